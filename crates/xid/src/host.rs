//! Host and process fingerprints used for the machine and process tags.
//!
//! Both tags are computed once when an [`crate::XidGenerator`] is built and
//! cached inside it. Detection never fails: when the host exposes no stable
//! identity the machine tag is drawn from the supplied random source.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::RandSource;

/// Files holding a stable per-host identity, tried in order.
const MACHINE_ID_PATHS: [&str; 4] = [
    "/etc/machine-id",
    "/var/lib/dbus/machine-id",
    "/etc/hostid",
    "/proc/sys/kernel/hostname",
];

/// Environment variables holding the host name, tried after the files.
const HOSTNAME_VARS: [&str; 2] = ["HOSTNAME", "COMPUTERNAME"];

/// Inside a container this file differs per cgroup even when pids repeat.
const CPUSET_PATH: &str = "/proc/self/cpuset";

/// Where a machine tag came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineSource {
    /// Read from the named file.
    File(&'static str),
    /// Read from the named environment variable.
    Env(&'static str),
    /// No host identity was available; the tag is random.
    Random,
}

/// Computes the 3-byte machine tag.
///
/// The tag is the first three bytes of a SHA-256 digest over the first
/// non-empty host identity found. If none is found, three random bytes are
/// used instead.
pub fn machine_tag<R>(rng: &R) -> ([u8; 3], MachineSource)
where
    R: RandSource<u32>,
{
    machine_tag_from(&MACHINE_ID_PATHS, &HOSTNAME_VARS, rng)
}

/// Computes the 2-byte process tag.
///
/// The tag is the process id truncated to 16 bits, XOR-ed with a digest of
/// the process cpuset when one exists.
pub fn process_tag<R>(rng: &R) -> u16
where
    R: RandSource<u32>,
{
    process_tag_from(process_id(), CPUSET_PATH, rng)
}

pub(crate) fn machine_tag_from<R>(
    paths: &[&'static str],
    vars: &[&'static str],
    rng: &R,
) -> ([u8; 3], MachineSource)
where
    R: RandSource<u32>,
{
    match read_host_identity(paths, vars) {
        Some((identity, source)) => (tag_from_identity(identity.as_bytes()), source),
        None => {
            let [_, a, b, c] = rng.rand().to_be_bytes();
            ([a, b, c], MachineSource::Random)
        }
    }
}

pub(crate) fn process_tag_from<P, R>(pid: Option<u32>, cpuset_path: P, rng: &R) -> u16
where
    P: AsRef<Path>,
    R: RandSource<u32>,
{
    let Some(pid) = pid else {
        return truncate(rng.rand());
    };
    match std::fs::read(cpuset_path) {
        Ok(cpuset) if !cpuset.is_empty() => truncate(pid ^ digest_u32(&cpuset)),
        _ => truncate(pid),
    }
}

fn read_host_identity(
    paths: &[&'static str],
    vars: &[&'static str],
) -> Option<(String, MachineSource)> {
    for &path in paths {
        if let Some(identity) = std::fs::read_to_string(path).ok().and_then(non_empty) {
            return Some((identity, MachineSource::File(path)));
        }
    }
    for &var in vars {
        if let Some(identity) = std::env::var(var).ok().and_then(non_empty) {
            return Some((identity, MachineSource::Env(var)));
        }
    }
    None
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn tag_from_identity(identity: &[u8]) -> [u8; 3] {
    let digest = Sha256::digest(identity);
    [digest[0], digest[1], digest[2]]
}

fn digest_u32(bytes: &[u8]) -> u32 {
    let digest = Sha256::digest(bytes);
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

#[allow(clippy::cast_possible_truncation)]
const fn truncate(value: u32) -> u16 {
    value as u16
}

// `std::process::id` panics on targets without processes.
#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
fn process_id() -> Option<u32> {
    Some(std::process::id())
}

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
fn process_id() -> Option<u32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FixedRand(u32);
    impl RandSource<u32> for FixedRand {
        fn rand(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn identity_tag_is_stable() {
        assert_eq!(tag_from_identity(b"host-a"), tag_from_identity(b"host-a"));
        assert_ne!(tag_from_identity(b"host-a"), tag_from_identity(b"host-b"));
    }

    #[test]
    fn identity_tag_is_digest_prefix() {
        // sha256("") = e3b0c442...
        assert_eq!(tag_from_identity(b""), [0xe3, 0xb0, 0xc4]);
    }

    #[test]
    fn machine_tag_is_stable_across_calls() {
        let (first, _) = machine_tag(&FixedRand(0x00AA_BBCC));
        let (second, _) = machine_tag(&FixedRand(0x0011_2233));
        if machine_tag_from(&MACHINE_ID_PATHS, &HOSTNAME_VARS, &FixedRand(0)).1
            != MachineSource::Random
        {
            assert_eq!(first, second);
        }
    }

    #[test]
    fn machine_tag_falls_back_to_random_without_host_identity() {
        let tag = machine_tag_from(
            &["/nonexistent/xid/machine-id", "/nonexistent/xid/hostid"],
            &["XID_TEST_UNSET_HOSTNAME"],
            &FixedRand(0x00AA_BBCC),
        );
        assert_eq!(tag, ([0xAA, 0xBB, 0xCC], MachineSource::Random));
    }

    #[test]
    fn machine_tag_reads_first_non_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty");
        let id = dir.path().join("machine-id");
        std::fs::write(&empty, " \n").unwrap();
        std::fs::write(&id, "host-a\n").unwrap();
        let empty: &'static str = empty.to_str().unwrap().to_owned().leak();
        let id: &'static str = id.to_str().unwrap().to_owned().leak();

        let tag = machine_tag_from(&[empty, id], &[], &FixedRand(0));
        assert_eq!(tag, (tag_from_identity(b"host-a"), MachineSource::File(id)));
    }

    #[test]
    fn process_tag_mixes_cpuset_digest() {
        let mut cpuset = tempfile::NamedTempFile::new().unwrap();
        cpuset.write_all(b"/docker/abc123\n").unwrap();

        let tag = process_tag_from(Some(0x0001_2345), cpuset.path(), &FixedRand(0));
        assert_eq!(tag, truncate(0x0001_2345 ^ digest_u32(b"/docker/abc123\n")));
    }

    #[test]
    fn process_tag_ignores_missing_or_empty_cpuset() {
        let empty = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(
            process_tag_from(Some(0x0001_2345), empty.path(), &FixedRand(0)),
            0x2345
        );
        assert_eq!(
            process_tag_from(Some(0x0001_2345), "/nonexistent/xid/cpuset", &FixedRand(0)),
            0x2345
        );
    }

    #[test]
    fn process_tag_is_random_without_pid() {
        assert_eq!(
            process_tag_from(None, "/nonexistent/xid/cpuset", &FixedRand(0x00AB_CDEF)),
            0xCDEF
        );
    }

    #[test]
    fn process_tag_is_stable_across_calls() {
        assert_eq!(process_tag(&FixedRand(1)), process_tag(&FixedRand(2)));
    }

    #[test]
    fn non_empty_trims_whitespace() {
        assert_eq!(non_empty("  abc\n".to_owned()), Some("abc".to_owned()));
        assert_eq!(non_empty(" \n".to_owned()), None);
    }
}
