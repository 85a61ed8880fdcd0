use std::sync::LazyLock;

use pgrx::{prelude::*, PgMemoryContexts};
use xid::{Xid, XidGenerator};

pgrx::pg_module_magic!();

/// One generator per backend process, built on first use.
///
/// The machine and process tags are resolved once here; every later call only
/// reads the clock and bumps the counter.
static GENERATOR: LazyLock<XidGenerator> = LazyLock::new(XidGenerator::new);

// PostgreSQL epoch: 2000-01-01 00:00:00 UTC Unix epoch: 1970-01-01 00:00:00 UTC
// Difference: 946684800 seconds = 946684800000000 microseconds
const PG_EPOCH_OFFSET_MICROS: i64 = 946_684_800_000_000;

/// Copies `bytes` into a bytea allocated in the current memory context.
fn palloc_bytes(bytes: &[u8]) -> &'static [u8] {
    let len = bytes.len();
    // SAFETY:
    // - `palloc_slice` allocates `len` bytes in CurrentMemoryContext.
    // - `copy_nonoverlapping`: src/dst are valid for `len` bytes and
    //   non-overlapping.
    // - Memory is fully initialized after copy; slice lifetime managed by
    //   PostgreSQL.
    unsafe {
        let ptr = PgMemoryContexts::CurrentMemoryContext.palloc_slice::<u8>(len);
        core::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_mut_ptr(), len);
        core::slice::from_raw_parts(ptr.as_ptr(), len)
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Generate a new xid as 12 raw bytes
#[pg_extern(parallel_safe)]
fn xid_bin() -> &'static [u8] {
    palloc_bytes(GENERATOR.generate().as_bytes())
}

/// Generate a new xid as 20 base32hex characters
#[pg_extern(parallel_safe)]
fn xid_string() -> String {
    GENERATOR.generate().to_string()
}

// ============================================================================
// CONVERSION
// ============================================================================

/// Decode the text form into 12 raw bytes. Returns NULL on malformed input.
#[pg_extern(immutable, parallel_safe, strict)]
fn xid_to_bin(text: &str) -> Option<&'static [u8]> {
    Xid::decode_text(text)
        .ok()
        .map(|id| palloc_bytes(id.as_bytes()))
}

/// Encode 12 raw bytes as text. Returns NULL unless the input is exactly 12
/// bytes.
#[pg_extern(immutable, parallel_safe, strict)]
fn bin_to_xid(bytes: &[u8]) -> Option<String> {
    Xid::decode_bytes(bytes).ok().map(|id| id.to_string())
}

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

/// Check if a string is a valid xid
#[pg_extern(immutable, parallel_safe, strict)]
fn xid_is_valid(text: &str) -> bool {
    Xid::decode_text(text).is_ok()
}

/// The embedded creation time, at second precision
#[pg_extern(immutable, parallel_safe, strict)]
fn xid_time(bytes: &[u8]) -> Option<TimestampWithTimeZone> {
    let id = Xid::decode_bytes(bytes).ok()?;
    let unix_micros = i64::from(id.time()) * 1_000_000;
    let pg_micros = unix_micros - PG_EPOCH_OFFSET_MICROS;

    Some(
        TimestampWithTimeZone::try_from(pg_micros)
            .unwrap_or_else(|e| pgrx::error!("timestamp out of range: {}", e)),
    )
}

/// The 3-byte machine tag of a binary xid
#[pg_extern(immutable, parallel_safe, strict)]
fn xid_machine(bytes: &[u8]) -> Option<&'static [u8]> {
    let id = Xid::decode_bytes(bytes).ok()?;
    Some(palloc_bytes(&id.machine()))
}

/// The process tag of a binary xid
#[pg_extern(immutable, parallel_safe, strict)]
fn xid_pid(bytes: &[u8]) -> Option<i32> {
    Xid::decode_bytes(bytes).ok().map(|id| i32::from(id.pid()))
}

/// The counter of a binary xid
#[pg_extern(immutable, parallel_safe, strict)]
fn xid_counter(bytes: &[u8]) -> Option<i32> {
    // The counter is 24 bits, so it always fits in i32.
    Xid::decode_bytes(bytes).ok().map(|id| id.counter() as i32)
}

extension_sql!(
    r#"
COMMENT ON FUNCTION xid_bin() IS 'Generate a new xid as 12 raw bytes';
COMMENT ON FUNCTION xid_string() IS 'Generate a new xid as 20 base32hex characters';
COMMENT ON FUNCTION xid_to_bin(text) IS 'Decode the text form of an xid to 12 raw bytes, NULL if malformed';
COMMENT ON FUNCTION bin_to_xid(bytea) IS 'Encode 12 raw bytes as the text form of an xid, NULL if malformed';
COMMENT ON FUNCTION xid_is_valid(text) IS 'Check if a text string is a valid xid';
COMMENT ON FUNCTION xid_time(bytea) IS 'Creation time embedded in a binary xid';
COMMENT ON FUNCTION xid_machine(bytea) IS 'Machine tag of a binary xid';
COMMENT ON FUNCTION xid_pid(bytea) IS 'Process tag of a binary xid';
COMMENT ON FUNCTION xid_counter(bytea) IS 'Counter of a binary xid';
"#,
    name = "add_comments",
    requires = [
        xid_bin,
        xid_string,
        xid_to_bin,
        bin_to_xid,
        xid_is_valid,
        xid_time,
        xid_machine,
        xid_pid,
        xid_counter
    ]
);

// ============================================================================
// TESTS
// ============================================================================

#[cfg(any(test, feature = "pg_test"))]
#[pg_schema]
mod tests {
    use super::*;

    const TEXT: &str = "9m4e2mr0ui3e8a215n4g";
    const BYTES: [u8; 12] = [
        0x4d, 0x88, 0xe1, 0x5b, 0x60, 0xf4, 0x86, 0xe4, 0x28, 0x41, 0x2d, 0xc9,
    ];

    // ========================================================================
    // Generation Tests
    // ========================================================================

    #[pg_test]
    fn xid_bin_is_12_bytes() {
        let size = Spi::get_one::<i32>("SELECT octet_length(xid_bin())")
            .unwrap()
            .unwrap();
        assert_eq!(size, 12);
    }

    #[pg_test]
    fn xid_string_is_20_valid_chars() {
        let text = Spi::get_one::<String>("SELECT xid_string()")
            .unwrap()
            .unwrap();
        assert_eq!(text.len(), 20);
        assert!(xid_is_valid(&text));
    }

    #[pg_test]
    fn generated_values_are_unique_and_share_tags() {
        let a: Xid = xid_string().parse().unwrap();
        let b: Xid = xid_string().parse().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.machine(), b.machine());
        assert_eq!(a.pid(), b.pid());
    }

    #[pg_test]
    fn generated_values_are_distinct_in_bulk() {
        let distinct = Spi::get_one::<i64>(
            "SELECT count(DISTINCT xid_bin()) FROM generate_series(1, 10000)",
        )
        .unwrap()
        .unwrap();
        assert_eq!(distinct, 10_000);
    }

    // ========================================================================
    // Conversion Tests
    // ========================================================================

    #[pg_test]
    fn conversions_match_reference_vector() {
        assert_eq!(xid_to_bin(TEXT), Some(&BYTES[..]));
        assert_eq!(bin_to_xid(&BYTES).as_deref(), Some(TEXT));
    }

    #[pg_test]
    fn conversions_round_trip_in_sql() {
        let text = Spi::get_one::<String>(&format!("SELECT bin_to_xid(xid_to_bin('{TEXT}'))"))
            .unwrap()
            .unwrap();
        assert_eq!(text, TEXT);
    }

    #[pg_test]
    fn malformed_input_yields_null() {
        for sql in [
            "SELECT xid_to_bin('not-an-xid')",
            "SELECT xid_to_bin('9M4E2MR0UI3E8A215N4G')",
            "SELECT xid_to_bin('vvvvvvvvvvvvvvvvvvvv')",
            "SELECT xid_to_bin(NULL)",
        ] {
            assert_eq!(Spi::get_one::<Vec<u8>>(sql).unwrap(), None, "{sql}");
        }
        for sql in [
            "SELECT bin_to_xid('\\x0102'::bytea)",
            "SELECT bin_to_xid(NULL)",
        ] {
            assert_eq!(Spi::get_one::<String>(sql).unwrap(), None, "{sql}");
        }
    }

    // ========================================================================
    // Utility Tests
    // ========================================================================

    #[pg_test]
    fn accessors_decode_fields() {
        assert_eq!(xid_machine(&BYTES), Some(&[0x60, 0xf4, 0x86][..]));
        assert_eq!(xid_pid(&BYTES), Some(58408));
        assert_eq!(xid_counter(&BYTES), Some(4_271_561));
        assert_eq!(xid_pid(&BYTES[..11]), None);
        assert!(!xid_is_valid("9m4e2mr0ui3e8a215n4"));
    }

    #[pg_test]
    fn every_function_carries_a_comment() {
        for signature in [
            "xid_bin()",
            "xid_string()",
            "xid_to_bin(text)",
            "bin_to_xid(bytea)",
            "xid_is_valid(text)",
            "xid_time(bytea)",
            "xid_machine(bytea)",
            "xid_pid(bytea)",
            "xid_counter(bytea)",
        ] {
            let comment = Spi::get_one::<String>(&format!(
                "SELECT obj_description('{signature}'::regprocedure, 'pg_proc')"
            ))
            .unwrap();
            assert!(comment.is_some(), "{signature} has no comment");
        }
    }

    #[pg_test]
    fn xid_time_is_embedded_second() {
        let secs = Spi::get_one::<i64>(&format!(
            "SELECT extract(epoch FROM xid_time(xid_to_bin('{TEXT}')))::bigint"
        ))
        .unwrap()
        .unwrap();
        assert_eq!(secs, 1_300_816_219);
    }
}

#[cfg(test)]
pub mod pg_test {
    pub fn setup(_options: Vec<&str>) {
        // Perform one-off initialization when the pg_test framework starts
    }

    pub fn postgresql_conf_options() -> Vec<&'static str> {
        // Return custom postgresql.conf settings for testing
        vec![]
    }
}
