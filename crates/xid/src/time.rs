#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub(crate) use web_time::{SystemTime, UNIX_EPOCH};

#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
pub(crate) use std::time::{SystemTime, UNIX_EPOCH};

/// A trait for time sources that return a wall-clock timestamp.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests.
///
/// The unit is **seconds since the UNIX epoch**.
///
/// # Example
///
/// ```
/// use xid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource<u32> for FixedTime {
///     fn current_secs(&self) -> u32 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_secs(), 1234);
/// ```
pub trait TimeSource<T> {
    /// Returns the current time in seconds since the UNIX epoch.
    fn current_secs(&self) -> T;
}

/// Reads [`SystemTime::now`] on every call.
///
/// The value is truncated to whole seconds and wraps modulo 2^32. A clock set
/// before 1970 reads as `0` rather than failing.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource<u32> for SystemClock {
    #[allow(clippy::cast_possible_truncation)]
    fn current_secs(&self) -> u32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-09-13T12:26:40Z
        assert!(SystemClock.current_secs() > 1_600_000_000);
    }
}
