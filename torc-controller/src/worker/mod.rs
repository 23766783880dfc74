//! Background workers
//!
//! Periodic loops that keep the controller's view of the cluster current.

pub mod expiry;
pub mod sync;

pub use expiry::StateExpiry;
pub use sync::StateSync;

use tokio::time::Duration;

/// Longest poll interval a loop runs with (one week)
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Loop period for a configured interval, kept within `1..=MAX_INTERVAL_SECS`
fn period(seconds: u64) -> Duration {
    Duration::from_secs(seconds.clamp(1, MAX_INTERVAL_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_is_bounded() {
        assert_eq!(period(5), Duration::from_secs(5));
        assert_eq!(period(0), Duration::from_secs(1));
        assert_eq!(period(u64::MAX), Duration::from_secs(MAX_INTERVAL_SECS));
    }
}
