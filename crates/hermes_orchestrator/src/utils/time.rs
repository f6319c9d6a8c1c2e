use jiff::{SignedDuration, Timestamp};
use tracing::debug;

/// Runs `step` and logs how long it took
pub fn timed<T>(step: &str, run: impl FnOnce() -> T) -> T {
    let started = Timestamp::now();
    let result = run();
    debug!(step, elapsed = ?Timestamp::now().duration_since(started), "Step done");
    result
}

/// Matrix travel times are seconds as floats, schedules use whole seconds
pub fn seconds(value: f64) -> SignedDuration {
    SignedDuration::from_secs(value.round() as i64)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_rounding() {
        assert_eq!(seconds(12.4), SignedDuration::from_secs(12));
        assert_eq!(seconds(12.5), SignedDuration::from_secs(13));
    }

    #[test]
    fn test_timed_returns_the_step_result() {
        assert_eq!(timed("sum", || 1 + 2), 3);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.234_567, 4), 1.2346);
        assert_eq!(round_to(0.000_04, 4), 0.0);
    }
}
