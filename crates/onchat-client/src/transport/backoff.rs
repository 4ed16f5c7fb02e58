use std::time::Duration;

use rand::Rng;

use crate::config::ConnectionSection;

/// Capped exponential reconnect delay with multiplicative jitter.
#[derive(Debug, Clone)]
pub struct Backoff {
    min: Duration,
    max: Duration,
    jitter: f64,
}

impl Backoff {
    pub fn new(min: Duration, max: Duration, jitter: f64) -> Self {
        let max = max.max(min);
        Self {
            min,
            max,
            jitter: jitter.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(cfg: &ConnectionSection) -> Self {
        Self::new(
            Duration::from_millis(cfg.reconnect_min_delay_ms),
            Duration::from_millis(cfg.reconnect_max_delay_ms),
            cfg.reconnect_jitter,
        )
    }

    /// `clamp(min * 2^attempt, min, max)` before jitter.
    pub fn base(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
        self.min.saturating_mul(factor).clamp(self.min, self.max)
    }

    /// Jittered delay, never outside `[min, max]`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base(attempt).as_nanos() as f64;
        let factor = rand::rng().random_range((1.0 - self.jitter)..=(1.0 + self.jitter));
        Duration::from_nanos((base * factor).round() as u64).clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn base_doubles_until_capped() {
        let b = Backoff::new(ms(500), ms(8000), 0.25);
        let got: Vec<u128> = (0..7).map(|n| b.base(n).as_millis()).collect();
        assert_eq!(got, vec![500, 1000, 2000, 4000, 8000, 8000, 8000]);
    }

    #[test]
    fn huge_attempts_do_not_overflow() {
        let b = Backoff::new(ms(500), ms(8000), 0.25);
        assert_eq!(b.base(u32::MAX), ms(8000));
        assert!(b.delay(u32::MAX) <= ms(8000));
    }

    #[test]
    fn delay_stays_in_bounds_and_jitter_band() {
        let b = Backoff::new(ms(500), ms(8000), 0.25);
        for attempt in 0..12 {
            let base = b.base(attempt).as_secs_f64();
            for _ in 0..200 {
                let d = b.delay(attempt);
                assert!(d >= ms(500) && d <= ms(8000), "attempt {attempt}: {d:?}");
                let secs = d.as_secs_f64();
                assert!(secs >= base * 0.75 - 1e-9 && secs <= base * 1.25 + 1e-9);
            }
        }
    }

    #[test]
    fn zero_jitter_is_exact() {
        let b = Backoff::new(ms(100), ms(1000), 0.0);
        assert_eq!(b.delay(0), ms(100));
        assert_eq!(b.delay(3), ms(800));
        assert_eq!(b.delay(9), ms(1000));
    }
}
