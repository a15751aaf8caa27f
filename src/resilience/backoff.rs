//! Configured backoff with positive jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::ServiceConfig;

/// Upper bound of the jitter, as a fraction of the base delay.
pub const JITTER_RATIO: f64 = 0.3;

/// Add up to 30% random jitter on top of `base`.
pub fn jittered(base: Duration) -> Duration {
    let base_ms = base.as_millis() as u64;
    let jitter_range = (base_ms as f64 * JITTER_RATIO) as u64;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..=jitter_range)
    } else {
        0
    };

    Duration::from_millis(base_ms.saturating_add(jitter))
}

/// Delay to sleep after a failed `attempt` before the next one.
pub fn calculate_backoff(config: &ServiceConfig, attempt: u32) -> Duration {
    jittered(config.retry_delay(attempt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(delays: Vec<u64>) -> ServiceConfig {
        ServiceConfig {
            name: "test".to_string(),
            base_url: "http://localhost".to_string(),
            timeout_ms: 100,
            max_retries: delays.len() as u32,
            retry_delays_ms: delays,
        }
    }

    #[test]
    fn test_backoff_stays_within_jitter_band() {
        let config = config(vec![100, 1_000, 4_000]);
        for attempt in 0..3u32 {
            let base = config.retry_delays_ms[attempt as usize];
            for _ in 0..200 {
                let delay = calculate_backoff(&config, attempt).as_millis() as u64;
                assert!(delay >= base, "attempt {}: {} < {}", attempt, delay, base);
                assert!(delay * 10 <= base * 13, "attempt {}: {} > 1.3 * {}", attempt, delay, base);
            }
        }
    }

    #[test]
    fn test_tiny_delays_have_no_jitter() {
        assert_eq!(jittered(Duration::from_millis(3)), Duration::from_millis(3));
        assert_eq!(jittered(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_huge_delay_saturates() {
        let delay = jittered(Duration::from_millis(u64::MAX));
        assert_eq!(delay, Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_jitter_varies() {
        let samples: std::collections::HashSet<u128> =
            (0..100).map(|_| jittered(Duration::from_secs(1)).as_millis()).collect();
        assert!(samples.len() > 1);
    }
}
