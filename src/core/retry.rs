use std::time::Duration;

/// Bounded retry with a fixed pause between attempts.
///
/// Shared by the broker reconnect path and the order executor; callers loop
/// over `attempts()` and `pause()` between failed tries instead of driving
/// retries through error unwinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Attempt numbers, 1-based so they read well in logs.
    pub fn attempts(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.max_attempts
    }

    pub fn is_last(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }

    pub async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempts_are_one_based_and_bounded() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let attempts: Vec<u32> = policy.attempts().collect();
        assert_eq!(attempts, vec![1, 2, 3]);
        assert!(!policy.is_last(2));
        assert!(policy.is_last(3));
    }

    #[test]
    fn zero_attempts_never_runs() {
        let policy = RetryPolicy::new(0, Duration::from_millis(1));
        assert_eq!(policy.attempts().count(), 0);
    }

    #[tokio::test]
    async fn pause_sleeps_for_the_configured_delay() {
        let policy = RetryPolicy::new(2, Duration::from_millis(20));
        let before = std::time::Instant::now();
        policy.pause().await;
        assert!(before.elapsed() >= Duration::from_millis(20));
    }
}
