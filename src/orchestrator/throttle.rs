use std::time::Duration;

/// Minimum time between two participants fetches.
pub const FETCH_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Rate limit for the participants/artifacts fetch sub-phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchThrottle {
    interval_ms: u64,
}

impl FetchThrottle {
    pub fn new(interval: Duration) -> Self {
        FetchThrottle {
            interval_ms: interval.as_millis() as u64,
        }
    }

    /// The gate opens when nothing was fetched yet, or strictly more than
    /// the interval has passed since the last fetch. A clock that went
    /// backwards keeps it closed.
    pub fn is_open(&self, last_fetch_ms: Option<u64>, now_ms: u64) -> bool {
        match last_fetch_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > self.interval_ms,
        }
    }
}

impl Default for FetchThrottle {
    fn default() -> Self {
        Self::new(FETCH_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opens_when_never_fetched() {
        assert!(FetchThrottle::default().is_open(None, 0));
    }

    #[test]
    fn test_interval_is_strict() {
        let throttle = FetchThrottle::default();
        let last = 5_000_000;
        assert!(!throttle.is_open(Some(last), last + 599_999));
        assert!(!throttle.is_open(Some(last), last + 600_000));
        assert!(throttle.is_open(Some(last), last + 600_001));
    }

    #[test]
    fn test_clock_going_backwards_keeps_gate_closed() {
        let throttle = FetchThrottle::default();
        assert!(!throttle.is_open(Some(10_000), 5_000));
    }

    #[test]
    fn test_custom_interval() {
        let throttle = FetchThrottle::new(Duration::from_secs(1));
        assert!(throttle.is_open(Some(0), 1_001));
        assert!(!throttle.is_open(Some(0), 1_000));
    }
}
