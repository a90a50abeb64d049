/// Number of consecutive failed players after which a collection run stops.
pub const DEFAULT_FAILURE_LIMIT: u32 = 5;

/// Counts consecutive failures; any success resets the count.
#[derive(Debug, Clone)]
pub struct FailureStreak {
    limit: u32,
    current: u32,
}

impl FailureStreak {
    pub fn new(limit: u32) -> Self {
        Self { limit: limit.max(1), current: 0 }
    }

    /// Returns true once the streak reaches the limit.
    pub fn record_failure(&mut self) -> bool {
        self.current += 1;
        self.current >= self.limit
    }

    pub fn record_success(&mut self) {
        self.current = 0;
    }

    pub fn current(&self) -> u32 {
        self.current
    }
}

impl Default for FailureStreak {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_LIMIT)
    }
}
