use std::time::Duration;

/// Default delay between consecutive page submissions of a full render pass.
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(100);

/// Default cap on concurrent backend renders.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// Render scheduler tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Page `n` of a full pass starts `(n - 1) * stagger` after the pass.
    pub stagger: Duration,
    /// Maximum number of renders running in the decode backend at once.
    pub max_in_flight: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { stagger: DEFAULT_STAGGER, max_in_flight: DEFAULT_MAX_IN_FLIGHT }
    }
}

impl SchedulerConfig {
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// At least one render is always allowed.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Start delay for the page at zero-based position `position` in a full pass.
    pub fn stagger_for(&self, position: u32) -> Duration {
        self.stagger.saturating_mul(position)
    }
}
