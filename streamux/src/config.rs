use crate::time::Duration;

/// Run-time parameters of a [`Stream`](crate::stream::Stream)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamConfig {
    /// Longest wait for a single byte in timed reads, parsing and search
    pub timeout: Duration,
}

impl StreamConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

    pub const fn new() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::new()
    }
}
