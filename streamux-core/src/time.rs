//! Monotonic time source used for stream timeouts
//!
//! Elapsed time is always computed with wrapping subtraction, so a 32-bit millisecond counter
//! may wrap around freely as long as a single timeout is shorter than the wrap period.

pub use embassy_time::{Duration, Instant};

/// Ever-increasing millisecond counter
pub trait Clock {
    fn now_ms(&self) -> u32;

    fn now_us(&self) -> u64 {
        u64::from(self.now_ms()) * 1000
    }

    /// Milliseconds elapsed since `start`, tolerant to counter wraparound
    fn elapsed_ms(&self, start: u32) -> u32 {
        self.now_ms().wrapping_sub(start)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Clock backed by the embassy time driver
///
/// The application must link a time driver, e.g. the one provided by its HAL crate.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation is intended: elapsed time uses wrapping arithmetic
        Instant::now().as_millis() as u32
    }

    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }
}

/// Converts a timeout into the millisecond domain of [`Clock`], saturating at `u32::MAX`
pub fn duration_to_ms(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}
