//! CPU clock configuration.

use crate::Ticks;

/// The clock feeding a CPU.
///
/// Frame budgets derive from this frequency: a 2 MHz 8080 at 60 Hz gets
/// `33_333` cycles per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MasterClock {
    /// CPU clock in Hz (e.g. `2_000_000` for Space Invaders' 8080).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Cycles per frame at the given frame rate (integer division). A zero
    /// rate has no frames and gets an empty budget.
    #[must_use]
    pub const fn cycles_per_frame(&self, frames_per_second: u64) -> Ticks {
        match self.frequency_hz.checked_div(frames_per_second) {
            Some(cycles) => Ticks::new(cycles),
            None => Ticks::ZERO,
        }
    }
}
