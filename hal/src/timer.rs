//! System timer abstraction

use crate::error::HalResult;

/// Function invoked from the timer interrupt.
///
/// A plain function pointer: the driver keeps only the reference, never the
/// code behind it.
pub type TimerCallback = fn();

/// Countdown timer with a single interrupt callback
pub trait Timer: Send + Sync {
    /// Arm the timer for periodic, interrupt-driven operation
    fn init(&self, period_ms: u32) -> HalResult<()>;

    /// Block the caller for `period_ms` by polling the count flag
    ///
    /// The timer is left disabled and cleared on return.
    fn start_busy_wait(&self, period_ms: u32) -> HalResult<()>;

    /// Register the interrupt callback (last write wins)
    fn set_callback(&self, callback: TimerCallback);

    /// Interrupt entry point; returns `true` if a callback ran
    fn handler(&self) -> bool;

    /// Resume counting with the current configuration
    fn start(&self);

    /// Pause counting, keeping the current configuration
    fn stop(&self);

    /// Disable the timer, clear its registers and drop the callback
    fn deinit(&self);
}
