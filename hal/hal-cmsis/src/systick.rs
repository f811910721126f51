//! ARM Cortex-M SysTick countdown timer
//!
//! The counter decrements once per clock from RELOAD down to zero, then
//! reloads. A RELOAD value of N therefore spans N + 1 clocks, which is why a
//! period of `ms` milliseconds is programmed as `ms * ticks_per_ms - 1`.
//!
//! The driver owns a single callback, run from [`SysTick::handler`]. Wire the
//! handler to the `SysTick` exception vector, e.g. with `cortex-m-rt`:
//!
//! ```ignore
//! static SYSTICK: SysTick<MmioBank> =
//!     SysTick::new(unsafe { MmioBank::new() }, ChipConfig::TM4C123GH6PM.systick);
//!
//! #[exception]
//! fn SysTick() {
//!     SYSTICK.handler();
//! }
//! ```

use core::convert::Infallible;

use hal::error::{HalError, HalResult};
use hal::timer::{Timer, TimerCallback};

use crate::callback::CallbackSlot;
use crate::chip::{ClockSource, SysTickConfig};
use crate::registers::{stctrl, Register, RegisterBank, STRELOAD_MASK};

/// SysTick driver over the register surface `B`
#[derive(Debug)]
pub struct SysTick<B> {
    bank: B,
    config: SysTickConfig,
    callback: CallbackSlot,
}

impl<B> SysTick<B> {
    pub const fn new(bank: B, config: SysTickConfig) -> Self {
        Self {
            bank,
            config,
            callback: CallbackSlot::new(),
        }
    }

    pub fn config(&self) -> &SysTickConfig {
        &self.config
    }

    /// Longest period a single reload can hold.
    pub fn max_period_ms(&self) -> u32 {
        match self.config.ticks_per_ms {
            0 => 0,
            ticks => (STRELOAD_MASK + 1) / ticks,
        }
    }

    /// RELOAD value for a period of `period_ms`.
    pub fn reload_for(&self, period_ms: u32) -> HalResult<u32> {
        period_ms
            .checked_mul(self.config.ticks_per_ms)
            .and_then(|ticks| ticks.checked_sub(1))
            .filter(|reload| *reload <= STRELOAD_MASK)
            .ok_or_else(|| {
                log::warn!("systick: rejected period {}ms", period_ms);
                HalError::InvalidPeriod(period_ms)
            })
    }

    fn clock_bits(&self) -> u32 {
        match self.config.clock_source {
            ClockSource::System => stctrl::CLK_SRC,
            ClockSource::PioscDiv4 => 0,
        }
    }

    /// Register the callback run by [`handler`](Self::handler).
    ///
    /// Safe to call while the timer interrupt is live: the slot is replaced
    /// with one atomic store.
    pub fn set_callback(&self, callback: TimerCallback) {
        self.callback.set(callback);
    }

    pub fn has_callback(&self) -> bool {
        self.callback.get().is_some()
    }

    /// SysTick exception entry point.
    ///
    /// Runs the registered callback synchronously and returns `true`, or
    /// returns `false` when none is registered.
    pub fn handler(&self) -> bool {
        self.callback.invoke()
    }
}

impl<B: RegisterBank> SysTick<B> {
    /// Stop the counter and program a fresh period, leaving it disabled.
    fn load(&self, reload: u32) {
        self.bank.write(Register::SysTickCtrl, 0);
        self.bank.write(Register::SysTickReload, reload);
        // Any write clears the counter and the COUNT flag.
        self.bank.write(Register::SysTickCurrent, 0);
    }

    /// Arm the timer for periodic interrupts every `period_ms`.
    pub fn init(&self, period_ms: u32) -> HalResult<()> {
        let reload = self.reload_for(period_ms)?;
        self.load(reload);
        self.bank.write(
            Register::SysTickCtrl,
            stctrl::ENABLE | stctrl::INTEN | self.clock_bits(),
        );
        log::debug!("systick: periodic {}ms (reload {})", period_ms, reload);
        Ok(())
    }

    /// Block for `period_ms` by polling the COUNT flag.
    ///
    /// Busy-polls without yielding, so calling it from an interrupt handler
    /// stalls every lower-priority interrupt for the whole period. Any
    /// periodic configuration is lost.
    pub fn start_busy_wait(&self, period_ms: u32) -> HalResult<()> {
        let reload = self.reload_for(period_ms)?;
        self.load(reload);
        self.bank
            .write(Register::SysTickCtrl, stctrl::ENABLE | self.clock_bits());

        nb::block!(self.wait()).unwrap_or_else(|never: Infallible| match never {});

        self.bank.write(Register::SysTickCtrl, 0);
        self.bank.write(Register::SysTickReload, 0);
        self.bank.write(Register::SysTickCurrent, 0);
        Ok(())
    }

    /// Poll for the end of the current period.
    ///
    /// Reading STCTRL clears COUNT, so only one caller sees each expiry.
    pub fn wait(&self) -> nb::Result<(), Infallible> {
        if self.bank.read(Register::SysTickCtrl) & stctrl::COUNT != 0 {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Resume counting; RELOAD, INTEN and the clock source are kept.
    pub fn start(&self) {
        self.bank
            .modify(Register::SysTickCtrl, |ctrl| ctrl | stctrl::ENABLE);
    }

    /// Pause counting; RELOAD, INTEN and the clock source are kept.
    pub fn stop(&self) {
        self.bank
            .modify(Register::SysTickCtrl, |ctrl| ctrl & !stctrl::ENABLE);
    }

    /// Disable the timer, zero its registers and drop the callback.
    ///
    /// Does not wait for a handler that is already running.
    pub fn deinit(&self) {
        self.bank.write(Register::SysTickCtrl, 0);
        self.bank.write(Register::SysTickReload, 0);
        self.bank.write(Register::SysTickCurrent, 0);
        self.callback.clear();
        log::debug!("systick: deinit");
    }

    pub fn reload(&self) -> u32 {
        self.bank.read(Register::SysTickReload) & STRELOAD_MASK
    }

    pub fn current(&self) -> u32 {
        self.bank.read(Register::SysTickCurrent) & STRELOAD_MASK
    }

    /// Whether the counter is enabled. Clears COUNT as a side effect.
    pub fn is_running(&self) -> bool {
        self.bank.read(Register::SysTickCtrl) & stctrl::ENABLE != 0
    }
}

impl<B: RegisterBank + Send + Sync> Timer for SysTick<B> {
    fn init(&self, period_ms: u32) -> HalResult<()> {
        SysTick::init(self, period_ms)
    }

    fn start_busy_wait(&self, period_ms: u32) -> HalResult<()> {
        SysTick::start_busy_wait(self, period_ms)
    }

    fn set_callback(&self, callback: TimerCallback) {
        SysTick::set_callback(self, callback)
    }

    fn handler(&self) -> bool {
        SysTick::handler(self)
    }

    fn start(&self) {
        SysTick::start(self)
    }

    fn stop(&self) {
        SysTick::stop(self)
    }

    fn deinit(&self) {
        SysTick::deinit(self)
    }
}
