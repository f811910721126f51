//! ARM CMSIS core peripheral implementation for HAL
//!
//! Register-level drivers for the parts of a Cortex-M core every vendor
//! shares: the Nested Vectored Interrupt Controller, the System Control
//! Block exception controls and the SysTick timer.
//!
//! ## Layout
//! - [`registers`] – Memory map and the [`RegisterBank`] access trait.
//! - [`nvic`] / [`exception`] – Interrupt and exception enable/priority encoding.
//! - [`systick`] – SysTick countdown timer with a single interrupt callback.
//! - [`delay`] – `embedded-hal` blocking delay on top of SysTick.
//! - [`sim`] – Simulated register bank and core for host-side tests.
//!
//! Every driver takes its register surface explicitly, so the same code runs
//! against [`MmioBank`] on target and [`sim::SimBank`] on the host.
//!
//! ## Features
//! - `defmt` - `defmt::Format` for HAL types
//! - `single-core` - `critical-section` implementation from `cortex-m`

#![no_std]

pub mod callback;
pub mod chip;
pub mod cpu;
pub mod delay;
pub mod exception;
pub mod nvic;
pub mod registers;
pub mod sim;
pub mod systick;

pub use chip::{ChipConfig, ClockSource, SysTickConfig};
pub use cpu::CoreControl;
#[cfg(target_arch = "arm")]
pub use cpu::CortexMCore;
pub use delay::Delay;
pub use nvic::Nvic;
pub use registers::{MmioBank, Register, RegisterBank};
pub use systick::SysTick;

use hal::error::HalResult;
use hal::interrupt::{Exception, InterruptPriority};

/// Interrupt controller and system timer of one core
///
/// The timer is borrowed because it normally lives in a `static` shared with
/// the `SysTick` exception handler.
#[derive(Debug)]
pub struct CortexM<'t, B, C> {
    nvic: Nvic<B, C>,
    systick: &'t SysTick<B>,
}

impl<'t, B: RegisterBank, C: CoreControl> CortexM<'t, B, C> {
    pub fn new(nvic: Nvic<B, C>, systick: &'t SysTick<B>) -> Self {
        Self { nvic, systick }
    }

    pub fn nvic(&self) -> &Nvic<B, C> {
        &self.nvic
    }

    pub fn systick(&self) -> &SysTick<B> {
        self.systick
    }

    /// Give the SysTick exception `priority`, then arm a periodic tick.
    pub fn start_tick(&self, period_ms: u32, priority: InterruptPriority) -> HalResult<()> {
        self.nvic
            .set_exception_priority(Exception::SysTick, priority)?;
        self.systick.init(period_ms)
    }

    /// Stop the tick and drop its callback.
    pub fn stop_tick(&self) {
        self.systick.deinit();
    }
}

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBank, SimCore};
    use hal::error::HalError;

    #[test]
    fn test_start_tick_sets_priority_then_arms() {
        let (bank, core) = (SimBank::new(), SimCore::new());
        let chip = ChipConfig::TM4C123GH6PM;
        let systick = SysTick::new(&bank, chip.systick);
        let port = CortexM::new(Nvic::new(&bank, &core, &chip), &systick);

        port.start_tick(1, 2).unwrap();
        assert_eq!(port.nvic().exception_priority(Exception::SysTick), Ok(2));
        assert_eq!(port.systick().reload(), 15_999);

        port.stop_tick();
        assert_eq!(port.systick().reload(), 0);
    }

    #[test]
    fn test_start_tick_rejects_bad_priority_before_arming() {
        let (bank, core) = (SimBank::new(), SimCore::new());
        let chip = ChipConfig::TM4C123GH6PM;
        let systick = SysTick::new(&bank, chip.systick);
        let port = CortexM::new(Nvic::new(&bank, &core, &chip), &systick);

        assert_eq!(port.start_tick(1, 9), Err(HalError::InvalidPriority(9)));
        assert_eq!(bank.writes(), 0);
    }

    fn configure<B: RegisterBank, C: CoreControl>(
        port: &CortexM<'_, B, C>,
        irq: u32,
    ) -> HalResult<()> {
        port.nvic().set_irq_priority(irq, 0)?;
        port.nvic().enable_irq(irq)?;
        port.start_tick(10, 7)
    }

    #[test]
    fn test_line_setup_error_stops_before_tick_is_armed() {
        let (bank, core) = (SimBank::new(), SimCore::new());
        let chip = ChipConfig::TM4C123GH6PM;
        let systick = SysTick::new(&bank, chip.systick);
        let port = CortexM::new(Nvic::new(&bank, &core, &chip), &systick);

        assert_eq!(configure(&port, 139), Err(HalError::InvalidIrq(139)));
        assert_eq!(bank.writes(), 0);
        assert!(!port.systick().is_running());

        assert_eq!(configure(&port, 30), Ok(()));
        assert!(port.nvic().is_irq_enabled(30).unwrap());
        assert!(port.systick().is_running());
    }
}
