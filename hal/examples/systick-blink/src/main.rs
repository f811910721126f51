//! SysTick Blink Example
//!
//! Runs a 10 ms periodic tick on a TM4C123GH6PM, counts it from the
//! callback, then hands SysTick over to blocking delays.
//!
//! Build with `cargo build --release` from this directory.

#![no_std]
#![no_main]

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m_rt::{entry, exception};
use embedded_hal::delay::DelayNs;
use hal::interrupt::{InterruptController, PRIORITY_HIGHEST, PRIORITY_LOWEST};
use hal::HalResult;
use hal_cmsis::{ChipConfig, CortexM, CortexMCore, Delay, MmioBank, Nvic};
use panic_halt as _;

const CHIP: ChipConfig = ChipConfig::TM4C123GH6PM;

/// GPIO port F, where the LaunchPad LEDs sit.
const GPIOF_IRQ: u32 = 30;

static SYSTICK: hal_cmsis::SysTick<MmioBank> =
    hal_cmsis::SysTick::new(unsafe { MmioBank::new() }, CHIP.systick);

static TICKS: AtomicU32 = AtomicU32::new(0);

fn on_tick() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}

#[exception]
fn SysTick() {
    SYSTICK.handler();
}

fn halt() -> ! {
    loop {
        cortex_m::asm::bkpt();
    }
}

fn configure(port: &CortexM<'_, MmioBank, CortexMCore>) -> HalResult<()> {
    port.nvic().set_priority(GPIOF_IRQ, PRIORITY_HIGHEST)?;
    port.nvic().enable_interrupt(GPIOF_IRQ)?;

    SYSTICK.set_callback(on_tick);
    port.start_tick(10, PRIORITY_LOWEST)
}

#[entry]
fn main() -> ! {
    // SAFETY: privileged thread mode on a Cortex-M4F.
    let (bank, core) = unsafe { (MmioBank::new(), CortexMCore::new()) };
    let port = CortexM::new(Nvic::new(bank, core, &CHIP), &SYSTICK);

    if configure(&port).is_err() {
        halt();
    }

    // One second of periodic ticks.
    while TICKS.load(Ordering::Relaxed) < 100 {
        cortex_m::asm::wfi();
    }
    port.stop_tick();

    let mut delay = Delay::new(&SYSTICK);
    loop {
        delay.delay_ms(500);
        TICKS.fetch_add(50, Ordering::Relaxed);
    }
}
