//! Blocking delays on top of [`SysTick::start_busy_wait`]

use embedded_hal::delay::DelayNs;

use crate::registers::RegisterBank;
use crate::systick::SysTick;

const NS_PER_MS: u32 = 1_000_000;
const US_PER_MS: u32 = 1_000;

/// `embedded-hal` delay provider borrowing a SysTick driver
///
/// Resolution is one millisecond; shorter requests round up. Each delay
/// reprograms the timer, so it cannot share SysTick with a periodic tick.
#[derive(Debug)]
pub struct Delay<'a, B> {
    systick: &'a SysTick<B>,
}

impl<'a, B: RegisterBank> Delay<'a, B> {
    pub fn new(systick: &'a SysTick<B>) -> Self {
        Self { systick }
    }

    /// Busy-wait `ms` milliseconds in chunks the reload register can hold.
    pub fn block_ms(&mut self, mut ms: u32) {
        let chunk = self.systick.max_period_ms();
        if chunk == 0 {
            log::error!("delay: SysTick clock too fast for a 1ms period");
            return;
        }
        while ms > 0 {
            let period = ms.min(chunk);
            if let Err(err) = self.systick.start_busy_wait(period) {
                log::error!("delay: {}", err);
                return;
            }
            ms -= period;
        }
    }
}

impl<B: RegisterBank> DelayNs for Delay<'_, B> {
    fn delay_ns(&mut self, ns: u32) {
        self.block_ms(ns.div_ceil(NS_PER_MS));
    }

    fn delay_us(&mut self, us: u32) {
        self.block_ms(us.div_ceil(US_PER_MS));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.block_ms(ms);
    }
}
