//! Simulated register surface and core for host-side testing
//!
//! [`SimBank`] models the hardware side effects the drivers rely on:
//! write-one-to-set/clear enable and pending banks, and a SysTick counter
//! that advances a fixed number of clocks on every STCTRL read.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use crate::cpu::CoreControl;
use crate::registers::{stctrl, Register, RegisterBank, STRELOAD_MASK};

/// SysTick clocks simulated per STCTRL read unless configured otherwise.
pub const DEFAULT_STEP: u32 = 1000;

/// In-memory register surface
#[derive(Debug)]
pub struct SimBank {
    regs: [AtomicU32; Register::COUNT],
    step: u32,
    writes: AtomicUsize,
    count_reads: AtomicUsize,
    expirations: AtomicUsize,
}

impl SimBank {
    pub const fn new() -> Self {
        Self::with_step(DEFAULT_STEP)
    }

    /// Advance SysTick by `step` clocks on each STCTRL read.
    pub const fn with_step(step: u32) -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const ZERO: AtomicU32 = AtomicU32::new(0);
        Self {
            regs: [ZERO; Register::COUNT],
            step,
            writes: AtomicUsize::new(0),
            count_reads: AtomicUsize::new(0),
            expirations: AtomicUsize::new(0),
        }
    }

    fn cell(&self, reg: Register) -> &AtomicU32 {
        let backing = match reg {
            Register::Disable(n) => Register::Enable(n),
            Register::Unpend(n) => Register::Pend(n),
            other => other,
        };
        &self.regs[backing.slot()]
    }

    /// Read a register without hardware side effects.
    pub fn peek(&self, reg: Register) -> u32 {
        self.cell(reg).load(Ordering::SeqCst)
    }

    /// Store a raw value without hardware side effects or write accounting.
    pub fn poke(&self, reg: Register, value: u32) {
        self.cell(reg).store(value, Ordering::SeqCst);
    }

    /// Number of writes issued through [`RegisterBank::write`].
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of STCTRL reads that returned COUNT set.
    pub fn count_reads(&self) -> usize {
        self.count_reads.load(Ordering::SeqCst)
    }

    /// Number of 1 -> 0 counter transitions so far.
    pub fn expirations(&self) -> usize {
        self.expirations.load(Ordering::SeqCst)
    }

    /// Let `clocks` SysTick clocks elapse.
    pub fn advance(&self, clocks: u32) {
        let ctrl = self.cell(Register::SysTickCtrl);
        let current = self.cell(Register::SysTickCurrent);
        let mut remaining = clocks;
        while remaining > 0 {
            if ctrl.load(Ordering::SeqCst) & stctrl::ENABLE == 0 {
                return;
            }
            let value = current.load(Ordering::SeqCst);
            if value == 0 {
                // Reload on the clock after reaching zero; RELOAD 0 never counts.
                let reload = self.peek(Register::SysTickReload);
                if reload == 0 {
                    return;
                }
                current.store(reload, Ordering::SeqCst);
                remaining -= 1;
            } else if remaining < value {
                current.store(value - remaining, Ordering::SeqCst);
                return;
            } else {
                remaining -= value;
                current.store(0, Ordering::SeqCst);
                ctrl.fetch_or(stctrl::COUNT, Ordering::SeqCst);
                self.expirations.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

impl Default for SimBank {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBank for SimBank {
    fn read(&self, reg: Register) -> u32 {
        if reg == Register::SysTickCtrl {
            self.advance(self.step);
            let value = self
                .cell(reg)
                .fetch_and(!stctrl::COUNT, Ordering::SeqCst);
            if value & stctrl::COUNT != 0 {
                self.count_reads.fetch_add(1, Ordering::SeqCst);
            }
            return value;
        }
        self.peek(reg)
    }

    fn write(&self, reg: Register, value: u32) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let cell = self.cell(reg);
        match reg {
            Register::Enable(_) | Register::Pend(_) => {
                cell.fetch_or(value, Ordering::SeqCst);
            }
            Register::Disable(_) | Register::Unpend(_) => {
                cell.fetch_and(!value, Ordering::SeqCst);
            }
            Register::SysTickCtrl => {
                let keep = cell.load(Ordering::SeqCst) & stctrl::COUNT;
                let bits = stctrl::ENABLE | stctrl::INTEN | stctrl::CLK_SRC;
                cell.store((value & bits) | keep, Ordering::SeqCst);
            }
            Register::SysTickReload => cell.store(value & STRELOAD_MASK, Ordering::SeqCst),
            Register::SysTickCurrent => {
                cell.store(0, Ordering::SeqCst);
                self.cell(Register::SysTickCtrl)
                    .fetch_and(!stctrl::COUNT, Ordering::SeqCst);
            }
            _ => cell.store(value, Ordering::SeqCst),
        }
    }
}

/// Records the mask and supervisor-call instructions instead of executing them
#[derive(Debug, Default)]
pub struct SimCore {
    primask: AtomicBool,
    faultmask: AtomicBool,
    svc_calls: AtomicUsize,
}

impl SimCore {
    pub const fn new() -> Self {
        Self {
            primask: AtomicBool::new(false),
            faultmask: AtomicBool::new(false),
            svc_calls: AtomicUsize::new(0),
        }
    }

    /// PRIMASK set: configurable interrupts are masked.
    pub fn interrupts_masked(&self) -> bool {
        self.primask.load(Ordering::SeqCst)
    }

    /// FAULTMASK set: configurable faults are masked.
    pub fn faults_masked(&self) -> bool {
        self.faultmask.load(Ordering::SeqCst)
    }

    pub fn svc_calls(&self) -> usize {
        self.svc_calls.load(Ordering::SeqCst)
    }
}

impl CoreControl for SimCore {
    fn enable_interrupts(&self) {
        self.primask.store(false, Ordering::SeqCst);
    }

    fn disable_interrupts(&self) {
        self.primask.store(true, Ordering::SeqCst);
    }

    fn enable_faults(&self) {
        self.faultmask.store(false, Ordering::SeqCst);
    }

    fn disable_faults(&self) {
        self.faultmask.store(true, Ordering::SeqCst);
    }

    fn supervisor_call(&self) {
        self.svc_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_banks_are_write_one() {
        let bank = SimBank::new();

        bank.write(Register::enable(2).unwrap(), 0b0110);
        bank.write(Register::enable(2).unwrap(), 0b0001);
        assert_eq!(bank.read(Register::enable(2).unwrap()), 0b0111);

        bank.write(Register::disable(2).unwrap(), 0b0010);
        assert_eq!(bank.read(Register::enable(2).unwrap()), 0b0101);
        assert_eq!(bank.read(Register::disable(2).unwrap()), 0b0101);
    }

    #[test]
    fn test_count_flag_clears_on_read() {
        let bank = SimBank::with_step(0);
        bank.write(Register::SysTickReload, 2);
        bank.write(Register::SysTickCtrl, stctrl::ENABLE);

        bank.advance(3);
        assert_eq!(bank.expirations(), 1);
        assert_ne!(bank.read(Register::SysTickCtrl) & stctrl::COUNT, 0);
        assert_eq!(bank.read(Register::SysTickCtrl) & stctrl::COUNT, 0);
        assert_eq!(bank.count_reads(), 1);
    }

    #[test]
    fn test_disabled_counter_does_not_advance() {
        let bank = SimBank::with_step(0);
        bank.write(Register::SysTickReload, 5);
        bank.advance(100);
        assert_eq!(bank.peek(Register::SysTickCurrent), 0);
        assert_eq!(bank.expirations(), 0);
    }

    #[test]
    fn test_current_write_clears_count() {
        let bank = SimBank::with_step(0);
        bank.write(Register::SysTickReload, 1);
        bank.write(Register::SysTickCtrl, stctrl::ENABLE);
        bank.advance(2);
        assert_ne!(bank.peek(Register::SysTickCtrl) & stctrl::COUNT, 0);

        bank.write(Register::SysTickCurrent, 1234);
        assert_eq!(bank.peek(Register::SysTickCurrent), 0);
        assert_eq!(bank.peek(Register::SysTickCtrl) & stctrl::COUNT, 0);
    }
}
