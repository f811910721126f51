//! Memory map of the NVIC, System Control Block and SysTick registers
//!
//! Addresses follow the ARMv7-M System Control Space as implemented on the
//! TM4C123GH6PM. Every register is 32 bits wide.

use hal::error::{HalError, HalResult};

/// Number of interrupt set-enable registers (EN0..EN4).
pub const ENABLE_REGS: u8 = 5;
/// Number of interrupt priority registers (PRI0..PRI34).
pub const PRIORITY_REGS: u8 = 35;
/// Number of system handler priority registers (SYSPRI1..SYSPRI3).
pub const SYS_PRIORITY_REGS: u8 = 3;

const EN_BASE: usize = 0xE000_E100;
const DIS_BASE: usize = 0xE000_E180;
const PEND_BASE: usize = 0xE000_E200;
const UNPEND_BASE: usize = 0xE000_E280;
const PRI_BASE: usize = 0xE000_E400;
const SYSPRI1: usize = 0xE000_ED18;
const SYSHNDCTRL: usize = 0xE000_ED24;
const STCTRL: usize = 0xE000_E010;
const STRELOAD: usize = 0xE000_E014;
const STCURRENT: usize = 0xE000_E018;

/// SysTick control and status register bits.
pub mod stctrl {
    /// Counter enable
    pub const ENABLE: u32 = 1 << 0;
    /// Raise the SysTick exception when the counter reaches zero
    pub const INTEN: u32 = 1 << 1;
    /// Clock source: 1 = system clock, 0 = PIOSC / 4
    pub const CLK_SRC: u32 = 1 << 2;
    /// Counted to zero since the last read (cleared on read)
    pub const COUNT: u32 = 1 << 16;
}

/// Width mask of the SysTick reload and current-value registers.
pub const STRELOAD_MASK: u32 = 0x00FF_FFFF;

/// Width of every priority field.
pub const PRIORITY_FIELD_MASK: u32 = 0x7;

/// Position inside a bank of `LEN` registers
///
/// The field is private, so an index exists only after [`BankIndex::new`]
/// has checked it against the bank length:
///
/// ```compile_fail
/// use hal_cmsis::registers::{BankIndex, Register};
///
/// let reg = Register::Priority(BankIndex(200));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BankIndex<const LEN: u8>(u8);

impl<const LEN: u8> BankIndex<LEN> {
    pub fn new(index: u8) -> HalResult<Self> {
        if index < LEN {
            Ok(Self(index))
        } else {
            log::warn!("registers: index {} outside bank of {}", index, LEN);
            Err(HalError::InvalidRegisterIndex)
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    const fn offset(self) -> usize {
        self.0 as usize
    }
}

/// Index into the EN/DIS/PEND/UNPEND banks.
pub type EnableIndex = BankIndex<ENABLE_REGS>;
/// Index into the PRI bank.
pub type PriorityIndex = BankIndex<PRIORITY_REGS>;
/// Zero-based index into SYSPRI1..SYSPRI3.
pub type SysPriorityIndex = BankIndex<SYS_PRIORITY_REGS>;

/// A single 32-bit register of the interrupt and timer register surface
///
/// Indexed variants carry a [`BankIndex`], which only the checked
/// constructors can produce, so a computed index never reaches past the end
/// of its bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// ENn: write 1 to enable, reads back the enable state
    Enable(EnableIndex),
    /// DISn: write 1 to disable, reads back the enable state
    Disable(EnableIndex),
    /// PENDn: write 1 to pend, reads back the pending state
    Pend(EnableIndex),
    /// UNPENDn: write 1 to clear pending, reads back the pending state
    Unpend(EnableIndex),
    /// PRIn: four 8-bit priority lanes
    Priority(PriorityIndex),
    /// SYSPRI1..SYSPRI3 (stored zero-based)
    SysPriority(SysPriorityIndex),
    /// SYSHNDCTRL: fault handler enables
    SysHandlerCtrl,
    /// STCTRL
    SysTickCtrl,
    /// STRELOAD
    SysTickReload,
    /// STCURRENT
    SysTickCurrent,
}

impl Register {
    /// Slots needed to back every register of the surface.
    pub const COUNT: usize =
        4 * ENABLE_REGS as usize + PRIORITY_REGS as usize + SYS_PRIORITY_REGS as usize + 4;

    pub fn enable(index: u8) -> HalResult<Self> {
        BankIndex::new(index).map(Register::Enable)
    }

    pub fn disable(index: u8) -> HalResult<Self> {
        BankIndex::new(index).map(Register::Disable)
    }

    pub fn pend(index: u8) -> HalResult<Self> {
        BankIndex::new(index).map(Register::Pend)
    }

    pub fn unpend(index: u8) -> HalResult<Self> {
        BankIndex::new(index).map(Register::Unpend)
    }

    pub fn priority(index: u8) -> HalResult<Self> {
        BankIndex::new(index).map(Register::Priority)
    }

    /// System handler priority register `SYSPRI<number>`, `number` in 1..=3.
    pub fn sys_priority(number: u8) -> HalResult<Self> {
        match number.checked_sub(1) {
            Some(index) => BankIndex::new(index).map(Register::SysPriority),
            None => Err(HalError::InvalidRegisterIndex),
        }
    }

    /// Absolute address on the target.
    pub const fn address(self) -> usize {
        match self {
            Register::Enable(n) => EN_BASE + 4 * n.offset(),
            Register::Disable(n) => DIS_BASE + 4 * n.offset(),
            Register::Pend(n) => PEND_BASE + 4 * n.offset(),
            Register::Unpend(n) => UNPEND_BASE + 4 * n.offset(),
            Register::Priority(n) => PRI_BASE + 4 * n.offset(),
            Register::SysPriority(n) => SYSPRI1 + 4 * n.offset(),
            Register::SysHandlerCtrl => SYSHNDCTRL,
            Register::SysTickCtrl => STCTRL,
            Register::SysTickReload => STRELOAD,
            Register::SysTickCurrent => STCURRENT,
        }
    }

    /// Dense index in `0..Register::COUNT`, used by simulated banks.
    pub const fn slot(self) -> usize {
        let banks = ENABLE_REGS as usize;
        match self {
            Register::Enable(n) => n.offset(),
            Register::Disable(n) => banks + n.offset(),
            Register::Pend(n) => 2 * banks + n.offset(),
            Register::Unpend(n) => 3 * banks + n.offset(),
            Register::Priority(n) => 4 * banks + n.offset(),
            Register::SysPriority(n) => 4 * banks + PRIORITY_REGS as usize + n.offset(),
            Register::SysHandlerCtrl => Register::COUNT - 4,
            Register::SysTickCtrl => Register::COUNT - 3,
            Register::SysTickReload => Register::COUNT - 2,
            Register::SysTickCurrent => Register::COUNT - 1,
        }
    }
}

/// Volatile access to the register surface
///
/// Implementations must not cache: every `read` observes the hardware and
/// every `write` reaches it immediately.
pub trait RegisterBank {
    fn read(&self, reg: Register) -> u32;

    fn write(&self, reg: Register, value: u32);

    /// Read-modify-write `reg` with interrupts held off.
    ///
    /// Only excludes other code on this core. A second bus master touching
    /// the same register can still interleave with the sequence.
    fn modify<F>(&self, reg: Register, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        critical_section::with(|_| {
            let value = self.read(reg);
            self.write(reg, f(value));
        })
    }

    /// Replace the `mask << offset` field of `reg` with `value`.
    fn write_field(&self, reg: Register, offset: u8, mask: u32, value: u32) {
        self.modify(reg, |current| {
            (current & !(mask << offset)) | ((value & mask) << offset)
        })
    }

    /// Read the `mask << offset` field of `reg`.
    fn read_field(&self, reg: Register, offset: u8, mask: u32) -> u32 {
        (self.read(reg) >> offset) & mask
    }
}

impl<T: RegisterBank + ?Sized> RegisterBank for &T {
    fn read(&self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }

    fn modify<F>(&self, reg: Register, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        (**self).modify(reg, f)
    }
}

/// The memory-mapped registers of the running core
#[derive(Debug, Clone, Copy)]
pub struct MmioBank {
    _private: (),
}

impl MmioBank {
    /// # Safety
    ///
    /// The caller must be running on a core that implements the System
    /// Control Space at the addresses in this module. Several handles may
    /// coexist; they all alias the same hardware.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBank for MmioBank {
    fn read(&self, reg: Register) -> u32 {
        // SAFETY: `MmioBank::new` guarantees the address is a valid, aligned
        // System Control Space register.
        unsafe { core::ptr::read_volatile(reg.address() as *const u32) }
    }

    fn write(&self, reg: Register, value: u32) {
        log::trace!("mmio: {:?} <- {:#010x}", reg, value);
        // SAFETY: see `read`.
        unsafe { core::ptr::write_volatile(reg.address() as *mut u32, value) }
    }
}
