//! Nested Vectored Interrupt Controller
//!
//! Each external interrupt line owns one bit in the enable/disable/pending
//! banks (`register = irq / 32`, `bit = irq % 32`) and one 8-bit lane in the
//! priority bank (`register = irq / 4`). Only the top three bits of a lane
//! are implemented, so the priority field sits at `(irq % 4) * 8 + 5`.

use hal::error::{HalError, HalResult};
use hal::interrupt::{check_priority, InterruptController, InterruptPriority};

use crate::chip::ChipConfig;
use crate::cpu::CoreControl;
use crate::registers::{Register, RegisterBank, PRIORITY_FIELD_MASK};

/// Offset of the implemented priority bits inside an 8-bit lane.
pub const PRIORITY_LANE_SHIFT: u8 = 5;

/// Location of one interrupt line's bit in a 32-bit bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitLocation {
    pub index: u8,
    pub mask: u32,
}

/// Location of one interrupt line's priority field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityLocation {
    pub register: Register,
    pub offset: u8,
}

/// Interrupt controller plus the system exception controls
///
/// `B` is the register surface and `C` the core's mask instructions. Both are
/// passed in so host tests can substitute [`crate::sim`] implementations.
#[derive(Debug)]
pub struct Nvic<B, C> {
    pub(crate) bank: B,
    pub(crate) core: C,
    irq_count: u32,
}

impl<B: RegisterBank, C: CoreControl> Nvic<B, C> {
    pub fn new(bank: B, core: C, chip: &ChipConfig) -> Self {
        Self {
            bank,
            core,
            irq_count: chip.irq_count.min(ChipConfig::MAX_IRQ_COUNT),
        }
    }

    /// Number of external interrupt lines accepted by this controller.
    pub fn irq_count(&self) -> u32 {
        self.irq_count
    }

    /// Access the underlying register surface.
    pub fn bank(&self) -> &B {
        &self.bank
    }

    fn check_irq(&self, irq: u32) -> HalResult<u32> {
        if irq < self.irq_count {
            Ok(irq)
        } else {
            log::warn!("nvic: rejected irq {} (lines: {})", irq, self.irq_count);
            Err(HalError::InvalidIrq(irq))
        }
    }

    /// Register index and bit mask of `irq` in the enable-style banks.
    pub fn bit_location(&self, irq: u32) -> HalResult<BitLocation> {
        let irq = self.check_irq(irq)?;
        Ok(BitLocation {
            index: (irq / 32) as u8,
            mask: 1 << (irq % 32),
        })
    }

    /// Priority register and field offset of `irq`.
    pub fn priority_location(&self, irq: u32) -> HalResult<PriorityLocation> {
        let irq = self.check_irq(irq)?;
        let register = u8::try_from(irq / 4)
            .map_err(|_| HalError::InvalidRegisterIndex)
            .and_then(Register::priority)?;
        Ok(PriorityLocation {
            register,
            offset: (irq % 4) as u8 * 8 + PRIORITY_LANE_SHIFT,
        })
    }

    pub fn enable_irq(&self, irq: u32) -> HalResult<()> {
        let loc = self.bit_location(irq)?;
        // Set-enable bank: zero bits are ignored, no read needed.
        self.bank.write(Register::enable(loc.index)?, loc.mask);
        log::debug!("nvic: enabled irq {}", irq);
        Ok(())
    }

    pub fn disable_irq(&self, irq: u32) -> HalResult<()> {
        let loc = self.bit_location(irq)?;
        self.bank.write(Register::disable(loc.index)?, loc.mask);
        log::debug!("nvic: disabled irq {}", irq);
        Ok(())
    }

    pub fn is_irq_enabled(&self, irq: u32) -> HalResult<bool> {
        let loc = self.bit_location(irq)?;
        Ok(self.bank.read(Register::enable(loc.index)?) & loc.mask != 0)
    }

    pub fn set_irq_priority(&self, irq: u32, priority: InterruptPriority) -> HalResult<()> {
        let loc = self.priority_location(irq)?;
        let priority = check_priority(priority).map_err(|err| {
            log::warn!("nvic: rejected priority {} for irq {}", priority, irq);
            err
        })?;
        self.bank.write_field(
            loc.register,
            loc.offset,
            PRIORITY_FIELD_MASK,
            u32::from(priority),
        );
        log::debug!("nvic: irq {} priority {}", irq, priority);
        Ok(())
    }

    pub fn irq_priority(&self, irq: u32) -> HalResult<InterruptPriority> {
        let loc = self.priority_location(irq)?;
        Ok(self
            .bank
            .read_field(loc.register, loc.offset, PRIORITY_FIELD_MASK) as InterruptPriority)
    }

    pub fn is_irq_pending(&self, irq: u32) -> HalResult<bool> {
        let loc = self.bit_location(irq)?;
        Ok(self.bank.read(Register::pend(loc.index)?) & loc.mask != 0)
    }

    pub fn set_irq_pending(&self, irq: u32) -> HalResult<()> {
        let loc = self.bit_location(irq)?;
        self.bank.write(Register::pend(loc.index)?, loc.mask);
        Ok(())
    }

    pub fn clear_irq_pending(&self, irq: u32) -> HalResult<()> {
        let loc = self.bit_location(irq)?;
        self.bank.write(Register::unpend(loc.index)?, loc.mask);
        Ok(())
    }
}

impl<B, C> InterruptController for Nvic<B, C>
where
    B: RegisterBank + Send + Sync,
    C: CoreControl + Send + Sync,
{
    fn enable_interrupt(&self, irq_num: u32) -> HalResult<()> {
        self.enable_irq(irq_num)
    }

    fn disable_interrupt(&self, irq_num: u32) -> HalResult<()> {
        self.disable_irq(irq_num)
    }

    fn is_enabled(&self, irq_num: u32) -> HalResult<bool> {
        self.is_irq_enabled(irq_num)
    }

    fn set_priority(&self, irq_num: u32, priority: InterruptPriority) -> HalResult<()> {
        self.set_irq_priority(irq_num, priority)
    }

    fn priority(&self, irq_num: u32) -> HalResult<InterruptPriority> {
        self.irq_priority(irq_num)
    }

    fn is_pending(&self, irq_num: u32) -> HalResult<bool> {
        self.is_irq_pending(irq_num)
    }

    fn set_pending(&self, irq_num: u32) -> HalResult<()> {
        self.set_irq_pending(irq_num)
    }

    fn clear_pending(&self, irq_num: u32) -> HalResult<()> {
        self.clear_irq_pending(irq_num)
    }
}
