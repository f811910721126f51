//! System exception enables and priorities
//!
//! The fixed exceptions do not follow the regular per-line layout of
//! external interrupts. Their controls are spread over processor mask
//! registers, SYSHNDCTRL and three system priority registers, so each kind
//! is described by a table entry instead of ad-hoc branches.

use hal::error::{HalError, HalResult};
use hal::interrupt::{
    check_priority, Exception, ExceptionControl, ExceptionController, InterruptPriority,
};

use crate::cpu::CoreControl;
use crate::nvic::Nvic;
use crate::registers::{Register, RegisterBank, PRIORITY_FIELD_MASK};

/// How an exception is enabled or disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableControl {
    /// Cannot be masked at all (Reset, NMI)
    NotMaskable,
    /// FAULTMASK; masks every configurable fault, not only HardFault
    FaultMask,
    /// PRIMASK; masks every configurable exception and interrupt
    PriMask,
    /// A single bit in SYSHNDCTRL
    HandlerBit(u32),
    /// Enabling raises the exception immediately; no disable exists
    Trigger,
    /// No enable control in this register surface
    NoControl,
}

/// Location of a 3-bit priority field in a system priority register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityField {
    /// `SYSPRI<n>` number, 1..=3
    pub sys_priority: u8,
    pub offset: u8,
}

/// Register-level description of one exception kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionDescriptor {
    pub enable: EnableControl,
    /// `None` for fixed-priority kinds
    pub priority: Option<PriorityField>,
}

const fn field(sys_priority: u8, offset: u8) -> Option<PriorityField> {
    Some(PriorityField {
        sys_priority,
        offset,
    })
}

/// SYSHNDCTRL enable bits.
pub const MEMFAULT_ENABLE: u32 = 1 << 16;
pub const BUSFAULT_ENABLE: u32 = 1 << 17;
pub const USAGEFAULT_ENABLE: u32 = 1 << 18;

/// Table entry for `kind`.
pub const fn descriptor(kind: Exception) -> ExceptionDescriptor {
    let (enable, priority) = match kind {
        Exception::Reset | Exception::Nmi => (EnableControl::NotMaskable, None),
        Exception::HardFault => (EnableControl::FaultMask, None),
        Exception::MemManage => (EnableControl::HandlerBit(MEMFAULT_ENABLE), field(1, 5)),
        Exception::BusFault => (EnableControl::HandlerBit(BUSFAULT_ENABLE), field(1, 13)),
        Exception::UsageFault => (EnableControl::HandlerBit(USAGEFAULT_ENABLE), field(1, 21)),
        Exception::SvCall => (EnableControl::Trigger, field(2, 29)),
        Exception::DebugMonitor => (EnableControl::NoControl, field(3, 5)),
        Exception::PendSv => (EnableControl::NoControl, field(3, 21)),
        Exception::SysTick => (EnableControl::NoControl, field(3, 29)),
        Exception::AllInterrupts => (EnableControl::PriMask, None),
    };
    ExceptionDescriptor { enable, priority }
}

impl<B: RegisterBank, C: CoreControl> Nvic<B, C> {
    pub fn enable_exception(&self, kind: Exception) -> HalResult<ExceptionControl> {
        let outcome = match descriptor(kind).enable {
            EnableControl::NotMaskable => {
                log::warn!("nvic: {} cannot be enabled", kind);
                return Err(HalError::NotMaskable(kind));
            }
            EnableControl::FaultMask => {
                self.core.enable_faults();
                ExceptionControl::Applied
            }
            EnableControl::PriMask => {
                self.core.enable_interrupts();
                ExceptionControl::Applied
            }
            EnableControl::HandlerBit(mask) => {
                self.bank.modify(Register::SysHandlerCtrl, |v| v | mask);
                ExceptionControl::Applied
            }
            EnableControl::Trigger => {
                self.core.supervisor_call();
                ExceptionControl::Triggered
            }
            EnableControl::NoControl => ExceptionControl::NoHardwareControl,
        };
        log::debug!("nvic: enable {} -> {:?}", kind, outcome);
        Ok(outcome)
    }

    pub fn disable_exception(&self, kind: Exception) -> HalResult<ExceptionControl> {
        let outcome = match descriptor(kind).enable {
            EnableControl::NotMaskable => {
                log::warn!("nvic: {} cannot be disabled", kind);
                return Err(HalError::NotMaskable(kind));
            }
            EnableControl::FaultMask => {
                self.core.disable_faults();
                ExceptionControl::Applied
            }
            EnableControl::PriMask => {
                self.core.disable_interrupts();
                ExceptionControl::Applied
            }
            EnableControl::HandlerBit(mask) => {
                self.bank.modify(Register::SysHandlerCtrl, |v| v & !mask);
                ExceptionControl::Applied
            }
            // SVCall is synchronous to the `svc` instruction and has no mask.
            EnableControl::Trigger | EnableControl::NoControl => {
                ExceptionControl::NoHardwareControl
            }
        };
        log::debug!("nvic: disable {} -> {:?}", kind, outcome);
        Ok(outcome)
    }

    /// Enable state of the SYSHNDCTRL-controlled faults.
    pub fn is_exception_enabled(&self, kind: Exception) -> HalResult<bool> {
        match descriptor(kind).enable {
            EnableControl::HandlerBit(mask) => {
                Ok(self.bank.read(Register::SysHandlerCtrl) & mask != 0)
            }
            _ => Err(HalError::NotSupported),
        }
    }

    fn priority_field(&self, kind: Exception) -> HalResult<(Register, u8)> {
        let field = descriptor(kind).priority.ok_or_else(|| {
            log::warn!("nvic: {} has a fixed priority", kind);
            HalError::FixedPriority(kind)
        })?;
        Ok((Register::sys_priority(field.sys_priority)?, field.offset))
    }

    pub fn set_exception_priority(
        &self,
        kind: Exception,
        priority: InterruptPriority,
    ) -> HalResult<()> {
        let (register, offset) = self.priority_field(kind)?;
        let priority = check_priority(priority)?;
        // Read and write back the same register; neighbouring fields survive.
        self.bank
            .write_field(register, offset, PRIORITY_FIELD_MASK, u32::from(priority));
        log::debug!("nvic: {} priority {}", kind, priority);
        Ok(())
    }

    pub fn exception_priority(&self, kind: Exception) -> HalResult<InterruptPriority> {
        let (register, offset) = self.priority_field(kind)?;
        Ok(self.bank.read_field(register, offset, PRIORITY_FIELD_MASK) as InterruptPriority)
    }
}

impl<B, C> ExceptionController for Nvic<B, C>
where
    B: RegisterBank + Send + Sync,
    C: CoreControl + Send + Sync,
{
    fn enable_exception(&self, kind: Exception) -> HalResult<ExceptionControl> {
        Nvic::enable_exception(self, kind)
    }

    fn disable_exception(&self, kind: Exception) -> HalResult<ExceptionControl> {
        Nvic::disable_exception(self, kind)
    }

    fn set_exception_priority(
        &self,
        kind: Exception,
        priority: InterruptPriority,
    ) -> HalResult<()> {
        Nvic::set_exception_priority(self, kind, priority)
    }

    fn exception_priority(&self, kind: Exception) -> HalResult<InterruptPriority> {
        Nvic::exception_priority(self, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::ChipConfig;
    use crate::sim::{SimBank, SimCore};

    #[test]
    fn test_enable_controls() {
        assert_eq!(descriptor(Exception::Nmi).enable, EnableControl::NotMaskable);
        assert_eq!(descriptor(Exception::SvCall).enable, EnableControl::Trigger);
        for kind in [Exception::DebugMonitor, Exception::PendSv, Exception::SysTick] {
            assert_eq!(descriptor(kind).enable, EnableControl::NoControl);
            assert!(descriptor(kind).priority.is_some());
        }
    }

    #[test]
    fn test_priority_fields_do_not_overlap() {
        for (i, a) in Exception::ALL.iter().enumerate() {
            for b in &Exception::ALL[i + 1..] {
                if let (Some(fa), Some(fb)) = (descriptor(*a).priority, descriptor(*b).priority) {
                    assert!(
                        fa.sys_priority != fb.sys_priority || fa.offset != fb.offset,
                        "{} and {} share a field",
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn test_handler_bits() {
        let (bank, core) = (SimBank::new(), SimCore::new());
        let nvic = Nvic::new(&bank, &core, &ChipConfig::TM4C123GH6PM);

        assert_eq!(
            nvic.enable_exception(Exception::BusFault),
            Ok(ExceptionControl::Applied)
        );
        assert_eq!(bank.peek(Register::SysHandlerCtrl), BUSFAULT_ENABLE);
        assert_eq!(nvic.is_exception_enabled(Exception::BusFault), Ok(true));
        assert_eq!(nvic.is_exception_enabled(Exception::MemManage), Ok(false));

        nvic.disable_exception(Exception::BusFault).unwrap();
        assert_eq!(bank.peek(Register::SysHandlerCtrl), 0);
        assert_eq!(
            nvic.is_exception_enabled(Exception::SvCall),
            Err(HalError::NotSupported)
        );
    }

    #[test]
    fn test_systick_priority_field() {
        let (bank, core) = (SimBank::new(), SimCore::new());
        let nvic = Nvic::new(&bank, &core, &ChipConfig::TM4C123GH6PM);

        nvic.set_exception_priority(Exception::SysTick, 5).unwrap();
        assert_eq!(bank.peek(Register::sys_priority(3).unwrap()), 5 << 29);
        assert_eq!(nvic.exception_priority(Exception::SysTick), Ok(5));
    }
}
