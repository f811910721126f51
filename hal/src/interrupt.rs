//! Interrupt controller abstraction

use core::fmt;

use crate::error::{HalError, HalResult};

/// Interrupt priority (0 = highest)
pub type InterruptPriority = u8;

/// Highest precedence a priority field can encode.
pub const PRIORITY_HIGHEST: InterruptPriority = 0;

/// Lowest precedence a priority field can encode.
pub const PRIORITY_LOWEST: InterruptPriority = 7;

/// Check that `priority` fits the 3-bit priority field.
pub fn check_priority(priority: InterruptPriority) -> HalResult<InterruptPriority> {
    if priority > PRIORITY_LOWEST {
        Err(HalError::InvalidPriority(priority))
    } else {
        Ok(priority)
    }
}

/// Fixed system exceptions of the processor core
///
/// `AllInterrupts` is not a real exception: it stands for the global
/// interrupt mask (PRIMASK).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exception {
    Reset,
    Nmi,
    HardFault,
    MemManage,
    BusFault,
    UsageFault,
    SvCall,
    DebugMonitor,
    PendSv,
    SysTick,
    AllInterrupts,
}

impl Exception {
    /// Every exception kind, in vector table order.
    pub const ALL: [Exception; 11] = [
        Exception::Reset,
        Exception::Nmi,
        Exception::HardFault,
        Exception::MemManage,
        Exception::BusFault,
        Exception::UsageFault,
        Exception::SvCall,
        Exception::DebugMonitor,
        Exception::PendSv,
        Exception::SysTick,
        Exception::AllInterrupts,
    ];

    /// Short name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Exception::Reset => "Reset",
            Exception::Nmi => "NMI",
            Exception::HardFault => "HardFault",
            Exception::MemManage => "MemManage",
            Exception::BusFault => "BusFault",
            Exception::UsageFault => "UsageFault",
            Exception::SvCall => "SVCall",
            Exception::DebugMonitor => "DebugMonitor",
            Exception::PendSv => "PendSV",
            Exception::SysTick => "SysTick",
            Exception::AllInterrupts => "AllInterrupts",
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Exception {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name());
    }
}

/// What an exception enable/disable request did to the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionControl {
    /// A mask bit or control register was changed
    Applied,
    /// The exception was raised immediately (SVCall has no enable bit)
    Triggered,
    /// The hardware exposes no control for this request; nothing was done
    NoHardwareControl,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ExceptionControl {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ExceptionControl::Applied => defmt::write!(fmt, "Applied"),
            ExceptionControl::Triggered => defmt::write!(fmt, "Triggered"),
            ExceptionControl::NoHardwareControl => defmt::write!(fmt, "NoHardwareControl"),
        }
    }
}

/// Interrupt controller abstraction
///
/// Registers are shared with the hardware, so every operation takes `&self`.
pub trait InterruptController: Send + Sync {
    /// Enable interrupt
    fn enable_interrupt(&self, irq_num: u32) -> HalResult<()>;

    /// Disable interrupt
    fn disable_interrupt(&self, irq_num: u32) -> HalResult<()>;

    /// Check if interrupt is enabled
    fn is_enabled(&self, irq_num: u32) -> HalResult<bool>;

    /// Set interrupt priority
    fn set_priority(&self, irq_num: u32, priority: InterruptPriority) -> HalResult<()>;

    /// Read back interrupt priority
    fn priority(&self, irq_num: u32) -> HalResult<InterruptPriority>;

    /// Check if interrupt is pending
    fn is_pending(&self, irq_num: u32) -> HalResult<bool>;

    /// Force interrupt into the pending state
    fn set_pending(&self, irq_num: u32) -> HalResult<()>;

    /// Clear pending interrupt
    fn clear_pending(&self, irq_num: u32) -> HalResult<()>;
}

/// System exception control (faults, SVCall, PendSV, SysTick, global masks)
pub trait ExceptionController: Send + Sync {
    /// Enable an exception, or unmask the group it stands for
    fn enable_exception(&self, kind: Exception) -> HalResult<ExceptionControl>;

    /// Disable an exception, or mask the group it stands for
    fn disable_exception(&self, kind: Exception) -> HalResult<ExceptionControl>;

    /// Set exception priority
    fn set_exception_priority(&self, kind: Exception, priority: InterruptPriority)
        -> HalResult<()>;

    /// Read back exception priority
    fn exception_priority(&self, kind: Exception) -> HalResult<InterruptPriority>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_priority_bounds() {
        assert_eq!(check_priority(PRIORITY_HIGHEST), Ok(0));
        assert_eq!(check_priority(PRIORITY_LOWEST), Ok(7));
        assert_eq!(check_priority(8), Err(HalError::InvalidPriority(8)));
        assert_eq!(check_priority(0xFF), Err(HalError::InvalidPriority(0xFF)));
    }

    /// Vector-order position of every kind. The match is exhaustive, so a new
    /// variant does not compile until it is placed here.
    fn position(kind: Exception) -> usize {
        match kind {
            Exception::Reset => 0,
            Exception::Nmi => 1,
            Exception::HardFault => 2,
            Exception::MemManage => 3,
            Exception::BusFault => 4,
            Exception::UsageFault => 5,
            Exception::SvCall => 6,
            Exception::DebugMonitor => 7,
            Exception::PendSv => 8,
            Exception::SysTick => 9,
            Exception::AllInterrupts => 10,
        }
    }

    #[test]
    fn test_exception_table_lists_every_kind_once() {
        assert_eq!(Exception::ALL.len(), position(Exception::AllInterrupts) + 1);
        for (i, kind) in Exception::ALL.iter().enumerate() {
            assert_eq!(position(*kind), i, "{} out of place", kind);
        }
    }

    #[test]
    fn test_exception_names_are_distinct() {
        for (i, a) in Exception::ALL.iter().enumerate() {
            for b in &Exception::ALL[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }
}
