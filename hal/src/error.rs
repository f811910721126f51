//! Common error types for HAL operations

use core::fmt;

use crate::interrupt::Exception;

/// HAL operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Interrupt request number is beyond the lines the silicon implements
    InvalidIrq(u32),
    /// Priority does not fit the 3-bit priority field
    InvalidPriority(u8),
    /// Computed register index is outside its register bank
    InvalidRegisterIndex,
    /// Exception cannot be enabled or disabled (Reset, NMI)
    NotMaskable(Exception),
    /// Exception has a fixed priority or no priority field
    FixedPriority(Exception),
    /// Timer period is zero or does not fit the reload register
    InvalidPeriod(u32),
    /// Operation not supported by this implementation
    NotSupported,
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIrq(irq) => write!(f, "invalid interrupt number: {}", irq),
            Self::InvalidPriority(priority) => write!(f, "invalid priority level: {}", priority),
            Self::InvalidRegisterIndex => write!(f, "register index out of range"),
            Self::NotMaskable(kind) => write!(f, "exception cannot be masked: {}", kind),
            Self::FixedPriority(kind) => write!(f, "exception priority is fixed: {}", kind),
            Self::InvalidPeriod(ms) => write!(f, "invalid timer period: {}ms", ms),
            Self::NotSupported => write!(f, "operation not supported"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidIrq(irq) => defmt::write!(fmt, "InvalidIrq({})", irq),
            Self::InvalidPriority(priority) => defmt::write!(fmt, "InvalidPriority({})", priority),
            Self::InvalidRegisterIndex => defmt::write!(fmt, "InvalidRegisterIndex"),
            Self::NotMaskable(kind) => defmt::write!(fmt, "NotMaskable({})", kind),
            Self::FixedPriority(kind) => defmt::write!(fmt, "FixedPriority({})", kind),
            Self::InvalidPeriod(ms) => defmt::write!(fmt, "InvalidPeriod({})", ms),
            Self::NotSupported => defmt::write!(fmt, "NotSupported"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_display_names_offending_value() {
        assert_eq!(
            HalError::InvalidIrq(139).to_string(),
            "invalid interrupt number: 139"
        );
        assert_eq!(
            HalError::InvalidPriority(8).to_string(),
            "invalid priority level: 8"
        );
        assert_eq!(
            HalError::NotMaskable(Exception::Nmi).to_string(),
            "exception cannot be masked: NMI"
        );
        assert_eq!(HalError::InvalidPeriod(0).to_string(), "invalid timer period: 0ms");
    }
}
