//! Per-chip constants

use crate::registers::{ENABLE_REGS, PRIORITY_REGS};

/// Clock feeding the SysTick counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// Processor (system) clock
    System,
    /// Precision internal oscillator divided by four
    PioscDiv4,
}

/// SysTick timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysTickConfig {
    /// Counter ticks per millisecond for the selected clock source
    pub ticks_per_ms: u32,
    pub clock_source: ClockSource,
}

impl SysTickConfig {
    pub const fn new(ticks_per_ms: u32, clock_source: ClockSource) -> Self {
        Self {
            ticks_per_ms,
            clock_source,
        }
    }

    /// Clocked from the system clock running at `clock_hz`.
    pub const fn system_clock(clock_hz: u32) -> Self {
        Self::new(clock_hz / 1000, ClockSource::System)
    }
}

/// Interrupt-controller and timer parameters of one chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipConfig {
    /// Number of external interrupt lines
    pub irq_count: u32,
    pub systick: SysTickConfig,
}

impl ChipConfig {
    /// TI TM4C123GH6PM at its reset-default 16 MHz system clock.
    pub const TM4C123GH6PM: ChipConfig = ChipConfig {
        irq_count: 139,
        systick: SysTickConfig::system_clock(16_000_000),
    };

    /// Highest line count both the enable and the priority banks can address.
    pub const MAX_IRQ_COUNT: u32 = {
        let enable_lines = 32 * ENABLE_REGS as u32;
        let priority_lines = 4 * PRIORITY_REGS as u32;
        if enable_lines < priority_lines {
            enable_lines
        } else {
            priority_lines
        }
    };
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self::TM4C123GH6PM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tm4c_defaults() {
        let chip = ChipConfig::default();
        assert_eq!(chip.irq_count, 139);
        assert_eq!(chip.systick.ticks_per_ms, 16_000);
        assert_eq!(chip.systick.clock_source, ClockSource::System);
        assert!(chip.irq_count <= ChipConfig::MAX_IRQ_COUNT);
    }

    #[test]
    fn test_line_cap_fits_priority_bank() {
        assert_eq!(ChipConfig::MAX_IRQ_COUNT, 140);
    }
}
