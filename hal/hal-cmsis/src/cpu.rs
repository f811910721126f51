//! Privileged processor-state instructions used by exception control

/// Processor mask and supervisor-call instructions
pub trait CoreControl {
    /// Clear PRIMASK (`cpsie i`)
    fn enable_interrupts(&self);

    /// Set PRIMASK (`cpsid i`)
    fn disable_interrupts(&self);

    /// Clear FAULTMASK (`cpsie f`)
    fn enable_faults(&self);

    /// Set FAULTMASK (`cpsid f`), masking every configurable fault
    fn disable_faults(&self);

    /// Raise the SVCall exception (`svc #0`)
    fn supervisor_call(&self);
}

impl<T: CoreControl + ?Sized> CoreControl for &T {
    fn enable_interrupts(&self) {
        (**self).enable_interrupts()
    }

    fn disable_interrupts(&self) {
        (**self).disable_interrupts()
    }

    fn enable_faults(&self) {
        (**self).enable_faults()
    }

    fn disable_faults(&self) {
        (**self).disable_faults()
    }

    fn supervisor_call(&self) {
        (**self).supervisor_call()
    }
}

/// The running Cortex-M core
#[cfg(target_arch = "arm")]
#[derive(Debug, Clone, Copy)]
pub struct CortexMCore {
    _private: (),
}

#[cfg(target_arch = "arm")]
impl CortexMCore {
    /// # Safety
    ///
    /// The caller must run in privileged mode; the mask instructions are
    /// ignored in unprivileged thread mode.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(target_arch = "arm")]
impl CoreControl for CortexMCore {
    fn enable_interrupts(&self) {
        // SAFETY: not called inside a critical section owned by this crate.
        unsafe { cortex_m::interrupt::enable() }
    }

    fn disable_interrupts(&self) {
        cortex_m::interrupt::disable()
    }

    fn enable_faults(&self) {
        // SAFETY: only changes FAULTMASK.
        unsafe { core::arch::asm!("cpsie f", options(nomem, nostack, preserves_flags)) }
    }

    fn disable_faults(&self) {
        // SAFETY: only changes FAULTMASK.
        unsafe { core::arch::asm!("cpsid f", options(nomem, nostack, preserves_flags)) }
    }

    fn supervisor_call(&self) {
        // SAFETY: the SVCall handler is installed by the vector table.
        unsafe { core::arch::asm!("svc #0") }
    }
}
