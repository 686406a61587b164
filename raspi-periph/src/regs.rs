//! Register access layer.
//!
//! Every driver in this crate talks to hardware through [`RegisterIo`]: plain
//! 32-bit reads and writes at byte offsets from the peripheral window, plus a
//! memory barrier. [`Mmio`] is the real implementation over a mapped window;
//! tests substitute a scripted register bank.
//!
//! Bit-fields are described with [`Field`] constants instead of overlapping
//! struct layouts, so a register value is always a plain `u32`.

use core::ptr::{read_volatile, write_volatile, NonNull};
use core::sync::atomic::{fence, AtomicBool, Ordering};

use crate::constants::PERIPHERAL_SPAN;
use crate::error::{Error, Result};

/// Volatile 32-bit register access.
///
/// Writes must be followed by [`barrier()`](Self::barrier) before a register
/// of a different peripheral is touched; the bus does not order accesses
/// across peripherals on its own.
pub trait RegisterIo {
    /// Read the register at `offset`.
    fn read(&mut self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`.
    fn write(&mut self, offset: usize, value: u32);

    /// Store/load memory barrier.
    fn barrier(&mut self);

    /// Read-modify-write.
    fn modify<F>(&mut self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(offset);
        self.write(offset, f(value));
    }
}

impl<R: RegisterIo + ?Sized> RegisterIo for &mut R {
    #[inline]
    fn read(&mut self, offset: usize) -> u32 {
        R::read(self, offset)
    }

    #[inline]
    fn write(&mut self, offset: usize, value: u32) {
        R::write(self, offset, value)
    }

    #[inline]
    fn barrier(&mut self) {
        R::barrier(self)
    }
}

// ── Bit-fields ─────────────────────────────────────────────────────────────

/// A contiguous bit-field inside a 32-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    shift: u32,
    width: u32,
}

impl Field {
    /// Field of `width` bits starting at bit `shift`.
    pub const fn new(shift: u32, width: u32) -> Self {
        assert!(width >= 1 && shift + width <= 32);
        Field { shift, width }
    }

    /// Single-bit field.
    pub const fn bit(shift: u32) -> Self {
        Self::new(shift, 1)
    }

    /// Mask of the field in register position.
    pub const fn mask(self) -> u32 {
        (u32::MAX >> (32 - self.width)) << self.shift
    }

    /// Extract the field from a register value.
    pub const fn get(self, reg: u32) -> u32 {
        (reg & self.mask()) >> self.shift
    }

    /// Whether any bit of the field is set.
    pub const fn is_set(self, reg: u32) -> bool {
        reg & self.mask() != 0
    }

    /// Return `reg` with the field replaced by `value` (excess bits dropped).
    pub const fn set(self, reg: u32, value: u32) -> u32 {
        (reg & !self.mask()) | ((value << self.shift) & self.mask())
    }

    /// The field holding `value`, all other bits zero.
    pub const fn val(self, value: u32) -> u32 {
        self.set(0, value)
    }
}

// ── Memory-mapped implementation ───────────────────────────────────────────

static CLAIMED: AtomicBool = AtomicBool::new(false);

/// Exclusive handle to the mapped peripheral window.
///
/// Only one `Mmio` can exist at a time; drivers borrow it (`&mut Mmio` also
/// implements [`RegisterIo`]) or own it and hand it back with `release()`.
#[derive(Debug)]
pub struct Mmio {
    base: NonNull<u8>,
}

impl Mmio {
    /// Claim the peripheral window starting at `base`.
    ///
    /// Fails with [`Error::AlreadyTaken`] while another handle is alive. A
    /// raw address converts with `NonNull::new(addr as *mut u8)`.
    ///
    /// # Safety
    ///
    /// `base` must point to [`PERIPHERAL_SPAN`] bytes of mapped peripheral
    /// registers (or memory standing in for them) that stay valid for the
    /// lifetime of the handle.
    pub unsafe fn take(base: NonNull<u8>) -> Result<Self> {
        CLAIMED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::AlreadyTaken)?;
        Ok(Mmio { base })
    }

    #[inline]
    fn reg(&self, offset: usize) -> *mut u32 {
        debug_assert!(offset % 4 == 0 && offset < PERIPHERAL_SPAN);
        // SAFETY: offset is inside the window promised by `take`.
        unsafe { self.base.as_ptr().add(offset) as *mut u32 }
    }
}

impl Drop for Mmio {
    fn drop(&mut self) {
        CLAIMED.store(false, Ordering::Release);
    }
}

impl RegisterIo for Mmio {
    #[inline]
    fn read(&mut self, offset: usize) -> u32 {
        // SAFETY: see `reg`.
        unsafe { read_volatile(self.reg(offset)) }
    }

    #[inline]
    fn write(&mut self, offset: usize, value: u32) {
        // SAFETY: see `reg`.
        unsafe { write_volatile(self.reg(offset), value) }
    }

    #[inline]
    fn barrier(&mut self) {
        // A `dmb` on ARMv7/v8.
        fence(Ordering::SeqCst);
    }
}
