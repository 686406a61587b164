//! System timer reads, busy-wait delays and the crate's wait policy.
//!
//! The BCM283x system timer is a free-running 1 MHz counter. Nothing here
//! programs its compare channels; it is only read to measure time.

use embedded_hal::delay::DelayNs;

use crate::constants::{ST_CHI, ST_CLO, ST_TICKS_PER_MS, ST_TICKS_PER_US};
use crate::error::{Error, Result};
use crate::regs::RegisterIo;

/// Low 32 bits of the free-running counter (1 tick = 1 µs).
#[inline]
pub fn now<R: RegisterIo>(regs: &mut R) -> u32 {
    regs.read(ST_CLO)
}

/// Full 64-bit counter value.
///
/// Re-reads the high word if the low word wrapped in between.
pub fn now64<R: RegisterIo>(regs: &mut R) -> u64 {
    loop {
        let hi = regs.read(ST_CHI);
        let lo = regs.read(ST_CLO);
        if regs.read(ST_CHI) == hi {
            return (u64::from(hi) << 32) | u64::from(lo);
        }
    }
}

/// Whether `after` is at least `ticks` later than `before`.
///
/// Correct across a single counter wrap.
#[inline]
pub const fn elapsed(before: u32, after: u32, ticks: u32) -> bool {
    after.wrapping_sub(before) >= ticks
}

/// Spin until `ticks` timer ticks have passed.
pub fn wait_ticks<R: RegisterIo>(regs: &mut R, ticks: u32) {
    let start = now(regs);
    while !elapsed(start, now(regs), ticks) {
        core::hint::spin_loop();
    }
}

// ── Delay provider ─────────────────────────────────────────────────────────

/// Busy-wait delay provider backed by the system timer.
///
/// Resolution is one microsecond; shorter requests round up to a full tick.
pub struct SystemTimer<R> {
    regs: R,
}

impl<R: RegisterIo> SystemTimer<R> {
    pub fn new(regs: R) -> Self {
        SystemTimer { regs }
    }

    /// Current counter value.
    pub fn now(&mut self) -> u32 {
        now(&mut self.regs)
    }

    /// Release the register handle.
    pub fn release(self) -> R {
        self.regs
    }
}

impl<R: RegisterIo> DelayNs for SystemTimer<R> {
    fn delay_ns(&mut self, ns: u32) {
        wait_ticks(&mut self.regs, ns.div_ceil(1000).saturating_mul(ST_TICKS_PER_US));
    }

    fn delay_us(&mut self, us: u32) {
        wait_ticks(&mut self.regs, us.saturating_mul(ST_TICKS_PER_US));
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            wait_ticks(&mut self.regs, ST_TICKS_PER_MS);
        }
    }
}

// ── Wait policy ────────────────────────────────────────────────────────────

/// How long a blocking hardware wait may spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Spin until the hardware is ready, however long that takes.
    #[default]
    Never,
    /// Give up with [`Error::Timeout`] after this many microseconds.
    Micros(u32),
}

/// Spin while `busy` reports the hardware is not ready.
///
/// Every polling loop in the crate goes through here. Under
/// [`Timeout::Never`] the timer is not read at all.
pub fn wait_while<R, F>(regs: &mut R, timeout: Timeout, mut busy: F) -> Result<()>
where
    R: RegisterIo,
    F: FnMut(&mut R) -> bool,
{
    match timeout {
        Timeout::Never => {
            while busy(regs) {
                core::hint::spin_loop();
            }
            Ok(())
        }
        Timeout::Micros(us) => {
            let start = now(regs);
            let ticks = us.saturating_mul(ST_TICKS_PER_US);
            while busy(regs) {
                if elapsed(start, now(regs), ticks) {
                    return Err(Error::Timeout);
                }
                core::hint::spin_loop();
            }
            Ok(())
        }
    }
}
