//! Firmware-managed clocks.

use crate::error::Error;
use crate::mailbox::{tag, BusTranslate, PropertyClient};
use crate::regs::{Field, RegisterIo};

/// Clock-state word: clock is running.
const STATE_ON: Field = Field::bit(0);
/// Clock-state word (response): clock does not exist.
const STATE_MISSING: Field = Field::bit(1);

/// Clocks known to the firmware, numbered as the property interface numbers
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ClockId {
    Reserved = 0,
    Emmc = 1,
    Uart = 2,
    Arm = 3,
    Core = 4,
    V3d = 5,
    H264 = 6,
    Isp = 7,
    Sdram = 8,
    Pixel = 9,
    Pwm = 10,
    Hevc = 11,
    Emmc2 = 12,
    M2mc = 13,
    PixelBvb = 14,
}

/// Trait for services that can start, stop and retune system clocks.
pub trait ClockControl {
    /// Error type for control operations.
    type Error;

    /// Switch `clock` on or off. Returns whether it is now running.
    fn set_clock_state(&mut self, clock: ClockId, on: bool) -> Result<bool, Self::Error>;

    /// Whether `clock` is running.
    fn clock_state(&mut self, clock: ClockId) -> Result<bool, Self::Error>;

    /// Switch `clock` on and set its rate in Hz. Returns the rate actually
    /// set, which the firmware may have rounded.
    fn set_clock_rate(&mut self, clock: ClockId, hz: u32) -> Result<u32, Self::Error>;

    /// Configured rate of `clock` in Hz, or 0 while it is off.
    fn clock_rate(&mut self, clock: ClockId) -> Result<u32, Self::Error>;

    /// Rate of `clock` as measured by the firmware.
    fn measured_clock_rate(&mut self, clock: ClockId) -> Result<u32, Self::Error>;

    fn min_clock_rate(&mut self, clock: ClockId) -> Result<u32, Self::Error>;

    fn max_clock_rate(&mut self, clock: ClockId) -> Result<u32, Self::Error>;
}

impl<R, B> PropertyClient<R, B>
where
    R: RegisterIo,
    B: BusTranslate,
{
    /// `[clock, argument]` call answered by `[clock, result]`.
    fn clock_call(&mut self, id: u32, clock: ClockId, argument: u32) -> Result<u32, Error> {
        let mut value = [clock as u32, argument];
        self.call(id, &mut value)?;
        Ok(value[1])
    }

    fn clock_state_call(&mut self, id: u32, clock: ClockId, argument: u32) -> Result<bool, Error> {
        let state = self.clock_call(id, clock, argument)?;
        if STATE_MISSING.is_set(state) {
            log::warn!("clock: {:?} does not exist", clock);
        }
        Ok(STATE_ON.is_set(state))
    }
}

impl<R, B> ClockControl for PropertyClient<R, B>
where
    R: RegisterIo,
    B: BusTranslate,
{
    type Error = Error;

    fn set_clock_state(&mut self, clock: ClockId, on: bool) -> Result<bool, Error> {
        self.clock_state_call(tag::SET_CLOCK_STATE, clock, STATE_ON.val(u32::from(on)))
    }

    fn clock_state(&mut self, clock: ClockId) -> Result<bool, Error> {
        self.clock_state_call(tag::GET_CLOCK_STATE, clock, 0)
    }

    fn set_clock_rate(&mut self, clock: ClockId, hz: u32) -> Result<u32, Error> {
        self.set_clock_state(clock, true)?;

        // Third word: skip turbo setting
        let mut value = [clock as u32, hz, 0];
        self.call(tag::SET_CLOCK_RATE, &mut value)?;
        log::debug!("clock: {:?} set to {} Hz (asked {})", clock, value[1], hz);
        Ok(value[1])
    }

    fn clock_rate(&mut self, clock: ClockId) -> Result<u32, Error> {
        if !self.clock_state(clock)? {
            return Ok(0);
        }
        self.clock_call(tag::GET_CLOCK_RATE, clock, 0)
    }

    fn measured_clock_rate(&mut self, clock: ClockId) -> Result<u32, Error> {
        self.clock_call(tag::GET_CLOCK_RATE_MEASURED, clock, 0)
    }

    fn min_clock_rate(&mut self, clock: ClockId) -> Result<u32, Error> {
        self.clock_call(tag::GET_MIN_CLOCK_RATE, clock, 0)
    }

    fn max_clock_rate(&mut self, clock: ClockId) -> Result<u32, Error> {
        self.clock_call(tag::GET_MAX_CLOCK_RATE, clock, 0)
    }
}
