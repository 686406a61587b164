//! Byte-boundary recovery for the PCM slave.
//!
//! The slave's shift register starts at an arbitrary bit of the master's
//! stream. The master cooperates by sending a continuous run of a marker
//! byte; every mismatching byte makes the slave drop one bit by gating its
//! clock, until the marker reads back cleanly enough times in a row:
//!
//! ```text
//! master:  81 81 81 81 … 81 81 81 … 81 7E …
//! slave:   ?? ?? 81 81 … 81 ─┬─        ── done
//!          └ slip per miss   └ 10th in a row: send 81
//! ```
//!
//! After the acknowledgement the master sends the inverted marker to mark
//! the end of the preamble; everything after it is data.

use log::{info, trace};

use super::pcm::PcmSlave;
use crate::error::Error;
use crate::regs::RegisterIo;

/// A byte pipe that can drop single bits of its input.
pub trait SlaveLink {
    /// Error type for link operations.
    type Error;

    /// Block until a byte arrives and return it.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Queue a byte for the master's next transfer.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Shift every following byte boundary by one bit.
    fn slip_bit(&mut self) -> Result<(), Self::Error>;
}

impl<R: RegisterIo> SlaveLink for PcmSlave<R> {
    type Error = Error;

    fn read_byte(&mut self) -> Result<u8, Error> {
        self.read()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.write(byte)
    }

    fn slip_bit(&mut self) -> Result<(), Error> {
        PcmSlave::slip_bit(self);
        Ok(())
    }
}

/// Handshake parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Byte the master repeats until acknowledged. Its complement ends the
    /// handshake.
    pub marker: u8,
    /// Consecutive clean markers needed before acknowledging.
    pub threshold: u8,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            marker: 0x81,
            threshold: 10,
        }
    }
}

/// Where the handshake stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Last byte was not the marker.
    #[default]
    Unsynced,
    /// This many markers in a row so far.
    Counting(u8),
    /// Acknowledged; waiting for the inverted marker.
    Synchronized,
}

/// What to do after a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    /// Drop one bit, then read on.
    Slip,
    /// Read on.
    Continue,
    /// Send the marker back, then read on.
    Acknowledge,
    /// The master ended the preamble.
    Complete,
}

/// Counts from a finished handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub bytes_read: usize,
    pub slips: usize,
}

/// Marker-stream synchronizer.
///
/// [`observe`](Self::observe) is the state machine on its own;
/// [`run`](Self::run) drives it over a [`SlaveLink`]. Neither gives up: a
/// master that never sends a clean marker stream keeps `run` spinning,
/// unless the link itself times out.
#[derive(Debug, Clone)]
pub struct ByteSynchronizer {
    config: SyncConfig,
    state: SyncState,
    slips: usize,
}

impl ByteSynchronizer {
    pub fn new(config: SyncConfig) -> Self {
        ByteSynchronizer {
            config,
            state: SyncState::Unsynced,
            slips: 0,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Slips requested so far.
    pub fn slips(&self) -> usize {
        self.slips
    }

    pub fn reset(&mut self) {
        self.state = SyncState::Unsynced;
        self.slips = 0;
    }

    /// Feed one received byte.
    pub fn observe(&mut self, byte: u8) -> SyncStep {
        let marker = self.config.marker;
        let seen = match self.state {
            SyncState::Synchronized => {
                return if byte == !marker {
                    SyncStep::Complete
                } else {
                    SyncStep::Continue
                };
            }
            SyncState::Unsynced => 0,
            SyncState::Counting(n) => n,
        };

        if byte != marker {
            if seen > 0 {
                trace!("sync: lost after {} markers ({:#04x})", seen, byte);
            }
            self.state = SyncState::Unsynced;
            self.slips += 1;
            return SyncStep::Slip;
        }

        let seen = seen + 1;
        if seen >= self.config.threshold {
            self.state = SyncState::Synchronized;
            SyncStep::Acknowledge
        } else {
            self.state = SyncState::Counting(seen);
            SyncStep::Continue
        }
    }

    /// Run the whole handshake over `link`.
    pub fn run<L: SlaveLink>(&mut self, link: &mut L) -> Result<SyncReport, L::Error> {
        self.reset();
        let mut bytes_read = 0;
        loop {
            let byte = link.read_byte()?;
            bytes_read += 1;
            match self.observe(byte) {
                SyncStep::Slip => link.slip_bit()?,
                SyncStep::Continue => {}
                SyncStep::Acknowledge => {
                    info!("sync: aligned after {} slips", self.slips);
                    link.write_byte(self.config.marker)?;
                }
                SyncStep::Complete => {
                    return Ok(SyncReport {
                        bytes_read,
                        slips: self.slips,
                    });
                }
            }
        }
    }
}
