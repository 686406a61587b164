//! Raw VideoCore mailbox transport.
//!
//! Two FIFO registers carry 32-bit words between the ARM and the VideoCore:
//! the ARM reads from mailbox 0 and writes to mailbox 1. Each word packs a
//! 4-bit channel number under a 16-byte aligned bus address.

use log::trace;

use crate::constants::{MBOX0_OFFSET, MBOX1_OFFSET, MBOX_DATA, MBOX_STATUS};
use crate::error::{Error, Result};
use crate::regs::{Field, RegisterIo};
use crate::timer::{wait_while, Timeout};

const MBOX0_READ: usize = MBOX0_OFFSET + MBOX_DATA;
const MBOX0_STATUS: usize = MBOX0_OFFSET + MBOX_STATUS;
const MBOX1_WRITE: usize = MBOX1_OFFSET + MBOX_DATA;
const MBOX1_STATUS: usize = MBOX1_OFFSET + MBOX_STATUS;

/// FIFO cannot accept another word.
const STATUS_FULL: Field = Field::bit(31);
/// FIFO holds no word.
const STATUS_EMPTY: Field = Field::bit(30);

/// Mailbox channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    Power = 0,
    Framebuffer = 1,
    VirtualUart = 2,
    Vchiq = 3,
    Leds = 4,
    Buttons = 5,
    Touchscreen = 6,
    /// Property tags, ARM → VideoCore. Used for every property request.
    PropertyArmToVc = 8,
    /// Property tags, VideoCore → ARM.
    PropertyVcToArm = 9,
}

/// A mailbox word: bus address in bits 31:4, channel in bits 3:0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxWord(u32);

impl MailboxWord {
    pub const CHANNEL: Field = Field::new(0, 4);
    pub const ADDRESS: Field = Field::new(4, 28);

    /// Pack `bus_address` for `channel`.
    ///
    /// The address must be 16-byte aligned; the low four bits belong to the
    /// channel.
    pub fn new(channel: Channel, bus_address: u32) -> Result<Self> {
        if bus_address & Self::CHANNEL.mask() != 0 {
            return Err(Error::Misaligned {
                address: bus_address as usize,
            });
        }
        Ok(MailboxWord(bus_address | channel as u32))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Channel number (not validated against [`Channel`]).
    pub const fn channel(self) -> u8 {
        Self::CHANNEL.get(self.0) as u8
    }

    /// The 16-byte aligned bus address.
    pub const fn address(self) -> u32 {
        self.0 & Self::ADDRESS.mask()
    }
}

/// Blocking mailbox transport over a register handle.
///
/// Waits follow the [`Timeout`] policy set with
/// [`with_timeout`](Self::with_timeout); the default blocks indefinitely.
pub struct Mailbox<R> {
    regs: R,
    timeout: Timeout,
}

impl<R: RegisterIo> Mailbox<R> {
    pub fn new(regs: R) -> Self {
        Mailbox {
            regs,
            timeout: Timeout::Never,
        }
    }

    /// Bound every FIFO wait by `timeout`.
    pub fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait while the write FIFO is full, then write `word`.
    pub fn push(&mut self, word: MailboxWord) -> Result<()> {
        wait_while(&mut self.regs, self.timeout, |r| {
            STATUS_FULL.is_set(r.read(MBOX1_STATUS))
        })?;
        self.regs.write(MBOX1_WRITE, word.raw());
        self.regs.barrier();
        Ok(())
    }

    /// Wait while the read FIFO is empty, then read one word.
    pub fn pop(&mut self) -> Result<MailboxWord> {
        self.regs.barrier();
        wait_while(&mut self.regs, self.timeout, |r| {
            STATUS_EMPTY.is_set(r.read(MBOX0_STATUS))
        })?;
        Ok(MailboxWord(self.regs.read(MBOX0_READ)))
    }

    /// Push `word` and wait for the identical word to come back.
    ///
    /// Responses to other requests (any other word, on this or another
    /// channel) are read and discarded.
    pub fn call(&mut self, word: MailboxWord) -> Result<()> {
        self.push(word)?;
        loop {
            let answer = self.pop()?;
            if answer == word {
                return Ok(());
            }
            trace!(
                "mailbox: discarding {:#010x} while waiting for {:#010x}",
                answer.raw(),
                word.raw()
            );
        }
    }

    /// Release the register handle.
    pub fn release(self) -> R {
        self.regs
    }
}
