//! Property-channel client.

use core::sync::atomic::{fence, Ordering};

use log::{debug, warn};

use super::channel::{Channel, Mailbox, MailboxWord};
use super::message::{tag, PropertyBuffer};
use crate::error::{Error, Result};
use crate::regs::RegisterIo;
use crate::timer::Timeout;

/// Words in the buffer backing a single-tag [`PropertyClient::call`].
const CALL_WORDS: usize = 64;

/// Largest value a single-tag call can carry.
pub const MAX_CALL_VALUE_WORDS: usize = CALL_WORDS - 6;

/// Translation from CPU addresses to the bus addresses the VideoCore sees.
pub trait BusTranslate {
    /// Bus address of the buffer at CPU address `cpu`.
    fn to_bus(&self, cpu: usize) -> Result<u32>;
}

/// Physical memory at CPU address 0, seen by the VideoCore through a fixed
/// alias.
///
/// The alias selects the VideoCore cache behaviour: `0x4000_0000` goes
/// through L2, `0xC000_0000` bypasses it. Which one is correct depends on how
/// the firmware was configured (`disable_l2cache` in `config.txt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectBus {
    alias: u32,
}

impl DirectBus {
    /// No alias. For MMU setups that already map the bus view.
    pub const IDENTITY: DirectBus = DirectBus { alias: 0 };
    /// L2 cache coherent alias.
    pub const L2_COHERENT: DirectBus = DirectBus { alias: 0x4000_0000 };
    /// Direct uncached alias.
    pub const UNCACHED: DirectBus = DirectBus { alias: 0xC000_0000 };

    pub const fn new(alias: u32) -> Self {
        DirectBus { alias }
    }

    pub const fn alias(self) -> u32 {
        self.alias
    }
}

impl Default for DirectBus {
    fn default() -> Self {
        DirectBus::UNCACHED
    }
}

impl BusTranslate for DirectBus {
    fn to_bus(&self, cpu: usize) -> Result<u32> {
        if cpu % 16 != 0 {
            return Err(Error::Misaligned { address: cpu });
        }
        let address = u32::try_from(cpu).map_err(|_| Error::AddressOutOfRange { address: cpu })?;
        // The alias occupies the top two bits; RAM must sit below 1 GiB
        if self.alias != 0 && address & 0xC000_0000 != 0 {
            return Err(Error::AddressOutOfRange { address: cpu });
        }
        Ok(address | self.alias)
    }
}

/// ARM or VideoCore share of the SDRAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    pub base: u32,
    pub size: u32,
}

/// Synchronous property-tag RPC over the mailbox.
///
/// Every call builds its message in a buffer that lives for that call only,
/// submits it on [`Channel::PropertyArmToVc`] and waits for the matching
/// answer. A firmware error status comes back as [`Error::Rejected`].
///
/// # Example
///
/// ```ignore
/// let regs = unsafe { Mmio::take(peripheral_base)? };
/// let mut vc = PropertyClient::new(regs, DirectBus::UNCACHED);
/// let revision = vc.firmware_revision()?;
/// let hz = vc.clock_rate(ClockId::Uart)?;
/// ```
pub struct PropertyClient<R, B = DirectBus> {
    mailbox: Mailbox<R>,
    bus: B,
}

impl<R, B> PropertyClient<R, B>
where
    R: RegisterIo,
    B: BusTranslate,
{
    pub fn new(regs: R, bus: B) -> Self {
        PropertyClient {
            mailbox: Mailbox::new(regs),
            bus,
        }
    }

    /// Bound every mailbox wait by `timeout`.
    pub fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.mailbox = self.mailbox.with_timeout(timeout);
        self
    }

    /// Give back the register handle and the bus translation.
    pub fn release(self) -> (R, B) {
        (self.mailbox.release(), self.bus)
    }

    /// Call one tag.
    ///
    /// `value` carries the request in and the response out; its length sets
    /// the tag's value buffer size. Returns the response length in bytes.
    pub fn call(&mut self, id: u32, value: &mut [u32]) -> Result<usize> {
        let mut buf = PropertyBuffer::<CALL_WORDS>::new();
        let slot = buf.push_tag(id, value, value.len())?;
        self.submit(&mut buf)?;

        let len = buf.response_len(slot).ok_or(Error::TagNotAnswered { tag: id })? as usize;
        let words = len.div_ceil(4);
        if words > value.len() {
            return Err(Error::ValueTooLarge {
                words,
                capacity: value.len(),
            });
        }
        value[..words].copy_from_slice(&buf.value(slot)[..words]);
        Ok(len)
    }

    /// Submit a buffer holding any number of tags in one round trip.
    ///
    /// Every tag must come back answered.
    pub fn call_multi<const N: usize>(&mut self, buf: &mut PropertyBuffer<N>) -> Result<()> {
        self.submit(buf)?;
        match buf.tags().find(|t| t.response_len.is_none()) {
            Some(unanswered) => Err(Error::TagNotAnswered { tag: unanswered.id }),
            None => Ok(()),
        }
    }

    fn submit<const N: usize>(&mut self, buf: &mut PropertyBuffer<N>) -> Result<()> {
        let size = buf.finish()?;
        let bus = self.bus.to_bus(buf.as_mut_ptr() as usize)?;
        let word = MailboxWord::new(Channel::PropertyArmToVc, bus)?;

        debug!("property: {} byte message at bus {:#010x}", size, bus);
        // Message contents must reach memory before the VideoCore sees the
        // pointer, and its answer must not be read early.
        fence(Ordering::SeqCst);
        self.mailbox.call(word)?;
        fence(Ordering::SeqCst);

        buf.check().inspect_err(|e| warn!("property: {}", e))
    }

    /// Single-word query.
    fn query(&mut self, id: u32) -> Result<u32> {
        let mut value = [0];
        self.call(id, &mut value)?;
        Ok(value[0])
    }

    fn query_pair(&mut self, id: u32) -> Result<[u32; 2]> {
        let mut value = [0; 2];
        self.call(id, &mut value)?;
        Ok(value)
    }

    pub fn firmware_revision(&mut self) -> Result<u32> {
        self.query(tag::GET_FIRMWARE_REVISION)
    }

    pub fn board_model(&mut self) -> Result<u32> {
        self.query(tag::GET_BOARD_MODEL)
    }

    /// Revision code, as printed by `cat /proc/cpuinfo`.
    pub fn board_revision(&mut self) -> Result<u32> {
        self.query(tag::GET_BOARD_REVISION)
    }

    pub fn board_serial(&mut self) -> Result<u64> {
        let [low, high] = self.query_pair(tag::GET_BOARD_SERIAL)?;
        Ok(u64::from(high) << 32 | u64::from(low))
    }

    /// SDRAM reserved for the ARM.
    pub fn arm_memory(&mut self) -> Result<MemoryRegion> {
        let [base, size] = self.query_pair(tag::GET_ARM_MEMORY)?;
        Ok(MemoryRegion { base, size })
    }

    /// SDRAM reserved for the VideoCore.
    pub fn vc_memory(&mut self) -> Result<MemoryRegion> {
        let [base, size] = self.query_pair(tag::GET_VC_MEMORY)?;
        Ok(MemoryRegion { base, size })
    }
}
