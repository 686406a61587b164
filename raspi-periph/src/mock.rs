//! Scripted register bank for host tests.
//!
//! [`MockRegs`] behaves like a plain register file, except for the handful of
//! registers whose hardware behaviour the drivers depend on:
//!
//! - `ST_CLO` advances by one tick on every read, so delays and deadlines
//!   terminate.
//! - The mailbox status/data registers model the two FIFOs. Every word
//!   written to mailbox 1 is passed to a responder (default: echo) whose
//!   output is queued in mailbox 0.
//! - `PCM_CS` reports RXD/TXD/TXE/SYNC from the modelled FIFO state, and
//!   `PCM_FIFO` pops/pushes the modelled FIFOs. An attached [`SimMaster`]
//!   clocks bytes into the RX FIFO and drops one bit per clock gate.
//!
//! Every write and barrier is logged in order as an [`Event`].
//!
//! [`fake_firmware`] installs a responder that answers property messages in
//! place, the way the VideoCore does.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::constants::{MBOX0_OFFSET, MBOX1_OFFSET, MBOX_DATA, MBOX_STATUS, ST_CLO};
use crate::error::Result;
use crate::mailbox::BusTranslate;
use crate::regs::RegisterIo;
use crate::spisl::registers::{cs, mode, PCM_CS, PCM_FIFO, PCM_MODE};

const MBOX_FULL: u32 = 1 << 31;
const MBOX_EMPTY: u32 = 1 << 30;

/// CS polls between two bytes clocked in by an attached master.
const BYTE_PERIOD: u32 = 4;

/// CS polls before a written SYNC value is echoed back.
const SYNC_LAG: u32 = 2;

/// Depth of the PCM FIFOs.
const FIFO_DEPTH: usize = 64;

/// One logged register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Write(usize, u32),
    Barrier,
}

/// Produces the mailbox-0 words answering one mailbox-1 write.
pub type Responder = Box<dyn FnMut(u32) -> Vec<u32>>;

pub struct MockRegs {
    regs: HashMap<usize, u32>,
    events: Vec<Event>,
    clock: u32,

    /// Words waiting in mailbox 0 (VC → ARM).
    pub mbox_inbox: VecDeque<u32>,
    /// Words written to mailbox 1 (ARM → VC).
    pub mbox_sent: Vec<u32>,
    /// Status polls for which mailbox 1 still reports full.
    pub mbox_full_polls: u32,
    responder: Option<Responder>,

    /// Bytes waiting in the PCM RX FIFO.
    pub pcm_rx: VecDeque<u8>,
    /// Bytes written to the PCM TX FIFO.
    pub pcm_tx: Vec<u8>,
    /// Bytes that arrive in the RX FIFO alongside the next TX writes.
    pub pcm_rx_on_write: VecDeque<u8>,
    /// CS polls for which the TX FIFO still reports full.
    pub pcm_tx_full_polls: u32,
    /// CS polls for which the TX FIFO still reports non-empty.
    pub pcm_tx_busy_polls: u32,
    /// Number of PCM FIFO reads.
    pub pcm_fifo_reads: usize,
    sync_value: bool,
    sync_countdown: u32,
    master: Option<SimMaster>,
    master_ticks: u32,
}

impl MockRegs {
    pub fn new() -> Self {
        MockRegs {
            regs: HashMap::new(),
            events: Vec::new(),
            clock: 0,
            mbox_inbox: VecDeque::new(),
            mbox_sent: Vec::new(),
            mbox_full_polls: 0,
            responder: None,
            pcm_rx: VecDeque::new(),
            pcm_tx: Vec::new(),
            pcm_rx_on_write: VecDeque::new(),
            pcm_tx_full_polls: 0,
            pcm_tx_busy_polls: 0,
            pcm_fifo_reads: 0,
            sync_value: false,
            sync_countdown: 0,
            master: None,
            master_ticks: 0,
        }
    }

    /// Plain register value, bypassing any modelled behaviour.
    pub fn get(&self, offset: usize) -> u32 {
        self.regs.get(&offset).copied().unwrap_or(0)
    }

    /// Preset a plain register value without logging it.
    pub fn set(&mut self, offset: usize, value: u32) {
        self.regs.insert(offset, value);
    }

    pub fn set_clock(&mut self, ticks: u32) {
        self.clock = ticks;
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Values written to `offset`, oldest first.
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                Event::Write(o, v) if o == offset => Some(v),
                _ => None,
            })
            .collect()
    }

    /// Index in [`events()`](Self::events) of the first write to `offset`.
    pub fn first_write(&self, offset: usize) -> Option<usize> {
        self.events
            .iter()
            .position(|e| matches!(*e, Event::Write(o, _) if o == offset))
    }

    pub fn barriers(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Barrier).count()
    }

    /// Replace the default echo responder on mailbox 1.
    pub fn respond_with(&mut self, responder: Responder) {
        self.responder = Some(responder);
    }

    pub fn attach_master(&mut self, master: SimMaster) {
        self.master = Some(master);
        self.master_ticks = 0;
    }

    pub fn master(&self) -> Option<&SimMaster> {
        self.master.as_ref()
    }

    fn read_pcm_cs(&mut self) -> u32 {
        let stored = self.get(PCM_CS);

        if self.sync_countdown > 0 {
            self.sync_countdown -= 1;
        }
        let sync = if self.sync_countdown == 0 {
            self.sync_value
        } else {
            !self.sync_value
        };

        let clocked = cs::EN.is_set(stored) && !mode::CLK_DIS.is_set(self.get(PCM_MODE));
        if let (Some(master), true) = (self.master.as_mut(), clocked) {
            self.master_ticks += 1;
            if self.master_ticks >= BYTE_PERIOD {
                self.master_ticks = 0;
                if self.pcm_rx.len() < FIFO_DEPTH {
                    self.pcm_rx.push_back(master.next_byte());
                }
            }
        }

        let tx_full = if self.pcm_tx_full_polls > 0 {
            self.pcm_tx_full_polls -= 1;
            true
        } else {
            false
        };
        let tx_busy = if self.pcm_tx_busy_polls > 0 {
            self.pcm_tx_busy_polls -= 1;
            true
        } else {
            false
        };

        let mut value = stored;
        value = cs::RXD.set(value, u32::from(!self.pcm_rx.is_empty()));
        value = cs::RXF.set(value, u32::from(self.pcm_rx.len() >= FIFO_DEPTH));
        value = cs::TXD.set(value, u32::from(!tx_full));
        value = cs::TXE.set(value, u32::from(!tx_busy));
        cs::SYNC.set(value, u32::from(sync))
    }

    fn write_pcm_cs(&mut self, value: u32) {
        let sync = cs::SYNC.is_set(value);
        if sync != self.sync_value {
            self.sync_value = sync;
            self.sync_countdown = SYNC_LAG;
        }
        self.regs.insert(PCM_CS, value);
    }

    fn write_pcm_mode(&mut self, value: u32) {
        let was_gated = mode::CLK_DIS.is_set(self.get(PCM_MODE));
        let now_gated = mode::CLK_DIS.is_set(value);
        if was_gated && !now_gated {
            if let Some(master) = self.master.as_mut() {
                master.slip();
            }
        }
        self.regs.insert(PCM_MODE, value);
    }
}

impl RegisterIo for MockRegs {
    fn read(&mut self, offset: usize) -> u32 {
        match offset {
            ST_CLO => {
                self.clock = self.clock.wrapping_add(1);
                self.clock
            }
            o if o == MBOX0_OFFSET + MBOX_STATUS => {
                if self.mbox_inbox.is_empty() {
                    MBOX_EMPTY
                } else {
                    0
                }
            }
            o if o == MBOX0_OFFSET + MBOX_DATA => self.mbox_inbox.pop_front().unwrap_or(0),
            o if o == MBOX1_OFFSET + MBOX_STATUS => {
                if self.mbox_full_polls > 0 {
                    self.mbox_full_polls -= 1;
                    MBOX_FULL
                } else {
                    0
                }
            }
            PCM_CS => self.read_pcm_cs(),
            PCM_FIFO => {
                self.pcm_fifo_reads += 1;
                u32::from(self.pcm_rx.pop_front().unwrap_or(0))
            }
            _ => self.get(offset),
        }
    }

    fn write(&mut self, offset: usize, value: u32) {
        self.events.push(Event::Write(offset, value));
        match offset {
            o if o == MBOX1_OFFSET + MBOX_DATA => {
                self.mbox_sent.push(value);
                let answer = match self.responder.as_mut() {
                    Some(responder) => responder(value),
                    None => vec![value],
                };
                self.mbox_inbox.extend(answer);
            }
            PCM_CS => self.write_pcm_cs(value),
            PCM_MODE => self.write_pcm_mode(value),
            PCM_FIFO => {
                let byte = value as u8;
                self.pcm_tx.push(byte);
                if let Some(master) = self.master.as_mut() {
                    master.accept(byte);
                }
                if let Some(echo) = self.pcm_rx_on_write.pop_front() {
                    self.pcm_rx.push_back(echo);
                }
            }
            _ => {
                self.regs.insert(offset, value);
            }
        }
    }

    fn barrier(&mut self) {
        self.events.push(Event::Barrier);
    }
}

// ── Simulated SPI master ───────────────────────────────────────────────────

/// Bit-level model of a master running the marker handshake.
///
/// The master streams `marker` continuously, MSB first. Once it receives the
/// marker back it switches to `!marker` from the next whole byte on. The
/// slave's view of the stream starts `misalignment` bits short of a byte
/// boundary; every clock gate drops one bit.
pub struct SimMaster {
    marker: u8,
    bit_pos: usize,
    finish_from: Option<usize>,
    /// Clock gates observed.
    pub slips: u32,
    /// Bytes the slave transmitted.
    pub received: Vec<u8>,
}

impl SimMaster {
    pub fn new(marker: u8, misalignment: usize) -> Self {
        SimMaster {
            marker,
            bit_pos: (8 - misalignment % 8) % 8,
            finish_from: None,
            slips: 0,
            received: Vec::new(),
        }
    }

    fn byte_at(&self, index: usize) -> u8 {
        match self.finish_from {
            Some(from) if index >= from => !self.marker,
            _ => self.marker,
        }
    }

    /// Shift the next eight bits out of the stream.
    pub fn next_byte(&mut self) -> u8 {
        let mut out = 0u8;
        for i in 0..8 {
            let n = self.bit_pos + i;
            let bit = (self.byte_at(n / 8) >> (7 - n % 8)) & 1;
            out = (out << 1) | bit;
        }
        self.bit_pos += 8;
        out
    }

    /// Drop one bit, as gating the slave's clock does.
    pub fn slip(&mut self) {
        self.bit_pos += 1;
        self.slips += 1;
    }

    /// Take a byte transmitted by the slave.
    pub fn accept(&mut self, byte: u8) {
        self.received.push(byte);
        if byte == self.marker && self.finish_from.is_none() {
            self.finish_from = Some(self.bit_pos / 8 + 1);
        }
    }

    pub fn finished(&self) -> bool {
        self.finish_from.is_some()
    }
}

// ── Fake VideoCore firmware ────────────────────────────────────────────────

/// Bus address the fake firmware hands out for every property buffer.
pub const FAKE_BUS_ADDRESS: u32 = 0x0010_0000;

/// Bus translation that remembers the last CPU address it translated.
#[derive(Clone, Default)]
pub struct CapturedBus {
    cpu: Rc<Cell<usize>>,
}

impl BusTranslate for CapturedBus {
    fn to_bus(&self, cpu: usize) -> Result<u32> {
        self.cpu.set(cpu);
        Ok(FAKE_BUS_ADDRESS)
    }
}

/// Handles returned by [`fake_firmware`].
pub struct Firmware {
    /// Pass this to the property client.
    pub bus: CapturedBus,
    /// Every tag seen, with the request value it carried.
    pub requests: Rc<RefCell<Vec<(u32, Vec<u32>)>>>,
}

/// Answer property messages on `regs` with `handler`, then set the header
/// code to `code`.
///
/// `handler` gets each tag id and its value buffer and returns the response
/// length in bytes, or `None` to leave the tag unanswered.
pub fn fake_firmware<H>(regs: &mut MockRegs, code: u32, mut handler: H) -> Firmware
where
    H: FnMut(u32, &mut [u32]) -> Option<u32> + 'static,
{
    let bus = CapturedBus::default();
    let requests = Rc::new(RefCell::new(Vec::new()));

    let cpu = bus.cpu.clone();
    let log = requests.clone();
    regs.respond_with(Box::new(move |word| {
        if word == FAKE_BUS_ADDRESS | 8 {
            let ptr = cpu.get() as *mut u32;
            // SAFETY: the client keeps the buffer alive and does not touch it
            // until the echoed word has been popped.
            let words = unsafe {
                let len = *ptr as usize / 4;
                std::slice::from_raw_parts_mut(ptr, len)
            };

            let mut pos = 2;
            while words[pos] != 0 {
                let id = words[pos];
                let value_words = words[pos + 1] as usize / 4;
                let value = &mut words[pos + 3..pos + 3 + value_words];
                log.borrow_mut().push((id, value.to_vec()));
                if let Some(len) = handler(id, value) {
                    words[pos + 2] = (1 << 31) | len;
                }
                pos += 3 + value_words;
            }
            words[1] = code;
        }
        vec![word]
    }));

    Firmware { bus, requests }
}
