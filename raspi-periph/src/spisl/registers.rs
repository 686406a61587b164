//! PCM / I2S and clock-manager register offsets and bit-fields.
//!
//! Offsets are relative to the peripheral window (see
//! [`constants`](crate::constants)). Field layouts follow the BCM2835 ARM
//! Peripherals datasheet, chapter 8 (PCM) and 6.3 (general purpose clocks).

// The full field set is defined even where the slave transport leaves
// hardware defaults alone (DMA thresholds, PDM, gray mode).
#![allow(dead_code)]

use crate::constants::{CM_OFFSET, PCM_OFFSET};
use crate::regs::Field;

// ── PCM register offsets ───────────────────────────────────────────────────

/// Control and status.
pub const PCM_CS: usize = PCM_OFFSET + 0x00;

/// Transmit/receive FIFO data.
pub const PCM_FIFO: usize = PCM_OFFSET + 0x04;

/// Mode (frame and clock configuration).
pub const PCM_MODE: usize = PCM_OFFSET + 0x08;

/// Receive channel configuration.
pub const PCM_RXC: usize = PCM_OFFSET + 0x0C;

/// Transmit channel configuration.
pub const PCM_TXC: usize = PCM_OFFSET + 0x10;

/// DMA request levels.
pub const PCM_DREQ: usize = PCM_OFFSET + 0x14;

/// Interrupt enables.
pub const PCM_INTEN: usize = PCM_OFFSET + 0x18;

/// Interrupt status and clear.
pub const PCM_INTSTC: usize = PCM_OFFSET + 0x1C;

/// Gray code mode control.
pub const PCM_GRAY: usize = PCM_OFFSET + 0x20;

// ── PCM_CS fields ──────────────────────────────────────────────────────────

pub mod cs {
    use super::Field;

    /// Enable the PCM block.
    pub const EN: Field = Field::bit(0);
    /// Enable reception.
    pub const RXON: Field = Field::bit(1);
    /// Enable transmission.
    pub const TXON: Field = Field::bit(2);
    /// Clear the TX FIFO (write 1).
    pub const TXCLR: Field = Field::bit(3);
    /// Clear the RX FIFO (write 1).
    pub const RXCLR: Field = Field::bit(4);
    /// TX FIFO threshold.
    pub const TXTHR: Field = Field::new(5, 2);
    /// RX FIFO threshold.
    pub const RXTHR: Field = Field::new(7, 2);
    /// DMA DREQ enable.
    pub const DMAEN: Field = Field::bit(9);
    /// TX FIFO sync (read-only).
    pub const TXSYNC: Field = Field::bit(13);
    /// RX FIFO sync (read-only).
    pub const RXSYNC: Field = Field::bit(14);
    /// TX FIFO underrun (write 1 to clear).
    pub const TXERR: Field = Field::bit(15);
    /// RX FIFO overrun (write 1 to clear).
    pub const RXERR: Field = Field::bit(16);
    /// TX FIFO needs writing.
    pub const TXW: Field = Field::bit(17);
    /// RX FIFO needs reading.
    pub const RXR: Field = Field::bit(18);
    /// TX FIFO can accept data.
    pub const TXD: Field = Field::bit(19);
    /// RX FIFO contains data.
    pub const RXD: Field = Field::bit(20);
    /// TX FIFO is empty.
    pub const TXE: Field = Field::bit(21);
    /// RX FIFO is full.
    pub const RXF: Field = Field::bit(22);
    /// Sign-extend RX samples.
    pub const RXSEX: Field = Field::bit(23);
    /// PCM clock sync helper: echoes the written value two clocks later.
    pub const SYNC: Field = Field::bit(24);
    /// RAM standby disable.
    pub const STBY: Field = Field::bit(25);
}

// ── PCM_MODE fields ────────────────────────────────────────────────────────

pub mod mode {
    use super::Field;

    /// Frame sync length in clocks.
    pub const FSLEN: Field = Field::new(0, 10);
    /// Frame length in clocks, minus one.
    pub const FLEN: Field = Field::new(10, 10);
    /// Invert frame sync.
    pub const FSI: Field = Field::bit(20);
    /// Frame sync is an input (slave).
    pub const FSM: Field = Field::bit(21);
    /// Invert clock.
    pub const CLKI: Field = Field::bit(22);
    /// Clock is an input (slave).
    pub const CLKM: Field = Field::bit(23);
    /// Transmit frame packed mode.
    pub const FTXP: Field = Field::bit(24);
    /// Receive frame packed mode.
    pub const FRXP: Field = Field::bit(25);
    /// PDM input mode.
    pub const PDME: Field = Field::bit(26);
    /// PDM decimation factor.
    pub const PDMN: Field = Field::bit(27);
    /// Gate the PCM clock.
    pub const CLK_DIS: Field = Field::bit(28);
}

// ── PCM_RXC / PCM_TXC fields ───────────────────────────────────────────────

pub mod chan {
    use super::Field;

    /// Channel 2 width (bits beyond 8, low four bits).
    pub const CH2WID: Field = Field::new(0, 4);
    /// Channel 2 position in the frame.
    pub const CH2POS: Field = Field::new(4, 10);
    /// Channel 2 enable.
    pub const CH2EN: Field = Field::bit(14);
    /// Channel 2 width extension.
    pub const CH2WEX: Field = Field::bit(15);
    /// Channel 1 width (bits beyond 8, low four bits).
    pub const CH1WID: Field = Field::new(16, 4);
    /// Channel 1 position in the frame.
    pub const CH1POS: Field = Field::new(20, 10);
    /// Channel 1 enable.
    pub const CH1EN: Field = Field::bit(30);
    /// Channel 1 width extension.
    pub const CH1WEX: Field = Field::bit(31);
}

/// All four PCM interrupt sources (TXW, RXR, TXERR, RXERR).
pub const INT_ALL: u32 = 0b1111;

// ── Clock manager ──────────────────────────────────────────────────────────

/// Password that must accompany every clock-manager write.
pub const CM_PASSWD: u32 = 0x5A;

/// Clock-manager slot of the PCM clock.
pub const CM_PCM: usize = 19;

/// Control register of clock-manager slot `slot`.
pub const fn cm_ctl(slot: usize) -> usize {
    CM_OFFSET + slot * 8
}

/// Divisor register of clock-manager slot `slot`.
pub const fn cm_div(slot: usize) -> usize {
    CM_OFFSET + slot * 8 + 4
}

pub mod cm {
    use super::Field;

    /// Clock source.
    pub const SRC: Field = Field::new(0, 4);
    /// Enable the clock generator.
    pub const ENAB: Field = Field::bit(4);
    /// Stop and reset the generator.
    pub const KILL: Field = Field::bit(5);
    /// Generator is running.
    pub const BUSY: Field = Field::bit(7);
    /// Invert the output.
    pub const FLIP: Field = Field::bit(8);
    /// MASH noise-shaping stages.
    pub const MASH: Field = Field::new(9, 2);
    /// Fractional divisor.
    pub const DIVF: Field = Field::new(0, 12);
    /// Integer divisor.
    pub const DIVI: Field = Field::new(12, 12);
    /// Password field, shared by CTL and DIV.
    pub const PASSWD: Field = Field::new(24, 8);
}

/// Clock-manager source selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    Gnd = 0,
    /// 19.2 MHz crystal.
    Oscillator = 1,
    PllA = 4,
    PllC = 5,
    PllD = 6,
    Hdmi = 7,
}
