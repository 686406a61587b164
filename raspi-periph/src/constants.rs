//! Peripheral offsets and address-space constants for BCM2835/6/7 boards.
//!
//! All `*_OFFSET` values are byte offsets from the start of the peripheral
//! window. The window starts at a board-specific ARM physical address
//! ([`ARM_IO_BASE_PI1`] / [`ARM_IO_BASE_PI2`]) and at [`BUS_IO_BASE`] in the
//! bus address space seen by the VideoCore and DMA engines.

/// Peripheral window on the original Raspberry Pi (BCM2835).
pub const ARM_IO_BASE_PI1: usize = 0x2000_0000;

/// Peripheral window on Raspberry Pi 2 and 3 (BCM2836/7).
pub const ARM_IO_BASE_PI2: usize = 0x3F00_0000;

/// Peripheral window in bus address space (all boards).
pub const BUS_IO_BASE: u32 = 0x7E00_0000;

/// Size of the peripheral window that a register handle may address.
pub const PERIPHERAL_SPAN: usize = 0x00F0_0000;

// ── System timer ───────────────────────────────────────────────────────────

/// System timer block.
pub const ST_OFFSET: usize = 0x00_3000;

/// Free-running counter, low 32 bits.
pub const ST_CLO: usize = ST_OFFSET + 0x04;

/// Free-running counter, high 32 bits.
pub const ST_CHI: usize = ST_OFFSET + 0x08;

/// System timer ticks per second (the counter runs at 1 MHz).
pub const ST_TICKS_PER_SECOND: u32 = 1_000_000;

/// System timer ticks per millisecond.
pub const ST_TICKS_PER_MS: u32 = ST_TICKS_PER_SECOND / 1000;

/// System timer ticks per microsecond.
pub const ST_TICKS_PER_US: u32 = ST_TICKS_PER_SECOND / 1_000_000;

// ── Mailbox ────────────────────────────────────────────────────────────────

/// Mailbox 0: VideoCore → ARM. The ARM reads responses here.
pub const MBOX0_OFFSET: usize = 0x00_B880;

/// Mailbox 1: ARM → VideoCore. The ARM writes requests here.
pub const MBOX1_OFFSET: usize = 0x00_B8A0;

/// Data register within a mailbox block.
pub const MBOX_DATA: usize = 0x00;

/// Status register within a mailbox block.
pub const MBOX_STATUS: usize = 0x18;

// ── Clock manager ──────────────────────────────────────────────────────────

/// Clock manager block. Each clock owns a CTL/DIV register pair.
pub const CM_OFFSET: usize = 0x10_1000;

// ── GPIO ───────────────────────────────────────────────────────────────────

/// GPIO block.
pub const GPIO_OFFSET: usize = 0x20_0000;

/// Number of GPIO lines on the BCM283x.
pub const GPIO_PIN_COUNT: u8 = 54;

// ── PCM / I2S ──────────────────────────────────────────────────────────────

/// PCM / I2S audio block.
pub const PCM_OFFSET: usize = 0x20_3000;
