//! # raspi-periph
//!
//! A `no_std`, allocation-free driver crate for two Raspberry Pi (BCM2835 /
//! BCM2836 / BCM2837) peripherals that need more than plain register
//! pokes: the VideoCore mailbox property interface, and an SPI slave built
//! from the PCM/I2S block.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Registers | [`regs`] | `RegisterIo` trait, bit-field accessors, owned `Mmio` handle |
//! | Time | [`timer`] | System timer reads, `DelayNs`, bounded-wait policy |
//! | Pins | [`gpio`] | Function select and level access |
//! | Firmware | [`mailbox`] / [`control`] | Mailbox, property RPC, clock control (feature-gated) |
//! | SPI slave | [`spisl`] | PCM slave transport and byte synchronizer (feature-gated) |
//!
//! Every driver owns (or mutably borrows) one [`RegisterIo`](regs::RegisterIo)
//! handle and hands it back with `release()`. No driver keeps global state.
//!
//! ## Quick start
//!
//! ```ignore
//! use core::ptr::NonNull;
//! use raspi_periph::constants::ARM_IO_BASE_PI2;
//! use raspi_periph::control::{ClockControl, ClockId};
//! use raspi_periph::mailbox::{DirectBus, PropertyClient};
//! use raspi_periph::regs::Mmio;
//! use raspi_periph::spisl::{ByteSynchronizer, PcmSlave, PcmSlaveConfig, SyncConfig};
//!
//! let base = ARM_IO_BASE_PI2 as *mut u8;
//! let mut regs = unsafe { Mmio::take(NonNull::new_unchecked(base))? };
//!
//! // Ask the firmware for a 3 MHz UART clock
//! let mut vc = PropertyClient::new(&mut regs, DirectBus::UNCACHED);
//! vc.set_clock_rate(ClockId::Uart, 3_000_000)?;
//!
//! // Become an SPI slave and align to the master's bytes
//! let mut slave = PcmSlave::new(&mut regs, PcmSlaveConfig::default());
//! slave.init()?;
//! ByteSynchronizer::new(SyncConfig::default()).run(&mut slave)?;
//! let first = slave.read()?;
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `mailbox` | yes | Mailbox transport, property client, clock control |
//! | `spisl` | yes | PCM-based SPI slave and byte synchronizer |
//!
//! ## Blocking
//!
//! All waits are busy polls. By default they never give up, matching the
//! hardware's lack of a failure mode; pass a
//! [`Timeout::Micros`](timer::Timeout::Micros) policy to bound them.

#![cfg_attr(not(test), no_std)]

pub mod constants;
pub mod error;
pub mod gpio;
pub mod regs;
pub mod timer;

#[cfg(feature = "mailbox")]
pub mod mailbox;

#[cfg(feature = "mailbox")]
pub mod control;

#[cfg(feature = "spisl")]
pub mod spisl;

#[cfg(test)]
mod mock;

pub use error::{Error, Result};
