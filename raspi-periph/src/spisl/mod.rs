//! SPI slave over the PCM/I2S block.
//!
//! The BCM283x SPI-slave controller is not wired to any header, so the PCM
//! block stands in for it. It shifts bytes on the master's clock but has no
//! notion of where a byte starts; [`ByteSynchronizer`] recovers the
//! boundary with a marker handshake before data flows.
//!
//! ## Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PcmSlave`] | Init sequence and blocking byte read/write/poll/flush |
//! | [`ByteSynchronizer`] | Marker-stream alignment over any [`SlaveLink`] |
//!
//! The PCM kernel driver must not be loaded while this module owns the
//! block.
//!
//! # Feature gate
//!
//! This module is available when the `spisl` feature is enabled (on by default).

mod pcm;
pub(crate) mod registers;
mod sync;

pub use pcm::{PcmPins, PcmSlave, PcmSlaveConfig};
pub use registers::ClockSource;
pub use sync::{ByteSynchronizer, SlaveLink, SyncConfig, SyncReport, SyncState, SyncStep};
