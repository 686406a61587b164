//! VideoCore mailbox and property-tag protocol.
//!
//! ## Layers
//!
//! | Type | Role |
//! |------|------|
//! | [`Mailbox`] | Raw FIFO transport: push, pop, matched call |
//! | [`PropertyBuffer`] | Builder and reader for property messages |
//! | [`PropertyClient`] | Synchronous tag RPC with status checking |
//!
//! Clock queries built on the client live in [`control`](crate::control).
//!
//! ## Buffers
//!
//! The VideoCore reads and writes messages in place through its own view
//! of SDRAM. Each buffer must be 16-byte aligned (guaranteed by
//! [`PropertyBuffer`]) and is handed over as a bus address produced by a
//! [`BusTranslate`] implementation, normally [`DirectBus`].

mod channel;
mod client;
pub mod message;

pub use channel::{Channel, Mailbox, MailboxWord};
pub use client::{BusTranslate, DirectBus, MemoryRegion, PropertyClient, MAX_CALL_VALUE_WORDS};
pub use message::{tag, PropertyBuffer, ResponseCode, TagSlot, TagView, Tags};
