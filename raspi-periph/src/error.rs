//! Crate-wide error type.

/// Errors reported by the mailbox and SPI-slave drivers.
///
/// FIFO backpressure is not an error: under the default
/// [`Timeout::Never`](crate::timer::Timeout::Never) policy every wait blocks
/// until the hardware makes progress, so [`Error::Timeout`] only appears once
/// a caller opts in to a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A bounded wait elapsed before the hardware became ready.
    #[error("timed out waiting for hardware")]
    Timeout,

    /// Firmware answered a property request with the error status.
    #[error("firmware rejected property request (code {code:#010x})")]
    Rejected { code: u32 },

    /// The response header holds neither a success nor an error status.
    #[error("unexpected property response code {code:#010x}")]
    UnexpectedCode { code: u32 },

    /// Firmware reported success but left a tag without a response.
    #[error("property tag {tag:#010x} was not answered")]
    TagNotAnswered { tag: u32 },

    /// A mailbox buffer must start on a 16-byte boundary.
    #[error("mailbox buffer at {address:#x} is not 16-byte aligned")]
    Misaligned { address: usize },

    /// A buffer address does not fit the mailbox's 28-bit address field.
    #[error("address {address:#x} is outside the mailbox address space")]
    AddressOutOfRange { address: usize },

    /// A property message does not fit its buffer.
    #[error("property message needs {needed} words, buffer holds {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    /// A property message was finished without any tags.
    #[error("property message holds no tags")]
    EmptyMessage,

    /// A tag response is longer than the value slice that receives it.
    #[error("tag response of {words} words overflows a {capacity}-word value")]
    ValueTooLarge { words: usize, capacity: usize },

    /// Another register handle for the same peripheral window is alive.
    #[error("peripheral registers are already claimed")]
    AlreadyTaken,

    /// GPIO numbers run from 0 to 53.
    #[error("GPIO {pin} does not exist")]
    InvalidPin { pin: u8 },
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
