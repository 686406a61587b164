//! Property-tag message buffers.
//!
//! A property message is a word array:
//!
//! ```text
//! ┌────────────┬──────┬─────────────────────────────────────────┬──────┐
//! │ size bytes │ code │ tag │ value size │ resp len|flag │ value… │ 0    │
//! └────────────┴──────┴─────────────────────────────────────────┴──────┘
//!   header (8 bytes)      one or more tags                         end
//! ```
//!
//! The header size equals the byte length of everything up to and including
//! the terminator. Firmware overwrites `code`, each tag's response word and
//! the value words in place.

use crate::error::{Error, Result};
use crate::regs::Field;

/// Header code of a request.
pub const CODE_REQUEST: u32 = 0x0000_0000;
/// Header code after a successful round trip.
pub const CODE_SUCCESS: u32 = 0x8000_0000;
/// Header code when firmware could not parse the request.
pub const CODE_ERROR: u32 = 0x8000_0001;

/// Header words before the first tag.
const HEADER_WORDS: usize = 2;
/// Tag words before the value buffer.
const TAG_HEADER_WORDS: usize = 3;

/// Response-length word: set by firmware on every tag it answered.
pub const TAG_RESPONSE: Field = Field::bit(31);
/// Response-length word: value length in bytes.
pub const TAG_LENGTH: Field = Field::new(0, 31);

/// Property tag identifiers.
///
/// See <https://github.com/raspberrypi/firmware/wiki/Mailbox-property-interface>.
pub mod tag {
    pub const GET_FIRMWARE_REVISION: u32 = 0x0000_0001;
    pub const GET_BOARD_MODEL: u32 = 0x0001_0001;
    pub const GET_BOARD_REVISION: u32 = 0x0001_0002;
    pub const GET_BOARD_MAC_ADDRESS: u32 = 0x0001_0003;
    pub const GET_BOARD_SERIAL: u32 = 0x0001_0004;
    pub const GET_ARM_MEMORY: u32 = 0x0001_0005;
    pub const GET_VC_MEMORY: u32 = 0x0001_0006;
    pub const GET_CLOCK_STATE: u32 = 0x0003_0001;
    pub const GET_CLOCK_RATE: u32 = 0x0003_0002;
    pub const GET_MAX_CLOCK_RATE: u32 = 0x0003_0004;
    pub const GET_MIN_CLOCK_RATE: u32 = 0x0003_0007;
    pub const GET_CLOCK_RATE_MEASURED: u32 = 0x0003_0047;
    pub const SET_CLOCK_STATE: u32 = 0x0003_8001;
    pub const SET_CLOCK_RATE: u32 = 0x0003_8002;
}

/// Decoded header code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Request,
    Success,
    Error,
    Unknown(u32),
}

impl From<u32> for ResponseCode {
    fn from(code: u32) -> Self {
        match code {
            CODE_REQUEST => ResponseCode::Request,
            CODE_SUCCESS => ResponseCode::Success,
            CODE_ERROR => ResponseCode::Error,
            other => ResponseCode::Unknown(other),
        }
    }
}

/// Position of a tag's value buffer inside a [`PropertyBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSlot {
    /// Word index of the tag id.
    start: usize,
    /// Value buffer length in words.
    words: usize,
}

impl TagSlot {
    fn value_range(self) -> core::ops::Range<usize> {
        let first = self.start + TAG_HEADER_WORDS;
        first..first + self.words
    }
}

/// One tag as read back from a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagView<'a> {
    pub id: u32,
    /// Declared value buffer size in bytes.
    pub buffer_size: u32,
    /// Response length in bytes, if firmware answered the tag.
    pub response_len: Option<u32>,
    pub value: &'a [u32],
}

/// 16-byte aligned property message with room for `N` words.
///
/// Tags are appended with [`push_tag`](Self::push_tag); [`finish`](Self::finish)
/// writes the header and terminator. After the round trip,
/// [`check`](Self::check) interprets the header code and
/// [`value`](Self::value) / [`tags`](Self::tags) read the answers.
#[repr(C, align(16))]
#[derive(Clone)]
pub struct PropertyBuffer<const N: usize> {
    words: [u32; N],
    /// Word index where the next tag (or the terminator) goes.
    end: usize,
}

impl<const N: usize> Default for PropertyBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PropertyBuffer<N> {
    pub const fn new() -> Self {
        PropertyBuffer {
            words: [0; N],
            end: HEADER_WORDS,
        }
    }

    /// Drop all tags.
    pub fn clear(&mut self) {
        self.words = [0; N];
        self.end = HEADER_WORDS;
    }

    /// Append a tag whose value buffer holds `words` words, pre-filled with
    /// `request` and zero-padded.
    ///
    /// The value buffer is sized for the larger of request and response;
    /// pass the response size as `words`.
    pub fn push_tag(&mut self, id: u32, request: &[u32], words: usize) -> Result<TagSlot> {
        let words = words.max(request.len());
        let needed = self.end + TAG_HEADER_WORDS + words + 1;
        if needed > N {
            return Err(Error::BufferTooSmall {
                needed,
                capacity: N,
            });
        }

        let slot = TagSlot {
            start: self.end,
            words,
        };
        let bytes = (words * 4) as u32;
        self.words[slot.start] = id;
        self.words[slot.start + 1] = bytes;
        self.words[slot.start + 2] = TAG_LENGTH.val(bytes);

        let value = &mut self.words[slot.value_range()];
        value[..request.len()].copy_from_slice(request);
        value[request.len()..].fill(0);

        self.end = slot.value_range().end;
        Ok(slot)
    }

    /// Write the header and terminator. Returns the message size in bytes.
    ///
    /// Fails if the buffer cannot hold a header and terminator, or if no
    /// tag was pushed.
    pub fn finish(&mut self) -> Result<u32> {
        if self.end >= N {
            return Err(Error::BufferTooSmall {
                needed: self.end + 1,
                capacity: N,
            });
        }
        if self.end == HEADER_WORDS {
            return Err(Error::EmptyMessage);
        }

        self.words[self.end] = 0;
        let bytes = ((self.end + 1) * 4) as u32;
        self.words[0] = bytes;
        self.words[1] = CODE_REQUEST;
        Ok(bytes)
    }

    /// Message size in bytes as written by [`finish`](Self::finish).
    pub fn size(&self) -> u32 {
        self.words.first().copied().unwrap_or(0)
    }

    pub fn code(&self) -> ResponseCode {
        ResponseCode::from(self.words.get(1).copied().unwrap_or(CODE_REQUEST))
    }

    /// Turn the header code into a result.
    pub fn check(&self) -> Result<()> {
        match self.code() {
            ResponseCode::Success => Ok(()),
            ResponseCode::Error => Err(Error::Rejected { code: CODE_ERROR }),
            ResponseCode::Request => Err(Error::UnexpectedCode { code: CODE_REQUEST }),
            ResponseCode::Unknown(code) => Err(Error::UnexpectedCode { code }),
        }
    }

    /// Value buffer of `slot`.
    pub fn value(&self, slot: TagSlot) -> &[u32] {
        &self.words[slot.value_range()]
    }

    /// Response length in bytes of `slot`, if firmware answered it.
    pub fn response_len(&self, slot: TagSlot) -> Option<u32> {
        let word = self.words[slot.start + 2];
        TAG_RESPONSE.is_set(word).then(|| TAG_LENGTH.get(word))
    }

    /// Every tag from the first up to the terminator.
    pub fn tags(&self) -> Tags<'_> {
        Tags {
            words: &self.words[..self.end.min(N)],
            pos: HEADER_WORDS,
        }
    }

    /// The serialized message, header through terminator.
    pub fn as_words(&self) -> &[u32] {
        &self.words[..(self.end + 1).min(N)]
    }

    /// Mutable view of the serialized message, as firmware sees it.
    pub fn as_words_mut(&mut self) -> &mut [u32] {
        &mut self.words[..(self.end + 1).min(N)]
    }

    pub fn as_ptr(&self) -> *const u32 {
        self.words.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u32 {
        self.words.as_mut_ptr()
    }
}

/// Iterator over the tags of a [`PropertyBuffer`].
pub struct Tags<'a> {
    words: &'a [u32],
    pos: usize,
}

impl<'a> Iterator for Tags<'a> {
    type Item = TagView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = self.words.get(self.pos..self.pos + TAG_HEADER_WORDS)?;
        if header[0] == 0 {
            return None;
        }
        let value_words = header[1] as usize / 4;
        let first = self.pos + TAG_HEADER_WORDS;
        let value = self.words.get(first..first + value_words)?;
        self.pos = first + value_words;

        Some(TagView {
            id: header[0],
            buffer_size: header[1],
            response_len: TAG_RESPONSE.is_set(header[2]).then(|| TAG_LENGTH.get(header[2])),
            value,
        })
    }
}
