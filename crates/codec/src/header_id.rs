//! Header identifiers.
//!
//! On the wire an id is a single byte.  The top two bits select how the value is encoded, so every byte is a valid id
//! even if we don't have a name for it.

/// Size of the id byte plus the 2-byte length field carried by length-prefixed headers.
pub const HEADER_PREFIX_SIZE: usize = 3;

/// The largest content a length-prefixed header can carry, since the frame size must fit in a u16.
pub const MAX_CONTENT_LENGTH: usize = u16::MAX as usize - HEADER_PREFIX_SIZE;

#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd, Debug, derive_more::Display)]
#[display(fmt = "0x{:02x}", _0)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct HeaderId(pub u8);

/// How the value of a header is laid out, from the top two bits of the id.
#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd, Debug)]
pub enum HeaderEncoding {
    /// `00`: null-terminated UTF-16BE text behind a 2-byte length.
    UnicodeText,

    /// `01`: raw bytes behind a 2-byte length.
    ByteSequence,

    /// `10`: a single byte.
    OneByte,

    /// `11`: a big-endian u32.
    FourByte,
}

impl HeaderEncoding {
    /// Content length for the quantity classes, which carry no length field.
    pub fn fixed_content_length(&self) -> Option<usize> {
        match self {
            HeaderEncoding::UnicodeText | HeaderEncoding::ByteSequence => None,
            HeaderEncoding::OneByte => Some(1),
            HeaderEncoding::FourByte => Some(4),
        }
    }

    pub fn is_length_prefixed(&self) -> bool {
        self.fixed_content_length().is_none()
    }
}

impl HeaderId {
    pub const COUNT: HeaderId = HeaderId(0xC0);
    pub const NAME: HeaderId = HeaderId(0x01);
    pub const TYPE: HeaderId = HeaderId(0x42);
    pub const LENGTH: HeaderId = HeaderId(0xC3);
    pub const TIME_ISO8601: HeaderId = HeaderId(0x44);
    pub const TIME_4BYTE: HeaderId = HeaderId(0xC4);
    pub const DESCRIPTION: HeaderId = HeaderId(0x05);
    pub const TARGET: HeaderId = HeaderId(0x46);
    pub const HTTP: HeaderId = HeaderId(0x47);
    pub const BODY: HeaderId = HeaderId(0x48);
    pub const END_OF_BODY: HeaderId = HeaderId(0x49);
    pub const WHO: HeaderId = HeaderId(0x4A);
    pub const CONNECTION_ID: HeaderId = HeaderId(0xCB);
    pub const APP_PARAMETERS: HeaderId = HeaderId(0x4C);
    pub const AUTH_CHALLENGE: HeaderId = HeaderId(0x4D);
    pub const AUTH_RESPONSE: HeaderId = HeaderId(0x4E);
    pub const CREATOR_ID: HeaderId = HeaderId(0xCF);
    pub const WAN_UUID: HeaderId = HeaderId(0x50);
    pub const OBJECT_CLASS: HeaderId = HeaderId(0x51);
    pub const SESSION_PARAMETERS: HeaderId = HeaderId(0x52);
    pub const SESSION_SEQUENCE_NUMBER: HeaderId = HeaderId(0x93);
    pub const ACTION: HeaderId = HeaderId(0x94);
    pub const DEST_NAME: HeaderId = HeaderId(0x15);
    pub const PERMISSIONS: HeaderId = HeaderId(0xD6);
    pub const SINGLE_RESPONSE_MODE: HeaderId = HeaderId(0x97);
    pub const SINGLE_RESPONSE_MODE_PARAMETERS: HeaderId = HeaderId(0x98);

    pub fn encoding(&self) -> HeaderEncoding {
        match self.0 >> 6 {
            0b00 => HeaderEncoding::UnicodeText,
            0b01 => HeaderEncoding::ByteSequence,
            0b10 => HeaderEncoding::OneByte,
            _ => HeaderEncoding::FourByte,
        }
    }
}

impl From<u8> for HeaderId {
    fn from(val: u8) -> HeaderId {
        HeaderId(val)
    }
}

impl From<HeaderId> for u8 {
    fn from(id: HeaderId) -> u8 {
        id.0
    }
}

/// Total size of a length-prefixed header with `content_len` bytes of content.
pub fn header_frame_size(content_len: usize) -> usize {
    content_len + HEADER_PREFIX_SIZE
}

/// Content length implied by a frame size read off the wire.
///
/// Returns `None` if the frame size can't even cover the prefix.
pub fn content_length(frame_size: u16) -> Option<usize> {
    (frame_size as usize).checked_sub(HEADER_PREFIX_SIZE)
}

/// Bytes needed on the wire for a header with the given id and content length.
pub fn encoded_len(id: HeaderId, content_len: usize) -> usize {
    match id.encoding().fixed_content_length() {
        Some(l) => 1 + l,
        None => header_frame_size(content_len),
    }
}
