use std::borrow::Cow;

use crate::header_id::HeaderId;

/// A single decoded header: its id and its content, without the id byte or length field.
///
/// Parsed headers borrow from the packet they came out of; use [Header::clone_static] to keep one around longer.
#[derive(Debug, Clone, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Header<'a> {
    pub id: HeaderId,
    pub data: Cow<'a, [u8]>,
}

impl<'a> Header<'a> {
    pub fn new(id: HeaderId, data: Cow<'a, [u8]>) -> Header<'a> {
        Header { id, data }
    }

    pub fn borrowed(id: HeaderId, data: &'a [u8]) -> Header<'a> {
        Header::new(id, Cow::Borrowed(data))
    }

    /// Extend the lifetime of this header to 'static by cloning the data.
    pub fn clone_static(&self) -> Header<'static> {
        Header {
            id: self.id,
            data: Cow::Owned(self.data.to_vec()),
        }
    }

    /// Content length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read a 4-byte header as a big-endian integer.
    pub fn as_u32(&self) -> Option<u32> {
        let bytes: [u8; 4] = self.data.as_ref().try_into().ok()?;
        Some(u32::from_be_bytes(bytes))
    }

    pub fn as_u8(&self) -> Option<u8> {
        match *self.data {
            [b] => Some(b),
            _ => None,
        }
    }
}
