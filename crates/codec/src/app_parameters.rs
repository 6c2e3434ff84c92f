//! Application parameters: the tag-length-value triplets carried in the body of an `AppParameters` header.
//!
//! PBAP and MAP use these for things like list offsets and vCard filters.  Each entry is a 1-byte tag, a 1-byte
//! length, then the value, so no value is ever longer than 255 bytes.
use bytes::BufMut;
use log::*;

/// Size of the tag and length bytes in front of every value.
pub const APP_PARAMETER_PREFIX_SIZE: usize = 2;

pub const MAX_APP_PARAMETER_LENGTH: usize = u8::MAX as usize;

/// Well-known tags from PBAP and MAP.
pub mod tags {
    pub const ORDER: u8 = 0x01;
    pub const SEARCH_VALUE: u8 = 0x02;
    pub const SEARCH_PROPERTY: u8 = 0x03;
    pub const MAX_LIST_COUNT: u8 = 0x04;
    pub const LIST_START_OFFSET: u8 = 0x05;
    pub const PROPERTY_SELECTOR: u8 = 0x06;
    pub const FORMAT: u8 = 0x07;
    pub const PHONEBOOK_SIZE: u8 = 0x08;
    pub const NEW_MISSED_CALLS: u8 = 0x09;
    pub const VCARD_SELECTOR: u8 = 0x0A;
    pub const VCARD_SELECTOR_OPERATOR: u8 = 0x0E;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AppParameter<'a> {
    pub tag: u8,
    pub value: &'a [u8],
}

#[derive(Debug, Eq, PartialEq, derive_more::Display, thiserror::Error)]
#[non_exhaustive]
pub enum AppParameterError {
    /// An entry claims more bytes than are left in the header body.
    #[display(fmt = "app parameter at offset {} is truncated", offset)]
    Truncated { offset: usize },
}

/// Write one application parameter to the front of `dest`.
///
/// Unlike headers, parameters are never partially written: if `dest` can't hold the whole entry, or the value is longer
/// than the length byte can describe, nothing is written and this returns 0.  Otherwise returns `value.len() + 2`.
pub fn append_app_parameter(dest: &mut [u8], tag: u8, value: &[u8]) -> usize {
    if value.len() > MAX_APP_PARAMETER_LENGTH {
        warn!(
            "App parameter 0x{:02x} is {} bytes, more than fits in its length byte",
            tag,
            value.len()
        );
        return 0;
    }

    let needed = value.len() + APP_PARAMETER_PREFIX_SIZE;
    if dest.len() < needed {
        warn!(
            "Return buffer size is too small for app parameter 0x{:02x}: need {}, have {}",
            tag,
            needed,
            dest.len()
        );
        return 0;
    }

    let mut buf = &mut dest[..needed];
    buf.put_u8(tag);
    buf.put_u8(value.len() as u8);
    buf.put_slice(value);
    needed
}

/// Iterates over the entries in the body of an `AppParameters` header.
///
/// Stops after yielding the first error.
pub struct AppParameters<'a> {
    data: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> AppParameters<'a> {
    pub fn new(data: &'a [u8]) -> AppParameters<'a> {
        AppParameters {
            data,
            offset: 0,
            failed: false,
        }
    }

    /// Find the value for `tag`, if any.  Entries after a malformed one aren't searched.
    pub fn find(data: &'a [u8], tag: u8) -> Option<&'a [u8]> {
        AppParameters::new(data)
            .map_while(|p| p.ok())
            .find(|p| p.tag == tag)
            .map(|p| p.value)
    }
}

impl<'a> Iterator for AppParameters<'a> {
    type Item = Result<AppParameter<'a>, AppParameterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }

        let remaining = &self.data[self.offset..];
        if remaining.len() < APP_PARAMETER_PREFIX_SIZE {
            self.failed = true;
            return Some(Err(AppParameterError::Truncated {
                offset: self.offset,
            }));
        }

        let tag = remaining[0];
        let len = remaining[1] as usize;
        let end = APP_PARAMETER_PREFIX_SIZE + len;
        if remaining.len() < end {
            self.failed = true;
            return Some(Err(AppParameterError::Truncated {
                offset: self.offset,
            }));
        }

        self.offset += end;
        Some(Ok(AppParameter {
            tag,
            value: &remaining[APP_PARAMETER_PREFIX_SIZE..end],
        }))
    }
}
