//! Header parsing.
//!
//! A packet body is a run of headers laid end to end.  We walk it with a cursor, reading each id, working out how
//! long its content is from the encoding class, and checking that the content is actually there before taking it.
//! Nothing past the end of the input is ever read.
//!
//! Parsing is all or nothing: if any header is corrupt we can't trust the rest of the packet, so the header set is
//! cleared and the caller gets an error.
use bytes::Buf;
use log::*;

use crate::header::Header;
use crate::header_id::{content_length, HeaderId};
use crate::header_set::HeaderSet;

#[derive(Debug, Eq, PartialEq, derive_more::Display, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A length-prefixed header starts too close to the end of the input to hold its length field.
    #[display(fmt = "header at offset {} is missing its length field", offset)]
    MissingLengthField { offset: usize },

    /// The length field is smaller than the header prefix it is supposed to include.
    #[display(fmt = "header at offset {} declares an invalid length {}", offset, declared)]
    InvalidLength { offset: usize, declared: u16 },

    /// The header claims more content than is left in the input.
    #[display(
        fmt = "header at offset {} needs {} bytes of content but only {} remain",
        offset,
        needed,
        remaining
    )]
    ContentOverrun {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
}

/// Parse every header in `source`, appending them to `dest` in order.
///
/// On failure `dest` is cleared, including anything it held before the call.
pub fn parse_headers<'a>(source: &'a [u8], dest: &mut HeaderSet<'a>) -> Result<(), ParseError> {
    let res = parse_into(source, dest);
    if let Err(e) = &res {
        warn!("Discarding all headers of a corrupt packet: {}", e);
        dest.clear_headers();
    }
    res
}

fn parse_into<'a>(source: &'a [u8], dest: &mut HeaderSet<'a>) -> Result<(), ParseError> {
    let mut buf = source;

    while buf.has_remaining() {
        let offset = source.len() - buf.remaining();
        let id = HeaderId(buf.get_u8());

        let content_len = match id.encoding().fixed_content_length() {
            Some(l) => l,
            None => {
                if buf.remaining() < 2 {
                    return Err(ParseError::MissingLengthField { offset });
                }
                let declared = buf.get_u16();
                content_length(declared).ok_or(ParseError::InvalidLength { offset, declared })?
            }
        };

        if buf.remaining() < content_len {
            return Err(ParseError::ContentOverrun {
                offset,
                needed: content_len,
                remaining: buf.remaining(),
            });
        }

        let (content, rest) = buf.split_at(content_len);
        trace!("Parsed header {} with {} bytes at offset {}", id, content_len, offset);
        dest.add_header(Header::borrowed(id, content));
        buf = rest;
    }

    Ok(())
}
