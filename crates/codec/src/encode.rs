//! Header encoders.
//!
//! Every function here writes one header to the front of a caller-owned buffer and returns how many bytes it wrote.
//! Nothing allocates.
//!
//! Length-prefixed headers follow a best-effort fill: if the destination is too small, as much of the header as fits
//! is written and the declared length still describes the whole header.  The return value is the only honest account
//! of what made it into the buffer, so callers compare it against [crate::encoded_len] when they need to know.
//!
//! The fixed-size headers (`Length`, `ConnectionId`, `SingleResponseMode`, the empty `EndOfBody`) expect a buffer that
//! is already large enough and panic otherwise.
use bytes::BufMut;
use log::*;

use crate::header_id::{header_frame_size, HeaderId, HEADER_PREFIX_SIZE, MAX_CONTENT_LENGTH};

/// Size of the `Length` and `ConnectionId` headers.
pub const U32_HEADER_SIZE: usize = 5;

/// Size of the `SingleResponseMode` header.
pub const U8_HEADER_SIZE: usize = 2;

/// Write a length-prefixed header.
///
/// Returns the number of bytes written, which is less than `data.len() + 3` if `dest` was too short.  Returns 0 without
/// writing if `data` is too long for the 16-bit length field.
pub fn append_header(id: HeaderId, dest: &mut [u8], data: &[u8]) -> usize {
    debug_assert!(
        id.encoding().is_length_prefixed(),
        "Header {} has a fixed size",
        id
    );

    if data.len() > MAX_CONTENT_LENGTH {
        warn!(
            "Refusing to encode header {} with {} bytes of content, more than a frame can describe",
            id,
            data.len()
        );
        return 0;
    }

    let frame_size = header_frame_size(data.len());
    let written = frame_size.min(dest.len());
    if written < frame_size {
        debug!(
            "Truncating header {}: needs {} bytes, only {} available",
            id, frame_size, written
        );
    }

    let mut prefix = [0u8; HEADER_PREFIX_SIZE];
    {
        let mut p = &mut prefix[..];
        p.put_u8(id.0);
        p.put_u16(frame_size as u16);
    }

    let prefix_written = written.min(HEADER_PREFIX_SIZE);
    dest[..prefix_written].copy_from_slice(&prefix[..prefix_written]);

    if written > HEADER_PREFIX_SIZE {
        let content_written = written - HEADER_PREFIX_SIZE;
        dest[HEADER_PREFIX_SIZE..written].copy_from_slice(&data[..content_written]);
    }

    written
}

/// Write a header whose value is a big-endian u32.
///
/// # Panics
///
/// If `dest` is shorter than [U32_HEADER_SIZE].
pub fn append_header_u32(id: HeaderId, dest: &mut [u8], value: u32) -> usize {
    let mut buf = &mut dest[..U32_HEADER_SIZE];
    buf.put_u8(id.0);
    buf.put_u32(value);
    U32_HEADER_SIZE
}

/// Write a header whose value is a single byte.
///
/// # Panics
///
/// If `dest` is shorter than [U8_HEADER_SIZE].
pub fn append_header_u8(id: HeaderId, dest: &mut [u8], value: u8) -> usize {
    let mut buf = &mut dest[..U8_HEADER_SIZE];
    buf.put_u8(id.0);
    buf.put_u8(value);
    U8_HEADER_SIZE
}

/// The name of the object, as null-terminated UTF-16BE.  See [encode_name].
pub fn append_header_name(dest: &mut [u8], name: &[u8]) -> usize {
    append_header(HeaderId::NAME, dest, name)
}

pub fn append_header_body(dest: &mut [u8], body: &[u8]) -> usize {
    append_header(HeaderId::BODY, dest, body)
}

pub fn append_header_end_of_body(dest: &mut [u8], body: &[u8]) -> usize {
    append_header(HeaderId::END_OF_BODY, dest, body)
}

pub fn append_header_target(dest: &mut [u8], target: &[u8]) -> usize {
    append_header(HeaderId::TARGET, dest, target)
}

pub fn append_header_who(dest: &mut [u8], who: &[u8]) -> usize {
    append_header(HeaderId::WHO, dest, who)
}

pub fn append_auth_response(dest: &mut [u8], digest: &[u8]) -> usize {
    append_header(HeaderId::AUTH_RESPONSE, dest, digest)
}

/// The MIME type of the object, as null-terminated ASCII.
pub fn append_header_type(dest: &mut [u8], content_type: &[u8]) -> usize {
    append_header(HeaderId::TYPE, dest, content_type)
}

/// The already-encoded body of an `AppParameters` header.  Build it with [crate::append_app_parameter].
pub fn append_header_app_parameters(dest: &mut [u8], app_parameters: &[u8]) -> usize {
    append_header(HeaderId::APP_PARAMETERS, dest, app_parameters)
}

/// Length of the object being sent.
pub fn append_header_length(dest: &mut [u8], object_length: u32) -> usize {
    append_header_u32(HeaderId::LENGTH, dest, object_length)
}

pub fn append_header_connection_id(dest: &mut [u8], connection_id: u32) -> usize {
    append_header_u32(HeaderId::CONNECTION_ID, dest, connection_id)
}

pub fn append_header_srm(dest: &mut [u8], enabled: bool) -> usize {
    append_header_u8(HeaderId::SINGLE_RESPONSE_MODE, dest, enabled as u8)
}

/// An `EndOfBody` with no content, used to close a body whose data has all gone out in `Body` headers.
///
/// # Panics
///
/// If `dest` is shorter than 3 bytes.
pub fn append_header_empty_end_of_body(dest: &mut [u8]) -> usize {
    let mut buf = &mut dest[..HEADER_PREFIX_SIZE];
    buf.put_u8(HeaderId::END_OF_BODY.0);
    buf.put_u16(HEADER_PREFIX_SIZE as u16);
    HEADER_PREFIX_SIZE
}

/// Encode a string the way `Name` and the other text headers expect it: UTF-16BE with a trailing null.
///
/// An empty string encodes to nothing at all, which is how an empty name is sent.
pub fn encode_name(name: &str) -> Vec<u8> {
    if name.is_empty() {
        return vec![];
    }

    let mut out = Vec::with_capacity((name.len() + 1) * 2);
    for unit in name.encode_utf16().chain(std::iter::once(0)) {
        out.put_u16(unit);
    }
    out
}
