//! Packets: the 3-byte envelope every request and response starts with, the extra fields a CONNECT carries, and a
//! writer that assembles whole packets out of headers.
//!
//! On the wire a packet is an opcode (or response code) byte, a big-endian u16 with the length of the entire packet,
//! then headers.  CONNECT requests and responses put a version byte, a flags byte and the sender's maximum packet
//! length between the envelope and the headers.
use bytes::{Buf, BufMut};
use log::*;

use crate::app_parameters::{append_app_parameter, AppParameter, APP_PARAMETER_PREFIX_SIZE};
use crate::encode;
use crate::header_id::{encoded_len, HeaderEncoding, HeaderId};
use crate::header_set::HeaderSet;
use crate::opcode::FINAL_BIT;
use crate::parser::{parse_headers, ParseError};

/// Size of the opcode and packet length.
pub const PACKET_INFO_SIZE: usize = 3;

/// Size of the version, flags, and maximum packet length in a CONNECT.
pub const CONNECT_PARAMETERS_SIZE: usize = 4;

/// OBEX 1.0, the version everyone sends.
pub const OBEX_VERSION: u8 = 0x10;

/// Every implementation must accept packets at least this large.
pub const LEAST_MAX_PACKET_SIZE: u16 = 255;

#[derive(Debug, Eq, PartialEq, derive_more::Display, thiserror::Error)]
#[non_exhaustive]
pub enum PacketError {
    NotEnoughData,

    /// The envelope claims a length smaller than the envelope itself.
    #[display(fmt = "packet length {} is shorter than the packet envelope", _0)]
    LengthTooShort(u16),

    #[display(fmt = "packet declares {} bytes but {} were given", declared, actual)]
    LengthMismatch { declared: u16, actual: usize },

    /// Adding this would take the packet past its maximum length.
    #[display(fmt = "{} more bytes would exceed the maximum packet length {}", needed, max)]
    TooLarge { needed: usize, max: u16 },

    /// A one- or four-byte header was given content of the wrong size.
    #[display(fmt = "header {} needs exactly {} bytes, got {}", id, expected, actual)]
    ContentLengthMismatch {
        id: HeaderId,
        expected: usize,
        actual: usize,
    },

    /// Connect parameters go immediately after the envelope.
    ConnectParametersAfterHeaders,

    #[display(fmt = "app parameter 0x{:02x} is too long", _0)]
    AppParameterTooLong(u8),

    Headers(#[from] ParseError),
}

/// Write the envelope of a packet to the front of `dest`.
///
/// # Panics
///
/// If `dest` is shorter than [PACKET_INFO_SIZE].
pub fn set_obex_packet_info(dest: &mut [u8], opcode: u8, packet_length: u16) {
    let mut buf = &mut dest[..PACKET_INFO_SIZE];
    buf.put_u8(opcode);
    buf.put_u16(packet_length);
}

/// The envelope of a packet.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct PacketInfo {
    /// A request opcode or a response code, depending on direction.
    pub opcode: u8,
    pub length: u16,
}

impl PacketInfo {
    pub fn encode(&self, dest: &mut impl BufMut) {
        dest.put_u8(self.opcode);
        dest.put_u16(self.length);
    }

    pub fn decode(source: &mut impl Buf) -> Result<PacketInfo, PacketError> {
        if source.remaining() < PACKET_INFO_SIZE {
            return Err(PacketError::NotEnoughData);
        }

        let opcode = source.get_u8();
        let length = source.get_u16();
        if (length as usize) < PACKET_INFO_SIZE {
            return Err(PacketError::LengthTooShort(length));
        }

        Ok(PacketInfo { opcode, length })
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct ConnectParameters {
    pub version: u8,
    pub flags: u8,
    /// The largest packet the sender can receive.
    pub max_packet_length: u16,
}

impl Default for ConnectParameters {
    fn default() -> ConnectParameters {
        ConnectParameters {
            version: OBEX_VERSION,
            flags: 0,
            max_packet_length: LEAST_MAX_PACKET_SIZE,
        }
    }
}

impl ConnectParameters {
    pub fn encode(&self, dest: &mut impl BufMut) {
        dest.put_u8(self.version);
        dest.put_u8(self.flags);
        dest.put_u16(self.max_packet_length);
    }

    pub fn decode(source: &mut impl Buf) -> Result<ConnectParameters, PacketError> {
        if source.remaining() < CONNECT_PARAMETERS_SIZE {
            return Err(PacketError::NotEnoughData);
        }

        Ok(ConnectParameters {
            version: source.get_u8(),
            flags: source.get_u8(),
            max_packet_length: source.get_u16(),
        })
    }
}

/// A parsed packet, borrowing its headers from the input.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Packet<'a> {
    pub info: PacketInfo,
    pub connect: Option<ConnectParameters>,
    pub headers: HeaderSet<'a>,
}

/// Parse one complete packet.
///
/// The envelope must describe exactly `source`.  Set `with_connect_parameters` for CONNECT requests and their
/// responses; nothing in the envelope says whether they are present, so the caller has to know from context.
pub fn parse_packet(source: &[u8], with_connect_parameters: bool) -> Result<Packet<'_>, PacketError> {
    let mut buf = source;
    let info = PacketInfo::decode(&mut buf)?;
    if info.length as usize != source.len() {
        return Err(PacketError::LengthMismatch {
            declared: info.length,
            actual: source.len(),
        });
    }

    let connect = if with_connect_parameters {
        Some(ConnectParameters::decode(&mut buf)?)
    } else {
        None
    };

    let mut headers = HeaderSet::new();
    parse_headers(buf, &mut headers)?;

    Ok(Packet {
        info,
        connect,
        headers,
    })
}

/// Builds a single packet in an internal buffer.
///
/// Call [PacketWriter::new], add headers, then [PacketWriter::finish] to fill in the envelope and get the bytes.
/// Every addition is checked against the maximum packet length negotiated with the peer; one that doesn't fit fails
/// without touching the buffer, so a caller splitting a body across packets can fill up to [PacketWriter::body_capacity]
/// and send.
pub struct PacketWriter {
    opcode: u8,
    max_packet_length: u16,
    buffer: Vec<u8>,
}

impl PacketWriter {
    pub fn new(opcode: impl Into<u8>, max_packet_length: u16) -> PacketWriter {
        let max_packet_length = max_packet_length.max(PACKET_INFO_SIZE as u16);
        let mut buffer = Vec::with_capacity(max_packet_length as usize);
        buffer.resize(PACKET_INFO_SIZE, 0);

        PacketWriter {
            opcode: opcode.into(),
            max_packet_length,
            buffer,
        }
    }

    /// Bytes still available before the packet hits its maximum length.
    pub fn remaining(&self) -> usize {
        self.max_packet_length as usize - self.buffer.len()
    }

    /// How much body content a single `Body` or `EndOfBody` header could still carry.
    pub fn body_capacity(&self) -> usize {
        self.remaining()
            .saturating_sub(crate::header_id::HEADER_PREFIX_SIZE)
    }

    /// Set the final bit on the opcode, for the last packet of a request.
    pub fn mark_final(&mut self) {
        self.opcode |= FINAL_BIT;
    }

    /// Length of the packet so far, envelope included.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == PACKET_INFO_SIZE
    }

    /// Grow the buffer by `needed` bytes and hand back the new tail, or fail if that would exceed the maximum.
    fn reserve(&mut self, needed: usize) -> Result<&mut [u8], PacketError> {
        if needed > self.remaining() {
            debug!(
                "Packet 0x{:02x} is full: {} of {} bytes used, {} more requested",
                self.opcode,
                self.buffer.len(),
                self.max_packet_length,
                needed
            );
            return Err(PacketError::TooLarge {
                needed,
                max: self.max_packet_length,
            });
        }

        let start = self.buffer.len();
        self.buffer.resize(start + needed, 0);
        Ok(&mut self.buffer[start..])
    }

    pub fn connect_parameters(&mut self, params: &ConnectParameters) -> Result<(), PacketError> {
        if !self.is_empty() {
            return Err(PacketError::ConnectParametersAfterHeaders);
        }

        let mut dest = self.reserve(CONNECT_PARAMETERS_SIZE)?;
        params.encode(&mut dest);
        Ok(())
    }

    /// Add a header with raw content.
    ///
    /// For one- and four-byte headers `data` must be exactly that long.
    pub fn add_header(&mut self, id: HeaderId, data: &[u8]) -> Result<(), PacketError> {
        let encoding = id.encoding();
        if let Some(expected) = encoding.fixed_content_length() {
            if data.len() != expected {
                return Err(PacketError::ContentLengthMismatch {
                    id,
                    expected,
                    actual: data.len(),
                });
            }
        } else if data.len() > crate::header_id::MAX_CONTENT_LENGTH {
            // Can never fit in a packet whose length is a u16 anyway.
            return Err(PacketError::TooLarge {
                needed: encoded_len(id, data.len()),
                max: self.max_packet_length,
            });
        }

        let needed = encoded_len(id, data.len());
        let dest = self.reserve(needed)?;
        let written = match encoding {
            HeaderEncoding::UnicodeText | HeaderEncoding::ByteSequence => {
                encode::append_header(id, dest, data)
            }
            HeaderEncoding::OneByte => encode::append_header_u8(id, dest, data[0]),
            HeaderEncoding::FourByte => {
                encode::append_header_u32(id, dest, u32::from_be_bytes([data[0], data[1], data[2], data[3]]))
            }
        };
        debug_assert_eq!(written, needed);
        Ok(())
    }

    /// Add a `Name` header, encoding `name` as UTF-16BE.
    pub fn add_name(&mut self, name: &str) -> Result<(), PacketError> {
        self.add_header(HeaderId::NAME, &encode::encode_name(name))
    }

    /// Add a `Type` header; the trailing null is appended here.
    pub fn add_type(&mut self, content_type: &str) -> Result<(), PacketError> {
        let mut data = Vec::with_capacity(content_type.len() + 1);
        data.extend_from_slice(content_type.as_bytes());
        data.push(0);
        self.add_header(HeaderId::TYPE, &data)
    }

    pub fn add_body(&mut self, body: &[u8]) -> Result<(), PacketError> {
        self.add_header(HeaderId::BODY, body)
    }

    pub fn add_end_of_body(&mut self, body: &[u8]) -> Result<(), PacketError> {
        if body.is_empty() {
            let dest = self.reserve(crate::header_id::HEADER_PREFIX_SIZE)?;
            encode::append_header_empty_end_of_body(dest);
            return Ok(());
        }
        self.add_header(HeaderId::END_OF_BODY, body)
    }

    pub fn add_target(&mut self, target: &[u8]) -> Result<(), PacketError> {
        self.add_header(HeaderId::TARGET, target)
    }

    pub fn add_who(&mut self, who: &[u8]) -> Result<(), PacketError> {
        self.add_header(HeaderId::WHO, who)
    }

    pub fn add_auth_response(&mut self, digest: &[u8]) -> Result<(), PacketError> {
        self.add_header(HeaderId::AUTH_RESPONSE, digest)
    }

    pub fn add_length(&mut self, object_length: u32) -> Result<(), PacketError> {
        let dest = self.reserve(encode::U32_HEADER_SIZE)?;
        encode::append_header_length(dest, object_length);
        Ok(())
    }

    pub fn add_connection_id(&mut self, connection_id: u32) -> Result<(), PacketError> {
        let dest = self.reserve(encode::U32_HEADER_SIZE)?;
        encode::append_header_connection_id(dest, connection_id);
        Ok(())
    }

    pub fn add_srm(&mut self, enabled: bool) -> Result<(), PacketError> {
        let dest = self.reserve(encode::U8_HEADER_SIZE)?;
        encode::append_header_srm(dest, enabled);
        Ok(())
    }

    /// Add an `AppParameters` header holding the given entries, in order.
    pub fn add_app_parameters(&mut self, params: &[AppParameter<'_>]) -> Result<(), PacketError> {
        let body_len = params
            .iter()
            .map(|p| p.value.len() + APP_PARAMETER_PREFIX_SIZE)
            .sum::<usize>();
        let mut body = vec![0u8; body_len];

        let mut offset = 0;
        for p in params {
            let written = append_app_parameter(&mut body[offset..], p.tag, p.value);
            if written == 0 {
                return Err(PacketError::AppParameterTooLong(p.tag));
            }
            offset += written;
        }

        self.add_header(HeaderId::APP_PARAMETERS, &body)
    }

    /// Fill in the envelope and return the finished packet.
    pub fn finish(mut self) -> Vec<u8> {
        let len = self.buffer.len() as u16;
        set_obex_packet_info(&mut self.buffer, self.opcode, len);
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use crate::opcode::{Opcode, ResponseCode};

    #[test]
    fn test_set_packet_info() {
        let mut buf = [0u8; 8];
        set_obex_packet_info(&mut buf, Opcode::PUT_FINAL.0, 0x0102);
        assert_eq!(&buf[..3], &[0x82, 0x01, 0x02]);
        assert!(buf[3..].iter().all(|x| *x == 0));
    }

    #[test]
    fn test_packet_info_errors() {
        assert_eq!(
            PacketInfo::decode(&mut &[0xA0, 0x00][..]),
            Err(PacketError::NotEnoughData)
        );
        assert_eq!(
            PacketInfo::decode(&mut &[0xA0, 0x00, 0x02][..]),
            Err(PacketError::LengthTooShort(2))
        );
    }

    #[test]
    fn test_connect_request() {
        let mut writer = PacketWriter::new(Opcode::CONNECT, LEAST_MAX_PACKET_SIZE);
        writer
            .connect_parameters(&ConnectParameters {
                max_packet_length: 0xFFFE,
                ..Default::default()
            })
            .expect("Should add");
        writer.add_target(&[0xF9, 0xEC, 0x7B, 0xC4]).expect("Should add");
        let bytes = writer.finish();

        assert_eq!(
            bytes,
            vec![0x80, 0x00, 0x0e, 0x10, 0x00, 0xFF, 0xFE, 0x46, 0x00, 0x07, 0xF9, 0xEC, 0x7B, 0xC4]
        );

        let packet = parse_packet(&bytes, true).expect("Should parse");
        assert_eq!(packet.info.opcode, Opcode::CONNECT.0);
        assert_eq!(packet.connect.map(|c| c.max_packet_length), Some(0xFFFE));
        assert_eq!(packet.headers.target(), Some(&[0xF9, 0xEC, 0x7B, 0xC4][..]));
    }

    #[test]
    fn test_connect_parameters_must_come_first() {
        let mut writer = PacketWriter::new(ResponseCode::SUCCESS, LEAST_MAX_PACKET_SIZE);
        writer.add_connection_id(1).expect("Should add");
        assert_eq!(
            writer.connect_parameters(&Default::default()),
            Err(PacketError::ConnectParametersAfterHeaders)
        );
    }

    #[test]
    fn test_writer_respects_max_length() {
        let mut writer = PacketWriter::new(Opcode::PUT, 20);
        writer.add_connection_id(7).expect("Should add");
        assert_eq!(writer.remaining(), 12);
        assert_eq!(writer.body_capacity(), 9);

        let before = writer.len();
        assert_eq!(
            writer.add_body(&[0u8; 10]),
            Err(PacketError::TooLarge { needed: 13, max: 20 })
        );
        assert_eq!(writer.len(), before);

        writer.add_body(&[0u8; 9]).expect("Should fit exactly");
        assert_eq!(writer.remaining(), 0);
        assert_eq!(writer.finish().len(), 20);
    }

    #[test]
    fn test_fixed_header_content_must_match() {
        let mut writer = PacketWriter::new(Opcode::GET_FINAL, LEAST_MAX_PACKET_SIZE);
        assert_eq!(
            writer.add_header(HeaderId::CONNECTION_ID, &[1, 2]),
            Err(PacketError::ContentLengthMismatch {
                id: HeaderId::CONNECTION_ID,
                expected: 4,
                actual: 2
            })
        );
        writer
            .add_header(HeaderId::CONNECTION_ID, &[1, 2, 3, 4])
            .expect("Should add");
        writer
            .add_header(HeaderId::SINGLE_RESPONSE_MODE, &[1])
            .expect("Should add");
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0x83, 0x00, 0x0a, 0xCB, 1, 2, 3, 4, 0x97, 1]);
    }

    #[test]
    fn test_mark_final() {
        let mut writer = PacketWriter::new(Opcode::PUT, LEAST_MAX_PACKET_SIZE);
        writer.mark_final();
        assert_eq!(writer.finish(), vec![Opcode::PUT_FINAL.0, 0x00, 0x03]);
    }

    #[test]
    fn test_empty_end_of_body() {
        let mut writer = PacketWriter::new(Opcode::PUT_FINAL, LEAST_MAX_PACKET_SIZE);
        writer.add_end_of_body(&[]).expect("Should add");
        assert_eq!(writer.finish(), vec![0x82, 0x00, 0x06, 0x49, 0x00, 0x03]);
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            parse_packet(&[0xA0, 0x00, 0x05, 0x97, 0x01, 0x00], false),
            Err(PacketError::LengthMismatch {
                declared: 5,
                actual: 6
            })
        );
    }

    #[test]
    fn test_corrupt_headers() {
        assert_eq!(
            parse_packet(&[0xA0, 0x00, 0x05, 0x48, 0x00], false),
            Err(PacketError::Headers(ParseError::MissingLengthField { offset: 0 }))
        );
    }

    #[test]
    fn test_app_parameter_too_long() {
        let mut writer = PacketWriter::new(Opcode::GET_FINAL, u16::MAX);
        let value = [0u8; 300];
        assert_eq!(
            writer.add_app_parameters(&[AppParameter {
                tag: 0x04,
                value: &value
            }]),
            Err(PacketError::AppParameterTooLong(0x04))
        );
        assert!(writer.is_empty());
    }

    proptest! {
        #[test]
        fn test_packet_info_roundtrip(info: PacketInfo) {
            prop_assume!(info.length as usize >= PACKET_INFO_SIZE);
            let mut buf = vec![];
            info.encode(&mut buf);
            prop_assert_eq!(PacketInfo::decode(&mut &buf[..]), Ok(info));
        }

        #[test]
        fn test_connect_parameters_roundtrip(params: ConnectParameters) {
            let mut buf = vec![];
            params.encode(&mut buf);
            prop_assert_eq!(ConnectParameters::decode(&mut &buf[..]), Ok(params));
        }
    }
}
