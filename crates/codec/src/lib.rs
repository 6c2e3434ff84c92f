//! This crate encodes and decodes OBEX (Object Exchange) headers, the length-prefixed binary format Bluetooth OPP,
//! PBAP and MAP use to move objects around.
//!
//! It is a stateless serializer/deserializer over caller-owned buffers:
//!
//! - The `append_*` functions write one header into a slice and return how many bytes they wrote.
//! - [parse_headers] walks a packet body and fills a [HeaderSet] with headers borrowing from it.
//! - [PacketWriter] and [parse_packet] deal with whole packets, including the envelope and CONNECT fields.
//!
//! This crate doesn't know anything about sessions or transports.  You hand it bytes from RFCOMM/L2CAP, and you get
//! headers out; what they mean for a PUT or a GET is up to you.
mod app_parameters;
mod encode;
mod header;
mod header_id;
mod header_set;
mod opcode;
mod packet;
mod parser;
#[cfg(test)]
mod tests;

pub use app_parameters::*;
pub use encode::*;
pub use header::*;
pub use header_id::*;
pub use header_set::*;
pub use opcode::*;
pub use packet::*;
pub use parser::*;
