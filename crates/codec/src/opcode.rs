//! Request opcodes and response codes, the first byte of every packet.
//!
//! Both are left as open newtypes over u8: a peer may send values we don't name, and the codec passes them through.

/// Set on a request opcode to mark the last packet of a request, and on every response code.
pub const FINAL_BIT: u8 = 0x80;

#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd, Debug, derive_more::Display)]
#[display(fmt = "0x{:02x}", _0)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Opcode(pub u8);

impl Opcode {
    pub const CONNECT: Opcode = Opcode(0x80);
    pub const DISCONNECT: Opcode = Opcode(0x81);
    pub const PUT: Opcode = Opcode(0x02);
    pub const PUT_FINAL: Opcode = Opcode(0x82);
    pub const GET: Opcode = Opcode(0x03);
    pub const GET_FINAL: Opcode = Opcode(0x83);
    pub const SET_PATH: Opcode = Opcode(0x85);
    pub const ABORT: Opcode = Opcode(0xFF);

    pub fn is_final(&self) -> bool {
        self.0 & FINAL_BIT != 0
    }

    /// The opcode with the final bit set.
    pub fn as_final(&self) -> Opcode {
        Opcode(self.0 | FINAL_BIT)
    }
}

#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd, Debug, derive_more::Display)]
#[display(fmt = "0x{:02x}", _0)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct ResponseCode(pub u8);

impl ResponseCode {
    pub const CONTINUE: ResponseCode = ResponseCode(0x90);
    pub const SUCCESS: ResponseCode = ResponseCode(0xA0);
    pub const BAD_REQUEST: ResponseCode = ResponseCode(0xC0);
    pub const UNAUTHORIZED: ResponseCode = ResponseCode(0xC1);
    pub const FORBIDDEN: ResponseCode = ResponseCode(0xC3);
    pub const NOT_FOUND: ResponseCode = ResponseCode(0xC4);
    pub const NOT_ACCEPTABLE: ResponseCode = ResponseCode(0xC6);
    pub const PRECONDITION_FAILED: ResponseCode = ResponseCode(0xCC);
    pub const INTERNAL_SERVER_ERROR: ResponseCode = ResponseCode(0xD0);
    pub const NOT_IMPLEMENTED: ResponseCode = ResponseCode(0xD1);
    pub const SERVICE_UNAVAILABLE: ResponseCode = ResponseCode(0xD3);

    /// Anything in the 0xA0 range is a success.
    pub fn is_success(&self) -> bool {
        self.0 & 0x70 == 0x20
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op.0
    }
}

impl From<ResponseCode> for u8 {
    fn from(code: ResponseCode) -> u8 {
        code.0
    }
}
