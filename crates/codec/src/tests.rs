//! Tests which aren't associated with a single component.
use std::borrow::Cow;

use proptest::prelude::*;

use crate::*;

/// One header to push through the encoders, so that a list of them approximates a packet body.
#[derive(Clone, Debug, proptest_derive::Arbitrary)]
enum TestHeader {
    Name(String),
    Body(Vec<u8>),
    EndOfBody(Vec<u8>),
    EmptyEndOfBody,
    Target(Vec<u8>),
    Who(Vec<u8>),
    AuthResponse(Vec<u8>),
    Type(Vec<u8>),
    AppParameters(Vec<u8>),
    Length(u32),
    ConnectionId(u32),
    Srm(bool),
}

impl TestHeader {
    /// The header we expect to parse back out.
    fn expected(&self) -> Header<'static> {
        let (id, data) = match self {
            TestHeader::Name(n) => (HeaderId::NAME, encode_name(n)),
            TestHeader::Body(d) => (HeaderId::BODY, d.clone()),
            TestHeader::EndOfBody(d) => (HeaderId::END_OF_BODY, d.clone()),
            TestHeader::EmptyEndOfBody => (HeaderId::END_OF_BODY, vec![]),
            TestHeader::Target(d) => (HeaderId::TARGET, d.clone()),
            TestHeader::Who(d) => (HeaderId::WHO, d.clone()),
            TestHeader::AuthResponse(d) => (HeaderId::AUTH_RESPONSE, d.clone()),
            TestHeader::Type(d) => (HeaderId::TYPE, d.clone()),
            TestHeader::AppParameters(d) => (HeaderId::APP_PARAMETERS, d.clone()),
            TestHeader::Length(v) => (HeaderId::LENGTH, v.to_be_bytes().to_vec()),
            TestHeader::ConnectionId(v) => (HeaderId::CONNECTION_ID, v.to_be_bytes().to_vec()),
            TestHeader::Srm(b) => (HeaderId::SINGLE_RESPONSE_MODE, vec![*b as u8]),
        };
        Header::new(id, Cow::Owned(data))
    }

    /// Encode into the front of `dest`, which must be large enough.
    fn encode(&self, dest: &mut [u8]) -> usize {
        match self {
            TestHeader::Name(n) => append_header_name(dest, &encode_name(n)),
            TestHeader::Body(d) => append_header_body(dest, d),
            TestHeader::EndOfBody(d) => append_header_end_of_body(dest, d),
            TestHeader::EmptyEndOfBody => append_header_empty_end_of_body(dest),
            TestHeader::Target(d) => append_header_target(dest, d),
            TestHeader::Who(d) => append_header_who(dest, d),
            TestHeader::AuthResponse(d) => append_auth_response(dest, d),
            TestHeader::Type(d) => append_header_type(dest, d),
            TestHeader::AppParameters(d) => append_header_app_parameters(dest, d),
            TestHeader::Length(v) => append_header_length(dest, *v),
            TestHeader::ConnectionId(v) => append_header_connection_id(dest, *v),
            TestHeader::Srm(b) => append_header_srm(dest, *b),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10000))]
    #[test]
    fn fuzz_roundtrip(headers: Vec<TestHeader>) {
        let expected = headers.iter().map(TestHeader::expected).collect::<Vec<_>>();
        let size = expected.iter().map(|h| encoded_len(h.id, h.len())).sum::<usize>();

        let mut buf = vec![0u8; size];
        let mut offset = 0;
        for h in headers.iter() {
            offset += h.encode(&mut buf[offset..]);
        }
        prop_assert_eq!(offset, size);

        let mut set = HeaderSet::new();
        parse_headers(&buf, &mut set).expect("Should parse");
        let parsed = set.iter().map(Header::clone_static).collect::<Vec<_>>();
        prop_assert_eq!(expected, parsed);
    }

    /// Chopping the encoded bytes anywhere except a header boundary must fail, and fail cleanly.
    #[test]
    fn fuzz_truncated_input(headers: Vec<TestHeader>, cut: prop::sample::Index) {
        let expected = headers.iter().map(TestHeader::expected).collect::<Vec<_>>();
        let mut boundaries = vec![0];
        let mut buf = vec![];
        for h in expected.iter() {
            let start = buf.len();
            buf.resize(start + encoded_len(h.id, h.len()), 0);
            let wrote = headers[boundaries.len() - 1].encode(&mut buf[start..]);
            prop_assert_eq!(start + wrote, buf.len());
            boundaries.push(buf.len());
        }
        prop_assume!(!buf.is_empty());

        let cut = cut.index(buf.len());
        let mut set = HeaderSet::new();
        let res = parse_headers(&buf[..cut], &mut set);
        if boundaries.contains(&cut) {
            prop_assert!(res.is_ok());
            prop_assert_eq!(set.len(), boundaries.iter().position(|b| *b == cut).unwrap_or(0));
        } else {
            prop_assert!(res.is_err());
            prop_assert!(set.is_empty());
        }
    }
}
