//! The decoded headers of one packet, in wire order.
use crate::app_parameters::AppParameters;
use crate::header::Header;
use crate::header_id::HeaderId;

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct HeaderSet<'a> {
    headers: Vec<Header<'a>>,
}

/// Trim the trailing nulls text headers are sent with.
fn strip_nuls<T: PartialEq + Default>(mut units: &[T]) -> &[T] {
    while let Some((last, rest)) = units.split_last() {
        if *last != T::default() {
            break;
        }
        units = rest;
    }
    units
}

impl<'a> HeaderSet<'a> {
    pub fn new() -> HeaderSet<'a> {
        Default::default()
    }

    pub fn add_header(&mut self, header: Header<'a>) {
        self.headers.push(header);
    }

    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header<'a>> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// The first header with the given id.
    pub fn get(&self, id: HeaderId) -> Option<&Header<'a>> {
        self.headers.iter().find(|h| h.id == id)
    }

    pub fn has(&self, id: HeaderId) -> bool {
        self.get(id).is_some()
    }

    /// Detach every header from the buffer it was parsed out of.
    pub fn into_static(self) -> HeaderSet<'static> {
        HeaderSet {
            headers: self.headers.iter().map(Header::clone_static).collect(),
        }
    }

    fn get_data(&self, id: HeaderId) -> Option<&[u8]> {
        self.get(id).map(|h| h.data.as_ref())
    }

    /// The `Name` header decoded from UTF-16BE.
    ///
    /// `None` if there is no name or it isn't valid UTF-16.  An empty `Name` header gives an empty string.
    pub fn name(&self) -> Option<String> {
        let data = self.get_data(HeaderId::NAME)?;
        if data.len() % 2 != 0 {
            return None;
        }

        let units = data
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect::<Vec<_>>();
        String::from_utf16(strip_nuls(&units)).ok()
    }

    /// The `Type` header, a null-terminated MIME type.
    pub fn content_type(&self) -> Option<String> {
        let data = self.get_data(HeaderId::TYPE)?;
        std::str::from_utf8(strip_nuls(data)).ok().map(str::to_owned)
    }

    /// The `Length` header: the size of the whole object being transferred.
    pub fn content_length(&self) -> Option<u32> {
        self.get(HeaderId::LENGTH).and_then(Header::as_u32)
    }

    pub fn connection_id(&self) -> Option<u32> {
        self.get(HeaderId::CONNECTION_ID).and_then(Header::as_u32)
    }

    /// Content of the `Body` header, or of `EndOfBody` if this packet closes the object.
    pub fn body(&self) -> Option<&[u8]> {
        self.get_data(HeaderId::BODY)
            .or_else(|| self.get_data(HeaderId::END_OF_BODY))
    }

    /// Whether this packet carries the last chunk of the object.
    pub fn is_final_body(&self) -> bool {
        self.has(HeaderId::END_OF_BODY)
    }

    pub fn target(&self) -> Option<&[u8]> {
        self.get_data(HeaderId::TARGET)
    }

    pub fn who(&self) -> Option<&[u8]> {
        self.get_data(HeaderId::WHO)
    }

    pub fn single_response_mode(&self) -> Option<bool> {
        self.get(HeaderId::SINGLE_RESPONSE_MODE)
            .and_then(Header::as_u8)
            .map(|v| v == 0x01)
    }

    /// Look up one entry in the `AppParameters` header.
    pub fn app_parameter(&self, tag: u8) -> Option<&[u8]> {
        AppParameters::find(self.get_data(HeaderId::APP_PARAMETERS)?, tag)
    }
}

impl<'a, 'b> IntoIterator for &'b HeaderSet<'a> {
    type Item = &'b Header<'a>;
    type IntoIter = std::slice::Iter<'b, Header<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}
