//! Response data produced by handlers.

use axum::body::Bytes;

use crate::http::headers::HeaderSet;
use crate::http::status::Status;

/// Character sets a string body can be encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Utf16Be,
    Utf16Le,
    /// Characters outside Latin-1 are replaced with `?`.
    Iso8859_1,
}

impl Charset {
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            Charset::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Charset::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Charset::Iso8859_1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }
}

/// HTTP response data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    headers: HeaderSet,
    body: Bytes,
    status: u16,
}

impl Response {
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// The body as raw bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn status(&self) -> u16 {
        self.status
    }
}

/// Builder for [`Response`].
///
/// Defaults to no headers, an empty body and status 0. Nothing is validated.
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    headers: HeaderSet,
    body: Bytes,
    status: u16,
}

impl ResponseBuilder {
    pub fn headers(mut self, headers: HeaderSet) -> Self {
        self.headers = headers;
        self
    }

    /// Set the body to the given raw bytes.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the body to `text` encoded as UTF-8.
    pub fn text(self, text: impl AsRef<str>) -> Self {
        self.text_with_charset(text, Charset::Utf8)
    }

    pub fn text_with_charset(mut self, text: impl AsRef<str>, charset: Charset) -> Self {
        self.body = Bytes::from(charset.encode(text.as_ref()));
        self
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.status = code;
        self
    }

    pub fn status(self, status: Status) -> Self {
        self.status_code(status.code())
    }

    pub fn build(self) -> Response {
        Response {
            headers: self.headers,
            body: self.body,
            status: self.status,
        }
    }
}
