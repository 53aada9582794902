use std::io::{Read, Seek};

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use thiserror::Error;
use url::Url;

use crate::error::S3ClientError;
use crate::util::{encode_escaped_path_and_query, raw_path};

/// Methods an object-storage request may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
}

impl RequestMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
        }
    }

    pub fn to_http(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
            Self::Head => Method::HEAD,
            Self::Patch => Method::PATCH,
        }
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Raised when a generic HTTP method has no object-storage counterpart.
///
/// This is a caller defect: the storage layer only ever issues the six
/// methods of [`RequestMethod`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unsupported request method: {method}")]
pub struct UnsupportedMethod {
    pub method: String,
}

impl TryFrom<&Method> for RequestMethod {
    type Error = UnsupportedMethod;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match *method {
            Method::GET => Ok(Self::Get),
            Method::POST => Ok(Self::Post),
            Method::PUT => Ok(Self::Put),
            Method::DELETE => Ok(Self::Delete),
            Method::HEAD => Ok(Self::Head),
            Method::PATCH => Ok(Self::Patch),
            _ => Err(UnsupportedMethod {
                method: method.as_str().to_owned(),
            }),
        }
    }
}

impl TryFrom<Method> for RequestMethod {
    type Error = UnsupportedMethod;

    fn try_from(method: Method) -> Result<Self, Self::Error> {
        Self::try_from(&method)
    }
}

/// A seekable request payload.
///
/// The stream position at the time the request is submitted is the logical
/// start of the payload; retried attempts rewind to it.
pub trait RequestBody: Read + Seek + Send {}

impl<T> RequestBody for T where T: Read + Seek + Send {}

pub struct RequestDescriptor {
    method: RequestMethod,
    uri: Url,
    /// Path as the caller or the redirect wrote it. `uri` has had its dot
    /// segments removed and must not be used for the request line.
    raw_path: String,
    headers: HeaderMap,
    body: Option<Box<dyn RequestBody>>,
}

impl RequestDescriptor {
    pub fn new(method: RequestMethod, uri: Url) -> Self {
        let raw_path = uri.path().to_owned();
        Self {
            method,
            uri,
            raw_path,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Parses `uri`, keeping its path byte-for-byte so keys such as
    /// `a/../b` reach the store unchanged.
    pub fn parse(method: RequestMethod, uri: &str) -> Result<Self, S3ClientError> {
        let parsed = Url::parse(uri).map_err(|_| S3ClientError::InvalidUri {
            uri: uri.to_owned(),
        })?;
        let mut request = Self::new(method, parsed);
        if let Some(path) = raw_path(uri) {
            request.raw_path = path.to_owned();
        }
        Ok(request)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl RequestBody + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    /// The encoded request target sent on the request line.
    pub fn path_and_query(&self) -> String {
        encode_escaped_path_and_query(&self.raw_path, self.uri.query())
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub(crate) fn set_target(&mut self, uri: Url, raw_path: String) {
        self.uri = uri;
        self.raw_path = raw_path;
    }

    pub(crate) fn body_mut(&mut self) -> Option<&mut (dyn RequestBody + 'static)> {
        self.body.as_deref_mut()
    }

    /// Headers and body borrowed together for writing one attempt.
    pub(crate) fn wire_parts(
        &mut self,
    ) -> (&HeaderMap, Option<&mut (dyn RequestBody + 'static)>) {
        (&self.headers, self.body.as_deref_mut())
    }
}

impl std::fmt::Debug for RequestDescriptor {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RequestDescriptor")
            .field("method", &self.method)
            .field("uri", &self.uri.as_str())
            .field("raw_path", &self.raw_path)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}
