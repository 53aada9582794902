use std::io::Read;

use http::{HeaderMap, StatusCode};
use url::Url;

use crate::config::ConnectionTimeouts;
use crate::error::S3ClientError;
use crate::proxy::ProxySettings;
use crate::request::RequestMethod;

/// The request line and headers as they go on the wire.
#[derive(Clone, Debug)]
pub struct WireRequest<'a> {
    pub method: RequestMethod,
    /// Target the session was acquired for.
    pub uri: &'a Url,
    /// Already-encoded request target, e.g. `/bucket/a%20b?uploads`.
    pub path_and_query: &'a str,
    pub headers: &'a HeaderMap,
}

#[derive(Clone, Debug)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub reason: Option<String>,
    pub headers: HeaderMap,
}

impl ResponseHead {
    pub fn new(status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            status,
            reason: None,
            headers,
        }
    }

    pub fn reason(&self) -> &str {
        self.reason
            .as_deref()
            .or_else(|| self.status.canonical_reason())
            .unwrap_or("")
    }
}

/// One connection to one origin, used for exactly one request/response.
pub trait Session: Send + Sync {
    fn set_proxy(&mut self, proxy: ProxySettings);

    /// Writes the request line, headers and the whole body, if any.
    fn send_request(
        &mut self,
        request: &WireRequest<'_>,
        body: Option<&mut dyn Read>,
    ) -> Result<(), S3ClientError>;

    /// Reads the status line and headers of the response to the last request.
    fn receive_response(&mut self) -> Result<ResponseHead, S3ClientError>;

    /// Hands out the response body stream. Returns `None` once taken.
    fn take_body(&mut self) -> Option<Box<dyn Read + Send>>;
}

pub trait SessionProvider: Send + Sync {
    /// `resolve_host == false` asks the transport to keep the host name as
    /// given, so a reverse proxy sees the same `Host` the request was signed
    /// with.
    fn acquire_session(
        &self,
        uri: &Url,
        timeouts: &ConnectionTimeouts,
        resolve_host: bool,
    ) -> Result<Box<dyn Session>, S3ClientError>;
}
