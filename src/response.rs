use std::io::Read;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

use crate::S3Result;
use crate::error::{S3ClientError, S3ClientErrorCode};
use crate::session::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ClientErrorKind {
    NetworkConnection,
}

impl ClientErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NetworkConnection => "network_connection",
        }
    }
}

/// Failure recorded on a response when no usable reply was obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub code: S3ClientErrorCode,
    pub message: String,
}

impl ClientError {
    pub(crate) fn network(error: &S3ClientError) -> Self {
        Self {
            kind: ClientErrorKind::NetworkConnection,
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Response body stream. Keeps the producing session alive until dropped.
pub struct ResponseBody {
    reader: Box<dyn Read + Send>,
    session: Arc<dyn Session>,
}

impl ResponseBody {
    pub(crate) fn new(reader: Box<dyn Read + Send>, session: Arc<dyn Session>) -> Self {
        Self { reader, session }
    }

    pub fn session(&self) -> Arc<dyn Session> {
        Arc::clone(&self.session)
    }

    pub fn read_to_bytes(mut self, limit_bytes: usize) -> S3Result<Bytes> {
        let mut collected = Vec::new();
        let mut chunk = [0_u8; 8192];
        loop {
            let read = self
                .reader
                .read(&mut chunk)
                .map_err(|source| S3ClientError::ReadBody { source })?;
            if read == 0 {
                break;
            }
            let actual_bytes = collected.len().saturating_add(read);
            if actual_bytes > limit_bytes {
                return Err(S3ClientError::ResponseBodyTooLarge {
                    limit_bytes,
                    actual_bytes,
                });
            }
            collected.extend_from_slice(&chunk[..read]);
        }
        Ok(Bytes::from(collected))
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buffer: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buffer)
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ResponseBody")
            .field("session_refs", &Arc::strong_count(&self.session))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct ResponseDescriptor {
    status: Option<StatusCode>,
    content_type: String,
    headers: HeaderMap,
    body: Option<ResponseBody>,
    client_error: Option<ClientError>,
}

impl ResponseDescriptor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Status of the terminal response; `None` when the call failed before
    /// one arrived.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn client_error(&self) -> Option<&ClientError> {
        self.client_error.as_ref()
    }

    pub fn has_client_error(&self) -> bool {
        self.client_error.is_some()
    }

    pub fn body_mut(&mut self) -> Option<&mut ResponseBody> {
        self.body.as_mut()
    }

    pub fn take_body(&mut self) -> Option<ResponseBody> {
        self.body.take()
    }

    pub(crate) fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub(crate) fn set_content_type(&mut self, content_type: String) {
        self.content_type = content_type;
    }

    pub(crate) fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub(crate) fn set_body(&mut self, body: ResponseBody) {
        self.body = Some(body);
    }

    pub(crate) fn set_client_error(&mut self, error: ClientError) {
        self.client_error = Some(error);
    }
}
