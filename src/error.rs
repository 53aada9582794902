use thiserror::Error;

use crate::request::UnsupportedMethod;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransportErrorKind {
    Dns,
    Connect,
    Tls,
    Proxy,
    Read,
    Other,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Dns => "dns",
            Self::Connect => "connect",
            Self::Tls => "tls",
            Self::Proxy => "proxy",
            Self::Read => "read",
            Self::Other => "other",
        };
        formatter.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum S3ClientErrorCode {
    InvalidUri,
    UnsupportedMethod,
    RequestBuild,
    Transport,
    Timeout,
    BodyRewind,
    NoPendingResponse,
    ReadBody,
    ResponseBodyTooLarge,
    MissingRedirectLocation,
    InvalidRedirectLocation,
    HostNotAllowed,
    InvalidHostPattern,
    TooManyRedirects,
}

impl S3ClientErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUri => "invalid_uri",
            Self::UnsupportedMethod => "unsupported_method",
            Self::RequestBuild => "request_build",
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::BodyRewind => "body_rewind",
            Self::NoPendingResponse => "no_pending_response",
            Self::ReadBody => "read_body",
            Self::ResponseBodyTooLarge => "response_body_too_large",
            Self::MissingRedirectLocation => "missing_redirect_location",
            Self::InvalidRedirectLocation => "invalid_redirect_location",
            Self::HostNotAllowed => "host_not_allowed",
            Self::InvalidHostPattern => "invalid_host_pattern",
            Self::TooManyRedirects => "too_many_redirects",
        }
    }
}

impl std::fmt::Display for S3ClientErrorCode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum S3ClientError {
    #[error("invalid request uri: {uri}")]
    InvalidUri { uri: String },
    #[error(transparent)]
    UnsupportedMethod(#[from] UnsupportedMethod),
    #[error("failed to build http request for {uri}: {source}")]
    RequestBuild {
        uri: String,
        #[source]
        source: http::Error,
    },
    #[error("http transport error ({kind}) for {method} {uri}: {source}")]
    Transport {
        kind: TransportErrorKind,
        method: &'static str,
        uri: String,
        #[source]
        source: BoxError,
    },
    #[error("http request timed out for {method} {uri}: {message}")]
    Timeout {
        method: &'static str,
        uri: String,
        message: String,
    },
    #[error("failed to rewind request body for {uri}: {source}")]
    BodyRewind {
        uri: String,
        #[source]
        source: std::io::Error,
    },
    #[error("session has no pending response for {uri}")]
    NoPendingResponse { uri: String },
    #[error("failed to read response body: {source}")]
    ReadBody {
        #[source]
        source: std::io::Error,
    },
    #[error("response body too large ({actual_bytes} bytes > {limit_bytes} bytes)")]
    ResponseBodyTooLarge {
        limit_bytes: usize,
        actual_bytes: usize,
    },
    #[error("temporary redirect from {uri} has no location header")]
    MissingRedirectLocation { uri: String },
    #[error("invalid redirect location {location} from {uri}")]
    InvalidRedirectLocation { location: String, uri: String },
    #[error("URL \"{host}\" is not allowed in configuration file")]
    HostNotAllowed { host: String },
    #[error("invalid remote host pattern {pattern}: {source}")]
    InvalidHostPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("too many redirects while trying to access {uri}")]
    TooManyRedirects { uri: String },
}

impl S3ClientError {
    pub const fn code(&self) -> S3ClientErrorCode {
        match self {
            Self::InvalidUri { .. } => S3ClientErrorCode::InvalidUri,
            Self::UnsupportedMethod(_) => S3ClientErrorCode::UnsupportedMethod,
            Self::RequestBuild { .. } => S3ClientErrorCode::RequestBuild,
            Self::Transport { .. } => S3ClientErrorCode::Transport,
            Self::Timeout { .. } => S3ClientErrorCode::Timeout,
            Self::BodyRewind { .. } => S3ClientErrorCode::BodyRewind,
            Self::NoPendingResponse { .. } => S3ClientErrorCode::NoPendingResponse,
            Self::ReadBody { .. } => S3ClientErrorCode::ReadBody,
            Self::ResponseBodyTooLarge { .. } => S3ClientErrorCode::ResponseBodyTooLarge,
            Self::MissingRedirectLocation { .. } => S3ClientErrorCode::MissingRedirectLocation,
            Self::InvalidRedirectLocation { .. } => S3ClientErrorCode::InvalidRedirectLocation,
            Self::HostNotAllowed { .. } => S3ClientErrorCode::HostNotAllowed,
            Self::InvalidHostPattern { .. } => S3ClientErrorCode::InvalidHostPattern,
            Self::TooManyRedirects { .. } => S3ClientErrorCode::TooManyRedirects,
        }
    }
}
