//! `s3http` executes object-storage (S3-style) requests over blocking HTTP.
//!
//! It sits between a request signer and the network: it encodes the request
//! target the way object-storage signers canonicalize it, follows
//! `307 Temporary Redirect` responses within an allowlist, applies a
//! per-request proxy decision, and accounts every call in read/write traffic
//! counters.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use s3http::prelude::*;
//!
//! let configuration = ClientConfiguration::builder()
//!     .endpoint_override("https://s3.eu-west-1.amazonaws.com")
//!     .connect_timeout(Duration::from_secs(5))
//!     .request_timeout(Duration::from_secs(30))
//!     .max_redirects(10)
//!     .remote_host_filter(RemoteHostFilter::allow_all().allow_host_regex(r".*\.amazonaws\.com")?)
//!     .build();
//! let client = S3HttpClient::new(configuration);
//!
//! let mut request = RequestDescriptor::parse(
//!     RequestMethod::Get,
//!     "https://s3.eu-west-1.amazonaws.com/bucket/key",
//! )?;
//! let mut response = client.make_request(&mut request, RateLimiters::none());
//! if let Some(error) = response.client_error() {
//!     eprintln!("request failed: {}", error.message);
//! } else if let Some(body) = response.take_body() {
//!     let bytes = body.read_to_bytes(8 * 1024 * 1024)?;
//!     println!("{} bytes", bytes.len());
//! }
//! # Ok::<(), s3http::S3ClientError>(())
//! ```

#[cfg(all(not(feature = "tls-rustls"), not(feature = "tls-native")))]
compile_error!("s3http requires one TLS feature: enable `tls-rustls` or `tls-native`");

mod client;
mod config;
mod error;
mod host_filter;
mod metrics;
mod proxy;
mod rate_limit;
mod request;
mod response;
mod session;
mod transport;
mod util;

pub use crate::client::S3HttpClient;
pub use crate::config::{
    AWS_GLOBAL_REGION, ClientConfiguration, ClientConfigurationBuilder, ConnectionTimeouts,
    DirectConfigurator, ErrorReporter, RequestConfiguration, RequestConfigurator, Scheme,
    region_from_host,
};
pub use crate::error::{S3ClientError, S3ClientErrorCode, TransportErrorKind};
pub use crate::host_filter::RemoteHostFilter;
pub use crate::metrics::{
    MetricEvent, RequestKind, RequestKindSnapshot, S3Metrics, S3MetricsSnapshot,
};
pub use crate::proxy::{ProxySettings, requires_tunnel};
pub use crate::rate_limit::{AttemptContext, NoopRateLimiter, RateLimiter, RateLimiters};
pub use crate::request::{RequestBody, RequestDescriptor, RequestMethod, UnsupportedMethod};
pub use crate::response::{ClientError, ClientErrorKind, ResponseBody, ResponseDescriptor};
pub use crate::session::{ResponseHead, Session, SessionProvider, WireRequest};
pub use crate::transport::UreqSessionProvider;
pub use crate::util::{
    encode_escaped_path_and_query, encode_path_and_query, encode_uri_path_and_query,
};

pub type S3Result<T> = std::result::Result<T, S3ClientError>;

pub mod prelude {
    pub use crate::{
        ClientConfiguration, ClientError, ClientErrorKind, RateLimiters, RemoteHostFilter,
        RequestConfiguration, RequestDescriptor, RequestMethod, ResponseDescriptor,
        S3ClientError, S3ClientErrorCode, S3HttpClient, S3Metrics, S3Result, Scheme,
    };
}
