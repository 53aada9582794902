use std::io::Read;
use std::sync::Mutex;

use tracing::debug;
use url::{Position, Url};

use crate::config::ConnectionTimeouts;
use crate::error::{S3ClientError, TransportErrorKind};
use crate::proxy::ProxySettings;
use crate::request::RequestMethod;
use crate::session::{ResponseHead, Session, SessionProvider, WireRequest};
use crate::util::redact_uri_for_logs;

const DEFAULT_USER_AGENT: &str = "s3http";

const fn tls_provider() -> ureq::tls::TlsProvider {
    #[cfg(feature = "tls-rustls")]
    {
        return ureq::tls::TlsProvider::Rustls;
    }
    #[cfg(all(not(feature = "tls-rustls"), feature = "tls-native"))]
    {
        return ureq::tls::TlsProvider::NativeTls;
    }
    #[allow(unreachable_code)]
    ureq::tls::TlsProvider::Rustls
}

/// Opens sessions on top of a blocking `ureq` agent.
///
/// Transport limits of this provider:
///
/// - `ureq` runs the whole exchange inside [`Session::send_request`]. When
///   [`Session::receive_response`] is called the response head has already
///   arrived, so a limiter's `before_receive` hook and the "receiving
///   response" trace run after the wait, not before it.
/// - `resolve_host == false` is only logged. `ureq` resolves the host itself
///   when it connects.
/// - [`ProxySettings::use_tunnel`] is not passed through. `ureq` decides on
///   its own and uses `CONNECT` for every https target behind a proxy, which
///   agrees with the flag for `http://` proxies.
///
/// Implement [`SessionProvider`] directly when any of these matter.
#[derive(Clone, Debug)]
pub struct UreqSessionProvider {
    user_agent: String,
}

impl UreqSessionProvider {
    pub fn new() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for UreqSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for UreqSessionProvider {
    fn acquire_session(
        &self,
        uri: &Url,
        timeouts: &ConnectionTimeouts,
        resolve_host: bool,
    ) -> Result<Box<dyn Session>, S3ClientError> {
        if uri.host_str().is_none() || !matches!(uri.scheme(), "http" | "https") {
            return Err(S3ClientError::InvalidUri {
                uri: uri.to_string(),
            });
        }
        if !resolve_host {
            debug!(
                uri = %redact_uri_for_logs(uri),
                "session keeps the unresolved host name for proxying"
            );
        }
        Ok(Box::new(UreqSession {
            origin: uri[..Position::BeforePath].to_owned(),
            timeouts: *timeouts,
            user_agent: self.user_agent.clone(),
            proxy: None,
            head: None,
            body: Mutex::new(None),
        }))
    }
}

struct UreqSession {
    origin: String,
    timeouts: ConnectionTimeouts,
    user_agent: String,
    proxy: Option<ProxySettings>,
    head: Option<ResponseHead>,
    body: Mutex<Option<ureq::Body>>,
}

impl UreqSession {
    fn make_agent(&self) -> Result<ureq::Agent, S3ClientError> {
        let proxy = match &self.proxy {
            Some(settings) => {
                let proxy_uri = settings.uri();
                let proxy = ureq::Proxy::new(&proxy_uri)
                    .map_err(|_| S3ClientError::InvalidUri { uri: proxy_uri })?;
                Some(proxy)
            }
            None => None,
        };
        let tls_config = ureq::tls::TlsConfig::builder()
            .provider(tls_provider())
            .build();
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .user_agent(self.user_agent.as_str())
            .timeout_connect(Some(self.timeouts.connect))
            .timeout_send_request(Some(self.timeouts.send))
            .timeout_send_body(Some(self.timeouts.send))
            .timeout_recv_response(Some(self.timeouts.receive))
            .timeout_recv_body(Some(self.timeouts.receive))
            .tls_config(tls_config)
            .proxy(proxy)
            .build();
        Ok(config.new_agent())
    }

    fn map_error(&self, method: RequestMethod, uri: &str, error: ureq::Error) -> S3ClientError {
        match error {
            ureq::Error::Timeout(timeout) => S3ClientError::Timeout {
                method: method.as_str(),
                uri: uri.to_owned(),
                message: format!("{timeout:?} phase elapsed"),
            },
            other => S3ClientError::Transport {
                kind: classify_ureq_transport_error(&other),
                method: method.as_str(),
                uri: uri.to_owned(),
                source: Box::new(other),
            },
        }
    }

    fn body_slot(&mut self) -> &mut Option<ureq::Body> {
        match self.body.get_mut() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Session for UreqSession {
    fn set_proxy(&mut self, proxy: ProxySettings) {
        debug!(
            proxy_host = %proxy.host,
            proxy_port = proxy.port,
            proxy_scheme = %proxy.scheme,
            use_tunnel = proxy.use_tunnel,
            "session configured with proxy"
        );
        self.proxy = Some(proxy);
    }

    fn send_request(
        &mut self,
        request: &WireRequest<'_>,
        body: Option<&mut dyn Read>,
    ) -> Result<(), S3ClientError> {
        let target = format!("{}{}", self.origin, request.path_and_query);
        let mut builder = ureq::http::Request::builder()
            .method(request.method.to_http())
            .uri(target.as_str());
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        let agent = self.make_agent()?;
        let response = match body {
            Some(body) => {
                let wire = builder
                    .body(ureq::SendBody::from_reader(body))
                    .map_err(|source| S3ClientError::RequestBuild {
                        uri: target.clone(),
                        source,
                    })?;
                agent.run(wire)
            }
            None => {
                let wire = builder
                    .body(Vec::new())
                    .map_err(|source| S3ClientError::RequestBuild {
                        uri: target.clone(),
                        source,
                    })?;
                agent.run(wire)
            }
        }
        .map_err(|error| self.map_error(request.method, &target, error))?;

        let (parts, body) = response.into_parts();
        self.head = Some(ResponseHead::new(parts.status, parts.headers));
        *self.body_slot() = Some(body);
        Ok(())
    }

    fn receive_response(&mut self) -> Result<ResponseHead, S3ClientError> {
        self.head
            .take()
            .ok_or_else(|| S3ClientError::NoPendingResponse {
                uri: self.origin.clone(),
            })
    }

    fn take_body(&mut self) -> Option<Box<dyn Read + Send>> {
        let body = self.body_slot().take()?;
        Some(Box::new(body.into_reader()))
    }
}

pub(crate) fn classify_ureq_transport_error(error: &ureq::Error) -> TransportErrorKind {
    match error {
        ureq::Error::HostNotFound => TransportErrorKind::Dns,
        ureq::Error::Tls(_) => TransportErrorKind::Tls,
        #[cfg(feature = "tls-rustls")]
        ureq::Error::Rustls(_) => TransportErrorKind::Tls,
        #[cfg(feature = "tls-native")]
        ureq::Error::NativeTls(_) => TransportErrorKind::Tls,
        ureq::Error::ConnectProxyFailed(_) => TransportErrorKind::Proxy,
        ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
        ureq::Error::Io(source) => match source.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                TransportErrorKind::Read
            }
            std::io::ErrorKind::NotFound => TransportErrorKind::Dns,
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected
            | std::io::ErrorKind::AddrNotAvailable => TransportErrorKind::Connect,
            std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof => TransportErrorKind::Read,
            _ => TransportErrorKind::Other,
        },
        _ => TransportErrorKind::Other,
    }
}
