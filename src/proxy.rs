use url::Url;

use crate::config::{RequestConfiguration, Scheme};

/// Proxy instructions handed to a session before it sends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
    pub scheme: Scheme,
    /// Ask the proxy for a CONNECT tunnel instead of letting it terminate TLS.
    pub use_tunnel: bool,
}

impl ProxySettings {
    /// Proxy settings for one attempt, or `None` when the attempt goes direct.
    pub fn for_attempt(configuration: &RequestConfiguration, target: &Url) -> Option<Self> {
        if !configuration.has_proxy() {
            return None;
        }
        Some(Self {
            host: configuration.proxy_host.clone(),
            port: configuration.proxy_port,
            scheme: configuration.proxy_scheme,
            use_tunnel: requires_tunnel(configuration.proxy_scheme, target),
        })
    }

    pub fn uri(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("{}://[{}]:{}", self.scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

/// A plaintext proxy in front of an encrypted target must tunnel.
pub fn requires_tunnel(proxy_scheme: Scheme, target: &Url) -> bool {
    proxy_scheme == Scheme::Http && target.scheme() == "https"
}
