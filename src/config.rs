use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::host_filter::RemoteHostFilter;
use crate::request::RequestDescriptor;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Region advertised when an endpoint override names no region. The service
/// answers with a redirect to the bucket's concrete region.
pub const AWS_GLOBAL_REGION: &str = "aws-global";

static REGION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^s3[.\-]([a-z0-9\-]+)\.amazonaws\.").expect("region pattern is valid")
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    pub fn parse(scheme: &str) -> Option<Self> {
        if scheme.eq_ignore_ascii_case("http") {
            Some(Self::Http)
        } else if scheme.eq_ignore_ascii_case("https") {
            Some(Self::Https)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Session timeouts: connection establishment, then send and receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionTimeouts {
    pub connect: Duration,
    pub send: Duration,
    pub receive: Duration,
}

impl ConnectionTimeouts {
    pub const fn new(connect: Duration, request: Duration) -> Self {
        Self {
            connect,
            send: request,
            receive: request,
        }
    }
}

/// Per-request overrides, recomputed on every attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestConfiguration {
    pub proxy_host: String,
    pub proxy_port: u16,
    pub proxy_scheme: Scheme,
}

impl RequestConfiguration {
    pub fn proxy(host: impl Into<String>, port: u16, scheme: Scheme) -> Self {
        Self {
            proxy_host: host.into(),
            proxy_port: port,
            proxy_scheme: scheme,
        }
    }

    pub fn has_proxy(&self) -> bool {
        !self.proxy_host.is_empty()
    }
}

pub trait RequestConfigurator: Send + Sync {
    fn configure(&self, request: &RequestDescriptor) -> RequestConfiguration;
}

impl<F> RequestConfigurator for F
where
    F: Fn(&RequestDescriptor) -> RequestConfiguration + Send + Sync,
{
    fn configure(&self, request: &RequestDescriptor) -> RequestConfiguration {
        self(request)
    }
}

#[derive(Debug, Default)]
pub struct DirectConfigurator;

impl RequestConfigurator for DirectConfigurator {
    fn configure(&self, _request: &RequestDescriptor) -> RequestConfiguration {
        RequestConfiguration::default()
    }
}

/// Notified when a terminal response carries a server error status.
/// Implementations must return promptly and must not panic.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, configuration: &RequestConfiguration);
}

impl<F> ErrorReporter for F
where
    F: Fn(&RequestConfiguration) + Send + Sync,
{
    fn report(&self, configuration: &RequestConfiguration) {
        self(configuration)
    }
}

#[derive(Clone)]
pub struct ClientConfiguration {
    pub(crate) connect_timeout: Duration,
    pub(crate) request_timeout: Duration,
    pub(crate) max_redirects: u32,
    pub(crate) enable_requests_logging: bool,
    pub(crate) remote_host_filter: RemoteHostFilter,
    pub(crate) force_region: Option<String>,
    pub(crate) endpoint_override: Option<String>,
    pub(crate) scheme: Scheme,
    pub(crate) region: Option<String>,
    pub(crate) per_request_configuration: Arc<dyn RequestConfigurator>,
    pub(crate) error_report: Option<Arc<dyn ErrorReporter>>,
}

impl ClientConfiguration {
    pub fn builder() -> ClientConfigurationBuilder {
        ClientConfigurationBuilder::new()
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn timeouts(&self) -> ConnectionTimeouts {
        ConnectionTimeouts::new(self.connect_timeout, self.request_timeout)
    }

    pub fn max_redirects(&self) -> u32 {
        self.max_redirects
    }

    pub fn requests_logging_enabled(&self) -> bool {
        self.enable_requests_logging
    }

    pub fn remote_host_filter(&self) -> &RemoteHostFilter {
        &self.remote_host_filter
    }

    pub fn force_region(&self) -> Option<&str> {
        self.force_region.as_deref()
    }

    pub fn endpoint_override(&self) -> Option<&str> {
        self.endpoint_override.as_deref()
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    fn update_scheme_and_region(&mut self) {
        let Some(endpoint) = self.endpoint_override.as_deref() else {
            self.region.clone_from(&self.force_region);
            return;
        };

        let parsed = Url::parse(endpoint).ok();
        if parsed.as_ref().and_then(|uri| Scheme::parse(uri.scheme())) == Some(Scheme::Http) {
            self.scheme = Scheme::Http;
        }

        self.region = Some(match &self.force_region {
            Some(region) => region.clone(),
            None => parsed
                .as_ref()
                .and_then(Url::host_str)
                .and_then(region_from_host)
                .unwrap_or_else(|| AWS_GLOBAL_REGION.to_owned()),
        });
    }
}

impl std::fmt::Debug for ClientConfiguration {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ClientConfiguration")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("max_redirects", &self.max_redirects)
            .field("enable_requests_logging", &self.enable_requests_logging)
            .field("remote_host_filter", &self.remote_host_filter)
            .field("force_region", &self.force_region)
            .field("endpoint_override", &self.endpoint_override)
            .field("scheme", &self.scheme)
            .field("region", &self.region)
            .field("error_report", &self.error_report.is_some())
            .finish_non_exhaustive()
    }
}

/// Extracts the region from hosts like `s3.eu-west-1.amazonaws.com` or
/// `s3-us-west-2.amazonaws.com`.
pub fn region_from_host(host: &str) -> Option<String> {
    REGION_PATTERN
        .captures(host)
        .and_then(|captures| captures.get(1))
        .map(|region| region.as_str().to_ascii_lowercase())
}

pub struct ClientConfigurationBuilder {
    connect_timeout: Duration,
    request_timeout: Duration,
    max_redirects: u32,
    enable_requests_logging: bool,
    remote_host_filter: RemoteHostFilter,
    force_region: Option<String>,
    endpoint_override: Option<String>,
    scheme: Scheme,
    per_request_configuration: Arc<dyn RequestConfigurator>,
    error_report: Option<Arc<dyn ErrorReporter>>,
}

impl ClientConfigurationBuilder {
    fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            enable_requests_logging: false,
            remote_host_filter: RemoteHostFilter::allow_all(),
            force_region: None,
            endpoint_override: None,
            scheme: Scheme::Https,
            per_request_configuration: Arc::new(DirectConfigurator),
            error_report: None,
        }
    }

    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn enable_requests_logging(mut self, enabled: bool) -> Self {
        self.enable_requests_logging = enabled;
        self
    }

    pub fn remote_host_filter(mut self, remote_host_filter: RemoteHostFilter) -> Self {
        self.remote_host_filter = remote_host_filter;
        self
    }

    pub fn force_region(mut self, region: impl Into<String>) -> Self {
        let region = region.into();
        self.force_region = (!region.is_empty()).then_some(region);
        self
    }

    pub fn endpoint_override(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.endpoint_override = (!endpoint.is_empty()).then_some(endpoint);
        self
    }

    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn per_request_configuration(
        mut self,
        configurator: impl RequestConfigurator + 'static,
    ) -> Self {
        self.per_request_configuration = Arc::new(configurator);
        self
    }

    pub fn error_report(mut self, reporter: impl ErrorReporter + 'static) -> Self {
        self.error_report = Some(Arc::new(reporter));
        self
    }

    pub fn build(self) -> ClientConfiguration {
        let mut configuration = ClientConfiguration {
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
            max_redirects: self.max_redirects,
            enable_requests_logging: self.enable_requests_logging,
            remote_host_filter: self.remote_host_filter,
            force_region: self.force_region,
            endpoint_override: self.endpoint_override,
            scheme: self.scheme,
            region: None,
            per_request_configuration: self.per_request_configuration,
            error_report: self.error_report,
        };
        configuration.update_scheme_and_region();
        configuration
    }
}

impl Default for ClientConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
