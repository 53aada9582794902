use std::sync::Arc;

use crate::config::{ClientConfiguration, ConnectionTimeouts};
use crate::metrics::{S3Metrics, S3MetricsSnapshot};
use crate::session::SessionProvider;
use crate::transport::UreqSessionProvider;

mod execute;

/// Executes object-storage requests against a remote store.
///
/// Requests follow `307 Temporary Redirect` responses up to the configured
/// limit, go through the per-request proxy decision, and are accounted in the
/// shared [`S3Metrics`]. Failures never escape as `Err`: they are recorded on
/// the returned [`crate::ResponseDescriptor`].
pub struct S3HttpClient {
    configuration: ClientConfiguration,
    timeouts: ConnectionTimeouts,
    session_provider: Arc<dyn SessionProvider>,
    metrics: S3Metrics,
}

impl S3HttpClient {
    pub fn new(configuration: ClientConfiguration) -> Self {
        Self::with_session_provider(configuration, UreqSessionProvider::new())
    }

    pub fn with_session_provider(
        configuration: ClientConfiguration,
        session_provider: impl SessionProvider + 'static,
    ) -> Self {
        let timeouts = configuration.timeouts();
        Self {
            configuration,
            timeouts,
            session_provider: Arc::new(session_provider),
            metrics: S3Metrics::new(),
        }
    }

    /// Accounts traffic into an existing sink instead of a private one.
    pub fn metrics(mut self, metrics: S3Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics_handle(&self) -> &S3Metrics {
        &self.metrics
    }

    pub fn metrics_snapshot(&self) -> S3MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn configuration(&self) -> &ClientConfiguration {
        &self.configuration
    }
}

impl std::fmt::Debug for S3HttpClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("S3HttpClient")
            .field("configuration", &self.configuration)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}
