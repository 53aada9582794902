use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::request::RequestMethod;

/// Which counter family a request is accounted under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Read,
    Write,
}

impl RequestKind {
    pub const fn of(method: RequestMethod) -> Self {
        match method {
            RequestMethod::Get | RequestMethod::Head => Self::Read,
            RequestMethod::Post
            | RequestMethod::Put
            | RequestMethod::Delete
            | RequestMethod::Patch => Self::Write,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Read => 0,
            Self::Write => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricEvent {
    Count,
    Microseconds,
    Errors,
    Throttling,
    Redirects,
}

impl MetricEvent {
    const COUNT: usize = 5;

    const fn index(self) -> usize {
        match self {
            Self::Count => 0,
            Self::Microseconds => 1,
            Self::Errors => 2,
            Self::Throttling => 3,
            Self::Redirects => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestKindSnapshot {
    pub count: u64,
    pub microseconds: u64,
    pub errors: u64,
    pub throttling: u64,
    pub redirects: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct S3MetricsSnapshot {
    pub read: RequestKindSnapshot,
    pub write: RequestKindSnapshot,
    pub in_flight: u64,
}

impl S3MetricsSnapshot {
    pub fn kind(&self, kind: RequestKind) -> &RequestKindSnapshot {
        match kind {
            RequestKind::Read => &self.read,
            RequestKind::Write => &self.write,
        }
    }
}

/// Shared traffic counters. Cloning yields another handle to the same
/// counters, so one sink can be handed to several clients.
#[derive(Clone, Debug, Default)]
pub struct S3Metrics {
    inner: Arc<S3MetricsInner>,
}

#[derive(Debug, Default)]
struct S3MetricsInner {
    events: [[AtomicU64; MetricEvent::COUNT]; 2],
    in_flight: AtomicU64,
}

pub(crate) struct InFlightGuard {
    inner: Arc<S3MetricsInner>,
}

impl S3Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, kind: RequestKind, event: MetricEvent) {
        self.add(kind, event, 1);
    }

    pub fn add(&self, kind: RequestKind, event: MetricEvent, amount: u64) {
        self.inner.events[kind.index()][event.index()].fetch_add(amount, Ordering::Relaxed);
    }

    pub(crate) fn enter_in_flight(&self) -> InFlightGuard {
        self.inner.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn snapshot(&self) -> S3MetricsSnapshot {
        S3MetricsSnapshot {
            read: self.kind_snapshot(RequestKind::Read),
            write: self.kind_snapshot(RequestKind::Write),
            in_flight: self.inner.in_flight.load(Ordering::Relaxed),
        }
    }

    fn kind_snapshot(&self, kind: RequestKind) -> RequestKindSnapshot {
        let load = |event: MetricEvent| {
            self.inner.events[kind.index()][event.index()].load(Ordering::Relaxed)
        };
        RequestKindSnapshot {
            count: load(MetricEvent::Count),
            microseconds: load(MetricEvent::Microseconds),
            errors: load(MetricEvent::Errors),
            throttling: load(MetricEvent::Throttling),
            redirects: load(MetricEvent::Redirects),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Outcome class of a terminal status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusClass {
    Success,
    Throttled,
    RequestError,
    ServerError,
}

pub(crate) fn classify_status(status: u16) -> StatusClass {
    match status {
        429 | 503 => StatusClass::Throttled,
        500.. => StatusClass::ServerError,
        300.. => StatusClass::RequestError,
        _ => StatusClass::Success,
    }
}
