use url::Url;

use crate::metrics::RequestKind;
use crate::request::RequestMethod;

/// What a limiter sees at each hook point.
#[derive(Clone, Copy, Debug)]
pub struct AttemptContext<'a> {
    pub method: RequestMethod,
    pub kind: RequestKind,
    pub uri: &'a Url,
    pub attempt: u32,
}

/// Traffic shaping hook consulted by the execution loop.
///
/// The loop calls [`RateLimiter::before_send`] before each attempt writes its
/// request and [`RateLimiter::before_receive`] before it waits for the
/// response. This crate enforces no policy of its own: [`NoopRateLimiter`]
/// is what runs when the caller passes no limiter.
pub trait RateLimiter: Send + Sync {
    fn before_send(&self, _context: &AttemptContext<'_>) {}

    fn before_receive(&self, _context: &AttemptContext<'_>) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {}

/// Read and write limiter handles for one call.
#[derive(Clone, Copy, Default)]
pub struct RateLimiters<'a> {
    pub read: Option<&'a dyn RateLimiter>,
    pub write: Option<&'a dyn RateLimiter>,
}

impl<'a> RateLimiters<'a> {
    pub const fn none() -> Self {
        Self {
            read: None,
            write: None,
        }
    }

    pub(crate) fn select(&self, kind: RequestKind) -> &'a dyn RateLimiter {
        let selected = match kind {
            RequestKind::Read => self.read,
            RequestKind::Write => self.write,
        };
        selected.unwrap_or(&NoopRateLimiter)
    }
}
