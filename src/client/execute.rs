use std::fmt::Write as _;
use std::io::SeekFrom;
use std::sync::Arc;
use std::time::Instant;

use http::header::LOCATION;
use http::{HeaderMap, StatusCode};
use tracing::{trace, warn};
use url::Url;

use crate::S3Result;
use crate::config::RequestConfiguration;
use crate::error::S3ClientError;
use crate::metrics::{MetricEvent, RequestKind, StatusClass, classify_status};
use crate::proxy::ProxySettings;
use crate::rate_limit::{AttemptContext, RateLimiter, RateLimiters};
use crate::request::{RequestBody, RequestDescriptor};
use crate::response::{ClientError, ResponseBody, ResponseDescriptor};
use crate::session::{ResponseHead, Session, WireRequest};
use crate::util::{CountingReader, content_type, raw_path, redact_uri_for_logs};

use super::S3HttpClient;

impl S3HttpClient {
    /// Executes `request`, following temporary redirects.
    ///
    /// On return the request's URI is the last target that was tried. The
    /// outcome is always a [`ResponseDescriptor`]: either a terminal status
    /// with headers and a body stream, or a client error.
    pub fn make_request(
        &self,
        request: &mut RequestDescriptor,
        limiters: RateLimiters<'_>,
    ) -> ResponseDescriptor {
        let kind = RequestKind::of(request.method());
        let mut response = ResponseDescriptor::new();

        self.metrics.increment(kind, MetricEvent::Count);
        let _in_flight = self.metrics.enter_in_flight();

        if let Err(error) = self.run_attempts(request, kind, limiters.select(kind), &mut response) {
            warn!(
                uri = %redact_uri_for_logs(request.uri()),
                code = error.code().as_str(),
                error = %error,
                "failed to make request"
            );
            response.set_client_error(ClientError::network(&error));
            self.metrics.increment(kind, MetricEvent::Errors);
        }
        response
    }

    fn run_attempts(
        &self,
        request: &mut RequestDescriptor,
        kind: RequestKind,
        limiter: &dyn RateLimiter,
        response: &mut ResponseDescriptor,
    ) -> S3Result<()> {
        let logging = self.configuration.enable_requests_logging;
        let original_uri = request.uri().to_string();
        let body_start = match request.body_mut() {
            Some(body) => body
                .stream_position()
                .map_err(|source| S3ClientError::BodyRewind {
                    uri: original_uri.clone(),
                    source,
                })?,
            None => 0,
        };

        for attempt in 0..=self.configuration.max_redirects {
            let target = request.uri().clone();
            if logging {
                trace!(uri = %redact_uri_for_logs(&target), attempt, "make request");
            }

            let request_configuration = self
                .configuration
                .per_request_configuration
                .configure(request);
            let mut session = self.open_session(&target, &request_configuration)?;

            let path_and_query = request.path_and_query();
            let context = AttemptContext {
                method: request.method(),
                kind,
                uri: &target,
                attempt,
            };

            limiter.before_send(&context);
            let started_at = Instant::now();
            {
                let (headers, body) = request.wire_parts();
                let wire = WireRequest {
                    method: context.method,
                    uri: &target,
                    path_and_query: &path_and_query,
                    headers,
                };
                send_attempt(session.as_mut(), &wire, body, attempt, body_start, logging)?;
            }

            if logging {
                trace!("receiving response");
            }
            limiter.before_receive(&context);
            let head = session.receive_response()?;
            let elapsed = started_at.elapsed();

            if logging {
                trace!(
                    status = head.status.as_u16(),
                    reason = head.reason(),
                    "response status"
                );
            }

            if head.status == StatusCode::TEMPORARY_REDIRECT {
                let (location, location_path) = redirect_location(&target, &head.headers)?;
                self.configuration.remote_host_filter.check_url(&location)?;
                if logging {
                    trace!(location = %redact_uri_for_logs(&location), "redirecting request");
                }
                self.metrics.increment(kind, MetricEvent::Redirects);
                request.set_target(location, location_path);
                continue;
            }

            let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
            self.metrics.add(kind, MetricEvent::Microseconds, micros);
            self.complete(response, head, session, kind, &request_configuration, logging);
            return Ok(());
        }

        Err(S3ClientError::TooManyRedirects { uri: original_uri })
    }

    fn open_session(
        &self,
        target: &Url,
        request_configuration: &RequestConfiguration,
    ) -> S3Result<Box<dyn Session>> {
        match ProxySettings::for_attempt(request_configuration, target) {
            Some(proxy) => {
                let mut session = self
                    .session_provider
                    .acquire_session(target, &self.timeouts, false)?;
                session.set_proxy(proxy);
                Ok(session)
            }
            None => self
                .session_provider
                .acquire_session(target, &self.timeouts, true),
        }
    }

    fn complete(
        &self,
        response: &mut ResponseDescriptor,
        head: ResponseHead,
        mut session: Box<dyn Session>,
        kind: RequestKind,
        request_configuration: &RequestConfiguration,
        logging: bool,
    ) {
        response.set_status(head.status);
        response.set_content_type(content_type(&head.headers));
        copy_response_headers(&head.headers, response.headers_mut(), logging);

        match classify_status(head.status.as_u16()) {
            StatusClass::Success => {}
            StatusClass::Throttled => self.metrics.increment(kind, MetricEvent::Throttling),
            StatusClass::RequestError => self.metrics.increment(kind, MetricEvent::Errors),
            StatusClass::ServerError => {
                self.metrics.increment(kind, MetricEvent::Errors);
                if let Some(reporter) = &self.configuration.error_report {
                    reporter.report(request_configuration);
                }
            }
        }

        let reader = session
            .take_body()
            .unwrap_or_else(|| Box::new(std::io::empty()));
        let session: Arc<dyn Session> = Arc::from(session);
        response.set_body(ResponseBody::new(reader, session));
    }
}

fn send_attempt(
    session: &mut dyn Session,
    wire: &WireRequest<'_>,
    body: Option<&mut (dyn RequestBody + 'static)>,
    attempt: u32,
    body_start: u64,
    logging: bool,
) -> S3Result<()> {
    let Some(body) = body else {
        return session.send_request(wire, None);
    };

    if logging {
        trace!("writing request body");
    }
    if attempt > 0 {
        body.seek(SeekFrom::Start(body_start))
            .map_err(|source| S3ClientError::BodyRewind {
                uri: wire.uri.to_string(),
                source,
            })?;
    }
    let mut counting = CountingReader::new(body);
    session.send_request(wire, Some(&mut counting))?;
    if logging {
        trace!(bytes = counting.count(), "written request body");
    }
    Ok(())
}

/// The redirect target and its path as written in the `Location` header.
fn redirect_location(current: &Url, headers: &HeaderMap) -> S3Result<(Url, String)> {
    let value = headers
        .get(LOCATION)
        .ok_or_else(|| S3ClientError::MissingRedirectLocation {
            uri: current.to_string(),
        })?;
    let invalid = || S3ClientError::InvalidRedirectLocation {
        location: String::from_utf8_lossy(value.as_bytes()).into_owned(),
        uri: current.to_string(),
    };
    let location = value.to_str().map_err(|_| invalid())?;
    let resolved = current.join(location).map_err(|_| invalid())?;
    if !matches!(resolved.scheme(), "http" | "https") || resolved.host_str().is_none() {
        return Err(invalid());
    }
    let path = raw_path(location).map_or_else(|| resolved.path().to_owned(), str::to_owned);
    Ok((resolved, path))
}

/// Copies every response header and, when logging, renders them as one
/// `name: value; ` line in the same pass.
fn copy_response_headers(source: &HeaderMap, target: &mut HeaderMap, logging: bool) {
    let mut line = logging.then(String::new);
    for (name, value) in source {
        if let Some(line) = line.as_mut() {
            let _ = write!(
                line,
                "{}: {}; ",
                name,
                String::from_utf8_lossy(value.as_bytes())
            );
        }
        target.append(name.clone(), value.clone());
    }
    if let Some(line) = line {
        trace!(headers = %line, "received headers");
    }
}
