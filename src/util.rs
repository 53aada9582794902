use std::io::Read;

use http::HeaderMap;
use http::header::CONTENT_TYPE;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, percent_encode};
use url::Url;

/// Bytes escaped in a request path. Everything except ASCII alphanumerics and
/// `-._~/` is escaped, which covers `?#:;+@&=%`, spaces and the remaining
/// delimiters. Object-storage signers canonicalize paths with this set, so
/// the request line must use it too.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Builds the request target from a decoded path and a raw query.
pub fn encode_path_and_query(path: &str, query: Option<&str>) -> String {
    encode_raw_path_and_query(path.as_bytes(), query)
}

/// Request target for a URL: its path is decoded first so escapes already
/// present are not doubled.
///
/// A parsed [`Url`] has already dropped `.` and `..` segments. Requests built
/// from text keep the path as written; see [`encode_escaped_path_and_query`].
pub fn encode_uri_path_and_query(uri: &Url) -> String {
    encode_escaped_path_and_query(uri.path(), uri.query())
}

/// Builds the request target from a path that may carry percent escapes.
/// Dot segments are kept: `a/%2E%2E/b` and `a/../b` both go out as `a/../b`.
pub fn encode_escaped_path_and_query(path: &str, query: Option<&str>) -> String {
    let decoded: Vec<u8> = percent_decode_str(path).collect();
    encode_raw_path_and_query(&decoded, query)
}

/// The path of an absolute URI or an absolute-path reference, exactly as
/// written. `None` for other relative references.
pub(crate) fn raw_path(reference: &str) -> Option<&str> {
    let reference = reference
        .split_once('#')
        .map_or(reference, |(head, _)| head);
    let reference = reference
        .split_once('?')
        .map_or(reference, |(head, _)| head);

    if let Some((scheme, rest)) = reference.split_once("://")
        && is_scheme(scheme)
    {
        let authority_end = rest.find('/').unwrap_or(rest.len());
        return Some(&rest[authority_end..]);
    }
    if reference.starts_with('/') && !reference.starts_with("//") {
        return Some(reference);
    }
    None
}

fn is_scheme(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn encode_raw_path_and_query(path: &[u8], query: Option<&str>) -> String {
    let mut path_and_query: String = percent_encode(path, PATH_ENCODE_SET).collect();
    if path_and_query.is_empty() {
        path_and_query.push('/');
    }
    if let Some(query) = query.filter(|query| !query.is_empty()) {
        path_and_query.push('?');
        path_and_query.push_str(query);
    }
    path_and_query
}

pub(crate) fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

/// Removes credentials and the query string before a URI reaches the logs.
pub(crate) fn redact_uri_for_logs(uri: &Url) -> String {
    let mut redacted = uri.clone();
    let _ = redacted.set_username("");
    let _ = redacted.set_password(None);
    redacted.set_query(None);
    redacted.set_fragment(None);
    redacted.to_string()
}

pub(crate) struct CountingReader<'a, R: Read + ?Sized> {
    inner: &'a mut R,
    count: u64,
}

impl<'a, R: Read + ?Sized> CountingReader<'a, R> {
    pub(crate) fn new(inner: &'a mut R) -> Self {
        Self { inner, count: 0 }
    }

    pub(crate) fn count(&self) -> u64 {
        self.count
    }
}

impl<R: Read + ?Sized> Read for CountingReader<'_, R> {
    fn read(&mut self, buffer: &mut [u8]) -> std::io::Result<usize> {
        let read = self.inner.read(buffer)?;
        self.count = self.count.saturating_add(read as u64);
        Ok(read)
    }
}
