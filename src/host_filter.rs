use std::collections::BTreeSet;

use regex::Regex;
use url::Url;

use crate::error::S3ClientError;

/// Allowlist of hosts a request or redirect may target.
///
/// Entries are either exact `host` / `host:port` strings or regular
/// expressions that must match the whole host. A filter with no entries
/// allows every host.
#[derive(Clone, Debug, Default)]
pub struct RemoteHostFilter {
    primary_hosts: BTreeSet<String>,
    regexp_hosts: Vec<Regex>,
}

impl RemoteHostFilter {
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn allow_host(mut self, host: impl AsRef<str>) -> Self {
        self.primary_hosts
            .insert(host.as_ref().trim().to_ascii_lowercase());
        self
    }

    pub fn allow_host_regex(mut self, pattern: &str) -> Result<Self, S3ClientError> {
        let anchored = format!("^(?:{pattern})$");
        let regex = Regex::new(&anchored).map_err(|source| S3ClientError::InvalidHostPattern {
            pattern: pattern.to_owned(),
            source,
        })?;
        self.regexp_hosts.push(regex);
        Ok(self)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.primary_hosts.is_empty() && self.regexp_hosts.is_empty()
    }

    pub fn check_url(&self, uri: &Url) -> Result<(), S3ClientError> {
        let host = uri.host_str().unwrap_or_default().to_ascii_lowercase();
        if self.is_allowed(&host, uri.port_or_known_default()) {
            return Ok(());
        }
        Err(S3ClientError::HostNotAllowed { host })
    }

    fn is_allowed(&self, host: &str, port: Option<u16>) -> bool {
        if self.is_unrestricted() {
            return true;
        }
        if self.primary_hosts.contains(host) {
            return true;
        }
        if let Some(port) = port
            && self.primary_hosts.contains(&format!("{host}:{port}"))
        {
            return true;
        }
        self.regexp_hosts.iter().any(|regex| regex.is_match(host))
    }
}
