use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Connection settings for one dashboard session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub server_url: Url,
    pub request_timeout: Duration,
    pub event_capacity: usize,
}

impl SessionConfig {
    pub fn new(server_url: &str) -> Result<Self> {
        let server_url = Url::parse(server_url)
            .with_context(|| format!("invalid server url '{server_url}'"))?;
        Ok(Self {
            server_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.server_url.as_str().trim_end_matches('/'))
    }
}
