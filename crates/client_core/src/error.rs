use std::fmt;

use thiserror::Error;

use shared::protocol::{ANALYTICS_PATH, TENANT_PATH, USERS_PATH};

/// The three tenant-scoped resources the session controller loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Tenant,
    Users,
    Analytics,
}

impl ResourceKind {
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Tenant => TENANT_PATH,
            ResourceKind::Users => USERS_PATH,
            ResourceKind::Analytics => ANALYTICS_PATH,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Tenant => "tenant",
            ResourceKind::Users => "users",
            ResourceKind::Analytics => "analytics",
        }
    }

    /// The message surfaced to the dashboard when this resource fails.
    pub fn user_message(self) -> &'static str {
        match self {
            ResourceKind::Tenant => "Failed to fetch tenant data",
            ResourceKind::Users => "Failed to fetch users data",
            ResourceKind::Analytics => "Failed to fetch analytics data",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Transport failure, non-2xx status, expired timeout, or a body that was
/// not JSON at all. Wrong-shaped JSON is not an error here; normalization
/// coerces it downstream.
#[derive(Debug, Error)]
#[error("{resource} request failed: {source}")]
pub struct FetchError {
    pub resource: ResourceKind,
    #[source]
    pub source: reqwest::Error,
}
