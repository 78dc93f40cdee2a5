use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque key selecting the active tenant. Selector values, the
/// `x-tenant-id` header, and all comparisons use the same string slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_PRIMARY_COLOR: &str = "#3B82F6";
pub const FALLBACK_TENANT_NAME: &str = "Fallback Tenant";
pub const NO_ANALYTICS_SENTINEL: &str = "No analytics";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    #[serde(default)]
    pub analytics: bool,
    #[serde(default)]
    pub user_management: bool,
    #[serde(default)]
    pub notifications: bool,
    #[serde(default)]
    pub chat: bool,
}

impl FeatureFlags {
    pub fn any_enabled(self) -> bool {
        self.analytics || self.user_management || self.notifications || self.chat
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    pub theme: Theme,
    pub primary_color: String,
    pub features: FeatureFlags,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            features: FeatureFlags::default(),
        }
    }
}

/// Tenant record as the session controller owns it: replaced wholesale on a
/// tenant switch, mutated in place only when the theme is toggled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub config: TenantConfig,
}

impl Tenant {
    /// Display degrade used when the tenant payload is unusable. Every
    /// feature flag is off, so no dependent fetch is ever triggered by it.
    pub fn fallback() -> Self {
        Self {
            name: FALLBACK_TENANT_NAME.to_string(),
            logo: None,
            config: TenantConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == "Active"
    }

    pub fn display_role(&self) -> &str {
        self.role.as_deref().unwrap_or("User")
    }
}

/// Analytics payloads are either a human-readable message (the backend sends
/// a bare string for tenants without analytics history) or a report object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Analytics {
    Message(String),
    Report(AnalyticsReport),
}

impl Analytics {
    pub fn no_data() -> Self {
        Analytics::Message(NO_ANALYTICS_SENTINEL.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_users: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub chart_data: Vec<ChartPoint>,
}

// Wire keys match the backend's chart series names verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cnt: Option<f64>,
}
