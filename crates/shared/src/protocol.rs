//! Wire contract for the dashboard backend and the normalization rules that
//! turn its payloads into domain values. The backend is loose about shapes:
//! tenant responses are sometimes wrapped in a `data` envelope, config
//! sections may be missing entirely, and the analytics endpoint answers with
//! either a report object or a bare string.

use serde_json::Value;

use crate::domain::{
    Analytics, AnalyticsReport, ChartPoint, FeatureFlags, Tenant, TenantConfig, Theme, User,
    DEFAULT_PRIMARY_COLOR, FALLBACK_TENANT_NAME,
};

pub const TENANT_ID_HEADER: &str = "x-tenant-id";

pub const TENANT_PATH: &str = "/api/tenant";
pub const USERS_PATH: &str = "/api/users";
pub const ANALYTICS_PATH: &str = "/api/analytics";

/// Normalizes a tenant payload. Returns `None` when the payload is not an
/// object at all; callers degrade to [`Tenant::fallback`] in that case.
pub fn normalize_tenant(payload: &Value) -> Option<Tenant> {
    let body = tenant_body(payload)?;
    let object = body.as_object()?;

    Some(Tenant {
        name: object
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| FALLBACK_TENANT_NAME.to_owned()),
        logo: object.get("logo").and_then(Value::as_str).map(str::to_owned),
        config: normalize_config(object.get("config")),
    })
}

// Some backend variants wrap the tenant record in `{ "data": { ... } }`.
// A `data` key holding anything other than an object is ignored.
fn tenant_body(payload: &Value) -> Option<&Value> {
    if !payload.is_object() {
        return None;
    }
    match payload.get("data") {
        Some(data) if data.is_object() => Some(data),
        _ => Some(payload),
    }
}

pub fn normalize_config(config: Option<&Value>) -> TenantConfig {
    let theme = match config
        .and_then(|config| config.get("theme"))
        .and_then(Value::as_str)
    {
        Some("dark") => Theme::Dark,
        _ => Theme::Light,
    };
    let primary_color = config
        .and_then(|config| config.get("primaryColor"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PRIMARY_COLOR)
        .to_owned();
    let features = config.and_then(|config| config.get("features"));

    TenantConfig {
        theme,
        primary_color,
        features: FeatureFlags {
            analytics: flag(features, "analytics"),
            user_management: flag(features, "userManagement"),
            notifications: flag(features, "notifications"),
            chat: flag(features, "chat"),
        },
    }
}

fn flag(features: Option<&Value>, key: &str) -> bool {
    features
        .and_then(|features| features.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Non-array payloads collapse to an empty collection; malformed entries
/// inside an otherwise valid array are skipped.
pub fn normalize_users(payload: Value) -> Vec<User> {
    match payload {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// String payloads pass through as a message; report objects are read
/// field by field so a single malformed field never discards the rest.
pub fn normalize_analytics(payload: &Value) -> Analytics {
    match payload {
        Value::String(text) => Analytics::Message(text.clone()),
        Value::Object(report) => Analytics::Report(AnalyticsReport {
            active_users: report.get("activeUsers").and_then(Value::as_u64),
            conversion_rate: report.get("conversionRate").and_then(Value::as_f64),
            revenue: report.get("revenue").and_then(Value::as_f64),
            chart_data: report
                .get("chartData")
                .and_then(Value::as_array)
                .map(|points| {
                    points
                        .iter()
                        .filter_map(|point| {
                            serde_json::from_value::<ChartPoint>(point.clone()).ok()
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }),
        _ => Analytics::no_data(),
    }
}
