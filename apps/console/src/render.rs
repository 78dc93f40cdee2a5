//! Text rendering of the dashboard panels. Everything here is a pure
//! function of a [`SessionSnapshot`]; the session controller stays the only
//! owner of state.

use std::fmt::{self, Write as _};

use clap::ValueEnum;

use client_core::{ResourcePhase, SessionSnapshot, ThemeSink};
use shared::domain::{Analytics, AnalyticsReport, TenantConfig, Theme, User};

// Tailwind gray-800 for dark, plain white for light.
const DARK_BACKGROUND: &str = "#1f2937";
const LIGHT_BACKGROUND: &str = "#ffffff";

const CHART_WIDTH: usize = 40;

/// Repaints the terminal background to match the applied theme, the console
/// analog of restyling the document root.
pub struct AnsiThemeSink;

impl ThemeSink for AnsiThemeSink {
    fn apply(&self, theme: Theme, _primary_color: &str) {
        let background = match theme {
            Theme::Dark => DARK_BACKGROUND,
            Theme::Light => LIGHT_BACKGROUND,
        };
        print!("\x1b]11;{background}\x07");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortKey {
    #[default]
    Name,
    Email,
    Status,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            SortKey::Name => "name",
            SortKey::Email => "email",
            SortKey::Status => "status",
        };
        f.write_str(key)
    }
}

pub fn sort_users(users: &[User], key: SortKey) -> Vec<User> {
    let mut sorted = users.to_vec();
    sorted.sort_by(|a, b| match key {
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Email => a.email.cmp(&b.email),
        SortKey::Status => a.status.cmp(&b.status),
    });
    sorted
}

pub fn filter_users(users: &[User], term: &str) -> Vec<User> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return users.to_vec();
    }
    users
        .iter()
        .filter(|user| {
            user.name.trim().to_lowercase().contains(&needle)
                || user.email.trim().to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

pub fn render_dashboard(snapshot: &SessionSnapshot, sort: SortKey, search: &str) -> String {
    if snapshot.loading {
        return "Loading tenant data...\n".to_string();
    }
    let Some(tenant) = &snapshot.tenant else {
        let mut out = String::from("Tenant not found\n");
        if let Some(error) = &snapshot.error {
            let _ = writeln!(out, "error: {error}");
        }
        return out;
    };

    let mut out = String::new();
    let theme = if snapshot.is_dark_mode { "dark" } else { "light" };
    let logo = tenant.logo.as_deref().unwrap_or("▣");
    let slug = snapshot
        .tenant_id
        .as_ref()
        .map(|id| id.as_str())
        .unwrap_or("-");
    let _ = writeln!(out, "{logo} {} ({slug}) [{theme}]", tenant.name);
    let _ = writeln!(out, "{}", "=".repeat(60));

    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "! {error}");
    }
    if tenant.config.features.notifications {
        let _ = writeln!(out, "notifications: enabled");
    }

    out.push_str(&render_sidebar(&tenant.config));

    if tenant.config.features.user_management {
        out.push_str(&render_user_table(
            &snapshot.users,
            sort,
            search,
            snapshot.users_phase,
        ));
    }
    if tenant.config.features.analytics {
        out.push_str(&render_analytics(
            snapshot.analytics.as_ref(),
            snapshot.analytics_phase,
        ));
    }
    if tenant.config.features.chat {
        out.push_str(&render_chat_placeholder());
    }

    out
}

fn render_sidebar(config: &TenantConfig) -> String {
    let mut out = String::from("\nDashboard\n");
    let _ = writeln!(out, "  • Settings");
    if config.features.user_management {
        let _ = writeln!(out, "  • User Management");
    }
    if config.features.analytics {
        let _ = writeln!(out, "  • Analytics");
    }
    if config.features.chat {
        let _ = writeln!(out, "  • Real-Time Chat");
    }
    out
}

fn render_user_table(users: &[User], sort: SortKey, search: &str, phase: ResourcePhase) -> String {
    let mut out = String::from("\n## User Management\n");
    if phase == ResourcePhase::Error {
        let _ = writeln!(out, "(user list unavailable)");
        return out;
    }

    let visible = filter_users(&sort_users(users, sort), search);
    if !search.trim().is_empty() {
        let _ = writeln!(out, "search: \"{}\"", search.trim());
    }

    if visible.is_empty() {
        let _ = writeln!(out, "No users found");
        return out;
    }

    let name_width = column_width("Name", visible.iter().map(|user| user.name.as_str()));
    let role_width = column_width("Role", visible.iter().map(User::display_role));
    let email_width = column_width("Email", visible.iter().map(|user| user.email.as_str()));

    let _ = writeln!(
        out,
        "{:<name_width$}  {:<role_width$}  {:<email_width$}  {}",
        "Name", "Role", "Email", "Status"
    );
    for user in &visible {
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<role_width$}  {:<email_width$}  {}",
            user.name,
            user.display_role(),
            user.email,
            user.status
        );
    }
    let _ = writeln!(out, "Showing {} of {} users", visible.len(), users.len());
    out
}

fn render_analytics(analytics: Option<&Analytics>, phase: ResourcePhase) -> String {
    let mut out = String::from("\n## Analytics Overview\n");
    if phase == ResourcePhase::Error {
        let _ = writeln!(out, "(analytics unavailable)");
        return out;
    }

    match analytics {
        None | Some(Analytics::Message(_)) => {
            let message = match analytics {
                Some(Analytics::Message(text)) => text.as_str(),
                _ => "No analytics",
            };
            let _ = writeln!(out, "{message}");
        }
        Some(Analytics::Report(report)) => {
            let _ = writeln!(out, "Active Users     {}", format_active_users(report));
            let _ = writeln!(out, "Conversion Rate  {}", format_conversion_rate(report));
            let _ = writeln!(out, "Revenue          {}", format_revenue(report));
            out.push_str(&render_chart(report));
        }
    }
    out
}

fn render_chart(report: &AnalyticsReport) -> String {
    if report.chart_data.is_empty() {
        return String::new();
    }

    let mut out = String::from("\n");
    let max = report
        .chart_data
        .iter()
        .filter_map(|point| point.uv)
        .fold(0.0_f64, f64::max);
    let label_width = column_width("", report.chart_data.iter().map(|point| point.name.as_str()));

    for point in &report.chart_data {
        let uv = point.uv.unwrap_or(0.0);
        let bar = if max > 0.0 {
            ((uv / max) * CHART_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(out, "{:<label_width$}  {}", point.name, "█".repeat(bar));
    }
    out
}

fn render_chat_placeholder() -> String {
    let mut out = String::from("\n## Real-Time Chat\n");
    let _ = writeln!(
        out,
        "Chat is enabled for this tenant but the console build has no live socket."
    );
    out
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(str::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0)
}

// Placeholder figures shown while a report omits a stat, matching the
// hosted dashboard's stat tiles.
fn format_active_users(report: &AnalyticsReport) -> String {
    report
        .active_users
        .map(|count| count.to_string())
        .unwrap_or_else(|| "1000k".to_string())
}

fn format_conversion_rate(report: &AnalyticsReport) -> String {
    report
        .conversion_rate
        .map(|rate| format!("{rate}%"))
        .unwrap_or_else(|| "23%".to_string())
}

fn format_revenue(report: &AnalyticsReport) -> String {
    report
        .revenue
        .map(|revenue| format!("${revenue}"))
        .unwrap_or_else(|| "$10000".to_string())
}

#[cfg(test)]
mod tests {
    use client_core::ResourcePhase;
    use shared::domain::{ChartPoint, FeatureFlags, Tenant, TenantId};

    use super::*;

    fn user(name: &str, email: &str, status: &str) -> User {
        User {
            name: name.to_string(),
            email: email.to_string(),
            status: status.to_string(),
            role: None,
        }
    }

    fn snapshot_with_tenant(tenant: Tenant) -> SessionSnapshot {
        SessionSnapshot {
            tenant_id: Some(TenantId::new("acme")),
            tenant: Some(tenant),
            users: Vec::new(),
            analytics: None,
            loading: false,
            error: None,
            tenant_phase: ResourcePhase::Ready,
            users_phase: ResourcePhase::Idle,
            analytics_phase: ResourcePhase::Idle,
            is_dark_mode: false,
        }
    }

    fn tenant_with_features(features: FeatureFlags) -> Tenant {
        let mut tenant = Tenant::fallback();
        tenant.name = "ACME Corporation".to_string();
        tenant.config.features = features;
        tenant
    }

    #[test]
    fn sidebar_lists_only_enabled_sections() {
        let all_on = render_sidebar(
            &tenant_with_features(FeatureFlags {
                analytics: true,
                user_management: true,
                notifications: false,
                chat: true,
            })
            .config,
        );
        assert!(all_on.contains("Settings"));
        assert!(all_on.contains("User Management"));
        assert!(all_on.contains("Analytics"));
        assert!(all_on.contains("Real-Time Chat"));

        let all_off = render_sidebar(&Tenant::fallback().config);
        assert!(all_off.contains("Settings"));
        assert!(!all_off.contains("User Management"));
        assert!(!all_off.contains("Analytics"));
        assert!(!all_off.contains("Real-Time Chat"));
    }

    #[test]
    fn users_sort_by_selected_column() {
        let users = vec![
            user("Zoe", "zoe@acme.test", "Active"),
            user("Ada", "ada@acme.test", "Pending"),
        ];

        let by_name = sort_users(&users, SortKey::Name);
        assert_eq!(by_name[0].name, "Ada");

        let by_status = sort_users(&users, SortKey::Status);
        assert_eq!(by_status[0].status, "Active");
    }

    #[test]
    fn user_search_matches_name_or_email_case_insensitively() {
        let users = vec![
            user("Ada Lovelace", "ada@acme.test", "Active"),
            user("Sol", "sol@startx.test", "Active"),
        ];

        let hits = filter_users(&users, "  ACME ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ada Lovelace");

        assert_eq!(filter_users(&users, "").len(), 2);
        assert!(filter_users(&users, "quantum").is_empty());
    }

    #[test]
    fn stat_tiles_fall_back_to_placeholder_figures() {
        let empty = AnalyticsReport::default();
        assert_eq!(format_active_users(&empty), "1000k");
        assert_eq!(format_conversion_rate(&empty), "23%");
        assert_eq!(format_revenue(&empty), "$10000");

        let report = AnalyticsReport {
            active_users: Some(1042),
            conversion_rate: Some(4.5),
            revenue: Some(10000.0),
            chart_data: Vec::new(),
        };
        assert_eq!(format_active_users(&report), "1042");
        assert_eq!(format_conversion_rate(&report), "4.5%");
        assert_eq!(format_revenue(&report), "$10000");
    }

    #[test]
    fn loading_snapshot_renders_loading_screen() {
        let mut snapshot = snapshot_with_tenant(Tenant::fallback());
        snapshot.tenant = None;
        snapshot.loading = true;
        snapshot.tenant_phase = ResourcePhase::Loading;

        assert_eq!(
            render_dashboard(&snapshot, SortKey::Name, ""),
            "Loading tenant data...\n"
        );
    }

    #[test]
    fn missing_tenant_renders_not_found_with_error() {
        let mut snapshot = snapshot_with_tenant(Tenant::fallback());
        snapshot.tenant = None;
        snapshot.tenant_phase = ResourcePhase::Error;
        snapshot.error = Some("Failed to fetch tenant data".to_string());

        let rendered = render_dashboard(&snapshot, SortKey::Name, "");
        assert!(rendered.contains("Tenant not found"));
        assert!(rendered.contains("Failed to fetch tenant data"));
    }

    #[test]
    fn feature_gated_panels_appear_only_when_enabled() {
        let mut snapshot = snapshot_with_tenant(tenant_with_features(FeatureFlags {
            analytics: true,
            user_management: true,
            notifications: true,
            chat: false,
        }));
        snapshot.users = vec![user("Ada", "ada@acme.test", "Active")];
        snapshot.users_phase = ResourcePhase::Ready;
        snapshot.analytics = Some(Analytics::Report(AnalyticsReport {
            active_users: Some(7),
            conversion_rate: None,
            revenue: None,
            chart_data: vec![ChartPoint {
                name: "Page A".to_string(),
                uv: Some(100.0),
                ..ChartPoint::default()
            }],
        }));
        snapshot.analytics_phase = ResourcePhase::Ready;

        let rendered = render_dashboard(&snapshot, SortKey::Name, "");
        assert!(rendered.contains("## User Management"));
        assert!(rendered.contains("ada@acme.test"));
        assert!(rendered.contains("## Analytics Overview"));
        assert!(rendered.contains("Active Users     7"));
        assert!(rendered.contains("Page A"));
        assert!(rendered.contains("notifications: enabled"));
        assert!(!rendered.contains("## Real-Time Chat"));
    }

    #[test]
    fn failed_secondary_resources_render_as_unavailable() {
        let mut snapshot = snapshot_with_tenant(tenant_with_features(FeatureFlags {
            analytics: true,
            user_management: true,
            notifications: false,
            chat: false,
        }));
        snapshot.users_phase = ResourcePhase::Error;
        snapshot.analytics_phase = ResourcePhase::Error;
        snapshot.error = Some("Failed to fetch users data".to_string());

        let rendered = render_dashboard(&snapshot, SortKey::Name, "");
        assert!(rendered.contains("(user list unavailable)"));
        assert!(rendered.contains("(analytics unavailable)"));
        assert!(rendered.contains("! Failed to fetch users data"));
    }
}
