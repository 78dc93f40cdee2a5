use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{DashboardSession, FileThemeStore, SessionConfig, SessionEvent};
use shared::domain::TenantId;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use render::{AnsiThemeSink, SortKey};

#[derive(Parser, Debug)]
struct Args {
    /// Backend base URL, e.g. http://127.0.0.1:3001
    #[arg(long)]
    server_url: Option<String>,
    /// Tenant slug to activate (e.g. acme, startx, quantum)
    #[arg(long)]
    tenant: Option<String>,
    /// Sort the user table by this column
    #[arg(long, value_enum, default_value_t = SortKey::Name)]
    sort: SortKey,
    /// Show only users whose name or email contains this term
    #[arg(long, default_value = "")]
    search: String,
    /// Flip the theme after the dashboard loads
    #[arg(long)]
    toggle_theme: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    let settings = config::load_settings();

    let server_url = args.server_url.unwrap_or(settings.server_url);
    let tenant = args.tenant.unwrap_or(settings.tenant);

    let session_config = SessionConfig::new(&server_url)?
        .with_request_timeout(Duration::from_secs(settings.request_timeout_secs));
    let session = DashboardSession::new_with_dependencies(
        session_config,
        Arc::new(AnsiThemeSink),
        Arc::new(FileThemeStore::new(&settings.theme_state_path)),
    )
    .await?;

    let mut events = session.subscribe_events();
    session.select_tenant(TenantId::new(tenant)).await;

    loop {
        let event = tokio::time::timeout(Duration::from_secs(30), events.recv())
            .await
            .context("timed out waiting for the dashboard to load")?;
        match event {
            Ok(SessionEvent::ActivationSettled { .. }) => break,
            Ok(event) => tracing::debug!("session event: {event:?}"),
            Err(err) => anyhow::bail!("session event stream closed: {err}"),
        }
    }

    if args.toggle_theme {
        session.toggle_theme().await;
    }

    let snapshot = session.snapshot().await;
    print!(
        "{}",
        render::render_dashboard(&snapshot, args.sort, &args.search)
    );

    session.shutdown().await;
    Ok(())
}
