//! Tenant session controller for the dashboard client.
//!
//! [`DashboardSession`] is the single writer of tenant identity, resource
//! fetch state, derived feature flags, and theme state. Selecting a tenant
//! starts one *activation*: fetch the tenant record, then load users and
//! analytics concurrently when their feature flags allow it. Switching
//! tenants aborts the outstanding activation and bumps a generation counter
//! checked before every commit, so a superseded fetch can never write a
//! previous tenant's data into the session.

use std::{sync::Arc, time::Instant};

use anyhow::Result;
use reqwest::Client;
use serde_json::Value;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{info, warn};

use shared::{
    domain::{Analytics, Tenant, TenantId, Theme, User},
    protocol::{self, TENANT_ID_HEADER},
};

pub mod config;
pub mod error;
pub mod theme;

pub use config::SessionConfig;
pub use error::{FetchError, ResourceKind};
pub use theme::{FileThemeStore, MemoryThemeStore, NoopThemeSink, ThemeSink, ThemeStore};

/// Per-resource fetch state machine. One instance per resource kind, all
/// reset to `Idle` when the active tenant changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourcePhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

impl ResourcePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ResourcePhase::Ready | ResourcePhase::Error)
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    TenantLoaded { tenant: Tenant },
    TenantFailed { message: String },
    UsersLoaded { count: usize },
    UsersFailed { message: String },
    AnalyticsLoaded { analytics: Analytics },
    AnalyticsFailed { message: String },
    ThemeChanged { theme: Theme },
    /// The activation finished: every resource it was going to load has
    /// reached a terminal phase.
    ActivationSettled { tenant_id: TenantId },
}

#[derive(Default)]
struct SessionState {
    tenant_id: Option<TenantId>,
    /// Bumped on every tenant switch, refresh, and shutdown. Commits from
    /// activation tasks are dropped when their captured value is stale.
    activation: u64,
    tenant: Option<Tenant>,
    users: Vec<User>,
    analytics: Option<Analytics>,
    error: Option<String>,
    tenant_phase: ResourcePhase,
    users_phase: ResourcePhase,
    analytics_phase: ResourcePhase,
    startup_theme: Option<Theme>,
    activation_task: Option<JoinHandle<()>>,
}

/// Read view of the session, cloned out under the lock.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub tenant_id: Option<TenantId>,
    pub tenant: Option<Tenant>,
    pub users: Vec<User>,
    pub analytics: Option<Analytics>,
    pub loading: bool,
    pub error: Option<String>,
    pub tenant_phase: ResourcePhase,
    pub users_phase: ResourcePhase,
    pub analytics_phase: ResourcePhase,
    pub is_dark_mode: bool,
}

impl SessionSnapshot {
    /// True once the current activation has nothing left in flight.
    pub fn settled(&self) -> bool {
        self.tenant_phase.is_terminal()
            && self.users_phase != ResourcePhase::Loading
            && self.analytics_phase != ResourcePhase::Loading
    }
}

pub struct DashboardSession {
    http: Client,
    config: SessionConfig,
    theme_sink: Arc<dyn ThemeSink>,
    theme_store: Arc<dyn ThemeStore>,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl DashboardSession {
    pub async fn new(config: SessionConfig) -> Result<Arc<Self>> {
        Self::new_with_dependencies(
            config,
            Arc::new(NoopThemeSink),
            Arc::new(MemoryThemeStore::new()),
        )
        .await
    }

    pub async fn new_with_dependencies(
        config: SessionConfig,
        theme_sink: Arc<dyn ThemeSink>,
        theme_store: Arc<dyn ThemeStore>,
    ) -> Result<Arc<Self>> {
        let http = Client::builder().timeout(config.request_timeout).build()?;

        // The persisted theme is only a pre-tenant fallback; failure to read
        // it must not block session construction.
        let startup_theme = match theme_store.load().await {
            Ok(theme) => theme,
            Err(err) => {
                warn!("theme: failed to load persisted theme: {err:#}");
                None
            }
        };

        let (events, _) = broadcast::channel(config.event_capacity);
        Ok(Arc::new(Self {
            http,
            config,
            theme_sink,
            theme_store,
            inner: Mutex::new(SessionState {
                startup_theme,
                ..SessionState::default()
            }),
            events,
        }))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let guard = self.inner.lock().await;
        let is_dark_mode = guard
            .tenant
            .as_ref()
            .map(|tenant| tenant.config.theme.is_dark())
            .or_else(|| guard.startup_theme.map(Theme::is_dark))
            .unwrap_or(false);

        SessionSnapshot {
            tenant_id: guard.tenant_id.clone(),
            tenant: guard.tenant.clone(),
            users: guard.users.clone(),
            analytics: guard.analytics.clone(),
            loading: guard.tenant_phase == ResourcePhase::Loading,
            error: guard.error.clone(),
            tenant_phase: guard.tenant_phase,
            users_phase: guard.users_phase,
            analytics_phase: guard.analytics_phase,
            is_dark_mode,
        }
    }

    /// Replaces the active tenant identifier and starts a fresh activation.
    ///
    /// Previously loaded tenant/users/analytics data is cleared eagerly so a
    /// new selection never shows another tenant's data while its own fetch
    /// is in flight. Selecting the already-active tenant is a no-op; use
    /// [`DashboardSession::refresh`] to reload it.
    pub async fn select_tenant(self: &Arc<Self>, tenant_id: TenantId) {
        let mut guard = self.inner.lock().await;
        if guard.tenant_id.as_ref() == Some(&tenant_id) {
            return;
        }
        guard.tenant_id = Some(tenant_id.clone());
        let activation = Self::begin_activation(&mut guard);

        let session = Arc::clone(self);
        guard.activation_task = Some(tokio::spawn(async move {
            session.run_activation(tenant_id, activation).await;
        }));
    }

    /// Re-runs the current tenant's activation from scratch, with the same
    /// clearing rules as a tenant switch. No-op when no tenant is selected.
    pub async fn refresh(self: &Arc<Self>) {
        let mut guard = self.inner.lock().await;
        let Some(tenant_id) = guard.tenant_id.clone() else {
            return;
        };
        let activation = Self::begin_activation(&mut guard);

        let session = Arc::clone(self);
        guard.activation_task = Some(tokio::spawn(async move {
            session.run_activation(tenant_id, activation).await;
        }));
    }

    pub async fn clear_error(&self) {
        self.inner.lock().await.error = None;
    }

    /// Flips the loaded tenant's theme in place, applies it, persists it,
    /// and emits [`SessionEvent::ThemeChanged`]. No-op when no tenant is
    /// loaded.
    pub async fn toggle_theme(&self) {
        let applied = {
            let mut guard = self.inner.lock().await;
            let Some(tenant) = guard.tenant.as_mut() else {
                return;
            };
            let next = tenant.config.theme.toggled();
            tenant.config.theme = next;
            (next, tenant.config.primary_color.clone())
        };

        self.apply_theme(applied.0, &applied.1).await;
        let _ = self
            .events
            .send(SessionEvent::ThemeChanged { theme: applied.0 });
    }

    /// Tears the session down: the outstanding activation is aborted and any
    /// late resolution of an already-started fetch is discarded.
    pub async fn shutdown(&self) {
        let mut guard = self.inner.lock().await;
        if let Some(task) = guard.activation_task.take() {
            task.abort();
        }
        guard.activation = guard.activation.wrapping_add(1);
    }

    fn begin_activation(guard: &mut SessionState) -> u64 {
        if let Some(task) = guard.activation_task.take() {
            task.abort();
        }
        guard.activation = guard.activation.wrapping_add(1);
        guard.tenant = None;
        guard.users.clear();
        guard.analytics = None;
        guard.error = None;
        guard.tenant_phase = ResourcePhase::Loading;
        guard.users_phase = ResourcePhase::Idle;
        guard.analytics_phase = ResourcePhase::Idle;
        guard.activation
    }

    async fn run_activation(self: Arc<Self>, tenant_id: TenantId, activation: u64) {
        let payload = match self.fetch_json(ResourceKind::Tenant, &tenant_id).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(tenant = %tenant_id, "tenant fetch failed: {err}");
                self.commit_tenant_failure(&tenant_id, activation).await;
                return;
            }
        };

        let (tenant, degraded) = match protocol::normalize_tenant(&payload) {
            Some(tenant) => (tenant, false),
            None => {
                warn!(tenant = %tenant_id, "tenant payload was not an object; degrading to fallback tenant");
                (Tenant::fallback(), true)
            }
        };
        let features = tenant.config.features;
        let theme = tenant.config.theme;
        let primary_color = tenant.config.primary_color.clone();

        let committed = {
            let mut guard = self.inner.lock().await;
            if guard.activation != activation {
                false
            } else {
                guard.tenant = Some(tenant.clone());
                if degraded {
                    // The fallback tenant is a display degrade, never a
                    // successful activation.
                    guard.tenant_phase = ResourcePhase::Error;
                    guard.error = Some(ResourceKind::Tenant.user_message().to_owned());
                } else {
                    guard.tenant_phase = ResourcePhase::Ready;
                }
                guard.users_phase = if features.user_management {
                    ResourcePhase::Loading
                } else {
                    ResourcePhase::Idle
                };
                guard.analytics_phase = if features.analytics {
                    ResourcePhase::Loading
                } else {
                    ResourcePhase::Idle
                };
                true
            }
        };
        if !committed {
            return;
        }

        if degraded {
            let _ = self.events.send(SessionEvent::TenantFailed {
                message: ResourceKind::Tenant.user_message().to_owned(),
            });
        } else {
            let _ = self.events.send(SessionEvent::TenantLoaded { tenant });
        }

        self.apply_theme(theme, &primary_color).await;

        let users_fetch = async {
            if !features.user_management {
                return;
            }
            match self.fetch_json(ResourceKind::Users, &tenant_id).await {
                Ok(payload) => {
                    let users = protocol::normalize_users(payload);
                    let count = users.len();
                    {
                        let mut guard = self.inner.lock().await;
                        if guard.activation != activation {
                            return;
                        }
                        guard.users = users;
                        guard.users_phase = ResourcePhase::Ready;
                    }
                    let _ = self.events.send(SessionEvent::UsersLoaded { count });
                }
                Err(err) => self.commit_dependent_failure(activation, err).await,
            }
        };

        let analytics_fetch = async {
            if !features.analytics {
                return;
            }
            match self.fetch_json(ResourceKind::Analytics, &tenant_id).await {
                Ok(payload) => {
                    let analytics = protocol::normalize_analytics(&payload);
                    {
                        let mut guard = self.inner.lock().await;
                        if guard.activation != activation {
                            return;
                        }
                        guard.analytics = Some(analytics.clone());
                        guard.analytics_phase = ResourcePhase::Ready;
                    }
                    let _ = self
                        .events
                        .send(SessionEvent::AnalyticsLoaded { analytics });
                }
                Err(err) => self.commit_dependent_failure(activation, err).await,
            }
        };

        tokio::join!(users_fetch, analytics_fetch);

        let still_current = self.inner.lock().await.activation == activation;
        if still_current {
            let _ = self.events.send(SessionEvent::ActivationSettled { tenant_id });
        }
    }

    async fn commit_tenant_failure(&self, tenant_id: &TenantId, activation: u64) {
        let message = ResourceKind::Tenant.user_message().to_owned();
        {
            let mut guard = self.inner.lock().await;
            if guard.activation != activation {
                return;
            }
            guard.tenant_phase = ResourcePhase::Error;
            guard.error = Some(message.clone());
        }
        let _ = self.events.send(SessionEvent::TenantFailed { message });
        let _ = self.events.send(SessionEvent::ActivationSettled {
            tenant_id: tenant_id.clone(),
        });
    }

    /// Users/analytics failures are non-fatal: the phase flips to `Error`
    /// and a secondary message is surfaced only when nothing more specific
    /// is already set.
    async fn commit_dependent_failure(&self, activation: u64, err: FetchError) {
        warn!(resource = %err.resource, "fetch failed: {err}");
        let message = err.resource.user_message().to_owned();
        {
            let mut guard = self.inner.lock().await;
            if guard.activation != activation {
                return;
            }
            match err.resource {
                ResourceKind::Users => guard.users_phase = ResourcePhase::Error,
                ResourceKind::Analytics => guard.analytics_phase = ResourcePhase::Error,
                ResourceKind::Tenant => return,
            }
            if guard.error.is_none() {
                guard.error = Some(message.clone());
            }
        }
        let event = match err.resource {
            ResourceKind::Users => SessionEvent::UsersFailed { message },
            _ => SessionEvent::AnalyticsFailed { message },
        };
        let _ = self.events.send(event);
    }

    async fn fetch_json(
        &self,
        resource: ResourceKind,
        tenant_id: &TenantId,
    ) -> Result<Value, FetchError> {
        let url = self.config.endpoint(resource.path());
        let started = Instant::now();

        let result = async {
            self.http
                .get(&url)
                .header(TENANT_ID_HEADER, tenant_id.as_str())
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await
        }
        .await;

        match result {
            Ok(payload) => {
                info!(
                    resource = %resource,
                    tenant = %tenant_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "fetch completed"
                );
                Ok(payload)
            }
            Err(source) => Err(FetchError { resource, source }),
        }
    }

    async fn apply_theme(&self, theme: Theme, primary_color: &str) {
        self.theme_sink.apply(theme, primary_color);
        if let Err(err) = self.theme_store.persist(theme).await {
            warn!("theme: failed to persist theme choice: {err:#}");
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
