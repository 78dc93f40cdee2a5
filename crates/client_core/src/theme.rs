//! Theme side effects: presenting the active theme to whatever surface hosts
//! the dashboard, and persisting the last applied choice so the next session
//! can start from it before the first tenant response arrives.

use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use shared::domain::Theme;

/// Applies a theme to the hosting surface. Implementations must be cheap;
/// the session calls this on its update path.
pub trait ThemeSink: Send + Sync {
    fn apply(&self, theme: Theme, primary_color: &str);
}

/// Headless surfaces (tests, batch runs) have nothing to restyle.
pub struct NoopThemeSink;

impl ThemeSink for NoopThemeSink {
    fn apply(&self, _theme: Theme, _primary_color: &str) {}
}

#[async_trait]
pub trait ThemeStore: Send + Sync {
    async fn load(&self) -> Result<Option<Theme>>;
    async fn persist(&self, theme: Theme) -> Result<()>;
}

/// In-memory store used as the default dependency and in tests.
#[derive(Default)]
pub struct MemoryThemeStore {
    inner: Mutex<Option<Theme>>,
}

impl MemoryThemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(theme: Theme) -> Self {
        Self {
            inner: Mutex::new(Some(theme)),
        }
    }
}

#[async_trait]
impl ThemeStore for MemoryThemeStore {
    async fn load(&self) -> Result<Option<Theme>> {
        Ok(*self.inner.lock().await)
    }

    async fn persist(&self, theme: Theme) -> Result<()> {
        *self.inner.lock().await = Some(theme);
        Ok(())
    }
}

/// Stores the theme as a single word in a state file, the closest local
/// analog to the browser build's `localStorage` key.
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ThemeStore for FileThemeStore {
    async fn load(&self) -> Result<Option<Theme>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read theme state file '{}'", self.path.display())
                })
            }
        };

        Ok(match raw.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        })
    }

    async fn persist(&self, theme: Theme) -> Result<()> {
        ensure_parent_dir_exists(&self.path)?;
        tokio::fs::write(&self.path, theme.as_str())
            .await
            .with_context(|| {
                format!("failed to write theme state file '{}'", self.path.display())
            })
    }
}

fn ensure_parent_dir_exists(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    std::fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for theme state file",
            parent.display()
        )
    })?;

    Ok(())
}

#[cfg(test)]
#[path = "tests/theme_tests.rs"]
mod tests;
