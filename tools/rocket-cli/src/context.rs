//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use rocket_api::HttpCatalog;
use rocket_cart::{CartStore, NotifyingCart};
use rocket_storage::FileStore;

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["rocket.toml", ".rocket.toml", "rocket.json"];

/// The cart handle commands work with.
pub type Cart = NotifyingCart<HttpCatalog, FileStore, Output>;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            // Try to find config in current directory or parent directories
            find_config(&cwd).unwrap_or_default()
        };

        Ok(Self {
            config: config.with_env_overrides(),
            output,
            cwd,
        })
    }

    /// Path of the storage document.
    pub fn storage_path(&self) -> PathBuf {
        match &self.config.storage.path {
            Some(path) => self.resolve_path(path),
            None => dirs_path().join("rocketshoes").join("storage.json"),
        }
    }

    /// Build the cart for this session.
    pub fn open_cart(&self) -> Result<Cart> {
        let catalog = HttpCatalog::new(&self.config.api).context("Failed to build API client")?;

        let path = self.storage_path();
        self.output.debug(&format!("Storage: {}", path.display()));
        let storage = FileStore::open(&path)
            .with_context(|| format!("Failed to open storage: {}", path.display()))?;

        let store = CartStore::open(catalog, storage, self.config.cart.clone())
            .context("Failed to load cart")?;
        tracing::debug!(
            api = %self.config.api.base_url,
            items = store.cart().len(),
            "cart opened"
        );
        Ok(NotifyingCart::new(Arc::new(store), self.output.clone()))
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find a config file in the directory tree, starting at `start`.
pub fn find_config(start: &Path) -> Option<CliConfig> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.exists() {
                match CliConfig::load(config_path.to_str()?) {
                    Ok(config) => return Some(config),
                    Err(e) => tracing::warn!(
                        path = %config_path.display(),
                        error = %format!("{e:#}"),
                        "skipping unreadable config file"
                    ),
                }
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Get the platform-specific data directory.
fn dirs_path() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        PathBuf::from("/tmp")
    }
}
