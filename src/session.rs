//! A running showcase: one configuration source driving one feed controller.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::info;

use crate::config::{DeploymentMode, RuntimeConfig};
use crate::controller::{FeedController, FeedSnapshot};
use crate::gateway::{Endpoints, FeedGateway, HttpTransport, UreqTransport};
use crate::models::Settings;
use crate::settings::{ConfigSource, SettingsError, SettingsStore};
use crate::sheet::SheetSource;

pub struct Session {
    source: ConfigSource,
    feed: FeedController,
    /// Serialises admin saves so the store and the feed agree on the winner.
    save_lock: Mutex<()>,
}

impl Session {
    /// Resolves settings and runs the initial feed fetch. Fails only when
    /// the sheet variant cannot produce settings.
    pub async fn start(source: ConfigSource, gateway: Arc<FeedGateway>) -> Result<Self> {
        let settings = source
            .resolve()
            .await
            .context("Failed to load application settings")?;
        let feed = FeedController::new(gateway);
        feed.apply_settings(settings).await;
        info!(read_only = source.is_read_only(), "showcase session started");
        Ok(Self {
            source,
            feed,
            save_lock: Mutex::new(()),
        })
    }

    /// Starts a session from runtime configuration with the real HTTP stack.
    pub async fn from_config(config: &RuntimeConfig) -> Result<Self> {
        let transport: Arc<dyn HttpTransport> =
            Arc::new(UreqTransport::new(config.request_timeout));
        let source = config_source(config, Arc::clone(&transport));
        let gateway = Arc::new(FeedGateway::new(transport, Endpoints::default()));
        Self::start(source, gateway).await
    }

    pub fn is_read_only(&self) -> bool {
        self.source.is_read_only()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.feed.snapshot()
    }

    /// Current settings including the API key.
    pub fn settings(&self) -> Settings {
        self.feed.snapshot().settings.unwrap_or_default()
    }

    pub async fn load_more(&self) -> bool {
        self.feed.load_more().await
    }

    pub async fn refresh(&self) {
        self.feed.refresh().await
    }

    /// Saves an admin edit and re-fetches the feed for it.
    ///
    /// A persistence failure still applies the new settings to the session;
    /// the error is returned so the caller can decide whether to show it.
    pub async fn save_settings(&self, settings: Settings) -> Result<(), SettingsError> {
        let _guard = self.save_lock.lock().await;
        let outcome = self.source.save(settings.clone());
        match outcome {
            Ok(()) | Err(SettingsError::Persistence(_)) => {
                self.feed.apply_settings(settings).await;
            }
            Err(_) => {}
        }
        outcome
    }
}

/// Picks the configuration source for the deployment mode.
pub fn config_source(config: &RuntimeConfig, transport: Arc<dyn HttpTransport>) -> ConfigSource {
    match config.mode {
        DeploymentMode::Local => ConfigSource::Local(SettingsStore::load(
            &config.settings_path,
            Settings::default(),
        )),
        DeploymentMode::Sheet => ConfigSource::Sheet(SheetSource::new(&config.sheet_url, transport)),
    }
}
