//! Where the session's settings record comes from.
//!
//! A deployment runs exactly one [`ConfigSource`]: either an editable JSON
//! blob on local disk or a read-only spreadsheet export.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::Settings;
use crate::sheet::SheetSource;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("creating {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("serializing settings: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("writing {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0}")]
    Invalid(String),
    #[error("settings are read-only in sheet mode")]
    ReadOnly,
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// The locally persisted settings blob.
///
/// The in-memory copy is authoritative for the session; the file only
/// matters at the next startup.
pub struct SettingsStore {
    path: PathBuf,
    current: RwLock<Settings>,
}

impl SettingsStore {
    /// Restores the blob at `path`, falling back to `defaults` when it is
    /// missing or cannot be parsed.
    pub fn load(path: impl Into<PathBuf>, defaults: Settings) -> Self {
        let path = path.into();
        let current = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), "ignoring unparsable settings blob: {err}");
                defaults
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => defaults,
            Err(err) => {
                warn!(path = %path.display(), "failed to read settings blob: {err}");
                defaults
            }
        };

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Settings {
        self.current.read().clone()
    }

    /// Replaces the in-memory record, then writes the whole record to disk.
    /// The in-memory copy keeps the new value even when the write fails.
    ///
    /// The write lock is held until the file is in place, so concurrent saves
    /// land on disk in the same order they land in memory.
    pub fn save(&self, settings: Settings) -> Result<(), PersistenceError> {
        let mut current = self.current.write();
        *current = settings;
        match write_json_atomic(&self.path, &*current) {
            Ok(()) => {
                info!(path = %self.path.display(), "saved settings");
                Ok(())
            }
            Err(err) => {
                warn!("failed to persist settings: {err}");
                Err(err)
            }
        }
    }
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PersistenceError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let payload = serde_json::to_vec_pretty(value)?;
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let write_err = |source: io::Error| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(&payload).map_err(write_err)?;
    tmp.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}

/// The two deployment flavours of the configuration source.
pub enum ConfigSource {
    Local(SettingsStore),
    Sheet(SheetSource),
}

impl ConfigSource {
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Sheet(_))
    }

    /// Resolves the startup settings. Only the sheet variant can fail.
    pub async fn resolve(&self) -> Result<Settings> {
        match self {
            Self::Local(store) => Ok(store.get()),
            Self::Sheet(sheet) => {
                let sheet = sheet.clone();
                tokio::task::spawn_blocking(move || sheet.fetch())
                    .await
                    .context("settings sheet task panicked")?
            }
        }
    }

    /// Validates and stores an admin edit. Sheet deployments refuse writes.
    pub fn save(&self, settings: Settings) -> Result<(), SettingsError> {
        let Self::Local(store) = self else {
            return Err(SettingsError::ReadOnly);
        };
        settings
            .validate()
            .map_err(|err| SettingsError::Invalid(err.to_string()))?;
        store.save(settings).map_err(SettingsError::from)
    }
}
