#![forbid(unsafe_code)]

use anyhow::{Context, Result, bail};
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::sheet::DEFAULT_SHEET_URL;

pub const DEFAULT_ENV_PATH: &str = ".env";
pub const DEFAULT_SHOWCASE_PORT: u16 = 8080;
pub const DEFAULT_SHOWCASE_HOST: &str = "127.0.0.1";
pub const DEFAULT_SETTINGS_PATH: &str = "showcase_settings.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Which configuration source a deployment runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentMode {
    /// Editable settings blob on local disk.
    #[default]
    Local,
    /// Read-only settings from a published spreadsheet export.
    Sheet,
}

impl DeploymentMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "admin" => Ok(Self::Local),
            "sheet" | "remote" | "csv" => Ok(Self::Sheet),
            other => bail!("unknown SHOWCASE_MODE `{other}` (expected `local` or `sheet`)"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Sheet => "sheet",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub mode: DeploymentMode,
    pub settings_path: PathBuf,
    pub sheet_url: String,
    pub host: String,
    pub port: u16,
    pub admin_secret: Option<String>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct RuntimeOverrides {
    pub mode: Option<DeploymentMode>,
    pub settings_path: Option<PathBuf>,
    pub sheet_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub env_path: Option<PathBuf>,
}

pub fn resolve_runtime_config(overrides: RuntimeOverrides) -> Result<RuntimeConfig> {
    let env_path = overrides
        .env_path
        .as_deref()
        .unwrap_or_else(|| Path::new(DEFAULT_ENV_PATH));
    let file_vars = read_env_file(env_path)?;
    build_runtime_config_with_overrides(&file_vars, env_var_string, overrides)
}

#[cfg(test)]
fn build_runtime_config(
    file_vars: &HashMap<String, String>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Result<RuntimeConfig> {
    build_runtime_config_with_overrides(file_vars, env_lookup, RuntimeOverrides::default())
}

fn build_runtime_config_with_overrides(
    file_vars: &HashMap<String, String>,
    env_lookup: impl Fn(&str) -> Option<String>,
    overrides: RuntimeOverrides,
) -> Result<RuntimeConfig> {
    let mode = match overrides.mode {
        Some(mode) => mode,
        None => lookup_value("SHOWCASE_MODE", file_vars, &env_lookup)
            .map(|value| DeploymentMode::parse(&value))
            .transpose()?
            .unwrap_or_default(),
    };
    let settings_path = overrides
        .settings_path
        .or_else(|| lookup_value("SHOWCASE_SETTINGS_PATH", file_vars, &env_lookup).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
    let sheet_url = non_blank(overrides.sheet_url)
        .or_else(|| lookup_value("SHOWCASE_SHEET_URL", file_vars, &env_lookup))
        .unwrap_or_else(|| DEFAULT_SHEET_URL.to_string());
    let host = non_blank(overrides.host)
        .or_else(|| lookup_value("SHOWCASE_HOST", file_vars, &env_lookup))
        .unwrap_or_else(|| DEFAULT_SHOWCASE_HOST.to_string());
    let port = overrides
        .port
        .or_else(|| {
            lookup_value("SHOWCASE_PORT", file_vars, &env_lookup)
                .and_then(|value| value.parse::<u16>().ok())
        })
        .unwrap_or(DEFAULT_SHOWCASE_PORT);
    let admin_secret = lookup_value("SHOWCASE_ADMIN_SECRET", file_vars, &env_lookup);
    let timeout_secs = lookup_value("SHOWCASE_REQUEST_TIMEOUT_SECS", file_vars, &env_lookup)
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

    Ok(RuntimeConfig {
        mode,
        settings_path,
        sheet_url,
        host,
        port,
        admin_secret,
        request_timeout: Duration::from_secs(timeout_secs),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_var_string(key: &str) -> Option<String> {
    non_blank(env::var(key).ok())
}

fn lookup_value(
    key: &str,
    file_vars: &HashMap<String, String>,
    env_lookup: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    env_lookup(key)
        .or_else(|| file_vars.get(key).cloned())
        .filter(|value| !value.trim().is_empty())
}

/// Reads `KEY=value` pairs, skipping blanks and `#` comments and accepting an
/// `export ` prefix and single or double quotes.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return Ok(vars);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, value_raw)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value_raw.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|value| value.strip_suffix('"'))
            .or_else(|| {
                value
                    .strip_prefix('\'')
                    .and_then(|value| value.strip_suffix('\''))
            })
            .unwrap_or(value);
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn make_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    fn runtime_from(contents: &str) -> RuntimeConfig {
        let cfg = make_config(contents);
        let vars = read_env_file(cfg.path()).unwrap();
        build_runtime_config(&vars, |_| None).unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let runtime = runtime_from("");
        assert_eq!(runtime.mode, DeploymentMode::Local);
        assert_eq!(runtime.settings_path, PathBuf::from(DEFAULT_SETTINGS_PATH));
        assert_eq!(runtime.sheet_url, DEFAULT_SHEET_URL);
        assert_eq!(runtime.host, DEFAULT_SHOWCASE_HOST);
        assert_eq!(runtime.port, DEFAULT_SHOWCASE_PORT);
        assert!(runtime.admin_secret.is_none());
        assert_eq!(
            runtime.request_timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }

    #[test]
    fn reads_sheet_mode_and_url() {
        let runtime = runtime_from(
            "SHOWCASE_MODE=\"sheet\"\nSHOWCASE_SHEET_URL=\"https://sheet.test/export?format=csv\"\n",
        );
        assert_eq!(runtime.mode, DeploymentMode::Sheet);
        assert_eq!(runtime.sheet_url, "https://sheet.test/export?format=csv");
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let vars = read_env_file(make_config("SHOWCASE_MODE=cloud\n").path()).unwrap();
        let err = build_runtime_config(&vars, |_| None).unwrap_err();
        assert!(err.to_string().contains("unknown SHOWCASE_MODE"));
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let runtime = runtime_from(
            "SHOWCASE_PORT=\"nope\"\nSHOWCASE_REQUEST_TIMEOUT_SECS=\"0\"\n",
        );
        assert_eq!(runtime.port, DEFAULT_SHOWCASE_PORT);
        assert_eq!(
            runtime.request_timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }

    #[test]
    fn blank_secret_means_disabled() {
        let runtime = runtime_from("SHOWCASE_ADMIN_SECRET=\"   \"\n");
        assert!(runtime.admin_secret.is_none());
        let runtime = runtime_from("SHOWCASE_ADMIN_SECRET='hunter2'\n");
        assert_eq!(runtime.admin_secret.as_deref(), Some("hunter2"));
    }

    #[test]
    fn env_wins_over_file() {
        let vars = read_env_file(make_config("SHOWCASE_PORT=\"7000\"\n").path()).unwrap();
        let runtime = build_runtime_config(&vars, |key| {
            if key == "SHOWCASE_PORT" {
                Some("7100".to_string())
            } else {
                None
            }
        })
        .unwrap();
        assert_eq!(runtime.port, 7100);
    }

    #[test]
    fn overrides_win_over_everything() {
        let mut vars = HashMap::new();
        vars.insert("SHOWCASE_MODE".to_string(), "sheet".to_string());
        vars.insert("SHOWCASE_HOST".to_string(), "file-host".to_string());
        vars.insert("SHOWCASE_SETTINGS_PATH".to_string(), "/file.json".to_string());

        let runtime = build_runtime_config_with_overrides(
            &vars,
            |key| (key == "SHOWCASE_PORT").then(|| "8000".to_string()),
            RuntimeOverrides {
                mode: Some(DeploymentMode::Local),
                settings_path: Some(PathBuf::from("/override.json")),
                host: Some("   ".into()),
                port: Some(9000),
                ..RuntimeOverrides::default()
            },
        )
        .unwrap();

        assert_eq!(runtime.mode, DeploymentMode::Local);
        assert_eq!(runtime.settings_path, PathBuf::from("/override.json"));
        assert_eq!(runtime.host, "file-host");
        assert_eq!(runtime.port, 9000);
    }

    #[test]
    fn read_env_file_handles_export_and_quotes() {
        let cfg = make_config(
            r#"
            export SHOWCASE_MODE="sheet"
            SHOWCASE_HOST='0.0.0.0'
            SHOWCASE_PORT =  "9090"
            # comment
            INVALID_LINE
            "#,
        );
        let vars = read_env_file(cfg.path()).unwrap();
        assert_eq!(vars.get("SHOWCASE_MODE").unwrap(), "sheet");
        assert_eq!(vars.get("SHOWCASE_HOST").unwrap(), "0.0.0.0");
        assert_eq!(vars.get("SHOWCASE_PORT").unwrap(), "9090");
        assert!(!vars.contains_key("INVALID_LINE"));
    }

    #[test]
    fn read_env_file_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let vars = read_env_file(&dir.path().join("missing.env")).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn mode_aliases_parse() {
        assert_eq!(DeploymentMode::parse("CSV").unwrap(), DeploymentMode::Sheet);
        assert_eq!(DeploymentMode::parse(" admin ").unwrap(), DeploymentMode::Local);
        assert_eq!(DeploymentMode::Sheet.as_str(), "sheet");
    }
}
