//! CLI configuration loading, resolution and saving.
//!
//! Merchant settings come from `~/.qpay/config.huml` with priority order:
//! `--sandbox` > environment variables > config file > defaults.

use anyhow::{Context, Result};
use qpay_core::{ClientConfig, DEFAULT_BASE_URL, SANDBOX_BASE_URL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Settings stored in the config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub invoice_code: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
}

/// Configuration after applying priority rules. Unset values are empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub invoice_code: String,
    pub callback_url: String,
}

impl ResolvedConfig {
    /// Builds gateway client settings, failing if credentials are missing.
    pub fn client_config(&self) -> qpay_core::Result<ClientConfig> {
        ClientConfig::new(&self.base_url, &self.username, &self.password)
    }

    /// Converts back to the stored form, dropping empty values.
    pub fn to_file_config(&self) -> FileConfig {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        FileConfig {
            base_url: non_empty(&self.base_url),
            username: non_empty(&self.username),
            password: non_empty(&self.password),
            invoice_code: non_empty(&self.invoice_code),
            callback_url: non_empty(&self.callback_url),
        }
    }
}

/// Returns the config directory path (~/.qpay).
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|h| h.join(".qpay"))
        .context("Could not determine home directory")
}

/// Returns the config file path, honoring `QPAY_CONFIG`.
pub fn config_path() -> Result<PathBuf> {
    match std::env::var("QPAY_CONFIG") {
        Ok(p) if !p.is_empty() => Ok(PathBuf::from(p)),
        _ => Ok(config_dir()?.join("config.huml")),
    }
}

/// Load configuration from the config file.
///
/// Returns `Ok(None)` if the config file doesn't exist.
/// Returns an error if the file exists but is invalid.
pub fn load_file_config(path: &Path) -> Result<Option<FileConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let config: FileConfig = huml_rs::serde::from_str(&content)
        .with_context(|| format!("Invalid HUML in {}", path.display()))?;

    check_file_permissions(path);

    Ok(Some(config))
}

/// Loads the config file (if any) and resolves it against the environment.
pub fn load(sandbox: bool) -> Result<ResolvedConfig> {
    let path = config_path()?;
    let file_config = load_file_config(&path)?;
    Ok(resolve(file_config, sandbox))
}

/// Resolve configuration by applying priority rules.
///
/// Priority order (highest to lowest):
/// 1. `--sandbox` (base URL only)
/// 2. Environment variables (`QPAY_BASE_URL`, `QPAY_USERNAME`, ...)
/// 3. Config file
/// 4. Defaults (`https://merchant.qpay.mn`)
pub fn resolve(file_config: Option<FileConfig>, sandbox: bool) -> ResolvedConfig {
    let file = file_config.unwrap_or_default();

    let pick = |env_key: &str, file_value: Option<String>| -> String {
        env_value(env_key)
            .or(file_value.filter(|v| !v.is_empty()))
            .unwrap_or_default()
    };

    let mut base_url = pick("QPAY_BASE_URL", file.base_url);
    if base_url.is_empty() {
        base_url = DEFAULT_BASE_URL.to_string();
    }
    if sandbox {
        base_url = SANDBOX_BASE_URL.to_string();
    }

    ResolvedConfig {
        base_url,
        username: pick("QPAY_USERNAME", file.username),
        password: pick("QPAY_PASSWORD", file.password),
        invoice_code: pick("QPAY_INVOICE_CODE", file.invoice_code),
        callback_url: pick("QPAY_CALLBACK_URL", file.callback_url),
    }
}

/// Reads an environment variable, treating empty values as unset.
fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Write config to file with HUML formatting and secure permissions.
pub fn save(path: &Path, config: &FileConfig) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        #[cfg(unix)]
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }

    let content = serialize_to_huml(config);
    fs::write(path, &content).with_context(|| format!("Failed to write {}", path.display()))?;

    // Owner read/write only: the file holds the merchant password
    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}

/// Serialize config to HUML format.
fn serialize_to_huml(config: &FileConfig) -> String {
    let mut output = String::from("%HUML v0.2.0\n");

    let entries = [
        ("base_url", &config.base_url),
        ("username", &config.username),
        ("password", &config.password),
        ("invoice_code", &config.invoice_code),
        ("callback_url", &config.callback_url),
    ];

    for (key, value) in entries {
        if let Some(value) = value {
            output.push_str(&format!("{}: \"{}\"\n", key, escape(value)));
        }
    }

    output
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Warn if config file has overly permissive permissions (on Unix).
#[cfg(unix)]
fn check_file_permissions(path: &Path) {
    if let Ok(metadata) = fs::metadata(path) {
        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            eprintln!(
                "Warning: {} has overly permissive permissions ({:o}). Consider running: chmod 600 {}",
                path.display(),
                mode & 0o777,
                path.display()
            );
        }
    }
}

#[cfg(not(unix))]
fn check_file_permissions(_path: &Path) {}

/// Mask a secret for display.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        "(not set)".to_string()
    } else {
        "********".to_string()
    }
}
