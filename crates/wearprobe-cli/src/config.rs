//! Configuration file management for wearprobe.
//!
//! Provides a TOML config file at `~/.config/wearprobe/config.toml` and a
//! resolution chain: CLI flag > env var > default path.
//!
//! The file doubles as the static configuration source the harness reads:
//! its `[MWDAT]` table is handed to the harness verbatim. The optional
//! `[simulator]` and `[harness]` tables tune the simulated SDK and the
//! harness itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use wearprobe_core::HarnessOptions;
use wearprobe_core::sdk::SimulatorSettings;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "WEARPROBE_CONFIG";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

/// The config file as written by `wearprobe init`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(rename = "MWDAT")]
    pub mwdat: MwdatSection,
    #[serde(default)]
    pub simulator: SimulatorSettings,
    #[serde(default)]
    pub harness: HarnessSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MwdatSection {
    #[serde(rename = "MetaAppID", skip_serializing_if = "Option::is_none")]
    pub meta_app_id: Option<String>,
    #[serde(rename = "ClientToken", skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
    #[serde(rename = "TeamID", skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(rename = "AppLinkURLScheme", skip_serializing_if = "Option::is_none")]
    pub app_link_url_scheme: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessSection {
    /// Register automatically this many milliseconds after startup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_register_after_ms: Option<u64>,
}

impl HarnessSection {
    pub fn to_options(&self) -> HarnessOptions {
        HarnessOptions {
            auto_register: self.auto_register_after_ms.map(Duration::from_millis),
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the wearprobe config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/wearprobe` or
/// `~/.config/wearprobe`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("wearprobe");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("wearprobe")
}

/// Return the default path to the config file.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Pick the config path: `cli_path` > `WEARPROBE_CONFIG` > default.
pub fn config_path(cli_path: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_path {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    default_config_path()
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // The client token is a credential: owner read/write only.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone)]
pub struct WearprobeConfig {
    pub path: PathBuf,
    /// The whole file as a table; the harness reads `[MWDAT]` from it.
    pub source: toml::Table,
    pub simulator: SimulatorSettings,
    pub harness: HarnessSection,
}

impl WearprobeConfig {
    /// Locate and load the config file.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        let path = config_path(cli_path);
        if !path.exists() {
            bail!(
                "config file not found at {}\nRun `wearprobe init` to create one.",
                path.display()
            );
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        Self::parse(path, &contents)
    }

    /// Parse config text. The `[MWDAT]` table is kept as-is, even when it is
    /// missing or malformed; the harness reports that itself.
    pub fn parse(path: PathBuf, contents: &str) -> Result<Self> {
        let source: toml::Table = contents
            .parse()
            .with_context(|| format!("failed to parse config file at {}", path.display()))?;

        let simulator = match source.get("simulator") {
            Some(value) => value
                .clone()
                .try_into::<SimulatorSettings>()
                .context("invalid [simulator] section")?,
            None => SimulatorSettings::default(),
        };
        let harness = match source.get("harness") {
            Some(value) => value
                .clone()
                .try_into::<HarnessSection>()
                .context("invalid [harness] section")?,
            None => HarnessSection::default(),
        };

        Ok(Self {
            path,
            source,
            simulator,
            harness,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
