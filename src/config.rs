//! Runtime configuration.
//!
//! Values come from `PLANBOARD_*` environment variables (a `.env` file is
//! honored), then `<store>/config.yaml`, then defaults.

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::Deserialize;

use crate::aggregator::UnknownIdPolicy;
use crate::error::{Error, Result};
use crate::task::Category;

/// Store root when `PLANBOARD_STORE` is unset.
pub const DEFAULT_STORE: &str = ".planboard";

/// Settings file name inside the store root.
pub const CONFIG_FILE: &str = "config.yaml";

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root directory of the file store.
    pub store_root: PathBuf,
    /// Identity whose tasks are shown.
    pub identity: String,
    /// Whether workspace tasks are merged in.
    pub workspace_tasks: bool,
    /// Webhook receiving task-created notifications.
    pub notify_url: Option<String>,
    /// Offset defining the local day; `None` uses the system offset.
    pub utc_offset: Option<FixedOffset>,
    /// Routing for ids missing from the view.
    pub unknown_id_policy: UnknownIdPolicy,
    /// Categories hidden when the view opens.
    pub hidden_categories: Vec<Category>,
}

/// Shape of `config.yaml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    identity: Option<String>,
    workspace_tasks: Option<bool>,
    notify_url: Option<String>,
    utc_offset_minutes: Option<i32>,
    unknown_id_policy: Option<UnknownIdPolicy>,
    hidden_categories: Vec<Category>,
}

impl Config {
    /// Loads configuration from the process environment and the store's
    /// `config.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but cannot be read or
    /// parsed, or if a value is out of range.
    pub fn load() -> Result<Self> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();
        let env = |key: &str| std::env::var(key).ok();
        let path = store_root(&env).join(CONFIG_FILE);
        let file = match std::fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => return Err(Error::Io { path, source }),
        };
        Self::from_lookup(env, file.as_deref())
    }

    /// Builds configuration from an environment lookup and optional
    /// `config.yaml` contents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for unparseable values and
    /// [`Error::Yaml`] for a malformed settings file.
    pub fn from_lookup<F>(lookup: F, file: Option<&str>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: FileConfig = match file {
            Some(contents) if !contents.trim().is_empty() => serde_yaml::from_str(contents)?,
            _ => FileConfig::default(),
        };

        let identity = lookup("PLANBOARD_IDENTITY")
            .or(file.identity)
            .or_else(|| lookup("USER"))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "me".to_string());

        let workspace_tasks = match lookup("PLANBOARD_WORKSPACE_TASKS") {
            Some(raw) => parse_bool("PLANBOARD_WORKSPACE_TASKS", &raw)?,
            None => file.workspace_tasks.unwrap_or(true),
        };

        let notify_url =
            lookup("PLANBOARD_NOTIFY_URL").or(file.notify_url).filter(|s| !s.trim().is_empty());

        let offset_minutes = match lookup("PLANBOARD_UTC_OFFSET_MINUTES") {
            Some(raw) => Some(raw.trim().parse::<i32>().map_err(|e| {
                Error::InvalidConfig(format!("PLANBOARD_UTC_OFFSET_MINUTES={raw}: {e}"))
            })?),
            None => file.utc_offset_minutes,
        };
        let utc_offset = offset_minutes.map(offset_from_minutes).transpose()?;

        let unknown_id_policy = match lookup("PLANBOARD_UNKNOWN_ID") {
            Some(raw) => raw
                .parse::<UnknownIdPolicy>()
                .map_err(|e| Error::InvalidConfig(format!("PLANBOARD_UNKNOWN_ID: {e}")))?,
            None => file.unknown_id_policy.unwrap_or_default(),
        };

        Ok(Self {
            store_root: store_root(&lookup),
            identity,
            workspace_tasks,
            notify_url,
            utc_offset,
            unknown_id_policy,
            hidden_categories: file.hidden_categories,
        })
    }

    /// Path of the settings file for this store.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.store_root.join(CONFIG_FILE)
    }
}

fn store_root<F: Fn(&str) -> Option<String>>(lookup: &F) -> PathBuf {
    lookup("PLANBOARD_STORE")
        .filter(|s| !s.trim().is_empty())
        .map_or_else(|| Path::new(DEFAULT_STORE).to_path_buf(), PathBuf::from)
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::InvalidConfig(format!("{key}={other}: expected true or false"))),
    }
}

fn offset_from_minutes(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| Error::InvalidConfig(format!("UTC offset of {minutes} minutes is out of range")))
}
