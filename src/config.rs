use chrono::{
    format::{Item, StrftimeItems},
    DateTime, TimeZone,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Write};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// An extra link shown in the navbar after the built-in ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub uri: String,
    pub name: String,
}

/// Site configuration, resolved once at startup and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Schema script to use instead of the built-in one.
    pub schema_path: Option<String>,

    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub copyright: String,

    #[serde(default)]
    pub navbar_addl: Vec<NavLink>,

    /// Show the newest posts first on the front page.
    #[serde(default = "default_true")]
    pub latest_first: bool,

    /// Same as `latest_first`, for `/view_category/*` pages.
    #[serde(default = "default_true")]
    pub latest_first_in_categories: bool,

    /// strftime format used for `Entry::posted`.
    #[serde(default = "default_time_format")]
    pub time_format: String,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("silvr");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("silvr.db").to_string_lossy().to_string()
}

fn default_secret_key() -> String {
    "dev key".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "default".to_string()
}

fn default_title() -> String {
    "Silvr".to_string()
}

fn default_true() -> bool {
    true
}

fn default_time_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            schema_path: None,
            debug: false,
            secret_key: default_secret_key(),
            username: default_username(),
            password: default_password(),
            title: default_title(),
            copyright: String::new(),
            navbar_addl: Vec::new(),
            latest_first: true,
            latest_first_in_categories: true,
            time_format: default_time_format(),
            bind_address: default_bind_address(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("silvr")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.secret_key.is_empty() {
            return Err(AppError::Config("secret_key must not be empty".to_string()));
        }
        if self.time_format.is_empty() {
            return Err(AppError::Config("time_format must not be empty".to_string()));
        }
        if StrftimeItems::new(&self.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(AppError::Config(format!(
                "time_format {:?} is not a valid strftime format",
                self.time_format
            )));
        }
        Ok(())
    }

    /// Format `when` with `time_format`. Fails instead of panicking on a
    /// format chrono cannot render.
    pub fn timestamp<Tz>(&self, when: &DateTime<Tz>) -> Result<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut out = String::new();
        write!(out, "{}", when.format(&self.time_format)).map_err(|_| {
            AppError::Config(format!("cannot format timestamp with {:?}", self.time_format))
        })?;
        Ok(out)
    }
}
