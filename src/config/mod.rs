use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_DATABASE: &str = "TIMESHEET_DB";
pub const ENV_BIND: &str = "TIMESHEET_BIND";
pub const ENV_HASHED_PASSWORD: &str = "HASHED_PASSWORD";
pub const ENV_SESSION_SECRET: &str = "SESSION_SECRET";
pub const ENV_SESSION_TTL: &str = "TIMESHEET_SESSION_TTL";

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashed_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

/// Fourteen days.
fn default_session_ttl() -> u64 {
    14 * 24 * 60 * 60
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            bind: default_bind(),
            hashed_password: None,
            session_secret: None,
            session_ttl_secs: default_session_ttl(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rtimesheet")
        } else {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.join(".rtimesheet")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rtimesheet.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rtimesheet.sqlite")
    }

    /// Resolve a user-supplied database path: `~` is expanded and relative
    /// paths live under the configuration directory.
    pub fn resolve_db_path(raw: &str) -> PathBuf {
        let p = PathBuf::from(expand_tilde(raw));
        if p.is_absolute() {
            p
        } else {
            Self::config_dir().join(p)
        }
    }

    /// Load the config file (defaults when missing), then apply environment overrides.
    pub fn load() -> AppResult<Self> {
        let mut cfg = Self::from_file(&Self::config_file())?;
        cfg.apply_overrides(|key| env::var(key).ok());
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let mut cfg: Config = serde_yaml::from_str(&content)?;
        cfg.database = Self::resolve_db_path(&cfg.database)
            .to_string_lossy()
            .to_string();
        cfg.hashed_password = non_empty(cfg.hashed_password);
        cfg.session_secret = non_empty(cfg.session_secret);
        Ok(cfg)
    }

    /// Override fields from `lookup` (the process environment in production).
    /// Empty values are treated as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = non_empty(lookup(ENV_DATABASE)) {
            self.database = Self::resolve_db_path(&db).to_string_lossy().to_string();
        }
        if let Some(bind) = non_empty(lookup(ENV_BIND)) {
            self.bind = bind;
        }
        if let Some(hash) = non_empty(lookup(ENV_HASHED_PASSWORD)) {
            self.hashed_password = Some(hash);
        }
        if let Some(secret) = non_empty(lookup(ENV_SESSION_SECRET)) {
            self.session_secret = Some(secret);
        }
        if let Some(ttl) = non_empty(lookup(ENV_SESSION_TTL)).and_then(|s| s.parse().ok()) {
            self.session_ttl_secs = ttl;
        }
    }

    /// Session secret required to run the server.
    ///
    /// There is deliberately no built-in fallback: an unset secret is a
    /// startup error.
    pub fn require_session_secret(&self) -> AppResult<&str> {
        self.session_secret.as_deref().ok_or_else(|| {
            AppError::Config(format!(
                "{ENV_SESSION_SECRET} is not set; refusing to start without a session signing secret"
            ))
        })
    }

    /// Copy with secrets masked, for printing.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.hashed_password.is_some() {
            cfg.hashed_password = Some(REDACTED.to_string());
        }
        if cfg.session_secret.is_some() {
            cfg.session_secret = Some(REDACTED.to_string());
        }
        cfg
    }

    /// Initialize configuration and database files.
    /// Returns the database path that was configured.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => Self::resolve_db_path(&name),
            None => Self::database_file(),
        };

        let mut config = Self::from_file(&Self::config_file())?;
        config.database = db_path.to_string_lossy().to_string();

        if !is_test {
            let yaml = serde_yaml::to_string(&config)?;
            fs::write(Self::config_file(), yaml)?;
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(db_path)
    }
}
