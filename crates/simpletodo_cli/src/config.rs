//! CLI configuration resolved from flags, environment and platform defaults.

use anyhow::{anyhow, Context};
use simpletodo_core::{default_log_level, SqliteStoreOptions};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "simpletodo";
const DB_FILE_NAME: &str = "simpletodo.sqlite3";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub quota_bytes: Option<u64>,
    pub memory: bool,
}

impl Config {
    /// Fills unset values with defaults.
    ///
    /// `data_dir` falls back to the platform data directory, or to the temp
    /// directory in memory mode. Relative paths are resolved against the
    /// current directory so log setup sees an absolute path.
    pub fn resolve(
        data_dir: Option<PathBuf>,
        log_level: Option<&str>,
        quota_bytes: Option<u64>,
        memory: bool,
    ) -> anyhow::Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => absolutize(&dir)?,
            None => match dirs::data_dir() {
                Some(base) => base.join(APP_DIR_NAME),
                None if memory => std::env::temp_dir().join(APP_DIR_NAME),
                None => return Err(anyhow!("no platform data directory; pass --data-dir")),
            },
        };

        Ok(Self {
            data_dir,
            log_level: log_level.unwrap_or(default_log_level()).to_string(),
            quota_bytes,
            memory,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    pub fn store_options(&self) -> SqliteStoreOptions {
        SqliteStoreOptions {
            quota_bytes: self.quota_bytes,
        }
    }
}

fn absolutize(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("resolve current directory")?;
    Ok(cwd.join(path))
}
