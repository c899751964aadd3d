use crate::storage::{FileStore, STORAGE_KEY};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const APP_DIR: &str = "personal_diary";
const LOG_FILE: &str = "diary.log";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_level: Option<String>,
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>, log_level: Option<String>) -> Self {
        Config {
            data_dir: data_dir.unwrap_or_else(default_data_dir),
            log_level,
        }
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(&self.data_dir)
    }

    pub fn entries_file(&self) -> PathBuf {
        self.store().path_for(STORAGE_KEY)
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    /// `--log-level` wins over `RUST_LOG`, which wins over `default`.
    pub fn log_filter(&self, default: &str) -> EnvFilter {
        match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}
