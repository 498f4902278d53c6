//! Command-line configuration

use std::path::PathBuf;

use clap::Parser;

use crate::constants::DEFAULT_LOG_FILE;
use crate::storage::default_store_path;

#[derive(Debug, Clone, Parser)]
#[command(name = "postbox", about = "Compose, send and organise HTTP requests", author, version)]
pub struct Config {
    /// Workspace store file (defaults to ~/.postbox-workspaces.json)
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,
    /// Where log output goes; stdout belongs to the prompt
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

impl Config {
    pub fn store_path(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(default_store_path)
    }

    /// Splits the log path into the directory and file name the appender wants.
    pub fn log_location(&self) -> (PathBuf, PathBuf) {
        let dir = match self.log_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file = self
            .log_file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
        (dir, file)
    }
}
