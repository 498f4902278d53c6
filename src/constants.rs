//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// File name of the persisted workspace store, placed in the home directory
pub const STORE_FILE_NAME: &str = ".postbox-workspaces.json";

/// Default log file, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "postbox.log";

/// `info.schema` value written on Postman export
pub const POSTMAN_SCHEMA_V21: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Markers around the current search match
pub const CURRENT_MATCH_OPEN: &str = "【";
pub const CURRENT_MATCH_CLOSE: &str = "】";

/// Markers around every other search match
pub const OTHER_MATCH_OPEN: &str = "〔";
pub const OTHER_MATCH_CLOSE: &str = "〕";

/// Application name
pub const APP_NAME: &str = "postbox";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
