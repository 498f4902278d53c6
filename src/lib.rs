//! # Postbox
//!
//! A Postman-style HTTP request composer and inspector.
//!
//! ## Features
//! - HTTP methods: GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS
//! - Free-text header editing with duplicate keys
//! - JSON responses re-indented, with timing and payload sizes
//! - Case-insensitive search over the response with match navigation
//! - JSON path queries over the response
//! - Workspaces and collections persisted to a single JSON file
//! - Postman Collection v2.1 import/export
//!
//! ## Architecture
//! Actor-based with channels:
//! - Front end - line-oriented prompt, or any other consumer of [`RenderState`]
//! - App Layer (state machine owning the store and the search view)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod headers;
pub mod json_query;
pub mod messages;
pub mod models;
pub mod network;
pub mod postman;
pub mod search;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use headers::{headers_to_text, parse_headers, HeaderList};
pub use models::{format_size, Collection, HttpMethod, HttpResponse, Request, StatusClass, Workspace};
pub use postman::{export_collection, export_collection_json, import_collection};
pub use search::{find_matches, Match, ResponseView, SearchPhase};
pub use storage::Storage;
pub use messages::{UiEvent, NetworkCommand, NetworkResponse, RenderState};
pub use app::{AppState, AppActor};
pub use network::NetworkActor;
