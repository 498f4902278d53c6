//! UI events - messages from UI layer to App layer

use tokio::sync::oneshot;

use crate::models::HttpMethod;

/// Events generated from user input in the front end.
///
/// Requests that need an answer back (export, copy) carry a oneshot sender.
#[derive(Debug)]
pub enum UiEvent {
    // Request editor
    SetMethod(HttpMethod),
    SetUrl(String),
    /// Free-text header block, one "Key: Value" per line
    SetHeaders(String),
    SetBody(String),
    SendRequest,

    // Response search
    Search(String),
    NextMatch,
    PrevMatch,
    ClearSearch,

    // Response tools
    JsonQuery(String),
    CopyResponse(oneshot::Sender<String>),

    // Workspace tree
    CreateWorkspace(String),
    CreateCollection(String),
    SelectWorkspace(String),
    SelectCollection(String),

    // Saved requests in the selected collection
    SaveRequest,
    LoadRequest(usize),
    RenameRequest { index: usize, name: String },
    /// Sent only after the front end has confirmed the deletion
    DeleteRequest(usize),

    // Postman interchange
    ImportPostman(Vec<u8>),
    ExportPostman(oneshot::Sender<Result<Vec<u8>, String>>),

    // System
    Quit,
}
