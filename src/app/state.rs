//! App state - pure data structure with no I/O logic beyond the store

use crate::headers::headers_to_text;
use crate::messages::RenderState;
use crate::models::{HttpMethod, HttpResponse, Request};
use crate::search::ResponseView;
use crate::storage::Storage;

/// The request being composed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestEditor {
    pub method: HttpMethod,
    pub url: String,
    /// Free-text header block as typed by the user
    pub headers_text: String,
    pub body: String,
}

impl RequestEditor {
    /// Editor contents for a saved request.
    pub fn from_request(request: &Request) -> Self {
        RequestEditor {
            method: request.method,
            url: request.url.clone(),
            headers_text: headers_to_text(&request.headers),
            body: request.body.clone(),
        }
    }
}

/// Main application state
pub struct AppState {
    // Storage (persisted data)
    pub storage: Storage,
    pub selected_workspace: Option<String>,
    pub selected_collection: Option<usize>,

    pub editor: RequestEditor,

    // HTTP Response
    pub view: ResponseView,
    /// Metadata of the last successful response; `None` after an error
    pub response: Option<HttpResponse>,
    pub response_revision: u64,
    pub json_output: String,
    pub is_loading: bool,
    pub next_request_id: u64,
    pub pending_request_id: Option<u64>,

    /// Last notice for the user (save failures, missing selection, ...)
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(storage: Storage) -> Self {
        AppState {
            storage,
            selected_workspace: None,
            selected_collection: None,
            editor: RequestEditor::default(),
            view: ResponseView::new(),
            response: None,
            response_revision: 0,
            json_output: String::new(),
            is_loading: false,
            next_request_id: 1,
            pending_request_id: None,
            status_message: None,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        let workspace = self
            .selected_workspace
            .as_deref()
            .and_then(|name| self.storage.workspace(name));
        let collection = match (&self.selected_workspace, self.selected_collection) {
            (Some(ws), Some(idx)) => self.storage.collection(ws, idx),
            _ => None,
        };

        RenderState {
            workspaces: self.storage.workspace_names(),
            selected_workspace: self.selected_workspace.clone(),
            collections: workspace
                .map(|ws| ws.collections.iter().map(|c| c.name.clone()).collect())
                .unwrap_or_default(),
            selected_collection: self.selected_collection,
            requests: collection
                .map(|c| c.requests.iter().map(|r| r.name.clone()).collect())
                .unwrap_or_default(),
            method: self.editor.method,
            url: self.editor.url.clone(),
            headers_text: self.editor.headers_text.clone(),
            body: self.editor.body.clone(),
            response_text: self.view.displayed().to_string(),
            status_label: self
                .response
                .as_ref()
                .map(HttpResponse::status_label)
                .unwrap_or_default(),
            status_class: self.response.as_ref().map(HttpResponse::status_class),
            meta_line: self
                .response
                .as_ref()
                .map(HttpResponse::meta_line)
                .unwrap_or_default(),
            response_headers: self
                .response
                .as_ref()
                .map(|r| r.headers.to_text())
                .unwrap_or_default(),
            is_loading: self.is_loading,
            response_revision: self.response_revision,
            search_query: self.view.query().to_string(),
            match_count: self.view.matches().len(),
            current_match: self.view.current_match_index(),
            current_match_line: self.view.current_line(),
            json_output: self.json_output.clone(),
            message: self.status_message.clone(),
        }
    }
}
