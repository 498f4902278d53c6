//! Command handlers - business logic for processing UI events

use crate::app::AppState;
use crate::app::state::RequestEditor;
use crate::error::Error;
use crate::headers::parse_headers;
use crate::json_query::query_json_path;
use crate::messages::{NetworkCommand, NetworkResponse, OutgoingRequest};
use crate::models::{HttpMethod, HttpResponse, Request};
use crate::postman;

const NO_WORKSPACE: &str = "Select a workspace first.";
const NO_COLLECTION: &str = "Select a collection first.";

impl AppState {
    // ========================
    // Request editor
    // ========================

    pub fn set_method(&mut self, method: HttpMethod) {
        self.editor.method = method;
    }

    pub fn set_url(&mut self, url: String) {
        self.editor.url = url;
    }

    pub fn set_headers(&mut self, text: String) {
        self.editor.headers_text = text;
    }

    pub fn set_body(&mut self, body: String) {
        self.editor.body = body;
    }

    // ========================
    // HTTP Request
    // ========================

    /// Snapshot the editor into a send command. Any earlier in-flight send
    /// stops being the one whose result is shown.
    pub fn begin_send(&mut self) -> NetworkCommand {
        let id = self.next_id();
        self.pending_request_id = Some(id);
        self.is_loading = true;
        self.status_message = None;

        NetworkCommand::Execute {
            id,
            request: OutgoingRequest {
                method: self.editor.method,
                url: self.editor.url.clone(),
                headers: parse_headers(&self.editor.headers_text),
                body: self.editor.body.clone(),
            },
        }
    }

    pub fn handle_response(&mut self, response: NetworkResponse) {
        let id = response.id();
        self.apply_result(id, response.into_result());
    }

    /// Shows the outcome of send `id`. Results of superseded sends are
    /// dropped; returns whether the result was applied.
    pub fn apply_result(&mut self, id: u64, result: Result<HttpResponse, Error>) -> bool {
        if self.pending_request_id != Some(id) {
            tracing::debug!(id, pending = ?self.pending_request_id, "Dropping stale response");
            return false;
        }
        self.pending_request_id = None;
        self.is_loading = false;
        self.response_revision += 1;

        match result {
            Ok(response) => {
                self.view.set_response(response.body.clone());
                self.response = Some(response);
            }
            Err(error) => {
                self.view.set_response(error.to_string());
                self.response = None;
            }
        }
        true
    }

    // ========================
    // Response search
    // ========================

    pub fn search(&mut self, query: &str) -> usize {
        self.view.search(query)
    }

    pub fn next_match(&mut self) {
        self.view.next();
    }

    pub fn prev_match(&mut self) {
        self.view.previous();
    }

    pub fn clear_search(&mut self) {
        self.view.clear();
    }

    // ========================
    // Response tools
    // ========================

    /// Evaluates a JSON path over the unannotated response. Resets search.
    pub fn run_json_query(&mut self, path: &str) {
        if path.trim().is_empty() {
            self.status_message = Some("Enter a JSON path expression.".to_string());
            return;
        }
        match query_json_path(self.view.original_text(), path) {
            Ok(output) => {
                self.json_output = output;
                self.view.clear();
            }
            Err(e) => self.status_message = Some(e),
        }
    }

    /// Response text for the clipboard, never annotated.
    pub fn copy_text(&self) -> String {
        self.view.copy_text()
    }

    // ========================
    // Workspaces & collections
    // ========================

    /// Persist the store; a failure is reported but memory is kept.
    fn persist(&mut self) {
        if let Err(e) = self.storage.save() {
            tracing::warn!(error = %e, path = %self.storage.path().display(), "Failed to save workspaces");
            self.status_message = Some(format!("Failed to save workspaces: {}", e));
        }
    }

    pub fn create_workspace(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.storage.add_workspace(name);
        self.persist();
        self.selected_workspace = Some(name.to_string());
        self.selected_collection = None;
    }

    pub fn create_collection(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let Some(ws) = self.selected_workspace.clone() else {
            self.status_message = Some(NO_WORKSPACE.to_string());
            return;
        };
        if let Some(idx) = self.storage.add_collection(&ws, name) {
            self.persist();
            self.selected_collection = Some(idx);
        }
    }

    pub fn select_workspace(&mut self, name: &str) {
        if self.storage.workspace(name).is_none() {
            self.status_message = Some(format!("Workspace '{}' not found", name));
            return;
        }
        if self.selected_workspace.as_deref() != Some(name) {
            self.selected_collection = None;
        }
        self.selected_workspace = Some(name.to_string());
    }

    pub fn select_collection(&mut self, name: &str) {
        let Some(ws) = self.selected_workspace.as_deref() else {
            self.status_message = Some(NO_WORKSPACE.to_string());
            return;
        };
        match self.storage.collection_index(ws, name) {
            Some(idx) => self.selected_collection = Some(idx),
            None => self.status_message = Some(format!("Collection '{}' not found", name)),
        }
    }

    /// Selected workspace name and collection index, or the reason there is none.
    fn selection(&self) -> Result<(String, usize), &'static str> {
        let ws = self.selected_workspace.clone().ok_or(NO_WORKSPACE)?;
        let col = self.selected_collection.ok_or(NO_COLLECTION)?;
        if self.storage.collection(&ws, col).is_none() {
            return Err(NO_COLLECTION);
        }
        Ok((ws, col))
    }

    fn with_selection(&mut self) -> Option<(String, usize)> {
        match self.selection() {
            Ok(sel) => Some(sel),
            Err(reason) => {
                self.status_message = Some(reason.to_string());
                None
            }
        }
    }

    // ========================
    // Saved requests
    // ========================

    /// Appends the editor contents to the selected collection, named after the URL.
    pub fn save_current_request(&mut self) {
        let Some((ws, col)) = self.with_selection() else {
            return;
        };
        let request = Request {
            name: self.editor.url.clone(),
            method: self.editor.method,
            url: self.editor.url.clone(),
            headers: parse_headers(&self.editor.headers_text).flatten(),
            body: self.editor.body.clone(),
        };
        if self.storage.add_request_at(&ws, col, request) {
            self.persist();
        }
    }

    pub fn load_request(&mut self, idx: usize) {
        let Some((ws, col)) = self.with_selection() else {
            return;
        };
        if let Some(request) = self.storage.request(&ws, col, idx) {
            self.editor = RequestEditor::from_request(request);
        }
    }

    /// Empty names are ignored, as is an index out of range.
    pub fn rename_request(&mut self, idx: usize, name: &str) {
        if name.is_empty() {
            return;
        }
        let Some((ws, col)) = self.with_selection() else {
            return;
        };
        if self.storage.rename_request(&ws, col, idx, name) {
            self.persist();
        }
    }

    pub fn delete_request(&mut self, idx: usize) {
        let Some((ws, col)) = self.with_selection() else {
            return;
        };
        if let Some(removed) = self.storage.delete_request(&ws, col, idx) {
            tracing::info!(name = %removed.name, "Request deleted");
            self.persist();
        }
    }

    // ========================
    // Postman interchange
    // ========================

    /// Imports into the selected workspace and selects the new collection.
    pub fn import_postman(&mut self, data: &[u8]) {
        let collection = match postman::import_collection(data) {
            Ok(c) => c,
            Err(e) => {
                self.status_message = Some(format!("Invalid JSON: {}", e));
                return;
            }
        };
        let Some(ws) = self.selected_workspace.clone() else {
            self.status_message = Some(NO_WORKSPACE.to_string());
            return;
        };
        let count = collection.requests.len();
        if let Some(idx) = self.storage.insert_collection(&ws, collection) {
            tracing::info!(workspace = %ws, requests = count, "Postman collection imported");
            self.persist();
            self.selected_collection = Some(idx);
        }
    }

    /// Postman v2.1 bytes for the selected collection.
    pub fn export_postman(&self) -> Result<Vec<u8>, String> {
        let (ws, col) = self
            .selection()
            .map_err(|_| "Select a workspace and collection.".to_string())?;
        let collection = self
            .storage
            .collection(&ws, col)
            .ok_or_else(|| "Invalid selection".to_string())?;
        postman::export_collection_json(collection).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HeaderList;
    use crate::models::Workspace;
    use crate::storage::Storage;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn state_in(dir: &TempDir) -> AppState {
        AppState::new(Storage::empty(dir.path().join("store.json")))
    }

    fn response(body: &str) -> HttpResponse {
        HttpResponse {
            status_code: 200,
            status_text: "OK".into(),
            headers: HeaderList::new(),
            body: body.into(),
            elapsed_ms: 12,
            request_bytes: 0,
            response_bytes: body.len(),
            received_at: Utc::now(),
        }
    }

    fn send_id(state: &mut AppState) -> u64 {
        match state.begin_send() {
            NetworkCommand::Execute { id, .. } => id,
            NetworkCommand::Shutdown => unreachable!(),
        }
    }

    #[test]
    fn test_send_uses_editor_method() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.set_method(HttpMethod::PUT);
        state.set_url("http://localhost/x".into());
        state.set_headers("A: 1\nA: 2".into());

        match state.begin_send() {
            NetworkCommand::Execute { request, .. } => {
                assert_eq!(request.method, HttpMethod::PUT);
                assert_eq!(request.url, "http://localhost/x");
                assert_eq!(request.headers.len(), 2);
            }
            NetworkCommand::Shutdown => unreachable!(),
        }
    }

    /// Workspace "ws" with collection "col" selected.
    fn with_collection(dir: &TempDir) -> AppState {
        let mut state = state_in(dir);
        state.create_workspace("ws");
        state.create_collection("col");
        state
    }

    #[test]
    fn test_begin_send_snapshots_editor() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.set_method(HttpMethod::POST);
        state.set_url("http://localhost/items".into());
        state.set_headers("Accept: a\nAccept: b".into());
        state.set_body("{}".into());

        match state.begin_send() {
            NetworkCommand::Execute { id, request } => {
                assert_eq!(id, 1);
                assert_eq!(request.method, HttpMethod::POST);
                assert_eq!(request.headers.len(), 2);
                assert_eq!(request.body, "{}");
            }
            NetworkCommand::Shutdown => panic!("expected execute"),
        }
        assert!(state.is_loading);
        assert_eq!(state.pending_request_id, Some(1));
    }

    #[test]
    fn test_latest_send_wins() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        let first = send_id(&mut state);
        let second = send_id(&mut state);

        assert!(!state.apply_result(first, Ok(response("old"))));
        assert_eq!(state.view.displayed(), "");
        assert!(state.is_loading);

        assert!(state.apply_result(second, Ok(response("new"))));
        assert_eq!(state.view.displayed(), "new");
        assert!(!state.is_loading);
        assert_eq!(state.response_revision, 1);
    }

    #[test]
    fn test_new_result_resets_search() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        let id = send_id(&mut state);
        state.apply_result(id, Ok(response("id id")));
        assert_eq!(state.search("id"), 2);
        assert_eq!(state.view.displayed(), "【id】 〔id〕");

        let id = send_id(&mut state);
        state.apply_result(id, Ok(response("fresh")));
        assert_eq!(state.view.displayed(), "fresh");
        assert_eq!(state.view.query(), "");
        assert_eq!(state.view.current_match_index(), None);
    }

    #[test]
    fn test_error_result_clears_metadata() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        let id = send_id(&mut state);
        state.apply_result(id, Ok(response("ok")));
        assert!(state.response.is_some());

        let id = send_id(&mut state);
        state.apply_result(id, Err(Error::Transport("connection refused".into())));
        assert_eq!(state.view.displayed(), "HTTP error: connection refused");
        assert!(state.response.is_none());

        let render = state.to_render_state();
        assert_eq!(render.meta_line, "");
        assert_eq!(render.status_label, "");
    }

    #[test]
    fn test_copy_text_is_unannotated() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        let id = send_id(&mut state);
        state.apply_result(id, Ok(response("alpha beta alpha")));
        state.search("alpha");
        state.next_match();
        assert_eq!(state.copy_text(), "alpha beta alpha");
    }

    #[test]
    fn test_json_query_resets_search() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        let id = send_id(&mut state);
        state.apply_result(id, Ok(response("{\n    \"user\": {\"id\": 5}\n}")));
        state.search("user");

        state.run_json_query("$.user.id");
        assert_eq!(state.json_output, "5");
        assert_eq!(state.view.query(), "");
        assert_eq!(state.view.displayed(), "{\n    \"user\": {\"id\": 5}\n}");

        state.run_json_query("user");
        assert!(state.status_message.is_some());
    }

    #[test]
    fn test_workspace_and_collection_selection() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.create_workspace("");
        assert!(state.storage.workspaces.is_empty());

        state.create_workspace("one");
        state.create_collection("a");
        state.create_collection("b");
        assert_eq!(state.selected_collection, Some(1));

        state.select_collection("a");
        assert_eq!(state.selected_collection, Some(0));

        state.create_workspace("two");
        assert_eq!(state.selected_workspace.as_deref(), Some("two"));
        assert_eq!(state.selected_collection, None);

        state.select_workspace("one");
        assert_eq!(state.selected_collection, None);
        state.select_collection("b");
        state.select_workspace("one");
        assert_eq!(state.selected_collection, Some(1));

        state.select_workspace("missing");
        assert_eq!(state.selected_workspace.as_deref(), Some("one"));
    }

    #[test]
    fn test_create_collection_requires_workspace() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.create_collection("c");
        assert_eq!(state.status_message.as_deref(), Some(NO_WORKSPACE));
        assert_eq!(state.selected_collection, None);
    }

    #[test]
    fn test_save_and_load_request() {
        let dir = TempDir::new().unwrap();
        let mut state = with_collection(&dir);
        state.set_method(HttpMethod::PUT);
        state.set_url("https://api.test/x".into());
        state.set_headers("Accept: a\nAccept: b\nX-Id: 1".into());
        state.set_body("payload".into());
        state.save_current_request();

        let saved = state.storage.request("ws", 0, 0).unwrap().clone();
        assert_eq!(saved.name, "https://api.test/x");
        assert_eq!(saved.headers["Accept"], "a, b");

        state.editor = RequestEditor::default();
        state.load_request(0);
        assert_eq!(state.editor.method, HttpMethod::PUT);
        assert_eq!(state.editor.headers_text, "Accept: a, b\nX-Id: 1\n");
        assert_eq!(state.editor.body, "payload");

        // Persisted after the mutation.
        let reopened = Storage::open(state.storage.path()).unwrap();
        assert_eq!(reopened.workspaces[0].collections[0].requests, vec![saved]);
    }

    #[test]
    fn test_save_without_collection_reports() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.create_workspace("ws");
        state.save_current_request();
        assert_eq!(state.status_message.as_deref(), Some(NO_COLLECTION));
    }

    #[test]
    fn test_rename_and_delete() {
        let dir = TempDir::new().unwrap();
        let mut state = with_collection(&dir);
        for url in ["u0", "u1", "u2"] {
            state.set_url(url.into());
            state.save_current_request();
        }

        state.rename_request(1, "renamed");
        state.rename_request(1, "");
        state.rename_request(9, "nope");
        state.delete_request(0);
        state.delete_request(9);

        let names: Vec<_> = state.storage.collection("ws", 0).unwrap()
            .requests.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec!["renamed", "u2"]);
    }

    #[test]
    fn test_save_failure_keeps_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::create_dir(&path).unwrap();
        let mut state = AppState::new(Storage::empty(&path));

        state.create_workspace("ws");
        assert_eq!(state.storage.workspaces, vec![Workspace::new("ws")]);
        assert!(state
            .status_message
            .as_deref()
            .unwrap()
            .starts_with("Failed to save workspaces"));
    }

    #[test]
    fn test_import_and_export() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        let doc = br#"{"info": {"name": "Imported"}, "item": [
            {"name": "r", "request": {"method": "POST", "url": "http://x", "body": {"raw": "b"}}}
        ]}"#;

        state.import_postman(doc);
        assert_eq!(state.status_message.as_deref(), Some(NO_WORKSPACE));

        state.create_workspace("ws");
        state.create_collection("first");
        state.import_postman(doc);
        assert_eq!(state.selected_collection, Some(1));
        assert_eq!(state.to_render_state().collections, vec!["first", "Imported"]);

        let exported: serde_json::Value =
            serde_json::from_slice(&state.export_postman().unwrap()).unwrap();
        assert_eq!(exported["info"]["name"], "Imported");
        assert_eq!(exported["item"][0]["request"]["body"]["raw"], "b");

        state.import_postman(b"{broken");
        assert!(state.status_message.as_deref().unwrap().starts_with("Invalid JSON"));
    }

    #[test]
    fn test_export_requires_selection() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);
        assert!(state.export_postman().is_err());
    }
}
