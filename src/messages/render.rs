//! Render state - data structure sent from App layer to UI for rendering

use crate::models::{HttpMethod, StatusClass};

/// Complete state needed by the UI to render
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    // Workspace tree
    pub workspaces: Vec<String>,
    pub selected_workspace: Option<String>,
    pub collections: Vec<String>,
    pub selected_collection: Option<usize>,
    pub requests: Vec<String>,

    // Request editor
    pub method: HttpMethod,
    pub url: String,
    pub headers_text: String,
    pub body: String,

    // Response
    /// Response pane text, annotated while a search is active
    pub response_text: String,
    pub status_label: String,
    pub status_class: Option<StatusClass>,
    pub meta_line: String,
    pub response_headers: String,
    pub is_loading: bool,
    /// Bumped every time a new result lands in the response pane
    pub response_revision: u64,

    // Search
    pub search_query: String,
    pub match_count: usize,
    pub current_match: Option<usize>,
    pub current_match_line: Option<usize>,

    pub json_output: String,
    pub message: Option<String>,
}

impl RenderState {
    /// "2 of 5" style counter, or `None` when there is nothing to navigate.
    pub fn match_counter(&self) -> Option<String> {
        if self.search_query.is_empty() {
            return None;
        }
        match self.current_match {
            Some(idx) => Some(format!("{} of {}", idx + 1, self.match_count)),
            None => Some("No matches".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_counter() {
        let mut state = RenderState::default();
        assert_eq!(state.match_counter(), None);

        state.search_query = "id".into();
        assert_eq!(state.match_counter().as_deref(), Some("No matches"));

        state.match_count = 3;
        state.current_match = Some(1);
        assert_eq!(state.match_counter().as_deref(), Some("2 of 3"));
    }
}
