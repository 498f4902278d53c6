//! Find-in-response: case-insensitive matching, a cyclic current-match cursor
//! and an annotated rendering of the response text.
//!
//! The view keeps the unannotated text (`original`) apart from what is
//! displayed. Match offsets always refer to `original`; the annotated text is
//! rebuilt from scratch on every navigation step and is never searched.

use crate::constants::{CURRENT_MATCH_CLOSE, CURRENT_MATCH_OPEN, OTHER_MATCH_CLOSE, OTHER_MATCH_OPEN};

/// Byte range of one match inside the original text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPhase {
    /// No query; the original text is displayed.
    Idle,
    /// A query with no matches.
    Querying,
    /// A query with matches and a current one.
    Navigating,
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// End offset of `query` matched at `start`, if it matches there.
fn match_at(text: &str, start: usize, query: &str) -> Option<usize> {
    let mut hay = text[start..].char_indices();
    let mut end = start;
    for q in query.chars() {
        let (i, c) = hay.next()?;
        if !chars_eq_ignore_case(c, q) {
            return None;
        }
        end = start + i + c.len_utf8();
    }
    Some(end)
}

/// All case-insensitive occurrences of `query`, scanning left to right.
/// The scan resumes after the end of each match, so self-overlapping
/// occurrences are counted once ("aa" in "aaaa" is found at 0 and 2).
pub fn find_matches(text: &str, query: &str) -> Vec<Match> {
    let mut matches = Vec::new();
    if query.is_empty() {
        return matches;
    }
    let mut pos = 0;
    while pos < text.len() {
        match match_at(text, pos, query) {
            Some(end) => {
                matches.push(Match { start: pos, end });
                pos = end;
            }
            None => {
                pos += text[pos..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    matches
}

/// Wraps every match in markers: the `current` one in 【】, the rest in 〔〕.
pub fn render(original: &str, matches: &[Match], current: usize) -> String {
    let extra = matches.len() * (OTHER_MATCH_OPEN.len() + OTHER_MATCH_CLOSE.len());
    let mut out = String::with_capacity(original.len() + extra);
    let mut last = 0;
    for (i, m) in matches.iter().enumerate() {
        let (open, close) = if i == current {
            (CURRENT_MATCH_OPEN, CURRENT_MATCH_CLOSE)
        } else {
            (OTHER_MATCH_OPEN, OTHER_MATCH_CLOSE)
        };
        out.push_str(&original[last..m.start]);
        out.push_str(open);
        out.push_str(&original[m.start..m.end]);
        out.push_str(close);
        last = m.end;
    }
    out.push_str(&original[last..]);
    out
}

/// `render` over a fresh scan of `original`.
pub fn annotate(original: &str, query: &str, current: usize) -> String {
    render(original, &find_matches(original, query), current)
}

/// The response text pane together with its search state.
#[derive(Clone, Debug, Default)]
pub struct ResponseView {
    displayed: String,
    /// Unannotated text captured when a search starts; `None` while idle.
    original: Option<String>,
    query: String,
    matches: Vec<Match>,
    current: Option<usize>,
}

impl ResponseView {
    pub fn new() -> Self {
        ResponseView::default()
    }

    /// Shows a new response. Any search in progress is discarded.
    pub fn set_response(&mut self, text: impl Into<String>) {
        self.displayed = text.into();
        self.original = None;
        self.query.clear();
        self.matches.clear();
        self.current = None;
    }

    /// Text currently shown, annotated while navigating.
    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    /// Unannotated response text.
    pub fn original_text(&self) -> &str {
        self.original.as_deref().unwrap_or(&self.displayed)
    }

    /// What "copy response" puts on the clipboard.
    pub fn copy_text(&self) -> String {
        self.original_text().to_string()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn match_positions(&self) -> Vec<usize> {
        self.matches.iter().map(|m| m.start).collect()
    }

    pub fn current_match_index(&self) -> Option<usize> {
        self.current
    }

    pub fn phase(&self) -> SearchPhase {
        if self.query.is_empty() {
            SearchPhase::Idle
        } else if self.matches.is_empty() {
            SearchPhase::Querying
        } else {
            SearchPhase::Navigating
        }
    }

    /// Zero-based line of the current match, for scrolling to it.
    pub fn current_line(&self) -> Option<usize> {
        let m = self.matches.get(self.current?)?;
        Some(self.original_text()[..m.start].matches('\n').count())
    }

    /// Runs a search and returns the number of matches.
    ///
    /// A blank query clears the search. Submitting the active query again
    /// moves to the next match.
    pub fn search(&mut self, query: &str) -> usize {
        let query = query.trim();
        if query.is_empty() {
            self.clear();
            return 0;
        }
        if query == self.query {
            if !self.matches.is_empty() {
                self.next();
            }
            return self.matches.len();
        }

        // Capture once: what is displayed may already be annotated.
        let original = self.original.get_or_insert_with(|| self.displayed.clone());
        self.query = query.to_string();
        self.matches = find_matches(original, query);
        if self.matches.is_empty() {
            self.current = None;
            self.displayed = original.clone();
        } else {
            self.current = Some(0);
            self.rerender();
        }
        self.matches.len()
    }

    /// Moves to the next match, wrapping from last to first.
    pub fn next(&mut self) -> Option<usize> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        let idx = self.current.map_or(0, |i| (i + 1) % len);
        self.current = Some(idx);
        self.rerender();
        Some(idx)
    }

    /// Moves to the previous match, wrapping from first to last.
    pub fn previous(&mut self) -> Option<usize> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        let idx = match self.current {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.current = Some(idx);
        self.rerender();
        Some(idx)
    }

    /// Drops the search and restores the original text. Idempotent.
    pub fn clear(&mut self) {
        if let Some(original) = self.original.take() {
            self.displayed = original;
        }
        self.query.clear();
        self.matches.clear();
        self.current = None;
    }

    fn rerender(&mut self) {
        if let (Some(original), Some(current)) = (&self.original, self.current) {
            self.displayed = render(original, &self.matches, current);
        }
    }
}
