//! Workspace store: the Workspace → Collection → Request tree and its JSON file.
//!
//! Names are not unique. Every name lookup resolves to the first match, so two
//! workspaces (or collections) sharing a name shadow each other.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::constants::STORE_FILE_NAME;
use crate::error::Result;
use crate::models::{Collection, Request, Workspace};

/// Default per-user location of the store file.
pub fn default_store_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STORE_FILE_NAME)
}

/// Reads the store document. A missing file is an empty store.
pub fn load_workspaces(path: &Path) -> Result<Vec<Workspace>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let workspaces: Option<Vec<Workspace>> = serde_json::from_str(&content)?;
    Ok(workspaces.unwrap_or_default())
}

/// Replaces the store document with `workspaces`.
///
/// The document is written to a sibling temporary file first and renamed over
/// the target, so readers see either the old or the new document.
pub fn save_workspaces(path: &Path, workspaces: &[Workspace]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(workspaces)?;

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| STORE_FILE_NAME.into());
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, content)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// Owns the in-memory workspace list and where it is persisted.
///
/// Mutators only touch memory; callers follow each one with [`Storage::save`].
pub struct Storage {
    pub workspaces: Vec<Workspace>,
    path: PathBuf,
}

impl Storage {
    /// Opens the store at `path`, loading whatever is there.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let workspaces = load_workspaces(&path)?;
        tracing::debug!(path = %path.display(), count = workspaces.len(), "Store loaded");
        Ok(Storage { workspaces, path })
    }

    /// An empty store bound to `path`, without reading it.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Storage {
            workspaces: Vec::new(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists the current in-memory state. On failure memory is left as is,
    /// so a later save retries from the same state.
    pub fn save(&self) -> Result<()> {
        save_workspaces(&self.path, &self.workspaces)?;
        tracing::debug!(path = %self.path.display(), count = self.workspaces.len(), "Store saved");
        Ok(())
    }

    // ========================
    // Lookups
    // ========================

    pub fn workspace_names(&self) -> Vec<String> {
        self.workspaces.iter().map(|ws| ws.name.clone()).collect()
    }

    pub fn workspace(&self, name: &str) -> Option<&Workspace> {
        self.workspaces.iter().find(|ws| ws.name == name)
    }

    fn workspace_mut(&mut self, name: &str) -> Option<&mut Workspace> {
        self.workspaces.iter_mut().find(|ws| ws.name == name)
    }

    pub fn collection(&self, ws_name: &str, col_idx: usize) -> Option<&Collection> {
        self.workspace(ws_name)?.collections.get(col_idx)
    }

    fn collection_mut(&mut self, ws_name: &str, col_idx: usize) -> Option<&mut Collection> {
        self.workspace_mut(ws_name)?.collections.get_mut(col_idx)
    }

    /// Index of the first collection named `col_name` in the workspace.
    pub fn collection_index(&self, ws_name: &str, col_name: &str) -> Option<usize> {
        self.workspace(ws_name)?
            .collections
            .iter()
            .position(|c| c.name == col_name)
    }

    pub fn request(&self, ws_name: &str, col_idx: usize, req_idx: usize) -> Option<&Request> {
        self.collection(ws_name, col_idx)?.requests.get(req_idx)
    }

    // ========================
    // Mutators
    // ========================

    /// Appends a workspace and returns its index.
    pub fn add_workspace(&mut self, name: impl Into<String>) -> usize {
        self.workspaces.push(Workspace::new(name));
        self.workspaces.len() - 1
    }

    /// Appends an empty collection. Returns its index, or `None` when the
    /// workspace does not exist.
    pub fn add_collection(&mut self, ws_name: &str, name: impl Into<String>) -> Option<usize> {
        self.insert_collection(ws_name, Collection::new(name))
    }

    /// Appends an already-built collection (e.g. an imported one).
    pub fn insert_collection(&mut self, ws_name: &str, collection: Collection) -> Option<usize> {
        let ws = self.workspace_mut(ws_name)?;
        ws.collections.push(collection);
        Some(ws.collections.len() - 1)
    }

    /// Appends a request to the first collection named `col_name`.
    pub fn add_request(&mut self, ws_name: &str, col_name: &str, request: Request) -> bool {
        match self.collection_index(ws_name, col_name) {
            Some(col_idx) => self.add_request_at(ws_name, col_idx, request),
            None => false,
        }
    }

    /// Appends a request to the collection at `col_idx`.
    pub fn add_request_at(&mut self, ws_name: &str, col_idx: usize, request: Request) -> bool {
        match self.collection_mut(ws_name, col_idx) {
            Some(col) => {
                col.requests.push(request);
                true
            }
            None => false,
        }
    }

    /// Renames the request at the given position. Out of range is a no-op.
    pub fn rename_request(
        &mut self,
        ws_name: &str,
        col_idx: usize,
        req_idx: usize,
        new_name: impl Into<String>,
    ) -> bool {
        let Some(col) = self.collection_mut(ws_name, col_idx) else {
            return false;
        };
        match col.requests.get_mut(req_idx) {
            Some(req) => {
                req.name = new_name.into();
                true
            }
            None => false,
        }
    }

    /// Removes exactly one request; later requests shift down by one.
    /// Returns the removed request, or `None` when out of range.
    pub fn delete_request(&mut self, ws_name: &str, col_idx: usize, req_idx: usize) -> Option<Request> {
        let col = self.collection_mut(ws_name, col_idx)?;
        if req_idx < col.requests.len() {
            Some(col.requests.remove(req_idx))
        } else {
            None
        }
    }
}
