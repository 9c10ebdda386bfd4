//! State Storage Implementations
//!
//! Storage backends for exported persona documents.

use std::fs;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use ontos_common::{OntosError, Result};
use tracing::{debug, warn};

use crate::domain::export::StateDocument;

/// Trait for state storage backends
pub trait StateStore: Send + Sync {
    /// Store a document under a key, replacing any previous one
    fn save(&self, key: &str, document: &StateDocument) -> Result<()>;

    /// Load the document stored under a key
    fn load(&self, key: &str) -> Result<Option<StateDocument>>;

    /// Delete a document. Returns whether one existed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// All stored keys
    fn keys(&self) -> Result<Vec<String>>;
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(OntosError::invalid(format!("invalid state key '{}'", key)))
    }
}

/// One JSON file per key inside a directory
pub struct FileStateStore {
    directory: PathBuf,
    pretty: bool,
}

impl FileStateStore {
    pub fn new(directory: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            directory: directory.into(),
            pretty,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }

    /// Write a document to an explicit path
    ///
    /// The document is written to a sibling temp file first and renamed into
    /// place, so readers never observe a partial file.
    pub fn write_path(path: &Path, document: &StateDocument, pretty: bool) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = document.to_json(pretty)?;
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, path)) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %tmp.display(), error = %cleanup, "Temp file left behind");
                }
            }
            return Err(e.into());
        }
        debug!(path = %path.display(), "State document written");
        Ok(())
    }

    /// Read a document from an explicit path
    pub fn read_path(path: &Path) -> Result<StateDocument> {
        let blob = fs::read_to_string(path)?;
        StateDocument::from_json(&blob)
    }
}

impl StateStore for FileStateStore {
    fn save(&self, key: &str, document: &StateDocument) -> Result<()> {
        validate_key(key)?;
        Self::write_path(&self.path_for(key), document, self.pretty)
    }

    fn load(&self, key: &str) -> Result<Option<StateDocument>> {
        validate_key(key)?;
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_path(&path).map(Some)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => keys.push(stem.to_string()),
                None => warn!(path = %path.display(), "Skipping non UTF-8 state file"),
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// In-memory storage implementation
///
/// Keeps serialized JSON so a load goes through the same validation as a
/// file import.
#[derive(Default)]
pub struct InMemoryStateStore {
    documents: DashMap<String, String>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl StateStore for InMemoryStateStore {
    fn save(&self, key: &str, document: &StateDocument) -> Result<()> {
        validate_key(key)?;
        self.documents
            .insert(key.to_string(), document.to_json(false)?);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<StateDocument>> {
        validate_key(key)?;
        self.documents
            .get(key)
            .map(|blob| StateDocument::from_json(blob.value()))
            .transpose()
    }

    fn delete(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        Ok(self.documents.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.documents.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}
