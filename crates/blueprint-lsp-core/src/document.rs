//! Open documents and their latest analysis.
//!
//! Everything is keyed by document URI: a request for one document only
//! ever sees the analysis produced for that same document.

use crate::analysis::DocumentAnalysis;
use std::collections::HashMap;
use std::sync::Arc;

/// A document as last sent by the editor.
#[derive(Debug, Clone)]
pub struct Document {
    /// The document's URI or path.
    uri: String,
    /// The document content.
    content: String,
    /// Version number for tracking changes (optional, used by LSP).
    version: Option<i32>,
}

impl Document {
    /// Create a new document with the given URI and content.
    pub fn new(uri: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            content: content.into(),
            version: None,
        }
    }

    /// Create a new document with a version number.
    pub fn with_version(uri: impl Into<String>, content: impl Into<String>, version: i32) -> Self {
        Self {
            uri: uri.into(),
            content: content.into(),
            version: Some(version),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn version(&self) -> Option<i32> {
        self.version
    }

    /// Update the document content with a new version.
    pub fn set_content_with_version(&mut self, content: impl Into<String>, version: i32) {
        self.content = content.into();
        self.version = Some(version);
    }
}

/// An open document plus the analysis of its latest validated version.
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub document: Document,
    /// Bumped whenever the text or the settings change. Only an analysis
    /// started at the current generation may be stored.
    generation: u64,
    analysis: Option<Arc<DocumentAnalysis>>,
}

impl DocumentState {
    fn new(document: Document, generation: u64) -> Self {
        Self {
            document,
            generation,
            analysis: None,
        }
    }

    /// The latest stored analysis, if any validation pass has completed.
    pub fn analysis(&self) -> Option<&Arc<DocumentAnalysis>> {
        self.analysis.as_ref()
    }

    /// Generation a validation pass must capture before reading settings.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// In-memory store of open documents, keyed by URI.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, DocumentState>,
    /// Store-wide, so a reopened document never reuses a generation.
    last_generation: u64,
}

impl DocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open or replace a document. Any previous analysis is dropped.
    pub fn open(&mut self, uri: impl Into<String>, content: impl Into<String>, version: i32) {
        let uri = uri.into();
        let document = Document::with_version(uri.clone(), content, version);
        let generation = self.next_generation();
        self.documents.insert(uri, DocumentState::new(document, generation));
    }

    /// Update a document's content.
    ///
    /// Returns `false` if the document is not open.
    pub fn change(&mut self, uri: &str, content: impl Into<String>, version: i32) -> bool {
        let generation = self.next_generation();
        match self.documents.get_mut(uri) {
            Some(state) => {
                state.document.set_content_with_version(content, version);
                state.generation = generation;
                true
            }
            None => false,
        }
    }

    /// Mark every open document's pending validation as outdated, e.g. after
    /// a settings change. Their stored analyses stay until replaced.
    pub fn invalidate_all(&mut self) {
        let generation = self.next_generation();
        for state in self.documents.values_mut() {
            state.generation = generation;
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.last_generation += 1;
        self.last_generation
    }

    /// Close a document (remove it and its analysis from the store).
    pub fn close(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    pub fn get(&self, uri: &str) -> Option<&DocumentState> {
        self.documents.get(uri)
    }

    /// Store the analysis produced by a validation pass started at `generation`.
    ///
    /// The analysis is discarded when the document changed, was reopened or
    /// had its settings replaced since the pass started, so a slow pass can
    /// never overwrite the result of a newer one. Returns whether the
    /// analysis was stored.
    pub fn store_analysis(
        &mut self,
        uri: &str,
        generation: u64,
        analysis: Arc<DocumentAnalysis>,
    ) -> bool {
        let Some(state) = self.documents.get_mut(uri) else {
            return false;
        };
        if state.generation != generation {
            tracing::debug!(
                uri,
                generation,
                current = state.generation,
                "Discarding outdated analysis"
            );
            return false;
        }
        state.analysis = Some(analysis);
        true
    }

    /// Get all document URIs.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(|s| s.as_str())
    }

    /// Check if a document is in the store.
    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    /// Get the number of documents in the store.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
