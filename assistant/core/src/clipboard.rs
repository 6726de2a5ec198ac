//! Clipboard Sink
//!
//! Where copied code and exported transcripts go. The engine only needs to
//! know whether the write succeeded so it can acknowledge or warn; the sink
//! itself is supplied by the surface (system clipboard, file, test double).

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

/// Errors a clipboard sink can report
#[derive(Debug, Error)]
pub enum CopyError {
    /// No clipboard is available in this environment
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    /// The write was attempted and failed
    #[error("Clipboard write failed: {0}")]
    WriteFailed(String),
}

/// Destination for copied text
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    /// Copy `text` verbatim
    async fn copy(&self, text: &str) -> Result<(), CopyError>;

    /// Sink name for logs
    fn name(&self) -> &str;
}

/// In-memory sink that records every copy
///
/// Clones share the same history.
#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    copies: Arc<Mutex<Vec<String>>>,
}

impl MemoryClipboard {
    /// Create an empty clipboard
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent copy
    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.copies.lock().last().cloned()
    }

    /// Every copy so far, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.copies.lock().clone()
    }
}

#[async_trait]
impl ClipboardSink for MemoryClipboard {
    async fn copy(&self, text: &str) -> Result<(), CopyError> {
        self.copies.lock().push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Sink that rejects every write
#[derive(Clone, Copy, Debug, Default)]
pub struct NoClipboard;

#[async_trait]
impl ClipboardSink for NoClipboard {
    async fn copy(&self, _text: &str) -> Result<(), CopyError> {
        Err(CopyError::Unavailable("no clipboard configured".to_string()))
    }

    fn name(&self) -> &str {
        "none"
    }
}
