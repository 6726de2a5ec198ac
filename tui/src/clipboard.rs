//! System clipboard via the platform copy tool
//!
//! The terminal has no clipboard of its own, so copies are piped into
//! `wl-copy`, `xclip` or `pbcopy`, whichever fits the session.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use orgbot_core::{ClipboardSink, CopyError, NoClipboard};

/// Clipboard sink that pipes text into an external command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    /// Pipe copies into `program args..`
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Pick a copy tool for the current session
    pub fn detect() -> Option<Self> {
        detect_with(|key| std::env::var(key).ok(), std::env::consts::OS)
    }

    /// The command that will be run
    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Pick a copy tool from session variables and the OS name
fn detect_with<F>(env: F, os: &str) -> Option<CommandClipboard>
where
    F: Fn(&str) -> Option<String>,
{
    if os == "macos" {
        return Some(CommandClipboard::new("pbcopy", Vec::<String>::new()));
    }
    if env("WAYLAND_DISPLAY").is_some_and(|v| !v.is_empty()) {
        return Some(CommandClipboard::new("wl-copy", Vec::<String>::new()));
    }
    if env("DISPLAY").is_some_and(|v| !v.is_empty()) {
        return Some(CommandClipboard::new("xclip", ["-selection", "clipboard"]));
    }
    None
}

/// The best available clipboard sink
pub fn system_clipboard() -> Arc<dyn ClipboardSink> {
    match CommandClipboard::detect() {
        Some(clipboard) => {
            tracing::info!(program = clipboard.program(), "Using system clipboard");
            Arc::new(clipboard)
        }
        None => {
            tracing::warn!("No clipboard tool found, copies will be rejected");
            Arc::new(NoClipboard)
        }
    }
}

#[async_trait]
impl ClipboardSink for CommandClipboard {
    async fn copy(&self, text: &str) -> Result<(), CopyError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CopyError::Unavailable(format!("{}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| CopyError::WriteFailed(e.to_string()))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| CopyError::WriteFailed(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(CopyError::WriteFailed(format!(
                "{} exited with {status}",
                self.program
            )))
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}
