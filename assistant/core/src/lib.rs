//! OrgBot Core - Headless Dialogue Engine for the OrgBot assistant
//!
//! This crate holds all of OrgBot's logic, independent of any UI framework:
//! matching user input against a catalog of scripted interactions, the
//! "would you like to see the code?" follow-up protocol, and the code panel
//! whose tabs replay code samples with a character-by-character reveal.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        UI Surfaces                           │
//! │        ┌─────────┐                 ┌─────────────────┐       │
//! │        │   TUI   │                 │ Headless / Test │       │
//! │        └────┬────┘                 └────────┬────────┘       │
//! │             └──────────────┬────────────────┘                │
//! │                   SurfaceEvent (up)                          │
//! │                 AssistantMessage (down)                      │
//! └────────────────────────────┼─────────────────────────────────┘
//!                              │
//! ┌────────────────────────────┼─────────────────────────────────┐
//! │                      ORGBOT CORE                             │
//! │  ┌─────────────────────────┴──────────────────────────────┐  │
//! │  │                      Assistant                         │  │
//! │  │  ┌──────────────┐  ┌────────────┐  ┌────────────────┐  │  │
//! │  │  │ Conversation │  │ Code Panel │  │ Clipboard Sink │  │  │
//! │  │  └──────┬───────┘  └────────────┘  └────────────────┘  │  │
//! │  │  ┌──────┴───────┐  ┌────────────┐  ┌────────────────┐  │  │
//! │  │  │   Resolver   │──│  Catalog   │──│   Normalizer   │  │  │
//! │  │  └──────────────┘  └────────────┘  └────────────────┘  │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Data flows one way: raw input, normalizer, resolver (consulting the
//! catalog), conversation (append/replace turns), and, when code is
//! unlocked, the code panel.
//!
//! # Key Types
//!
//! - [`Assistant`]: orchestration over one event loop
//! - [`Catalog`]: the read-only scripted-interaction table
//! - [`Resolver`]: input to [`ResolutionOutcome`]
//! - [`Conversation`]: transcript owner and pending-turn state machine
//! - [`CodePanel`]: tabs, visibility and the reveal timer
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use orgbot_core::{Assistant, AssistantConfig, Catalog, MemoryClipboard, SurfaceEvent};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, mut rx) = mpsc::channel(256);
//!     let mut assistant = Assistant::new(
//!         Arc::new(Catalog::builtin()),
//!         AssistantConfig::default(),
//!         Arc::new(MemoryClipboard::new()),
//!         tx,
//!     );
//!     assistant.start().await?;
//!     assistant.handle_event(SurfaceEvent::submit("Check for public S3 buckets")).await?;
//!
//!     loop {
//!         assistant.poll_timers(tokio::time::Instant::now()).await;
//!         while let Ok(msg) = rx.try_recv() {
//!             // Render message to UI
//!         }
//!     }
//! }
//! ```
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assistant;
pub mod catalog;
pub mod clipboard;
pub mod config;
pub mod conversation;
pub mod events;
pub mod messages;
pub mod normalize;
pub mod panel;
pub mod resolver;
pub mod reveal;
pub mod transcript;

// Re-exports for convenience
pub use assistant::Assistant;
pub use catalog::{Catalog, CatalogBuilder, CatalogEntry, CatalogError, EntrySpec, Response};
pub use clipboard::{ClipboardSink, CopyError, MemoryClipboard, NoClipboard};
pub use conversation::{Conversation, ExchangeState, Resolved, Submission, NO_CODE_APOLOGY};
pub use events::SurfaceEvent;
pub use messages::{
    AssistantMessage, AssistantState, CopyTarget, EventId, NotifyLevel, SessionId,
};
pub use normalize::{normalize, NormalizeMode};
pub use panel::{CodePanel, PanelState, RevealProgress, Tab, TabId};
pub use resolver::{MatchStrategy, ResolutionOutcome, Resolver, ResolverSettings};
pub use reveal::{RevealEffect, RevealTimer};
pub use transcript::{Sender, Transcript, Turn, TurnId};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, AssistantConfig, AssistantToml,
    ConfigError, ConfigOverrides, ConfigSource,
};
