//! OrgBot TUI - Terminal interface for the OrgBot assistant
//!
//! A full-screen chat with a side code panel. All dialogue and panel logic
//! lives in `orgbot-core`; this crate turns key presses into surface events
//! and draws whatever the assistant reports.
//!
//! # Architecture
//!
//! - **AssistantClient**: Embeds the assistant and drains its messages
//! - **DisplayState**: Render-ready state built from assistant messages
//! - **CommandClipboard**: Clipboard sink backed by the platform copy tool
//! - **App**: Terminal event loop and rendering

pub mod app;
pub mod assistant_client;
pub mod clipboard;
pub mod display;
pub mod theme;

pub use app::App;
