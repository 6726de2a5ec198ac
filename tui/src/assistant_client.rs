//! Assistant Client
//!
//! Thin wrapper around the Assistant for TUI integration.
//! This client embeds the Assistant directly and provides a convenient
//! interface for sending events and receiving messages.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any dialogue logic.
//! The TUI's job is:
//! 1. Convert terminal events to SurfaceEvents
//! 2. Send SurfaceEvents to the Assistant
//! 3. Drive the Assistant's timers from the frame loop
//! 4. Receive AssistantMessages and render them

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use orgbot_core::{
    Assistant, AssistantConfig, AssistantMessage, AssistantState, Catalog, ClipboardSink,
    SurfaceEvent, TabId, TurnId,
};

/// Client for communicating with the embedded Assistant
pub struct AssistantClient {
    /// The embedded Assistant instance
    assistant: Assistant,
    /// Receiver for messages from the Assistant
    rx: mpsc::Receiver<AssistantMessage>,
}

impl AssistantClient {
    /// Create a new AssistantClient with an embedded Assistant
    pub fn new(
        catalog: Arc<Catalog>,
        config: AssistantConfig,
        clipboard: Arc<dyn ClipboardSink>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        let assistant = Assistant::new(catalog, config, clipboard, tx);
        Self { assistant, rx }
    }

    /// Start the Assistant
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.assistant.start().await
    }

    /// Submit typed text
    pub async fn submit(&mut self, text: String) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::submit(text)).await
    }

    /// Submit one of the suggested prompts
    pub async fn select_prompt(&mut self, index: usize) -> anyhow::Result<()> {
        let event = SurfaceEvent::PromptSelected {
            event_id: SurfaceEvent::new_event_id(),
            index,
        };
        self.send_event(event).await
    }

    /// Accept the code offer on `turn_id`
    pub async fn accept_offer(&mut self, turn_id: TurnId) -> anyhow::Result<()> {
        let event = SurfaceEvent::AcceptOffer {
            event_id: SurfaceEvent::new_event_id(),
            turn_id,
        };
        self.send_event(event).await
    }

    /// Decline the code offer on `turn_id`
    pub async fn decline_offer(&mut self, turn_id: TurnId) -> anyhow::Result<()> {
        let event = SurfaceEvent::DeclineOffer {
            event_id: SurfaceEvent::new_event_id(),
            turn_id,
        };
        self.send_event(event).await
    }

    /// Switch to a tab
    pub async fn activate_tab(&mut self, tab_id: TabId) -> anyhow::Result<()> {
        let event = SurfaceEvent::ActivateTab {
            event_id: SurfaceEvent::new_event_id(),
            tab_id,
        };
        self.send_event(event).await
    }

    /// Close a tab
    pub async fn close_tab(&mut self, tab_id: TabId) -> anyhow::Result<()> {
        let event = SurfaceEvent::CloseTab {
            event_id: SurfaceEvent::new_event_id(),
            tab_id,
        };
        self.send_event(event).await
    }

    /// Open or close the code panel
    pub async fn toggle_panel(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::TogglePanel {
            event_id: SurfaceEvent::new_event_id(),
        };
        self.send_event(event).await
    }

    /// Copy the active tab's code
    pub async fn copy_active_tab(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::CopyActiveTab {
            event_id: SurfaceEvent::new_event_id(),
        };
        self.send_event(event).await
    }

    /// Copy the transcript as JSON
    pub async fn export_transcript(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::ExportTranscript {
            event_id: SurfaceEvent::new_event_id(),
        };
        self.send_event(event).await
    }

    /// Notify the Assistant that user wants to quit
    pub async fn request_quit(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::QuitRequested {
            event_id: SurfaceEvent::new_event_id(),
        };
        self.send_event(event).await
    }

    /// Run whatever resolutions and reveal ticks are due (call every frame)
    pub async fn poll_timers(&mut self) -> bool {
        self.assistant.poll_timers(Instant::now()).await
    }

    /// When the Assistant next has timed work
    pub fn next_deadline(&self) -> Option<Instant> {
        self.assistant.next_deadline()
    }

    /// The most recent bot turn still offering code
    pub fn latest_offer(&self) -> Option<TurnId> {
        self.assistant.conversation().latest_offer()
    }

    /// Receive all pending messages from the Assistant (non-blocking)
    pub fn recv_all(&mut self) -> Vec<AssistantMessage> {
        let mut messages = Vec::new();
        loop {
            while let Ok(msg) = self.rx.try_recv() {
                messages.push(msg);
            }
            // Messages that did not fit wait in the Assistant's backlog
            if !self.assistant.flush_backlog() {
                break;
            }
        }
        messages
    }

    /// Get the current Assistant state
    pub fn state(&self) -> AssistantState {
        self.assistant.state()
    }

    /// Send raw surface event to the Assistant
    pub async fn send_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        self.assistant.handle_event(event).await
    }
}
