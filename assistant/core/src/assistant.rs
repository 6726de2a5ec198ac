//! Assistant - The Orchestration Core
//!
//! The Assistant ties the pieces together on one event loop:
//! - the conversation (transcript, pending turns, resolver)
//! - the code panel (tabs, visibility, reveal)
//! - the clipboard sink
//! - communication with a UI surface
//!
//! # Design Philosophy
//!
//! The Assistant is UI-agnostic. It communicates through:
//! - `SurfaceEvent`: what the user did, received FROM the surface
//! - `AssistantMessage`: what to display, sent TO the surface
//!
//! Time only enters through explicit deadlines. Submissions schedule their
//! resolution `resolution_delay` into the future, and the panel schedules
//! reveal ticks. [`Assistant::poll_timers`] runs whatever is due. A surface
//! can either call it every frame or hand the event receiver to
//! [`Assistant::run`], which sleeps until the next deadline.
//!
//! A resolution already scheduled always completes, whatever happens to the
//! panel in the meantime. Panel actions only ever cancel the reveal.
//!
//! Sending to the surface never waits. An embedded surface drains the channel
//! on the same task that drives the Assistant, so messages that do not fit
//! queue in order in a backlog until [`Assistant::flush_backlog`] (or the
//! [`Assistant::run`] loop) moves them.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::Instant;

use crate::catalog::Catalog;
use crate::clipboard::ClipboardSink;
use crate::config::AssistantConfig;
use crate::conversation::{Conversation, ExchangeState, NO_CODE_APOLOGY};
use crate::events::SurfaceEvent;
use crate::messages::{
    AssistantMessage, AssistantState, CopyTarget, EventId, NotifyLevel, SessionId,
};
use crate::panel::CodePanel;
use crate::resolver::{ResolutionOutcome, Resolver};
use crate::reveal::RevealEffect;
use crate::transcript::TurnId;

/// A pending turn and when it resolves
#[derive(Clone, Copy, Debug)]
struct ScheduledResolution {
    pending: TurnId,
    due: Instant,
}

/// The Assistant - headless orchestration core
pub struct Assistant {
    /// Configuration
    config: AssistantConfig,
    /// Transcript and resolver
    conversation: Conversation,
    /// Tabs and reveal
    panel: CodePanel,
    /// Where copies go
    clipboard: Arc<dyn ClipboardSink>,
    /// Resolutions waiting for their delay, in submission order
    scheduled: VecDeque<ScheduledResolution>,
    /// Current operational state
    state: AssistantState,
    /// Session identifier
    session_id: SessionId,
    /// Channel to send messages to UI surface
    tx: mpsc::Sender<AssistantMessage>,
    /// Messages waiting for room in the channel, oldest first
    backlog: Mutex<VecDeque<AssistantMessage>>,
    /// Set once quit was requested
    quitting: bool,
}

impl Assistant {
    /// Create a new Assistant over `catalog`
    pub fn new(
        catalog: Arc<Catalog>,
        config: AssistantConfig,
        clipboard: Arc<dyn ClipboardSink>,
        tx: mpsc::Sender<AssistantMessage>,
    ) -> Self {
        let resolver = Resolver::new(catalog, config.resolver_settings());
        let panel = CodePanel::new(config.reveal_tick);

        Self {
            conversation: Conversation::new(resolver),
            panel,
            clipboard,
            scheduled: VecDeque::new(),
            state: AssistantState::Initializing,
            session_id: SessionId::new(),
            tx,
            backlog: Mutex::new(VecDeque::new()),
            quitting: false,
            config,
        }
    }

    /// Get the session ID
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Get current state
    pub fn state(&self) -> AssistantState {
        self.state
    }

    /// The conversation
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The code panel
    pub fn panel(&self) -> &CodePanel {
        &self.panel
    }

    /// Configuration in use
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Whether quit was requested
    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Start the Assistant and announce the session
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.set_state(AssistantState::Ready).await;
        self.send(AssistantMessage::SessionInfo {
            session_id: self.session_id.clone(),
            prompts: self.conversation.resolver().catalog().prompts().to_vec(),
        })
        .await;

        tracing::info!(
            session = %self.session_id.0,
            entries = self.conversation.resolver().catalog().len(),
            "Assistant started"
        );
        Ok(())
    }

    /// Handle an event from the UI surface
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        let now = Instant::now();
        self.ack(event.event_id().clone()).await;

        match event {
            SurfaceEvent::Submit { text, .. } => {
                if text.trim().is_empty() {
                    tracing::debug!("Ignoring blank submission");
                } else {
                    self.submit(text, now).await;
                }
            }

            SurfaceEvent::PromptSelected { index, .. } => {
                let prompt = self
                    .conversation
                    .resolver()
                    .catalog()
                    .prompts()
                    .get(index)
                    .cloned();
                match prompt {
                    Some(text) => self.submit(text, now).await,
                    None => {
                        tracing::warn!(index, "Unknown prompt selected");
                        self.notify(NotifyLevel::Warning, "That prompt is not available")
                            .await;
                    }
                }
            }

            SurfaceEvent::AcceptOffer { turn_id, .. } => {
                match self.conversation.accept_offer(turn_id) {
                    ResolutionOutcome::CodeUnlock { code, title } => {
                        self.open_code_tab(code, title, now).await;
                    }
                    outcome => {
                        tracing::warn!(turn = %turn_id, outcome = outcome.kind(), "Offer had no code");
                        self.notify(NotifyLevel::Warning, NO_CODE_APOLOGY).await;
                    }
                }
            }

            SurfaceEvent::DeclineOffer { turn_id, .. } => {
                if let Some(turn) = self.conversation.decline_offer(turn_id) {
                    self.send(AssistantMessage::TurnUpdated { turn }).await;
                } else {
                    tracing::debug!(turn = %turn_id, "No offer to decline");
                }
            }

            SurfaceEvent::ActivateTab { tab_id, .. } => {
                if self.panel.activate(tab_id, now) {
                    self.send(AssistantMessage::TabActivated { tab_id }).await;
                    self.flush_reveal_effects().await;
                } else {
                    tracing::warn!(tab = %tab_id, "Activate for unknown tab");
                }
            }

            SurfaceEvent::CloseTab { tab_id, .. } => {
                if self.panel.close(tab_id, now) {
                    self.flush_reveal_effects().await;
                    self.send(AssistantMessage::TabClosed {
                        tab_id,
                        active: self.panel.active(),
                    })
                    .await;
                } else {
                    tracing::warn!(tab = %tab_id, "Close for unknown tab");
                }
            }

            SurfaceEvent::SetPanelOpen { open, .. } => {
                self.set_panel_open(open, now).await;
            }

            SurfaceEvent::TogglePanel { .. } => {
                let open = !self.panel.is_open();
                self.set_panel_open(open, now).await;
            }

            SurfaceEvent::CopyActiveTab { .. } => {
                self.copy_active_tab().await;
            }

            SurfaceEvent::ExportTranscript { .. } => {
                let json = self.conversation.transcript().to_json()?;
                self.copy_text(&json, CopyTarget::Transcript).await;
            }

            SurfaceEvent::QuitRequested { .. } => {
                self.shutdown().await?;
            }
        }

        Ok(())
    }

    /// Earliest instant at which [`Self::poll_timers`] has work
    pub fn next_deadline(&self) -> Option<Instant> {
        let resolution = self.scheduled.front().map(|s| s.due);
        let reveal = self.panel.next_deadline();
        match (resolution, reveal) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run everything due at `now`
    ///
    /// Reveal ticks due before a resolution run first, so a tab opened by that
    /// resolution starts its reveal at the resolution's own deadline.
    /// Returns whether anything happened.
    pub async fn poll_timers(&mut self, now: Instant) -> bool {
        let mut progressed = false;

        while let Some(due) = self
            .scheduled
            .front()
            .map(|s| s.due)
            .filter(|due| *due <= now)
        {
            self.tick_reveal(due).await;
            self.resolve_scheduled(due).await;
            progressed = true;
        }

        progressed |= self.tick_reveal(now).await;
        progressed
    }

    /// Drive the Assistant from a surface event channel until quit
    ///
    /// Sleeps until either the next event or the next timer deadline.
    pub async fn run(mut self, mut events: mpsc::Receiver<SurfaceEvent>) -> anyhow::Result<()> {
        self.start().await?;

        while !self.quitting {
            self.drain_backlog().await;
            let deadline = self.next_deadline();
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await?,
                    None => {
                        tracing::info!("Surface channel closed");
                        break;
                    }
                },
                () = sleep_until(deadline) => {
                    self.poll_timers(Instant::now()).await;
                }
            }
        }

        self.drain_backlog().await;
        Ok(())
    }

    /// Shutdown the Assistant
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.set_state(AssistantState::ShuttingDown).await;
        self.quitting = true;

        self.send(AssistantMessage::Quit {
            message: Some("Goodbye!".to_string()),
        })
        .await;

        Ok(())
    }

    async fn submit(&mut self, text: String, now: Instant) {
        let submission = self.conversation.submit(text);
        self.scheduled.push_back(ScheduledResolution {
            pending: submission.pending,
            due: now + self.config.resolution_delay,
        });

        for id in [submission.user, submission.pending] {
            if let Some(turn) = self.conversation.transcript().get(id).cloned() {
                self.send(AssistantMessage::TurnAppended { turn }).await;
            }
        }
        if self.state != AssistantState::Resolving {
            self.set_state(AssistantState::Resolving).await;
        }
    }

    async fn resolve_scheduled(&mut self, at: Instant) {
        let Some(scheduled) = self.scheduled.pop_front() else {
            return;
        };

        if let Some(resolved) = self.conversation.resolve(scheduled.pending) {
            self.send(AssistantMessage::TurnResolved {
                turn: resolved.turn,
            })
            .await;
            if let ResolutionOutcome::CodeUnlock { code, title } = resolved.outcome {
                self.open_code_tab(code, title, at).await;
            }
        } else {
            tracing::warn!(turn = %scheduled.pending, "Scheduled resolution had no pending turn");
        }

        if self.conversation.state() == ExchangeState::Idle {
            self.set_state(AssistantState::Ready).await;
        }
    }

    async fn open_code_tab(&mut self, code: String, title: String, at: Instant) {
        let was_open = self.panel.is_open();
        let id = self.panel.open_tab(code, title, at);
        self.flush_reveal_effects().await;

        if let Some(tab) = self.panel.tab(id).cloned() {
            tracing::info!(tab = %id, title = %tab.title, "Code unlocked");
            self.send(AssistantMessage::TabOpened { tab }).await;
        }
        if !was_open {
            self.send(AssistantMessage::PanelVisibility { open: true }).await;
        }
    }

    async fn set_panel_open(&mut self, open: bool, now: Instant) {
        if self.panel.set_open(open, now) {
            self.flush_reveal_effects().await;
            self.send(AssistantMessage::PanelVisibility { open }).await;
        }
    }

    async fn tick_reveal(&mut self, now: Instant) -> bool {
        let Some(progress) = self.panel.tick(now) else {
            return false;
        };
        self.send(AssistantMessage::RevealProgress { progress }).await;
        self.flush_reveal_effects().await;
        true
    }

    async fn flush_reveal_effects(&mut self) {
        for effect in self.panel.drain_effects() {
            match effect {
                RevealEffect::Cancelled { tab, revealed } => {
                    tracing::debug!(tab = %tab, revealed, "Reveal cancelled");
                    self.send(AssistantMessage::RevealCancelled { tab_id: tab })
                        .await;
                }
                RevealEffect::Armed { tab } => {
                    tracing::trace!(tab = %tab, "Reveal armed");
                }
                RevealEffect::Completed { tab } => {
                    tracing::debug!(tab = %tab, "Reveal completed");
                }
            }
        }
    }

    async fn copy_active_tab(&mut self) {
        let Some(tab) = self.panel.active_tab() else {
            self.notify(NotifyLevel::Info, "No code to copy").await;
            return;
        };
        let (tab_id, code) = (tab.id, tab.full_code.clone());
        self.copy_text(&code, CopyTarget::Code { tab_id }).await;
    }

    async fn copy_text(&self, text: &str, target: CopyTarget) {
        match self.clipboard.copy(text).await {
            Ok(()) => {
                tracing::debug!(sink = self.clipboard.name(), ?target, "Copied to clipboard");
                self.send(AssistantMessage::CopyAcknowledged {
                    target,
                    chars: text.chars().count(),
                })
                .await;
            }
            Err(e) => {
                tracing::warn!(sink = self.clipboard.name(), error = %e, "Copy failed");
                self.notify(NotifyLevel::Warning, &format!("Copy failed: {e}"))
                    .await;
            }
        }
    }

    /// Set state and notify UI
    async fn set_state(&mut self, state: AssistantState) {
        self.state = state;
        self.send(AssistantMessage::State { state }).await;
    }

    /// Send acknowledgment
    async fn ack(&self, event_id: EventId) {
        self.send(AssistantMessage::Ack { event_id }).await;
    }

    /// Send notification
    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.send(AssistantMessage::Notify {
            level,
            title: None,
            message: message.to_string(),
        })
        .await;
    }

    /// Move backlogged messages into the channel while it has room
    ///
    /// Returns whether any message moved.
    pub fn flush_backlog(&self) -> bool {
        let mut backlog = self.backlog.lock();
        let mut moved = false;
        while let Some(msg) = backlog.pop_front() {
            match self.tx.try_send(msg) {
                Ok(()) => moved = true,
                Err(TrySendError::Full(msg)) => {
                    backlog.push_front(msg);
                    break;
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::warn!(dropped = backlog.len() + 1, "Surface channel closed");
                    backlog.clear();
                    break;
                }
            }
        }
        moved
    }

    /// Messages waiting for room in the channel
    pub fn backlog_len(&self) -> usize {
        self.backlog.lock().len()
    }

    /// Send the whole backlog, waiting for the surface to make room
    async fn drain_backlog(&self) {
        loop {
            let next = {
                let mut backlog = self.backlog.lock();
                backlog.pop_front()
            };
            let Some(msg) = next else {
                break;
            };
            if let Err(e) = self.tx.send(msg).await {
                tracing::warn!("Failed to send message to surface: {}", e);
                self.backlog.lock().clear();
                break;
            }
        }
    }

    /// Send a message to the UI surface without waiting
    async fn send(&self, msg: AssistantMessage) {
        let mut backlog = self.backlog.lock();
        if !backlog.is_empty() {
            backlog.push_back(msg);
            return;
        }
        match self.tx.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(msg)) => {
                tracing::debug!("Surface channel full, message queued");
                backlog.push_back(msg);
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("Failed to send message to surface: channel closed");
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{MemoryClipboard, NoClipboard};
    use std::time::Duration;

    fn assistant_with(
        clipboard: Arc<dyn ClipboardSink>,
    ) -> (Assistant, mpsc::Receiver<AssistantMessage>) {
        assistant_with_capacity(clipboard, 256)
    }

    fn assistant_with_capacity(
        clipboard: Arc<dyn ClipboardSink>,
        capacity: usize,
    ) -> (Assistant, mpsc::Receiver<AssistantMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        let assistant = Assistant::new(
            Arc::new(Catalog::builtin()),
            AssistantConfig::default(),
            clipboard,
            tx,
        );
        (assistant, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<AssistantMessage>) -> Vec<AssistantMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    #[tokio::test]
    async fn test_assistant_creation() {
        let (assistant, _rx) = assistant_with(Arc::new(NoClipboard));
        assert_eq!(assistant.state(), AssistantState::Initializing);
        assert!(assistant.next_deadline().is_none());
        assert!(!assistant.is_quitting());
    }

    #[tokio::test]
    async fn test_assistant_start_announces_prompts() {
        let (mut assistant, mut rx) = assistant_with(Arc::new(NoClipboard));
        assistant.start().await.unwrap();

        assert_eq!(assistant.state(), AssistantState::Ready);
        let messages = drain(&mut rx);
        assert!(matches!(messages[0], AssistantMessage::State { .. }));
        assert!(matches!(
            &messages[1],
            AssistantMessage::SessionInfo { prompts, .. } if prompts.len() == 5
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_submission_is_only_acked() {
        let (mut assistant, mut rx) = assistant_with(Arc::new(NoClipboard));
        assistant
            .handle_event(SurfaceEvent::submit("   \n"))
            .await
            .unwrap();

        let messages = drain(&mut rx);
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0], AssistantMessage::Ack { .. }));
        assert!(assistant.conversation().transcript().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolution_waits_for_delay() {
        let (mut assistant, _rx) = assistant_with(Arc::new(NoClipboard));
        let start = Instant::now();
        assistant
            .handle_event(SurfaceEvent::submit("asdkjhasd"))
            .await
            .unwrap();

        assert_eq!(
            assistant.next_deadline(),
            Some(start + Duration::from_millis(1500))
        );
        assert!(!assistant.poll_timers(start + Duration::from_millis(1499)).await);
        assert_eq!(assistant.state(), AssistantState::Resolving);

        assert!(assistant.poll_timers(start + Duration::from_millis(1500)).await);
        assert_eq!(assistant.state(), AssistantState::Ready);
        assert_eq!(assistant.conversation().transcript().pending_ids().count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_without_tab_notifies() {
        let clipboard = MemoryClipboard::new();
        let (mut assistant, mut rx) = assistant_with(Arc::new(clipboard.clone()));
        assistant
            .handle_event(SurfaceEvent::CopyActiveTab {
                event_id: SurfaceEvent::new_event_id(),
            })
            .await
            .unwrap();

        assert!(clipboard.last().is_none());
        assert!(drain(&mut rx)
            .iter()
            .any(|m| matches!(m, AssistantMessage::Notify { level: NotifyLevel::Info, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_sets_flag() {
        let (mut assistant, mut rx) = assistant_with(Arc::new(NoClipboard));
        assistant
            .handle_event(SurfaceEvent::QuitRequested {
                event_id: SurfaceEvent::new_event_id(),
            })
            .await
            .unwrap();

        assert!(assistant.is_quitting());
        assert_eq!(assistant.state(), AssistantState::ShuttingDown);
        assert!(drain(&mut rx)
            .iter()
            .any(|m| matches!(m, AssistantMessage::Quit { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_channel_does_not_block_handle_event() {
        let (mut assistant, mut rx) = assistant_with_capacity(Arc::new(NoClipboard), 1);

        let handled = tokio::time::timeout(
            Duration::from_secs(5),
            assistant.handle_event(SurfaceEvent::submit("hi")),
        )
        .await;
        assert!(handled.is_ok(), "handle_event waited on a full channel");
        assert_eq!(assistant.backlog_len(), 3);

        // Drain the way an embedded surface does, one channel slot at a time
        let mut messages = Vec::new();
        loop {
            while let Ok(msg) = rx.try_recv() {
                messages.push(msg);
            }
            if !assistant.flush_backlog() {
                break;
            }
        }

        assert_eq!(messages.len(), 4);
        assert!(matches!(messages[0], AssistantMessage::Ack { .. }));
        assert!(matches!(&messages[1], AssistantMessage::TurnAppended { turn } if !turn.is_bot()));
        assert!(matches!(&messages[2], AssistantMessage::TurnAppended { turn } if turn.pending));
        assert!(matches!(
            messages[3],
            AssistantMessage::State { state: AssistantState::Resolving }
        ));
        assert_eq!(assistant.backlog_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backlog_keeps_order_across_polls() {
        let (mut assistant, mut rx) = assistant_with_capacity(Arc::new(NoClipboard), 1);
        let start = Instant::now();
        for text in ["one", "two", "three"] {
            assistant.handle_event(SurfaceEvent::submit(text)).await.unwrap();
        }
        assert!(assistant.poll_timers(start + Duration::from_millis(1500)).await);

        let mut resolved = Vec::new();
        loop {
            while let Ok(msg) = rx.try_recv() {
                if let AssistantMessage::TurnResolved { turn } = msg {
                    resolved.push(turn.id);
                }
            }
            if !assistant.flush_backlog() {
                break;
            }
        }

        let pending: Vec<_> = assistant
            .conversation()
            .transcript()
            .turns()
            .iter()
            .filter(|t| t.is_bot())
            .map(|t| t.id)
            .collect();
        assert_eq!(resolved, pending);
    }
}
