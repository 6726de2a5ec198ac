//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from AssistantMessages and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client" - it just renders what the Assistant tells it to.
//! Display state is the bridge between AssistantMessages and rendering.
//!
//! - DisplayTurn: A rendered transcript turn
//! - DisplayTab: A code-panel tab
//! - DisplayNotification: Transient status-bar message

use std::time::{Duration, Instant};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use orgbot_core::{
    AssistantMessage, AssistantState, CopyTarget, NotifyLevel, Sender, SessionId, Tab, TabId,
    Turn, TurnId,
};

/// How long a notification stays in the status bar
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// A rendered transcript turn
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayTurn {
    /// Turn ID
    pub id: TurnId,
    /// Who sent this turn
    pub role: DisplayRole,
    /// The turn text
    pub text: String,
    /// Inline code sample (empty when none)
    pub code: String,
    /// Whether the bot is still "thinking"
    pub pending: bool,
}

impl From<Turn> for DisplayTurn {
    fn from(turn: Turn) -> Self {
        Self {
            id: turn.id,
            role: turn.sender.into(),
            text: turn.text,
            code: turn.code,
            pending: turn.pending,
        }
    }
}

/// Display role for turns
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// OrgBot
    Bot,
}

impl From<Sender> for DisplayRole {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => DisplayRole::User,
            Sender::Bot => DisplayRole::Bot,
        }
    }
}

impl DisplayRole {
    /// Get the prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            DisplayRole::User => "You: ",
            DisplayRole::Bot => "OrgBot: ",
        }
    }
}

/// A code-panel tab
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayTab {
    /// Tab ID
    pub id: TabId,
    /// Tab title
    pub title: String,
    /// Complete code
    pub full_code: String,
}

impl From<Tab> for DisplayTab {
    fn from(tab: Tab) -> Self {
        Self {
            id: tab.id,
            title: tab.title,
            full_code: tab.full_code,
        }
    }
}

impl DisplayTab {
    /// Title cut to fit `max_width` terminal columns
    pub fn short_title(&self, max_width: usize) -> String {
        if self.title.width() <= max_width {
            return self.title.clone();
        }
        let budget = max_width.saturating_sub(1);
        let mut width = 0;
        let mut short = String::new();
        for c in self.title.chars() {
            let w = c.width().unwrap_or(0);
            if width + w > budget {
                break;
            }
            width += w;
            short.push(c);
        }
        short.push('…');
        short
    }
}

/// A notification to display
#[derive(Clone, Debug)]
pub struct DisplayNotification {
    /// Notification level
    pub level: NotifyLevel,
    /// Optional title
    pub title: Option<String>,
    /// Message content
    pub message: String,
    /// When it was shown
    pub shown_at: Instant,
}

impl DisplayNotification {
    fn new(level: NotifyLevel, title: Option<String>, message: String) -> Self {
        Self {
            level,
            title,
            message,
            shown_at: Instant::now(),
        }
    }

    /// Status-bar text
    pub fn text(&self) -> String {
        match &self.title {
            Some(title) => format!("{title}: {}", self.message),
            None => self.message.clone(),
        }
    }
}

/// The full display state for the TUI
#[derive(Debug)]
pub struct DisplayState {
    /// Transcript turns in order
    pub turns: Vec<DisplayTurn>,
    /// Open tabs in creation order
    pub tabs: Vec<DisplayTab>,
    /// Active tab
    pub active_tab: Option<TabId>,
    /// Whether the code panel is shown
    pub panel_open: bool,
    /// Characters of the active tab revealed so far
    pub revealed: usize,
    /// Whether a reveal is in flight
    pub revealing: bool,
    /// Assistant state
    pub assistant_state: AssistantState,
    /// Session ID once announced
    pub session_id: Option<SessionId>,
    /// Suggested prompts
    pub prompts: Vec<String>,
    /// Pending notification (if any)
    pub notification: Option<DisplayNotification>,
    /// Goodbye message from the Assistant
    pub goodbye: Option<String>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            turns: Vec::new(),
            tabs: Vec::new(),
            active_tab: None,
            panel_open: false,
            revealed: 0,
            revealing: false,
            assistant_state: AssistantState::Initializing,
            session_id: None,
            prompts: Vec::new(),
            notification: None,
            goodbye: None,
        }
    }
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an AssistantMessage to update display state
    pub fn apply_message(&mut self, msg: AssistantMessage) {
        match msg {
            // Transcript messages
            AssistantMessage::TurnAppended { turn } => {
                self.turns.push(turn.into());
            }
            AssistantMessage::TurnResolved { turn } | AssistantMessage::TurnUpdated { turn } => {
                let turn = DisplayTurn::from(turn);
                match self.turns.iter_mut().find(|t| t.id == turn.id) {
                    Some(existing) => *existing = turn,
                    None => self.turns.push(turn),
                }
            }

            // Code panel messages
            AssistantMessage::TabOpened { tab } => {
                self.revealing = !tab.full_code.is_empty();
                self.active_tab = Some(tab.id);
                self.revealed = 0;
                self.tabs.push(tab.into());
            }
            AssistantMessage::TabActivated { tab_id } => {
                self.active_tab = Some(tab_id);
                self.revealed = 0;
            }
            AssistantMessage::TabClosed { tab_id, active } => {
                self.tabs.retain(|t| t.id != tab_id);
                if self.active_tab != active {
                    self.revealed = 0;
                }
                self.active_tab = active;
            }
            AssistantMessage::PanelVisibility { open } => {
                self.panel_open = open;
                self.revealed = 0;
            }
            AssistantMessage::RevealProgress { progress } => {
                if self.active_tab == Some(progress.tab) {
                    self.revealed = progress.revealed;
                    self.revealing = !progress.is_complete();
                }
            }
            AssistantMessage::RevealCancelled { tab_id } => {
                if self.active_tab == Some(tab_id) {
                    self.revealing = false;
                }
            }
            AssistantMessage::CopyAcknowledged { target, chars } => {
                let message = match target {
                    CopyTarget::Code { .. } => format!("Copied {chars} characters of code"),
                    CopyTarget::Transcript => format!("Transcript copied ({chars} characters)"),
                };
                self.notification = Some(DisplayNotification::new(
                    NotifyLevel::Success,
                    None,
                    message,
                ));
            }

            // System messages
            AssistantMessage::Notify {
                level,
                title,
                message,
            } => {
                self.notification = Some(DisplayNotification::new(level, title, message));
            }
            AssistantMessage::State { state } => {
                self.assistant_state = state;
            }
            AssistantMessage::SessionInfo {
                session_id,
                prompts,
            } => {
                self.session_id = Some(session_id);
                self.prompts = prompts;
            }
            AssistantMessage::Quit { message } => {
                // The app will handle quitting
                self.goodbye = message;
            }
            AssistantMessage::Ack { .. } => {}
        }
    }

    /// Expire old notifications
    pub fn update(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| now.duration_since(n.shown_at) >= NOTIFICATION_TTL)
        {
            self.notification = None;
        }
    }

    /// When the current notification expires
    pub fn notification_deadline(&self) -> Option<Instant> {
        self.notification
            .as_ref()
            .map(|n| n.shown_at + NOTIFICATION_TTL)
    }

    /// The active tab
    pub fn active(&self) -> Option<&DisplayTab> {
        let id = self.active_tab?;
        self.tabs.iter().find(|t| t.id == id)
    }

    /// The revealed prefix of the active tab's code
    pub fn revealed_code(&self) -> &str {
        let Some(tab) = self.active() else {
            return "";
        };
        let end = tab
            .full_code
            .char_indices()
            .nth(self.revealed)
            .map_or(tab.full_code.len(), |(i, _)| i);
        &tab.full_code[..end]
    }

    /// The tab `offset` positions from the active one, wrapping around
    pub fn neighbor_tab(&self, offset: isize) -> Option<TabId> {
        let len = isize::try_from(self.tabs.len()).ok().filter(|l| *l > 0)?;
        let current = self
            .active_tab
            .and_then(|id| self.tabs.iter().position(|t| t.id == id))
            .and_then(|i| isize::try_from(i).ok())
            .unwrap_or(0);
        let idx = usize::try_from((current + offset).rem_euclid(len)).ok()?;
        self.tabs.get(idx).map(|t| t.id)
    }

    /// Whether any submission is awaiting resolution
    pub fn is_resolving(&self) -> bool {
        self.turns.iter().any(|t| t.pending)
    }

    /// Clear the notification
    pub fn clear_notification(&mut self) {
        self.notification = None;
    }
}
