//! Assistant Messages
//!
//! Messages sent from the assistant to UI surfaces. A surface builds its whole
//! display from this stream: transcript turns, code-panel tabs, reveal
//! progress and notifications.
//!
//! # Design Philosophy
//!
//! The assistant owns every piece of state. Surfaces are renderers that apply
//! these messages in order; they never recompute which tab is active or how
//! much code has been revealed.

use serde::{Deserialize, Serialize};

use crate::panel::{RevealProgress, Tab, TabId};
use crate::transcript::Turn;

/// Messages from assistant to UI surface
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum AssistantMessage {
    // ============================================
    // Transcript Messages
    // ============================================
    /// A turn was appended (user turn or pending placeholder)
    TurnAppended {
        /// The new turn
        turn: Turn,
    },

    /// A pending placeholder was replaced with its resolved content
    TurnResolved {
        /// The turn as now stored
        turn: Turn,
    },

    /// A resolved turn was edited in place (offer declined)
    TurnUpdated {
        /// The turn as now stored
        turn: Turn,
    },

    // ============================================
    // Code Panel Messages
    // ============================================
    /// A tab was created and made active
    TabOpened {
        /// The new tab
        tab: Tab,
    },

    /// A different tab became active
    TabActivated {
        /// The active tab
        tab_id: TabId,
    },

    /// A tab was closed
    TabClosed {
        /// The closed tab
        tab_id: TabId,
        /// The active tab afterwards
        active: Option<TabId>,
    },

    /// The panel was opened or closed
    PanelVisibility {
        /// Whether the panel is open
        open: bool,
    },

    /// More of the active tab's code is visible
    RevealProgress {
        /// Reveal position
        progress: RevealProgress,
    },

    /// An in-flight reveal was stopped
    RevealCancelled {
        /// Tab whose reveal stopped
        tab_id: TabId,
    },

    /// Text reached the clipboard
    CopyAcknowledged {
        /// What was copied
        target: CopyTarget,
        /// Characters copied
        chars: usize,
    },

    // ============================================
    // System Messages
    // ============================================
    /// System notification
    Notify {
        /// Notification level
        level: NotifyLevel,
        /// Title (optional)
        title: Option<String>,
        /// Message content
        message: String,
    },

    /// Assistant state change
    State {
        /// The new state
        state: AssistantState,
    },

    /// Session information
    SessionInfo {
        /// Session ID
        session_id: SessionId,
        /// Suggested prompts, in display order
        prompts: Vec<String>,
    },

    /// Acknowledgment of received event
    Ack {
        /// Event ID being acknowledged
        event_id: EventId,
    },

    /// Request surface to quit
    Quit {
        /// Optional goodbye message
        message: Option<String>,
    },
}

/// What a copy request targeted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyTarget {
    /// A tab's full code
    Code {
        /// The copied tab
        tab_id: TabId,
    },
    /// The transcript export
    Transcript,
}

/// Event identifier (for acks)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new unique session ID
    pub fn new() -> Self {
        Self(format!("session_{}", uuid::Uuid::new_v4()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
    /// Success
    Success,
}

/// Assistant operational states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssistantState {
    /// Starting up, not ready
    Initializing,
    /// Ready for input
    Ready,
    /// At least one submission awaits resolution
    Resolving,
    /// Shutting down
    ShuttingDown,
}

impl AssistantState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Initializing => "Starting up...",
            Self::Ready => "Ready",
            Self::Resolving => "Thinking...",
            Self::ShuttingDown => "Shutting down...",
        }
    }
}
