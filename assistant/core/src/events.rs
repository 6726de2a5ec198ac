//! Surface Events
//!
//! Events sent from UI surfaces to the assistant. These represent all the ways
//! a surface reports what the user did.
//!
//! # Design Philosophy
//!
//! Surfaces forward user actions without interpreting them. A surface does not
//! decide whether "yes" unlocks code or which tab becomes active after a
//! close; it reports the action and renders whatever the assistant answers.

use serde::{Deserialize, Serialize};

use crate::messages::EventId;
use crate::panel::TabId;
use crate::transcript::TurnId;

/// Events from UI surface to assistant
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SurfaceEvent {
    // ============================================
    // Input Events
    // ============================================
    /// User submitted text (typed or a final speech transcript)
    Submit {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// The submitted text
        text: String,
    },

    /// User picked one of the suggested prompts
    PromptSelected {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Position in the catalog's prompt list
        index: usize,
    },

    // ============================================
    // Offer Events
    // ============================================
    /// User pressed "Yes" on a bot turn's code offer
    AcceptOffer {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// The bot turn carrying the offer
        turn_id: TurnId,
    },

    /// User pressed "No" on a bot turn's code offer
    DeclineOffer {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// The bot turn carrying the offer
        turn_id: TurnId,
    },

    // ============================================
    // Panel Events
    // ============================================
    /// User selected a tab
    ActivateTab {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Tab to activate
        tab_id: TabId,
    },

    /// User closed a tab
    CloseTab {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Tab to close
        tab_id: TabId,
    },

    /// Open or close the code panel
    SetPanelOpen {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Desired visibility
        open: bool,
    },

    /// Flip the code panel's visibility
    TogglePanel {
        /// Event ID for acknowledgment
        event_id: EventId,
    },

    /// Copy the active tab's full code
    CopyActiveTab {
        /// Event ID for acknowledgment
        event_id: EventId,
    },

    /// Copy the transcript as JSON
    ExportTranscript {
        /// Event ID for acknowledgment
        event_id: EventId,
    },

    // ============================================
    // Lifecycle Events
    // ============================================
    /// User requested quit
    QuitRequested {
        /// Event ID for acknowledgment
        event_id: EventId,
    },
}

impl SurfaceEvent {
    /// Generate a new event ID
    pub fn new_event_id() -> EventId {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        EventId(format!("evt_{id}"))
    }

    /// Submit `text` with a fresh event ID
    pub fn submit(text: impl Into<String>) -> Self {
        Self::Submit {
            event_id: Self::new_event_id(),
            text: text.into(),
        }
    }

    /// The event's ID
    #[must_use]
    pub fn event_id(&self) -> &EventId {
        match self {
            Self::Submit { event_id, .. }
            | Self::PromptSelected { event_id, .. }
            | Self::AcceptOffer { event_id, .. }
            | Self::DeclineOffer { event_id, .. }
            | Self::ActivateTab { event_id, .. }
            | Self::CloseTab { event_id, .. }
            | Self::SetPanelOpen { event_id, .. }
            | Self::TogglePanel { event_id }
            | Self::CopyActiveTab { event_id }
            | Self::ExportTranscript { event_id }
            | Self::QuitRequested { event_id } => event_id,
        }
    }
}
