//! Transcript
//!
//! The ordered history of turns in one session. Turns live in an arena and
//! are addressed by a stable [`TurnId`], so replacing a pending placeholder
//! is an update-by-id rather than a search for a marker string. This keeps
//! several outstanding resolutions from ever overwriting each other's
//! placeholders.
//!
//! The transcript is append-only, with two in-place edits:
//! - a pending bot turn is replaced once with its resolved content
//! - a resolved bot turn may have its follow-up offer stripped (user said "No")

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::find_marker;

/// Stable turn identifier, unique and increasing within a transcript
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TurnId(pub u64);

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "turn_{}", self.0)
    }
}

/// Who produced a turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    /// Typed or transcribed user input
    User,
    /// The assistant
    Bot,
}

/// One entry in the transcript
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Stable identifier
    pub id: TurnId,
    /// Display text (empty while pending)
    pub text: String,
    /// Who produced it
    pub sender: Sender,
    /// Attached code sample (empty when none)
    #[serde(default)]
    pub code: String,
    /// When the turn was created or last resolved
    pub timestamp: DateTime<Utc>,
    /// Whether this is a placeholder awaiting resolution
    pub pending: bool,
}

impl Turn {
    fn new(id: TurnId, sender: Sender, text: String, code: String, pending: bool) -> Self {
        Self {
            id,
            text,
            sender,
            code,
            timestamp: Utc::now(),
            pending,
        }
    }

    /// Whether this is a bot turn
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }

    /// Whether the turn carries a non-blank code sample
    #[must_use]
    pub fn has_code(&self) -> bool {
        !self.code.trim().is_empty()
    }
}

/// Ordered, id-addressed turn history
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
    next_id: u64,
}

impl Transcript {
    /// Create an empty transcript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> TurnId {
        let id = TurnId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a user turn
    pub fn push_user(&mut self, text: impl Into<String>) -> TurnId {
        let id = self.allocate_id();
        self.turns
            .push(Turn::new(id, Sender::User, text.into(), String::new(), false));
        id
    }

    /// Append a resolved bot turn
    pub fn push_bot(&mut self, text: impl Into<String>, code: impl Into<String>) -> TurnId {
        let id = self.allocate_id();
        self.turns
            .push(Turn::new(id, Sender::Bot, text.into(), code.into(), false));
        id
    }

    /// Append a pending bot placeholder
    pub fn push_pending(&mut self) -> TurnId {
        let id = self.allocate_id();
        self.turns
            .push(Turn::new(id, Sender::Bot, String::new(), String::new(), true));
        id
    }

    /// Replace a pending placeholder with its resolved content
    ///
    /// Returns `None` if `id` is unknown or already resolved.
    pub fn resolve(
        &mut self,
        id: TurnId,
        text: impl Into<String>,
        code: impl Into<String>,
    ) -> Option<&Turn> {
        let turn = self.get_mut(id).filter(|t| t.pending)?;
        turn.text = text.into();
        turn.code = code.into();
        turn.pending = false;
        turn.timestamp = Utc::now();
        Some(turn)
    }

    /// Remove the follow-up offer sentence from a resolved bot turn
    ///
    /// The sentence runs from the marker through the next `?` (or the end of
    /// the text). Returns `None` if the turn is unknown, pending, a user turn,
    /// or carries no offer.
    pub fn strip_follow_up(&mut self, id: TurnId, marker: &str) -> Option<&Turn> {
        let turn = self.get_mut(id).filter(|t| t.is_bot() && !t.pending)?;
        let start = find_marker(&turn.text, marker)?;
        let end = turn.text[start..]
            .find('?')
            .map_or(turn.text.len(), |offset| start + offset + 1);

        let mut text = turn.text[..start].trim_end().to_string();
        text.push_str(&turn.text[end..]);
        turn.text = text.trim_end().to_string();
        Some(turn)
    }

    fn position(&self, id: TurnId) -> Option<usize> {
        self.turns.binary_search_by_key(&id, |t| t.id).ok()
    }

    fn get_mut(&mut self, id: TurnId) -> Option<&mut Turn> {
        let idx = self.position(id)?;
        self.turns.get_mut(idx)
    }

    /// Get a turn by id
    #[must_use]
    pub fn get(&self, id: TurnId) -> Option<&Turn> {
        self.position(id).map(|idx| &self.turns[idx])
    }

    /// Turns strictly before `id`, in order (empty if `id` is unknown)
    #[must_use]
    pub fn history_before(&self, id: TurnId) -> &[Turn] {
        match self.position(id) {
            Some(idx) => &self.turns[..idx],
            None => &[],
        }
    }

    /// Turns up to and including `id` (empty if `id` is unknown)
    #[must_use]
    pub fn history_through(&self, id: TurnId) -> &[Turn] {
        match self.position(id) {
            Some(idx) => &self.turns[..=idx],
            None => &[],
        }
    }

    /// All turns in order
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Ids of pending placeholders, oldest first
    pub fn pending_ids(&self) -> impl Iterator<Item = TurnId> + '_ {
        self.turns.iter().filter(|t| t.pending).map(|t| t.id)
    }

    /// Number of turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the transcript is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Pretty JSON export of all turns
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.turns)
    }
}

/// Most recent resolved bot turn in `history`
#[must_use]
pub fn last_bot_turn(history: &[Turn]) -> Option<&Turn> {
    history.iter().rev().find(|t| t.is_bot() && !t.pending)
}
