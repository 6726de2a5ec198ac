//! Conversation State Machine
//!
//! Owns the transcript and drives each exchange through
//! `Idle -> AwaitingResolution -> Resolved`:
//!
//! 1. [`Conversation::submit`] appends the user turn and a pending bot turn
//! 2. [`Conversation::resolve_next`] (called once the resolution delay has
//!    elapsed) asks the resolver and replaces that pending turn by id
//!
//! Submissions are accepted while others are outstanding. Each gets its own
//! user/pending pair and they resolve FIFO. Because replacement is addressed
//! by [`TurnId`], a resolution can never land in another submission's
//! placeholder.
//!
//! Timing is not handled here. The owner schedules when to call
//! [`Conversation::resolve_next`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::resolver::{ResolutionOutcome, Resolver, NO_CODE_AVAILABLE};
use crate::transcript::{Transcript, Turn, TurnId};

/// Bot text when a "yes" finds no code to unlock
pub const NO_CODE_APOLOGY: &str = "Sorry, I couldn't find any code to show for this prompt.";

/// Exchange state of the conversation as a whole
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeState {
    /// No resolution outstanding
    Idle,
    /// At least one pending turn awaits resolution
    AwaitingResolution,
}

/// Turns created by one submission
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// The user turn
    pub user: TurnId,
    /// The pending bot placeholder
    pub pending: TurnId,
}

/// A completed resolution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    /// The resolved bot turn, as now stored in the transcript
    pub turn: Turn,
    /// What the resolver decided
    pub outcome: ResolutionOutcome,
}

#[derive(Clone, Debug)]
struct Outstanding {
    submission: Submission,
    input: String,
}

/// Transcript owner and per-exchange state machine
#[derive(Clone, Debug)]
pub struct Conversation {
    transcript: Transcript,
    resolver: Resolver,
    outstanding: VecDeque<Outstanding>,
}

impl Conversation {
    /// Create an idle conversation with an empty transcript
    #[must_use]
    pub fn new(resolver: Resolver) -> Self {
        Self {
            transcript: Transcript::new(),
            resolver,
            outstanding: VecDeque::new(),
        }
    }

    /// Current exchange state
    #[must_use]
    pub fn state(&self) -> ExchangeState {
        if self.outstanding.is_empty() {
            ExchangeState::Idle
        } else {
            ExchangeState::AwaitingResolution
        }
    }

    /// Append a user turn and a pending bot turn
    pub fn submit(&mut self, text: impl Into<String>) -> Submission {
        let input = text.into();
        let user = self.transcript.push_user(input.clone());
        let pending = self.transcript.push_pending();
        let submission = Submission { user, pending };

        tracing::debug!(user = %user, pending = %pending, "Submission accepted");
        self.outstanding.push_back(Outstanding { submission, input });
        submission
    }

    /// The oldest outstanding submission
    #[must_use]
    pub fn next_outstanding(&self) -> Option<Submission> {
        self.outstanding.front().map(|o| o.submission)
    }

    /// Number of outstanding submissions
    #[must_use]
    pub fn outstanding_len(&self) -> usize {
        self.outstanding.len()
    }

    /// Resolve the oldest outstanding submission
    pub fn resolve_next(&mut self) -> Option<Resolved> {
        let next = self.outstanding.pop_front()?;
        self.complete(next)
    }

    /// Resolve a specific outstanding submission by its pending turn id
    pub fn resolve(&mut self, pending: TurnId) -> Option<Resolved> {
        let idx = self
            .outstanding
            .iter()
            .position(|o| o.submission.pending == pending)?;
        let target = self.outstanding.remove(idx)?;
        self.complete(target)
    }

    fn complete(&mut self, outstanding: Outstanding) -> Option<Resolved> {
        let Submission { user, pending } = outstanding.submission;

        // Context is everything before this submission's user turn
        let outcome = self
            .resolver
            .resolve(&outstanding.input, self.transcript.history_before(user));
        let (text, code) = turn_content(&outcome);

        let turn = self.transcript.resolve(pending, text, code)?.clone();
        tracing::info!(turn = %turn.id, outcome = outcome.kind(), "Resolved pending turn");
        Some(Resolved { turn, outcome })
    }

    /// Run the unlock tiers anchored at a specific bot turn
    ///
    /// The transcript is not modified.
    #[must_use]
    pub fn accept_offer(&self, offer: TurnId) -> ResolutionOutcome {
        match self.transcript.get(offer) {
            Some(turn) => self
                .resolver
                .unlock(turn, self.transcript.history_through(offer)),
            None => ResolutionOutcome::Unmatched {
                reason: NO_CODE_AVAILABLE.to_string(),
            },
        }
    }

    /// Strip the follow-up offer from a bot turn
    ///
    /// Returns the updated turn, or `None` if there was nothing to strip.
    pub fn decline_offer(&mut self, offer: TurnId) -> Option<Turn> {
        let marker = self.resolver.settings().follow_up_marker.clone();
        let turn = self.transcript.strip_follow_up(offer, &marker)?.clone();
        tracing::debug!(turn = %offer, "Follow-up offer declined");
        Some(turn)
    }

    /// Most recent resolved bot turn still carrying an offer
    #[must_use]
    pub fn latest_offer(&self) -> Option<TurnId> {
        self.transcript
            .turns()
            .iter()
            .rev()
            .find(|t| self.resolver.is_offer(t))
            .map(|t| t.id)
    }

    /// The transcript
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The resolver
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}

/// Bot text and code for a resolved turn
fn turn_content(outcome: &ResolutionOutcome) -> (String, String) {
    match outcome {
        ResolutionOutcome::NewAnswer(r) | ResolutionOutcome::Default(r) => {
            (r.text.clone(), r.code.clone())
        }
        ResolutionOutcome::CodeUnlock { title, .. } => {
            (format!("Opening \"{title}\" in the code panel."), String::new())
        }
        ResolutionOutcome::Unmatched { .. } => (NO_CODE_APOLOGY.to_string(), String::new()),
    }
}
