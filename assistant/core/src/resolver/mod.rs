//! Resolver
//!
//! Decides what a submission means. Given raw user text and the turns that
//! preceded it, the resolver produces exactly one [`ResolutionOutcome`]:
//!
//! - an affirmative reply to a bot turn carrying the follow-up marker runs the
//!   unlock tiers and yields [`ResolutionOutcome::CodeUnlock`] or
//!   [`ResolutionOutcome::Unmatched`]
//! - anything else runs the question tiers and yields
//!   [`ResolutionOutcome::NewAnswer`] or [`ResolutionOutcome::Default`]
//!
//! Resolution never fails. Every miss degrades to a valid outcome here, so
//! callers have no error branch to handle.
//!
//! The catalog is injected at construction and shared read-only.

mod strategy;

pub use strategy::{MatchContext, MatchStrategy, QUESTION_TIERS, UNLOCK_TIERS};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Response};
use crate::normalize::{contains_marker, is_affirmative, strict_key};
use crate::transcript::{last_bot_turn, Turn};

/// Reason reported when no unlock tier produced code
pub const NO_CODE_AVAILABLE: &str = "no code available";

/// What a submission resolved to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    /// The input matched a catalog entry
    NewAnswer(Response),
    /// An affirmative reply unlocked a code sample
    CodeUnlock {
        /// Code to show, prefixed with a newline
        code: String,
        /// Tab title
        title: String,
    },
    /// The input matched nothing; carries the fallback response
    Default(Response),
    /// An affirmative reply found no code to unlock
    Unmatched {
        /// Why nothing was unlocked
        reason: String,
    },
}

impl ResolutionOutcome {
    fn unmatched() -> Self {
        Self::Unmatched {
            reason: NO_CODE_AVAILABLE.to_string(),
        }
    }

    /// Short name for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewAnswer(_) => "new_answer",
            Self::CodeUnlock { .. } => "code_unlock",
            Self::Default(_) => "default",
            Self::Unmatched { .. } => "unmatched",
        }
    }
}

/// Resolver settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Phrase marking a pending yes/no code offer
    pub follow_up_marker: String,
    /// Tab title used when unlocked code has no catalog entry
    pub generic_title: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            follow_up_marker: "would you like".to_string(),
            generic_title: "Code".to_string(),
        }
    }
}

/// Maps user input to outcomes against an injected catalog
#[derive(Clone, Debug)]
pub struct Resolver {
    catalog: Arc<Catalog>,
    settings: ResolverSettings,
}

impl Resolver {
    /// Create a resolver over `catalog`
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, settings: ResolverSettings) -> Self {
        Self { catalog, settings }
    }

    /// The catalog this resolver consults
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolver settings
    #[must_use]
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Whether `turn` is a resolved bot turn carrying a code offer
    #[must_use]
    pub fn is_offer(&self, turn: &Turn) -> bool {
        turn.is_bot() && !turn.pending && contains_marker(&turn.text, &self.settings.follow_up_marker)
    }

    /// Resolve `raw` against the turns that preceded it
    ///
    /// Only the most recent resolved bot turn in `history` is considered as
    /// an offer.
    #[must_use]
    pub fn resolve(&self, raw: &str, history: &[Turn]) -> ResolutionOutcome {
        let input_key = strict_key(raw);

        if is_affirmative(&input_key) {
            if let Some(offer) = last_bot_turn(history).filter(|t| self.is_offer(t)) {
                tracing::debug!(offer = %offer.id, "Affirmative reply to code offer");
                return self.run_unlock_tiers(offer, history);
            }
        }

        let ctx = self.context(&input_key, None, history);
        for strategy in QUESTION_TIERS {
            if let Some(outcome) = strategy.apply(&ctx) {
                tracing::debug!(tier = strategy.name(), "Question matched");
                return outcome;
            }
        }

        tracing::debug!(input = %input_key, "No catalog match, using default response");
        ResolutionOutcome::Default(self.catalog.default_response().clone())
    }

    /// Unlock code for a specific offer turn
    ///
    /// `history` should end at `offer`. Returns `Unmatched` when `offer`
    /// carries no marker or no tier produces code.
    #[must_use]
    pub fn unlock(&self, offer: &Turn, history: &[Turn]) -> ResolutionOutcome {
        if !self.is_offer(offer) {
            return ResolutionOutcome::unmatched();
        }
        self.run_unlock_tiers(offer, history)
    }

    fn run_unlock_tiers(&self, offer: &Turn, history: &[Turn]) -> ResolutionOutcome {
        let ctx = self.context("", Some(offer), history);
        for strategy in UNLOCK_TIERS {
            if let Some(outcome) = strategy.apply(&ctx) {
                tracing::debug!(tier = strategy.name(), offer = %offer.id, "Code unlocked");
                return outcome;
            }
        }

        tracing::debug!(offer = %offer.id, "No unlock tier produced code");
        ResolutionOutcome::unmatched()
    }

    fn context<'a>(
        &'a self,
        input_key: &'a str,
        offer: Option<&'a Turn>,
        history: &'a [Turn],
    ) -> MatchContext<'a> {
        MatchContext {
            catalog: &self.catalog,
            input_key,
            offer,
            history,
            marker: &self.settings.follow_up_marker,
            generic_title: &self.settings.generic_title,
        }
    }
}
