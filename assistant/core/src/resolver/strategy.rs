//! Match strategies
//!
//! Each tier of the resolver is a tagged [`MatchStrategy`]. A strategy is a
//! pure function of a [`MatchContext`]: it either produces an outcome or
//! passes. The resolver runs the tiers in a fixed order and the first hit
//! wins, so the tie-break policy lives entirely in [`QUESTION_TIERS`] and
//! [`UNLOCK_TIERS`].

use serde::{Deserialize, Serialize};

use super::ResolutionOutcome;
use crate::catalog::{Catalog, CatalogEntry};
use crate::normalize::fuzzy_key;
use crate::transcript::Turn;

/// Tiers tried for an ordinary question, in priority order
pub const QUESTION_TIERS: [MatchStrategy; 2] =
    [MatchStrategy::ExactKey, MatchStrategy::VariationList];

/// Tiers tried when an affirmative reply answers a code offer, in priority order
pub const UNLOCK_TIERS: [MatchStrategy; 4] = [
    MatchStrategy::FuzzyContainment,
    MatchStrategy::PrefixSplit,
    MatchStrategy::LastCodeFallback,
    MatchStrategy::AnyPriorCodeFallback,
];

/// One resolution tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStrategy {
    // ============================================
    // Question tiers
    // ============================================
    /// Strict key equals a catalog key
    ExactKey,
    /// Strict key contains one of an entry's variation phrasings
    VariationList,

    // ============================================
    // Unlock tiers
    // ============================================
    /// Fuzzy offer text and fuzzy entry text contain one another
    FuzzyContainment,
    /// Offer text starts with the part of an entry's text before the marker
    PrefixSplit,
    /// The offer turn carries code of its own
    LastCodeFallback,
    /// Some earlier bot turn carries code
    AnyPriorCodeFallback,
}

impl MatchStrategy {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExactKey => "exact_key",
            Self::VariationList => "variation_list",
            Self::FuzzyContainment => "fuzzy_containment",
            Self::PrefixSplit => "prefix_split",
            Self::LastCodeFallback => "last_code_fallback",
            Self::AnyPriorCodeFallback => "any_prior_code_fallback",
        }
    }

    /// Whether this tier unlocks code rather than answering a question
    #[must_use]
    pub fn is_unlock(&self) -> bool {
        !matches!(self, Self::ExactKey | Self::VariationList)
    }

    /// Evaluate this tier
    #[must_use]
    pub fn apply(&self, ctx: &MatchContext<'_>) -> Option<ResolutionOutcome> {
        match self {
            Self::ExactKey => ctx
                .catalog
                .lookup(ctx.input_key)
                .map(|entry| ResolutionOutcome::NewAnswer(entry.response.clone())),

            Self::VariationList => ctx
                .catalog
                .find_variation(ctx.input_key)
                .map(|entry| ResolutionOutcome::NewAnswer(entry.response.clone())),

            Self::FuzzyContainment => {
                let offer = fuzzy_key(&ctx.offer?.text);
                if offer.is_empty() {
                    return None;
                }
                ctx.code_entries()
                    .find(|(_, text)| offer.contains(text.as_str()) || text.contains(&offer))
                    .map(|(entry, _)| unlock_entry(entry))
            }

            Self::PrefixSplit => {
                let offer = fuzzy_key(&ctx.offer?.text);
                let marker = fuzzy_key(ctx.marker);
                if marker.is_empty() {
                    return None;
                }
                ctx.code_entries()
                    .find(|(_, text)| {
                        let prefix = text.split(marker.as_str()).next().unwrap_or_default().trim();
                        !prefix.is_empty() && offer.starts_with(prefix)
                    })
                    .map(|(entry, _)| unlock_entry(entry))
            }

            Self::LastCodeFallback => ctx
                .offer
                .filter(|turn| turn.has_code())
                .map(|turn| unlock_code(&turn.code, ctx.generic_title)),

            Self::AnyPriorCodeFallback => ctx
                .history
                .iter()
                .rev()
                .find(|turn| turn.is_bot() && !turn.pending && turn.has_code())
                .map(|turn| unlock_code(&turn.code, ctx.generic_title)),
        }
    }
}

/// Everything a tier may look at
#[derive(Clone, Copy, Debug)]
pub struct MatchContext<'a> {
    /// The read-only catalog
    pub catalog: &'a Catalog,
    /// Strict-normalized user input
    pub input_key: &'a str,
    /// The bot turn carrying the offer being answered
    pub offer: Option<&'a Turn>,
    /// Turns visible to the resolution, oldest first
    pub history: &'a [Turn],
    /// Follow-up marker phrase
    pub marker: &'a str,
    /// Tab title for code not tied to a catalog entry
    pub generic_title: &'a str,
}

impl<'a> MatchContext<'a> {
    /// Entries with code, paired with their fuzzy-normalized text
    ///
    /// Entries whose text normalizes to nothing are skipped, since the empty
    /// string is contained in every offer.
    fn code_entries(&self) -> impl Iterator<Item = (&'a CatalogEntry, String)> + 'a {
        self.catalog
            .entries()
            .filter(|entry| entry.response.has_code())
            .map(|entry| (entry, fuzzy_key(&entry.response.text)))
            .filter(|(_, text)| !text.is_empty())
    }
}

fn unlock_entry(entry: &CatalogEntry) -> ResolutionOutcome {
    unlock_code(&entry.response.code, &entry.title)
}

fn unlock_code(code: &str, title: &str) -> ResolutionOutcome {
    ResolutionOutcome::CodeUnlock {
        code: format!("\n{code}"),
        title: title.to_string(),
    }
}
