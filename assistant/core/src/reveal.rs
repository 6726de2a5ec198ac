//! Reveal timer
//!
//! The typing reveal is a cancellable timed process bound to one tab. The
//! timer holds the tab identity it was armed for plus the instant of its next
//! tick, and it is the only thing that advances a reveal. Arming and
//! cancelling are recorded as [`RevealEffect`]s so owners can observe
//! cancellation instead of inferring it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::panel::TabId;

/// A scheduled reveal for one tab
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealTimer {
    tab: TabId,
    next_tick: Instant,
    interval: Duration,
}

impl RevealTimer {
    /// Arm a timer whose first tick is one interval after `now`
    #[must_use]
    pub fn arm(tab: TabId, now: Instant, interval: Duration) -> Self {
        Self {
            tab,
            next_tick: now + interval,
            interval,
        }
    }

    /// Tab this timer reveals
    #[must_use]
    pub fn tab(&self) -> TabId {
        self.tab
    }

    /// When the next tick is due
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.next_tick
    }

    /// Whether a tick is due at `now`
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_tick <= now
    }

    /// Consume one tick
    pub fn advance(&mut self) {
        self.next_tick += self.interval;
    }
}

/// Lifecycle changes of the reveal timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealEffect {
    /// A reveal started from zero
    Armed {
        /// Tab being revealed
        tab: TabId,
    },
    /// An in-flight reveal was stopped before finishing
    Cancelled {
        /// Tab whose reveal stopped
        tab: TabId,
        /// Characters shown when it stopped
        revealed: usize,
    },
    /// A reveal showed the whole code sample
    Completed {
        /// Tab that finished
        tab: TabId,
    },
}
