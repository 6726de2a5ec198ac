//! Code Panel Manager
//!
//! Session-scoped tabs holding unlocked code samples, the active-tab pointer,
//! the panel's open/closed flag and the reveal of the active tab's code.
//!
//! # Rules
//!
//! - [`CodePanel::open_tab`] always creates a new tab (no dedup), activates it
//!   and opens the panel
//! - switching tabs, closing the active tab or closing the panel cancels the
//!   reveal and resets `revealed` to 0
//! - a reveal restarts from zero whenever it is re-armed; it never resumes
//! - while a tab is active and the panel is open, `revealed` only grows, one
//!   character per tick, until it covers the whole code
//!
//! Reveal length counts characters. The matching byte offset is tracked
//! alongside so [`CodePanel::revealed_code`] is a plain slice.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::reveal::{RevealEffect, RevealTimer};

/// Stable tab identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tab_{}", self.0)
    }
}

/// One open code sample
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    /// Stable identifier
    pub id: TabId,
    /// Title shown on the tab
    pub title: String,
    /// The complete code sample
    pub full_code: String,
}

/// Snapshot of the panel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelState {
    /// Open tabs in creation order
    pub open_tabs: Vec<Tab>,
    /// The active tab
    pub active_tab: Option<TabId>,
    /// Characters of the active tab currently shown
    pub revealed_length: usize,
    /// Whether the panel is open
    pub open: bool,
}

/// Reveal progress after a batch of ticks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealProgress {
    /// Tab being revealed
    pub tab: TabId,
    /// Characters shown
    pub revealed: usize,
    /// Characters in the full code
    pub total: usize,
}

impl RevealProgress {
    /// Whether the whole code is shown
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.revealed >= self.total
    }
}

/// Tab set, active pointer and reveal driver
#[derive(Debug)]
pub struct CodePanel {
    tabs: Vec<Tab>,
    active: Option<TabId>,
    open: bool,
    revealed_chars: usize,
    revealed_bytes: usize,
    active_chars: usize,
    next_id: u64,
    interval: Duration,
    timer: Option<RevealTimer>,
    effects: Vec<RevealEffect>,
}

impl CodePanel {
    /// Create a closed, empty panel revealing one character per `interval`
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            tabs: Vec::new(),
            active: None,
            open: false,
            revealed_chars: 0,
            revealed_bytes: 0,
            active_chars: 0,
            next_id: 0,
            interval,
            timer: None,
            effects: Vec::new(),
        }
    }

    // ============================================
    // Tab operations
    // ============================================

    /// Open a new tab, activate it and open the panel
    pub fn open_tab(
        &mut self,
        code: impl Into<String>,
        title: impl Into<String>,
        now: Instant,
    ) -> TabId {
        let id = TabId(self.next_id);
        self.next_id += 1;
        self.tabs.push(Tab {
            id,
            title: title.into(),
            full_code: code.into(),
        });

        self.open = true;
        self.switch_to(Some(id), now);
        tracing::debug!(tab = %id, tabs = self.tabs.len(), "Tab opened");
        id
    }

    /// Make `id` the active tab and restart its reveal
    ///
    /// Returns `false` if no such tab is open.
    pub fn activate(&mut self, id: TabId, now: Instant) -> bool {
        if self.tab(id).is_none() {
            return false;
        }
        self.switch_to(Some(id), now);
        true
    }

    /// Close `id`
    ///
    /// If it was active, the most recently opened remaining tab becomes
    /// active (or none). Returns `false` if no such tab is open.
    pub fn close(&mut self, id: TabId, now: Instant) -> bool {
        let Some(idx) = self.tabs.iter().position(|t| t.id == id) else {
            return false;
        };
        self.tabs.remove(idx);

        if self.active == Some(id) {
            let next = self.tabs.last().map(|t| t.id);
            self.switch_to(next, now);
        }
        tracing::debug!(tab = %id, remaining = self.tabs.len(), "Tab closed");
        true
    }

    // ============================================
    // Visibility
    // ============================================

    /// Open or close the panel
    ///
    /// Closing cancels the reveal and resets it; opening restarts it.
    /// Returns `false` if the panel was already in that state.
    pub fn set_open(&mut self, open: bool, now: Instant) -> bool {
        if self.open == open {
            return false;
        }
        self.open = open;
        self.cancel_reveal();
        self.reset_reveal();
        if open {
            self.arm_reveal(now);
        }
        true
    }

    // ============================================
    // Reveal
    // ============================================

    /// Show one more character of the active tab
    ///
    /// Returns `true` while more remains to be shown. Does nothing when no tab
    /// is active or the panel is closed.
    pub fn advance_reveal(&mut self) -> bool {
        if !self.open {
            return false;
        }
        let Some(tab) = self.active.and_then(|id| self.tab(id)) else {
            return false;
        };

        let total = tab.full_code.len();
        let step = tab.full_code[self.revealed_bytes..]
            .chars()
            .next()
            .map(char::len_utf8);

        if let Some(width) = step {
            self.revealed_bytes += width;
            self.revealed_chars += 1;
        }
        self.revealed_bytes < total
    }

    /// Run every reveal tick due at `now`
    ///
    /// Returns progress if at least one tick ran.
    pub fn tick(&mut self, now: Instant) -> Option<RevealProgress> {
        let mut timer = self.timer?;
        if !timer.is_due(now) {
            return None;
        }

        let mut more = true;
        while more && timer.is_due(now) {
            more = self.advance_reveal();
            timer.advance();
        }

        if more {
            self.timer = Some(timer);
        } else {
            self.timer = None;
            self.effects.push(RevealEffect::Completed { tab: timer.tab() });
        }

        Some(RevealProgress {
            tab: timer.tab(),
            revealed: self.revealed_chars,
            total: self.active_chars,
        })
    }

    /// When the next reveal tick is due
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.map(|t| t.deadline())
    }

    /// Whether a reveal is in flight
    #[must_use]
    pub fn is_revealing(&self) -> bool {
        self.timer.is_some()
    }

    /// Take the reveal effects recorded since the last call
    pub fn drain_effects(&mut self) -> Vec<RevealEffect> {
        std::mem::take(&mut self.effects)
    }

    fn switch_to(&mut self, id: Option<TabId>, now: Instant) {
        self.cancel_reveal();
        self.active = id;
        self.reset_reveal();
        self.arm_reveal(now);
    }

    fn reset_reveal(&mut self) {
        self.revealed_chars = 0;
        self.revealed_bytes = 0;
        self.active_chars = self.active_tab().map_or(0, |t| t.full_code.chars().count());
    }

    fn arm_reveal(&mut self, now: Instant) {
        if !self.open || self.active_chars == 0 {
            return;
        }
        if let Some(tab) = self.active {
            self.timer = Some(RevealTimer::arm(tab, now, self.interval));
            self.effects.push(RevealEffect::Armed { tab });
        }
    }

    fn cancel_reveal(&mut self) {
        if let Some(timer) = self.timer.take() {
            tracing::trace!(tab = %timer.tab(), revealed = self.revealed_chars, "Reveal cancelled");
            self.effects.push(RevealEffect::Cancelled {
                tab: timer.tab(),
                revealed: self.revealed_chars,
            });
        }
    }

    // ============================================
    // Queries
    // ============================================

    /// Look up an open tab
    #[must_use]
    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    /// Open tabs in creation order
    #[must_use]
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// The active tab id
    #[must_use]
    pub fn active(&self) -> Option<TabId> {
        self.active
    }

    /// The active tab
    #[must_use]
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.and_then(|id| self.tab(id))
    }

    /// Whether the panel is open
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Characters of the active tab currently shown
    #[must_use]
    pub fn revealed_length(&self) -> usize {
        self.revealed_chars
    }

    /// The shown prefix of the active tab's code
    #[must_use]
    pub fn revealed_code(&self) -> &str {
        self.active_tab()
            .map_or("", |t| &t.full_code[..self.revealed_bytes])
    }

    /// Snapshot of the panel
    #[must_use]
    pub fn state(&self) -> PanelState {
        PanelState {
            open_tabs: self.tabs.clone(),
            active_tab: self.active,
            revealed_length: self.revealed_chars,
            open: self.open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TICK: Duration = Duration::from_millis(10);

    fn panel() -> CodePanel {
        CodePanel::new(TICK)
    }

    #[test]
    fn test_open_tab_activates_and_opens() {
        let now = Instant::now();
        let mut panel = panel();
        let id = panel.open_tab("\nls", "Listing", now);

        assert!(panel.is_open());
        assert_eq!(panel.active(), Some(id));
        assert_eq!(panel.revealed_length(), 0);
        assert!(panel.is_revealing());
        assert_eq!(panel.drain_effects(), vec![RevealEffect::Armed { tab: id }]);
    }

    #[test]
    fn test_open_tab_never_dedups() {
        let now = Instant::now();
        let mut panel = panel();
        let a = panel.open_tab("same", "Same", now);
        let b = panel.open_tab("same", "Same", now);
        assert_ne!(a, b);
        assert_eq!(panel.tabs().len(), 2);
        assert_eq!(panel.active(), Some(b));
    }

    #[test]
    fn test_open_then_close_restores_state() {
        let now = Instant::now();
        let mut panel = panel();
        let before = panel.state();

        let id = panel.open_tab("code", "Title", now);
        assert!(panel.close(id, now));

        let after = panel.state();
        assert_eq!(after.open_tabs, before.open_tabs);
        assert_eq!(after.active_tab, before.active_tab);
        assert_eq!(after.revealed_length, 0);
        assert!(!panel.is_revealing());
        assert!(!panel.close(id, now));
    }

    #[test]
    fn test_close_active_picks_last_remaining() {
        let now = Instant::now();
        let mut panel = panel();
        let a = panel.open_tab("a", "A", now);
        let b = panel.open_tab("b", "B", now);
        let c = panel.open_tab("c", "C", now);

        panel.activate(a, now);
        panel.close(a, now);
        assert_eq!(panel.active(), Some(c));

        // Closing an inactive tab keeps the active one
        panel.close(b, now);
        assert_eq!(panel.active(), Some(c));
    }

    #[test]
    fn test_advance_reveal_counts_chars() {
        let now = Instant::now();
        let mut panel = panel();
        panel.open_tab("a→b", "Unicode", now);

        assert!(panel.advance_reveal());
        assert_eq!(panel.revealed_code(), "a");
        assert!(panel.advance_reveal());
        assert_eq!(panel.revealed_code(), "a→");
        assert!(!panel.advance_reveal());
        assert_eq!(panel.revealed_length(), 3);

        // Stops advancing once complete
        assert!(!panel.advance_reveal());
        assert_eq!(panel.revealed_length(), 3);
    }

    #[test]
    fn test_advance_reveal_requires_open_panel() {
        let now = Instant::now();
        let mut panel = panel();
        assert!(!panel.advance_reveal());

        panel.open_tab("abc", "T", now);
        panel.set_open(false, now);
        assert!(!panel.advance_reveal());
        assert_eq!(panel.revealed_length(), 0);
    }

    #[test]
    fn test_tick_reveals_one_char_per_interval() {
        let start = Instant::now();
        let mut panel = panel();
        let id = panel.open_tab("abcd", "T", start);

        assert!(panel.tick(start).is_none());
        let progress = panel.tick(start + TICK).unwrap();
        assert_eq!(progress, RevealProgress { tab: id, revealed: 1, total: 4 });

        // Catch up on missed ticks
        let progress = panel.tick(start + TICK * 3).unwrap();
        assert_eq!(progress.revealed, 3);
        assert_eq!(panel.next_deadline(), Some(start + TICK * 4));
    }

    #[test]
    fn test_reveal_is_monotonic_and_finishes() {
        let start = Instant::now();
        let mut panel = panel();
        let id = panel.open_tab("\nprint('hi')", "T", start);
        panel.drain_effects();

        let mut last = 0;
        let mut now = start;
        for _ in 0..100 {
            now += TICK;
            if let Some(progress) = panel.tick(now) {
                assert!(progress.revealed >= last);
                last = progress.revealed;
            }
        }
        assert_eq!(last, 12);
        assert!(!panel.is_revealing());
        assert_eq!(panel.revealed_code(), "\nprint('hi')");
        assert_eq!(panel.drain_effects(), vec![RevealEffect::Completed { tab: id }]);
        assert!(panel.tick(now + TICK).is_none());
    }

    #[test]
    fn test_switching_tabs_cancels_and_restarts() {
        let start = Instant::now();
        let mut panel = panel();
        let a = panel.open_tab("aaaa", "A", start);
        let b = panel.open_tab("bbbb", "B", start);
        panel.tick(start + TICK * 2);
        assert_eq!(panel.revealed_length(), 2);
        panel.drain_effects();

        panel.activate(a, start + TICK * 2);
        assert_eq!(panel.revealed_length(), 0);
        assert_eq!(
            panel.drain_effects(),
            vec![
                RevealEffect::Cancelled { tab: b, revealed: 2 },
                RevealEffect::Armed { tab: a },
            ]
        );

        // No partial tick from the old timer
        assert!(panel.tick(start + TICK * 2).is_none());
    }

    #[test]
    fn test_closing_panel_cancels_and_reopening_restarts() {
        let start = Instant::now();
        let mut panel = panel();
        let id = panel.open_tab("abcdef", "T", start);
        panel.tick(start + TICK * 3);
        panel.drain_effects();

        assert!(panel.set_open(false, start + TICK * 3));
        assert_eq!(panel.revealed_length(), 0);
        assert_eq!(panel.next_deadline(), None);
        assert!(!panel.set_open(false, start + TICK * 3));

        assert!(panel.set_open(true, start + TICK * 4));
        assert_eq!(panel.active(), Some(id));
        assert_eq!(panel.revealed_length(), 0);
        assert_eq!(panel.next_deadline(), Some(start + TICK * 5));
    }

    #[test]
    fn test_empty_code_is_never_armed() {
        let now = Instant::now();
        let mut panel = panel();
        panel.open_tab("", "Empty", now);
        assert!(!panel.is_revealing());
        assert_eq!(panel.revealed_code(), "");
    }
}
