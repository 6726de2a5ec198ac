//! Integration Tests for TUI + Assistant
//!
//! These tests verify the full interaction flow between the TUI's client
//! and display state and the embedded Assistant, on tokio's paused clock.
//!
//! # Test Coverage
//!
//! 1. **Startup Flow**: Session info and prompts reach the display
//! 2. **Offer Flow**: A scripted prompt, then "yes", fills the code panel
//! 3. **Panel Flow**: Reveal, tab switching and closing as the display sees them

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use orgbot_core::{AssistantConfig, AssistantState, Catalog, MemoryClipboard, TabId};
use orgbot_tui::assistant_client::AssistantClient;
use orgbot_tui::display::{DisplayRole, DisplayState};

const DELAY: Duration = Duration::from_millis(1500);
const TICK: Duration = Duration::from_millis(10);

// ============================================================================
// Helpers
// ============================================================================

struct Surface {
    client: AssistantClient,
    display: DisplayState,
    clipboard: MemoryClipboard,
}

impl Surface {
    async fn start() -> Self {
        Self::start_with(AssistantConfig::default()).await
    }

    async fn start_with(config: AssistantConfig) -> Self {
        let clipboard = MemoryClipboard::new();
        let mut client = AssistantClient::new(
            Arc::new(Catalog::builtin()),
            config,
            Arc::new(clipboard.clone()),
        );
        tokio_test::assert_ok!(client.start().await);

        let mut surface = Self {
            client,
            display: DisplayState::new(),
            clipboard,
        };
        surface.pump();
        surface
    }

    fn pump(&mut self) {
        for msg in self.client.recv_all() {
            self.display.apply_message(msg);
        }
    }

    /// Let time pass the way the frame loop does
    async fn wait(&mut self, by: Duration) {
        tokio::time::advance(by).await;
        self.client.poll_timers().await;
        self.pump();
    }
}

// ============================================================================
// Startup Flow
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_startup_announces_prompts() {
    let surface = Surface::start().await;

    assert_eq!(surface.display.assistant_state, AssistantState::Ready);
    assert!(surface.display.session_id.is_some());
    assert_eq!(
        surface.display.prompts,
        vec![
            "Check for public S3 buckets",
            "Connect Jira to OrgBot",
            "Upload latest privacy policy",
            "List users without MFA",
            "Generate a security checklist",
        ]
    );
}

// ============================================================================
// Offer Flow
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_prompt_then_yes_fills_code_panel() {
    let mut surface = Surface::start().await;

    surface.client.select_prompt(0).await.unwrap();
    surface.pump();
    assert!(surface.display.is_resolving());
    assert_eq!(surface.display.assistant_state, AssistantState::Resolving);

    surface.wait(DELAY).await;
    assert!(!surface.display.is_resolving());
    assert!(surface.client.latest_offer().is_some());

    surface.client.submit("yes".to_string()).await.unwrap();
    surface.wait(DELAY).await;

    assert!(surface.display.panel_open);
    let tab = surface.display.active().unwrap();
    assert_eq!(tab.title, "Check for public S3 buckets");

    let bot_turns = surface
        .display
        .turns
        .iter()
        .filter(|t| t.role == DisplayRole::Bot)
        .count();
    assert_eq!(bot_turns, 2);

    surface.wait(TICK * 6).await;
    assert_eq!(surface.display.revealed, 6);
    assert!(surface.display.revealing);
}

#[tokio::test(start_paused = true)]
async fn test_accept_button_unlocks_without_typing() {
    let mut surface = Surface::start().await;

    surface.client.select_prompt(1).await.unwrap();
    surface.wait(DELAY).await;

    let offer = surface.client.latest_offer().unwrap();
    surface.client.accept_offer(offer).await.unwrap();
    surface.pump();

    assert_eq!(surface.display.active().unwrap().title, "Connect Jira to OrgBot");
    // Accepting adds no turns
    assert_eq!(surface.display.turns.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_decline_removes_offer() {
    let mut surface = Surface::start().await;

    surface.client.select_prompt(2).await.unwrap();
    surface.wait(DELAY).await;

    let offer = surface.client.latest_offer().unwrap();
    surface.client.decline_offer(offer).await.unwrap();
    surface.pump();

    assert!(surface.client.latest_offer().is_none());
    assert!(!surface.display.turns[1].text.contains("Would you like"));
}

#[tokio::test(start_paused = true)]
async fn test_smallest_channel_still_completes_an_unlock() {
    let mut config = AssistantConfig::default();
    config.channel_capacity = 1;
    let mut surface = Surface::start_with(config).await;
    assert_eq!(surface.display.prompts.len(), 5);

    tokio::time::timeout(Duration::from_secs(5), surface.client.select_prompt(0))
        .await
        .expect("select_prompt waited on a full channel")
        .unwrap();
    surface.pump();
    assert_eq!(surface.display.turns.len(), 2);

    surface.wait(DELAY).await;
    surface.client.submit("yes".to_string()).await.unwrap();
    surface.wait(DELAY).await;

    assert_eq!(surface.display.turns.len(), 4);
    assert!(!surface.display.is_resolving());
    assert_eq!(
        surface.display.active().unwrap().title,
        "Check for public S3 buckets"
    );
}

// ============================================================================
// Panel Flow
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_panel_flow() {
    let mut surface = Surface::start().await;

    for index in [0, 3] {
        surface.client.select_prompt(index).await.unwrap();
        surface.wait(DELAY).await;
        surface.client.submit("yes".to_string()).await.unwrap();
        surface.wait(DELAY).await;
    }
    assert_eq!(surface.display.tabs.len(), 2);
    assert_eq!(surface.display.active_tab, Some(TabId(1)));

    let previous = surface.display.neighbor_tab(-1).unwrap();
    surface.client.activate_tab(previous).await.unwrap();
    surface.wait(TICK * 3).await;
    assert_eq!(surface.display.active_tab, Some(TabId(0)));
    assert_eq!(surface.display.revealed_code().chars().count(), 3);

    surface.client.copy_active_tab().await.unwrap();
    surface.pump();
    assert!(surface.clipboard.last().unwrap().contains("aws"));
    assert!(surface.display.notification.is_some());

    surface.client.toggle_panel().await.unwrap();
    surface.pump();
    assert!(!surface.display.panel_open);
    assert_eq!(surface.display.revealed, 0);

    surface.client.close_tab(TabId(0)).await.unwrap();
    surface.pump();
    assert_eq!(surface.display.active_tab, Some(TabId(1)));
    assert_eq!(surface.display.tabs.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_quit_reaches_display() {
    let mut surface = Surface::start().await;

    surface.client.request_quit().await.unwrap();
    surface.pump();

    assert_eq!(surface.client.state(), AssistantState::ShuttingDown);
    assert_eq!(surface.display.goodbye.as_deref(), Some("Goodbye!"));
}
