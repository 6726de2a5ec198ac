//! Theme and Colors
//!
//! OrgBot's palette for the conversation, the code panel and the status bar.

use ratatui::style::Color;

use orgbot_core::NotifyLevel;

// ============================================================================
// Brand Colors
// ============================================================================

/// OrgBot accent blue (bot name, active tab)
pub const ORGBOT_BLUE: Color = Color::Rgb(90, 160, 255);

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

// ============================================================================
// Code Panel
// ============================================================================

/// Code text
pub const CODE_FG: Color = Color::Rgb(220, 220, 200);

/// Inline code in the conversation
pub const CODE_INLINE: Color = Color::Rgb(160, 160, 140);

/// Reveal cursor
pub const REVEAL_CURSOR: Color = Color::Rgb(255, 200, 90);

/// Panel border
pub const PANEL_BORDER: Color = Color::Rgb(70, 90, 120);

// ============================================================================
// Notifications
// ============================================================================

/// Warning yellow
pub const WARNING_YELLOW: Color = Color::Rgb(240, 200, 80);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Success green
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Color for a notification level
pub fn notify_color(level: NotifyLevel) -> Color {
    match level {
        NotifyLevel::Info => ORGBOT_BLUE,
        NotifyLevel::Warning => WARNING_YELLOW,
        NotifyLevel::Error => ERROR_RED,
        NotifyLevel::Success => SUCCESS_GREEN,
    }
}
