//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize)
//! - AssistantClient for orchestration
//! - DisplayState for rendering
//!
//! The loop never polls on a fixed frame rate. It waits for either a
//! terminal event or the next deadline the Assistant (or a notification)
//! reports, then runs due timers, applies messages and redraws.

use std::io;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};
use ratatui::{Frame, Terminal};
use tokio::time::Instant;
use unicode_width::UnicodeWidthChar;

use orgbot_core::{AssistantMessage, AssistantState};

use crate::assistant_client::AssistantClient;
use crate::display::{DisplayRole, DisplayState};
use crate::theme::{
    notify_color, CODE_FG, CODE_INLINE, DIM_GRAY, ORGBOT_BLUE, PANEL_BORDER, REVEAL_CURSOR,
    USER_GREEN,
};

/// Input box height (lines, including its border)
const INPUT_HEIGHT: u16 = 4;

/// Widest tab title before it is shortened
const TAB_TITLE_WIDTH: usize = 24;

/// Key hints for the status bar
const KEY_HINTS: &str =
    "F1-F5 prompts | Ctrl+O show code | Ctrl+N no thanks | Ctrl+T panel | Ctrl+Y copy | Ctrl+E export | Esc quit";

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,
    /// Client for communicating with the embedded Assistant
    client: AssistantClient,
    /// Display state derived from AssistantMessages
    display: DisplayState,
    /// User input buffer
    input_buffer: String,
    /// Scroll offset (lines from bottom, 0 = latest)
    scroll_offset: usize,
    /// Conversation viewport height from the last frame
    page_size: usize,
}

impl App {
    /// Create a new App around an Assistant client
    pub fn new(client: AssistantClient) -> Self {
        Self {
            running: true,
            client,
            display: DisplayState::new(),
            input_buffer: String::new(),
            scroll_offset: 0,
            page_size: 10,
        }
    }

    /// Goodbye message to print once the terminal is restored
    pub fn goodbye(&self) -> Option<&str> {
        self.display.goodbye.as_deref()
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        self.client.start().await?;
        self.process_messages();
        terminal.draw(|frame| self.render(frame))?;

        while self.running {
            let wake = self.next_wake();

            tokio::select! {
                biased;

                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => {
                        if let Err(e) = self.handle_terminal_event(event).await {
                            tracing::warn!(error = %e, "Failed to handle terminal event");
                        }
                    }
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    None => self.running = false,
                },

                () = wait_until(wake) => {}
            }

            self.client.poll_timers().await;
            self.process_messages();
            self.display.update(std::time::Instant::now());

            if matches!(self.client.state(), AssistantState::ShuttingDown) {
                self.running = false;
            }

            terminal.draw(|frame| self.render(frame))?;
        }

        Ok(())
    }

    /// Earliest of the Assistant's deadline and the notification expiry
    fn next_wake(&self) -> Option<Instant> {
        let notification = self
            .display
            .notification_deadline()
            .map(Instant::from_std);
        match (self.client.next_deadline(), notification) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Process all pending messages from the Assistant
    fn process_messages(&mut self) {
        for msg in self.client.recv_all() {
            if matches!(msg, AssistantMessage::TurnAppended { .. }) {
                self.scroll_offset = 0;
            }
            self.display.apply_message(msg);
        }
    }

    async fn handle_terminal_event(&mut self, event: Event) -> anyhow::Result<()> {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key).await,
            _ => Ok(()),
        }
    }

    /// Handle keyboard input
    async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            // Quit
            KeyCode::Esc => self.client.request_quit().await?,
            KeyCode::Char('c') if ctrl => self.client.request_quit().await?,

            // Code offers
            KeyCode::Char('o') if ctrl => match self.client.latest_offer() {
                Some(turn) => self.client.accept_offer(turn).await?,
                None => tracing::debug!("No code offer to accept"),
            },
            KeyCode::Char('n') if ctrl => match self.client.latest_offer() {
                Some(turn) => self.client.decline_offer(turn).await?,
                None => tracing::debug!("No code offer to decline"),
            },

            // Code panel
            KeyCode::Char('t') if ctrl => self.client.toggle_panel().await?,
            KeyCode::Char('w') if ctrl => {
                if let Some(tab) = self.display.active_tab {
                    self.client.close_tab(tab).await?;
                }
            }
            KeyCode::Char('y') if ctrl => self.client.copy_active_tab().await?,
            KeyCode::Char('e') if ctrl => self.client.export_transcript().await?,
            KeyCode::Left if ctrl => {
                if let Some(tab) = self.display.neighbor_tab(-1) {
                    self.client.activate_tab(tab).await?;
                }
            }
            KeyCode::Right if ctrl => {
                if let Some(tab) = self.display.neighbor_tab(1) {
                    self.client.activate_tab(tab).await?;
                }
            }

            // Suggested prompts
            KeyCode::F(n) if n >= 1 && usize::from(n) <= self.display.prompts.len() => {
                self.client.select_prompt(usize::from(n - 1)).await?;
            }

            // Submit message
            KeyCode::Enter => {
                if !self.input_buffer.trim().is_empty() {
                    let text = std::mem::take(&mut self.input_buffer);
                    self.client.submit(text).await?;
                }
            }

            // Typing
            KeyCode::Char(c) if !ctrl => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                self.scroll_offset += (self.page_size / 2).max(1);
            }
            KeyCode::PageDown => {
                self.scroll_offset = self
                    .scroll_offset
                    .saturating_sub((self.page_size / 2).max(1));
            }

            _ => {}
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(INPUT_HEIGHT),
                Constraint::Length(1),
            ])
            .split(frame.area());

        if self.display.panel_open {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(rows[0]);
            self.render_conversation(frame, columns[0]);
            self.render_panel(frame, columns[1]);
        } else {
            self.render_conversation(frame, rows[0]);
        }

        self.render_input(frame, rows[1]);
        self.render_status(frame, rows[2]);
    }

    /// Render conversation area
    fn render_conversation(&mut self, frame: &mut Frame, area: Rect) {
        let width = usize::from(area.width.saturating_sub(1));
        let height = usize::from(area.height);
        if width < 10 || height < 1 {
            return;
        }

        let lines = conversation_lines(&self.display, width);
        self.page_size = height;

        // Clamp scroll offset
        let max_scroll = lines.len().saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_scroll);
        let top = max_scroll - self.scroll_offset;

        let paragraph =
            Paragraph::new(lines).scroll((u16::try_from(top).unwrap_or(u16::MAX), 0));
        frame.render_widget(paragraph, area);
    }

    /// Render code panel
    fn render_panel(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PANEL_BORDER))
            .title(" Code ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.display.tabs.is_empty() {
            let hint = Paragraph::new("Accept a code offer to open a tab here.")
                .style(Style::default().fg(DIM_GRAY))
                .wrap(Wrap { trim: true });
            frame.render_widget(hint, inner);
            return;
        }

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(inner);

        let titles: Vec<String> = self
            .display
            .tabs
            .iter()
            .map(|t| t.short_title(TAB_TITLE_WIDTH))
            .collect();
        let selected = self
            .display
            .active_tab
            .and_then(|id| self.display.tabs.iter().position(|t| t.id == id))
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .style(Style::default().fg(DIM_GRAY))
            .highlight_style(
                Style::default()
                    .fg(ORGBOT_BLUE)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, parts[0]);

        let mut lines: Vec<Line> = self
            .display
            .revealed_code()
            .split('\n')
            .map(|l| Line::styled(l.to_string(), Style::default().fg(CODE_FG)))
            .collect();
        if self.display.revealing {
            if let Some(last) = lines.last_mut() {
                last.push_span(Span::styled("▌", Style::default().fg(REVEAL_CURSOR)));
            }
        }

        // Keep the reveal cursor in view
        let overflow = lines.len().saturating_sub(usize::from(parts[1].height));
        let code = Paragraph::new(lines).scroll((u16::try_from(overflow).unwrap_or(u16::MAX), 0));
        frame.render_widget(code, parts[1]);
    }

    /// Render input box
    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(DIM_GRAY));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text_width = usize::from(inner.width.saturating_sub(1));
        if text_width < 5 {
            return;
        }

        let full_input = format!("You: {}_", self.input_buffer);
        let wrapped: Vec<String> = textwrap::wrap(&full_input, text_width)
            .iter()
            .map(ToString::to_string)
            .collect();

        // Show the tail of long input
        let visible = usize::from(inner.height);
        let lines: Vec<Line> = wrapped
            .iter()
            .skip(wrapped.len().saturating_sub(visible))
            .map(|l| Line::styled(l.clone(), Style::default().fg(USER_GREEN)))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    /// Render status bar
    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let width = usize::from(area.width);
        let (text, style) = match &self.display.notification {
            Some(n) => (
                format!(" {}", n.text()),
                Style::default().fg(notify_color(n.level)),
            ),
            None => {
                let scroll = if self.scroll_offset > 0 {
                    format!(" [^{} lines]", self.scroll_offset)
                } else {
                    String::new()
                };
                (
                    format!(
                        " {}{} | {}",
                        self.display.assistant_state.description(),
                        scroll,
                        KEY_HINTS
                    ),
                    Style::default().fg(DIM_GRAY),
                )
            }
        };

        frame.render_widget(Paragraph::new(fit_width(&text, width)).style(style), area);
    }
}

/// Sleep until `deadline`, or forever if there is none
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Conversation lines wrapped to `width` columns
fn conversation_lines(display: &DisplayState, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if display.turns.is_empty() {
        lines.push(Line::styled(
            "OrgBot: Hi! Ask me about your cloud organization, or pick a prompt:",
            Style::default().fg(ORGBOT_BLUE),
        ));
        for (i, prompt) in display.prompts.iter().enumerate() {
            lines.push(Line::styled(
                format!("  F{}  {prompt}", i + 1),
                Style::default().fg(DIM_GRAY),
            ));
        }
        return lines;
    }

    for turn in &display.turns {
        let style = match turn.role {
            DisplayRole::User => Style::default().fg(USER_GREEN),
            DisplayRole::Bot => Style::default().fg(ORGBOT_BLUE),
        };

        if turn.pending {
            lines.push(Line::styled(
                format!("{}thinking…", turn.role.prefix()),
                style.add_modifier(Modifier::ITALIC),
            ));
        } else {
            let content = format!("{}{}", turn.role.prefix(), turn.text);
            for line in textwrap::wrap(&content, width) {
                lines.push(Line::styled(line.into_owned(), style));
            }
        }

        if !turn.code.is_empty() {
            for code_line in turn.code.lines() {
                lines.push(Line::styled(
                    fit_width(&format!("  │ {code_line}"), width),
                    Style::default().fg(CODE_INLINE),
                ));
            }
        }

        lines.push(Line::default());
    }

    lines
}

/// Cut `text` to at most `width` terminal columns
fn fit_width(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgbot_core::{Sender, SessionId, Transcript};
    use pretty_assertions::assert_eq;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width("hello", 10), "hello");
        assert_eq!(fit_width("hello world", 5), "hello");
        assert_eq!(fit_width("🔧🔧🔧", 5), "🔧🔧");
    }

    #[test]
    fn test_empty_conversation_lists_prompts() {
        let mut display = DisplayState::new();
        display.apply_message(AssistantMessage::SessionInfo {
            session_id: SessionId::new(),
            prompts: vec![
                "Check for public S3 buckets".to_string(),
                "Connect Jira to OrgBot".to_string(),
            ],
        });

        let lines = conversation_lines(&display, 80);
        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(&lines[2]), "  F2  Connect Jira to OrgBot");
    }

    #[test]
    fn test_pending_and_code_lines() {
        let mut transcript = Transcript::new();
        transcript.push_user("how do i enable guardduty");
        let bot = transcript.push_bot("To enable GuardDuty:", "aws guardduty create-detector\n--enable");
        transcript.push_user("asdkjhasd");
        transcript.push_pending();

        let mut display = DisplayState::new();
        for turn in transcript.turns() {
            display.apply_message(AssistantMessage::TurnAppended { turn: turn.clone() });
        }
        assert_eq!(transcript.get(bot).unwrap().sender, Sender::Bot);

        let text: Vec<String> = conversation_lines(&display, 80)
            .iter()
            .map(line_text)
            .collect();
        assert!(text.contains(&"  │ --enable".to_string()));
        assert!(text.contains(&"OrgBot: thinking…".to_string()));
    }
}
