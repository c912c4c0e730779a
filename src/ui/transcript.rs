//! Transcript display: every turn except the leading system turn.

use crate::conversation::{Role, Turn};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Pure scroll-follow state, independent of any UI toolkit.
///
/// The viewport is anchored `offset` lines above the bottom of the
/// transcript. Whenever the transcript grows the anchor snaps back to the
/// bottom so the newest turn is always visible; manual scrolling detaches
/// it until the next growth.
#[derive(Debug, Clone, Default)]
pub struct ScrollFollow {
    last_len: usize,
    offset: usize,
}

impl ScrollFollow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current total line count. Growth re-pins to the bottom.
    pub fn observe(&mut self, len: usize) {
        if len > self.last_len {
            self.offset = 0;
        }
        self.last_len = len;
    }

    pub fn scroll_up(&mut self, lines: usize, viewport_height: usize) {
        let max_offset = self.last_len.saturating_sub(viewport_height);
        self.offset = (self.offset + lines).min(max_offset);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn pinned_to_bottom(&self) -> bool {
        self.offset == 0
    }

    /// Index of the first visible line for the given viewport height.
    pub fn window_start(&self, total: usize, viewport_height: usize) -> usize {
        total.saturating_sub(viewport_height + self.offset)
    }
}

/// Transcript view with bottom-anchored scrolling and a busy indicator.
pub struct TranscriptView {
    follow: ScrollFollow,
    last_height: usize,
}

impl TranscriptView {
    pub fn new() -> Self {
        Self {
            follow: ScrollFollow::new(),
            last_height: 0,
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.follow.scroll_up(lines, self.last_height);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.follow.scroll_down(lines);
    }

    /// Render the visible turns into the given area.
    pub fn render(&mut self, turns: &[Turn], pending: bool, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("💬 Conversation");
        let inner = block.inner(area);
        block.render(area, buf);

        if turns.is_empty() && !pending {
            let welcome = [
                Line::from(Span::styled(
                    "Ask anything about accounting, strategy, or entrepreneurship.",
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::raw("")),
                Line::from(Span::styled(
                    "Type below and press Enter to send. /help lists commands.",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            for (i, line) in welcome.iter().enumerate() {
                if i < inner.height as usize {
                    buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
                }
            }
            return;
        }

        let mut all_lines: Vec<Line> = Vec::new();
        for turn in turns {
            all_lines.extend(render_turn(turn, inner.width));
            // spacing between turns
            all_lines.push(Line::from(Span::raw("")));
        }

        if pending {
            all_lines.push(thinking_line());
        }

        let height = inner.height as usize;
        self.last_height = height;
        let total = all_lines.len();
        self.follow.observe(total);
        let start = self.follow.window_start(total, height);
        let visible = &all_lines[start..total.min(start + height)];

        for (i, line) in visible.iter().enumerate() {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}

/// Render a single turn into header + wrapped content lines.
fn render_turn(turn: &Turn, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let (icon, label) = match turn.role {
        Role::User => ("👤", "You"),
        Role::Assistant => ("🤖", "Advisor"),
        Role::System => ("⚙️", "System"),
    };

    let timestamp = turn.timestamp.format("%H:%M:%S").to_string();
    let header = format!("{} {} {} {}", icon, label, timestamp, "─".repeat(20));
    lines.push(Line::from(Span::styled(
        header,
        Style::default().fg(Color::DarkGray),
    )));

    let style = content_style(turn.role);
    for content_line in wrap_text(&turn.content, width.saturating_sub(2) as usize) {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(content_line, style),
        ]));
    }

    lines
}

fn content_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Blue),
        Role::Assistant => Style::default().fg(Color::Green),
        Role::System => Style::default().fg(Color::Yellow),
    }
}

/// Animated "thinking" indicator shown while a request is in flight.
fn thinking_line() -> Line<'static> {
    let dots = match (std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        / 300)
        % 4
    {
        0 => ".",
        1 => "..",
        2 => "...",
        _ => "   ",
    };

    Line::from(vec![
        Span::styled("🤖 ", Style::default().fg(Color::Green)),
        Span::styled("Advisor is thinking", Style::default().fg(Color::Green)),
        Span::styled(dots.to_string(), Style::default().fg(Color::Yellow)),
    ])
}

/// Wrap text to fit within the given width, breaking on whitespace.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line = String::new();

        for word in paragraph.split_whitespace() {
            if current_line.len() + word.len() + 1 <= width {
                if !current_line.is_empty() {
                    current_line.push(' ');
                }
                current_line.push_str(word);
            } else {
                if !current_line.is_empty() {
                    lines.push(current_line);
                    current_line = String::new();
                }
                current_line.push_str(word);
            }
        }

        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
