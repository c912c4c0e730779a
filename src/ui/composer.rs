use crate::conversation::{ConversationController, Turn};
use crate::ui::commands::{command_entries, parse_slash_command, CommandEntry, SlashCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result of feeding a key event to the composer.
#[derive(Debug)]
pub enum ComposerResult {
    /// A user message was accepted; the snapshot is ready to send.
    Submitted(Vec<Turn>),
    /// A slash command was entered.
    Command(SlashCommand),
    None,
}

/// Input composer. The draft text itself lives in the
/// [`ConversationController`]; the composer owns only the cursor and the
/// command registry.
pub struct Composer {
    cursor: usize,
    placeholder: String,
    commands: Vec<CommandEntry>,
}

impl Composer {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            placeholder: "Type your business question...".to_string(),
            commands: command_entries(),
        }
    }

    /// Handle a key press against the controller's draft.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        ctrl: &mut ConversationController,
    ) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        self.clamp_cursor(ctrl.draft());

        match key.code {
            KeyCode::Enter => {
                let draft = ctrl.draft().trim().to_string();
                if draft.starts_with('/') {
                    ctrl.draft_mut().clear();
                    self.cursor = 0;
                    if let Some(command) = parse_slash_command(&draft) {
                        return ComposerResult::Command(command);
                    }
                    // Unknown command: swallow it rather than send it.
                    return ComposerResult::None;
                }

                // Submission is refused while a request is in flight or the
                // draft is blank; the draft stays put either way.
                if let Some(snapshot) = ctrl.submit_draft() {
                    self.cursor = 0;
                    return ComposerResult::Submitted(snapshot);
                }
            }
            KeyCode::Char(c) => {
                ctrl.draft_mut().insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            KeyCode::Backspace => {
                if let Some(prev) = prev_char_boundary(ctrl.draft(), self.cursor) {
                    ctrl.draft_mut().remove(prev);
                    self.cursor = prev;
                }
            }
            KeyCode::Delete => {
                if self.cursor < ctrl.draft().len() {
                    ctrl.draft_mut().remove(self.cursor);
                }
            }
            KeyCode::Left => {
                if let Some(prev) = prev_char_boundary(ctrl.draft(), self.cursor) {
                    self.cursor = prev;
                }
            }
            KeyCode::Right => {
                if let Some(next) = next_char_boundary(ctrl.draft(), self.cursor) {
                    self.cursor = next;
                }
            }
            KeyCode::Home => {
                self.cursor = 0;
            }
            KeyCode::End => {
                self.cursor = ctrl.draft().len();
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Render the composer box plus a command hint when the draft starts
    /// with '/'.
    pub fn render(&self, ctrl: &ConversationController, area: Rect, buf: &mut Buffer) {
        let pending = ctrl.pending();
        let title = if pending {
            "⏳ Waiting for the advisor..."
        } else {
            "💼 Ask the advisor"
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(if pending {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Green)
            });

        let inner = block.inner(area);
        block.render(area, buf);

        let draft = ctrl.draft();
        if draft.is_empty() {
            let placeholder = Line::from(Span::styled(
                self.placeholder.clone(),
                Style::default().fg(Color::DarkGray),
            ));
            buf.set_line(inner.x, inner.y, &placeholder, inner.width);
        } else {
            let mut content = draft.to_string();
            if !pending {
                content.insert(self.cursor.min(content.len()), '▌');
            }
            let line = Line::from(Span::raw(content));
            buf.set_line(inner.x, inner.y, &line, inner.width);
        }

        if draft.starts_with('/') {
            self.render_command_hint(draft, area, buf);
        }
    }

    fn render_command_hint(&self, draft: &str, area: Rect, buf: &mut Buffer) {
        let query = draft
            .trim_start_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();

        let matching: Vec<String> = self
            .commands
            .iter()
            .filter(|entry| query.is_empty() || entry.keyword.starts_with(&query))
            .map(|entry| format!("/{} — {}", entry.keyword, entry.description))
            .collect();

        if matching.is_empty() || area.y == 0 {
            return;
        }

        let hint = Line::from(Span::styled(
            matching.join("   "),
            Style::default().fg(Color::Blue),
        ));
        buf.set_line(area.x + 1, area.y - 1, &hint, area.width.saturating_sub(2));
    }

    fn clamp_cursor(&mut self, draft: &str) {
        if self.cursor > draft.len() {
            self.cursor = draft.len();
        }
        while self.cursor < draft.len() && !draft.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }
}

fn prev_char_boundary(text: &str, from: usize) -> Option<usize> {
    if from == 0 {
        return None;
    }
    let mut idx = from - 1;
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    Some(idx)
}

fn next_char_boundary(text: &str, from: usize) -> Option<usize> {
    if from >= text.len() {
        return None;
    }
    let mut idx = from + 1;
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    Some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::DEFAULT_SYSTEM_PROMPT;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn controller() -> ConversationController {
        ConversationController::new(DEFAULT_SYSTEM_PROMPT)
    }

    fn type_text(composer: &mut Composer, ctrl: &mut ConversationController, text: &str) {
        for c in text.chars() {
            composer.handle_key(press(KeyCode::Char(c)), ctrl);
        }
    }

    #[test]
    fn typing_builds_the_draft() {
        let mut composer = Composer::new();
        let mut ctrl = controller();
        type_text(&mut composer, &mut ctrl, "hello");
        assert_eq!(ctrl.draft(), "hello");
    }

    #[test]
    fn enter_submits_the_draft() {
        let mut composer = Composer::new();
        let mut ctrl = controller();
        type_text(&mut composer, &mut ctrl, "What is SWOT analysis?");

        match composer.handle_key(press(KeyCode::Enter), &mut ctrl) {
            ComposerResult::Submitted(snapshot) => {
                assert_eq!(snapshot.len(), 2);
                assert_eq!(snapshot[1].content, "What is SWOT analysis?");
            }
            other => panic!("expected submission, got {:?}", other),
        }
        assert!(ctrl.draft().is_empty());
        assert!(ctrl.pending());
    }

    #[test]
    fn enter_on_empty_draft_does_nothing() {
        let mut composer = Composer::new();
        let mut ctrl = controller();
        assert!(matches!(
            composer.handle_key(press(KeyCode::Enter), &mut ctrl),
            ComposerResult::None
        ));
        assert_eq!(ctrl.turns().len(), 1);
    }

    #[test]
    fn enter_while_pending_keeps_the_draft() {
        let mut composer = Composer::new();
        let mut ctrl = controller();
        ctrl.submit("first").expect("accepted");

        type_text(&mut composer, &mut ctrl, "second");
        assert!(matches!(
            composer.handle_key(press(KeyCode::Enter), &mut ctrl),
            ComposerResult::None
        ));
        assert_eq!(ctrl.draft(), "second");
        assert_eq!(ctrl.turns().len(), 2);
    }

    #[test]
    fn slash_commands_are_recognized_and_cleared() {
        let mut composer = Composer::new();
        let mut ctrl = controller();
        type_text(&mut composer, &mut ctrl, "/quit");

        match composer.handle_key(press(KeyCode::Enter), &mut ctrl) {
            ComposerResult::Command(SlashCommand::Quit) => {}
            other => panic!("expected quit command, got {:?}", other),
        }
        assert!(ctrl.draft().is_empty());
        assert_eq!(ctrl.turns().len(), 1);
    }

    #[test]
    fn backspace_and_cursor_movement_edit_the_draft() {
        let mut composer = Composer::new();
        let mut ctrl = controller();
        type_text(&mut composer, &mut ctrl, "abd");

        composer.handle_key(press(KeyCode::Left), &mut ctrl);
        composer.handle_key(press(KeyCode::Backspace), &mut ctrl);
        assert_eq!(ctrl.draft(), "ad");

        composer.handle_key(press(KeyCode::Char('b')), &mut ctrl);
        assert_eq!(ctrl.draft(), "abd");

        composer.handle_key(press(KeyCode::End), &mut ctrl);
        composer.handle_key(press(KeyCode::Char('c')), &mut ctrl);
        assert_eq!(ctrl.draft(), "abdc");
    }

    #[test]
    fn multibyte_input_keeps_char_boundaries() {
        let mut composer = Composer::new();
        let mut ctrl = controller();
        type_text(&mut composer, &mut ctrl, "é€b");

        composer.handle_key(press(KeyCode::Left), &mut ctrl);
        composer.handle_key(press(KeyCode::Backspace), &mut ctrl);
        assert_eq!(ctrl.draft(), "éb");
    }
}
