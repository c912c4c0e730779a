use crate::client::{AskClient, ReplyEvent};
use crate::config::Config;
use crate::conversation::ConversationController;
use crate::ui::commands::{help_line, SlashCommand};
use crate::ui::composer::{Composer, ComposerResult};
use crate::ui::transcript::TranscriptView;
use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    Frame, Terminal,
};
use std::io::Stdout;
use tokio::sync::mpsc;
use tokio::time::Duration;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Launch the chat TUI and block until the user quits.
pub async fn run(config: Config) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = App::new(&config).run_loop(&mut terminal).await;
    restore_terminal(&mut terminal)?;
    result
}

/// Top-level application state: the conversation controller, the HTTP
/// client, the two view components, and at most one in-flight request.
struct App {
    ctrl: ConversationController,
    client: AskClient,
    composer: Composer,
    transcript: TranscriptView,
    reply_rx: Option<mpsc::Receiver<ReplyEvent>>,
    show_help: bool,
    should_quit: bool,
    /// Set when view-only state (scroll, help) changes; conversation
    /// changes are detected through the controller's revision counter.
    view_dirty: bool,
}

impl App {
    fn new(config: &Config) -> Self {
        Self {
            ctrl: ConversationController::new(config.system_prompt()),
            client: AskClient::new(config.endpoint.clone(), config.request_timeout()),
            composer: Composer::new(),
            transcript: TranscriptView::new(),
            reply_rx: None,
            show_help: false,
            should_quit: false,
            view_dirty: false,
        }
    }

    async fn run_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        let mut events = EventStream::new();
        // Periodic tick keeps the thinking indicator animated while a
        // request is in flight.
        let mut tick = tokio::time::interval(Duration::from_millis(150));

        terminal
            .draw(|f| self.render(f))
            .context("Failed to draw frame")?;
        let mut drawn_revision = self.ctrl.revision();

        loop {
            tokio::select! {
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => self.handle_key(key),
                        // Resize and the like invalidate the layout.
                        Some(Ok(_)) => self.view_dirty = true,
                        Some(Err(e)) => return Err(e).context("Terminal event error"),
                        None => break,
                    }
                }
                reply = next_reply(&mut self.reply_rx) => {
                    self.apply_reply(reply);
                }
                _ = tick.tick() => {
                    if !self.ctrl.pending() {
                        continue;
                    }
                }
            }

            if self.should_quit {
                break;
            }

            // Redraw when the conversation moved, the view changed, or the
            // thinking indicator needs another animation frame.
            if self.ctrl.revision() != drawn_revision || self.view_dirty || self.ctrl.pending() {
                terminal
                    .draw(|f| self.render(f))
                    .context("Failed to draw frame")?;
                drawn_revision = self.ctrl.revision();
                self.view_dirty = false;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::PageUp => {
                self.transcript.scroll_up(5);
                self.view_dirty = true;
            }
            KeyCode::PageDown => {
                self.transcript.scroll_down(5);
                self.view_dirty = true;
            }
            KeyCode::Up => {
                self.transcript.scroll_up(1);
                self.view_dirty = true;
            }
            KeyCode::Down => {
                self.transcript.scroll_down(1);
                self.view_dirty = true;
            }
            _ => match self.composer.handle_key(key, &mut self.ctrl) {
                ComposerResult::Submitted(snapshot) => {
                    self.reply_rx = Some(self.client.send(snapshot));
                }
                ComposerResult::Command(SlashCommand::Help) => {
                    self.show_help = !self.show_help;
                    self.view_dirty = true;
                }
                ComposerResult::Command(SlashCommand::Quit) => {
                    self.should_quit = true;
                }
                // Cursor movement is composer-local state, invisible to
                // the controller's revision counter.
                ComposerResult::None => self.view_dirty = true,
            },
        }
    }

    fn apply_reply(&mut self, reply: Option<ReplyEvent>) {
        match reply {
            Some(ReplyEvent::Reply(text)) => self.ctrl.resolve(text),
            Some(ReplyEvent::Failed(error)) => self.ctrl.fail(error),
            // The request task went away without reporting; treat it as a
            // failure so the composer is not left disabled.
            None => {
                if self.ctrl.pending() {
                    self.ctrl.fail("request aborted");
                }
            }
        }
        self.reply_rx = None;
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),    // Transcript
                Constraint::Length(1), // Status line
                Constraint::Length(3), // Composer
            ])
            .split(f.size());

        let buf = f.buffer_mut();
        self.transcript
            .render(self.ctrl.visible_turns(), self.ctrl.pending(), chunks[0], buf);
        self.render_status(chunks[1], buf);
        self.composer.render(&self.ctrl, chunks[2], buf);
    }

    fn render_status(&self, area: ratatui::layout::Rect, buf: &mut ratatui::buffer::Buffer) {
        let line = if let Some(notice) = self.ctrl.notice() {
            Line::from(Span::styled(
                format!("⚠ {}", notice),
                Style::default().fg(Color::Red),
            ))
        } else if self.show_help {
            Line::from(Span::styled(help_line(), Style::default().fg(Color::Blue)))
        } else {
            Line::from(Span::styled(
                "Enter to send · /help for commands",
                Style::default().fg(Color::DarkGray),
            ))
        };
        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));
    }
}

/// Wait for the in-flight request, or forever when none is pending.
async fn next_reply(rx: &mut Option<mpsc::Receiver<ReplyEvent>>) -> Option<ReplyEvent> {
    match rx.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")
}
