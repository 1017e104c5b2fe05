use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use time::UtcOffset;

use crate::config::AppConfig;
use crate::storage::StorageHandle;
use crate::toast::ToastNotifier;
use crate::ui;

pub mod actions;
pub mod form;
pub mod state;
pub mod theme;

pub use actions::{Action, FormAction};
pub use form::{DialogState, EntryForm, FormField};
pub use state::{Journal, SubmitOutcome};
pub use theme::ThemeController;

pub struct App {
    journal: Journal<StorageHandle>,
    scroll: u16,
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn new(config: &AppConfig, storage: StorageHandle, offset: UtcOffset) -> Result<Self> {
        let toast = ToastNotifier::from_config(&config.toast);
        let journal = Journal::open(storage, toast, offset)
            .context("opening journal for initial state")?;
        Ok(Self {
            tick_rate: config.tick_rate(),
            journal,
            scroll: 0,
            should_quit: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        loop {
            terminal
                .draw(|frame| ui::draw_app(frame, &self.journal, self.scroll, Instant::now()))
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(0));

            if event::poll(timeout).context("polling for terminal events")? {
                match event::read().context("reading terminal event")? {
                    Event::Key(key) => self.handle_key(key, Instant::now()),
                    Event::Resize(_, _) => {
                        // no-op: next draw will naturally adapt to the new size
                    }
                    _ => {}
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                self.journal.toast_mut().tick(Instant::now());
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.journal.form().is_open() {
            if let Some(action) = actions::form_action_for_key(key) {
                self.handle_form_action(action, now);
            }
            return;
        }

        if let Some(action) = actions::action_for_key(key) {
            self.handle_action(action, now);
        }
    }

    fn handle_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::OpenDialog => self.journal.open_dialog(),
            Action::ToggleTheme => {
                self.journal.toggle_theme(now);
            }
            Action::ScrollDown => self.scroll = self.scroll.saturating_add(1),
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::ScrollTop => self.scroll = 0,
        }
    }

    fn handle_form_action(&mut self, action: FormAction, now: Instant) {
        match action {
            FormAction::Close => self.journal.close_dialog(),
            FormAction::Submit => {
                if self.journal.submit_form(now) == SubmitOutcome::Created {
                    self.scroll = 0;
                }
            }
            FormAction::NextField => self.journal.form_mut().focus_next(),
            FormAction::Newline => self.journal.form_mut().insert_newline(),
            FormAction::Backspace => self.journal.form_mut().backspace(),
            FormAction::Input(ch) => self.journal.form_mut().insert_char(ch),
        }
    }
}

/// Local UTC offset for date labels. Must run before any thread is spawned;
/// falls back to UTC when the platform cannot tell.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or_else(|err| {
        tracing::debug!(%err, "local offset unavailable, dates shown in UTC");
        UtcOffset::UTC
    })
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("restoring screen state")?;
    Ok(())
}
