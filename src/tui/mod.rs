use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::time::Duration;

mod host;
pub mod model_picker;
mod ui;

pub use host::{PickerAction, PickerHost};
pub use model_picker::{ModelPicker, PickerProps, PickerRow, PickerState};

/// Full-screen interactive picker
pub struct PickerRunner {
    host: PickerHost,
}

impl PickerRunner {
    pub fn new(host: PickerHost) -> Self {
        Self { host }
    }

    pub fn into_host(self) -> PickerHost {
        self.host
    }

    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut terminal = setup_or_restore(
            || {
                let mut stdout = io::stdout();
                execute!(stdout, EnterAlternateScreen)?;
                Ok(Terminal::new(CrosstermBackend::new(stdout))?)
            },
            restore_terminal,
        )?;

        let result = self.event_loop(&mut terminal);

        restore_terminal();
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| ui::draw(f, self.host.picker(), self.host.store()))?;

            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = map_key(key, self.host.picker().is_open()) {
                    if !self.host.dispatch(action) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Run `setup`; if it fails, run `restore` before returning the error
fn setup_or_restore<T>(
    setup: impl FnOnce() -> Result<T>,
    restore: impl FnOnce(),
) -> Result<T> {
    setup().inspect_err(|_| restore())
}

fn restore_terminal() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Translate a key press into a picker action
pub fn map_key(key: KeyEvent, is_open: bool) -> Option<PickerAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(PickerAction::Quit);
    }

    if !is_open {
        return match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down => Some(PickerAction::Open),
            KeyCode::Esc | KeyCode::Char('q') => Some(PickerAction::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => Some(PickerAction::Dismiss),
        KeyCode::Enter => Some(PickerAction::Activate),
        KeyCode::Up => Some(PickerAction::Up),
        KeyCode::Down => Some(PickerAction::Down),
        KeyCode::Backspace => Some(PickerAction::Backspace),
        KeyCode::Char('d') if ctrl => Some(PickerAction::DeleteHighlighted),
        KeyCode::Char(c) if !ctrl => Some(PickerAction::Input(c)),
        _ => None,
    }
}
