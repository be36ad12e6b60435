use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::warn;

use super::app::App;

const TICK: Duration = Duration::from_millis(250);

/// Raw-mode alternate screen that is put back when dropped, so an error or a
/// panic inside the loop does not leave the shell unusable.
struct Session {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

impl Session {
    fn start() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err).context("failed to enter alternate screen");
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))
            .context("failed to create terminal backend")?;
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode().context("failed to disable raw mode")?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .context("failed to leave alternate screen")?;
        self.terminal
            .show_cursor()
            .context("failed to restore cursor visibility")
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!("terminal not restored: {err:#}");
        }
    }
}

/// Raw mode swallows SIGINT, so Ctrl+C has to be read as a key.
fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Take over the terminal and feed key presses to `app` until it asks to quit.
pub fn run_app(app: &mut App) -> Result<()> {
    let mut session = Session::start()?;

    loop {
        session
            .terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        if !event::poll(TICK).context("event polling failed")? {
            continue;
        }
        let Event::Key(key) = event::read().context("failed to read event")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if is_interrupt(&key) || app.handle_key(key.code)? {
            break;
        }
    }

    session.restore()
}
