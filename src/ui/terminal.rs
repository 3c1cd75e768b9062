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

use super::app::App;

type BrewTerminal = Terminal<CrosstermBackend<Stdout>>;

/// How often the loop wakes up without input to redraw.
const TICK: Duration = Duration::from_millis(250);

/// Take over the terminal, run the brew log until the user quits, and hand the
/// terminal back even when the loop fails.
pub fn run_app(app: &mut App) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal backend")?;

    let outcome = event_loop(&mut terminal, app);
    restore_terminal(&mut terminal)?;
    outcome
}

fn event_loop(terminal: &mut BrewTerminal, app: &mut App) -> Result<()> {
    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw brew log")?;

        if !event::poll(TICK).context("event polling failed")? {
            continue;
        }
        match event::read().context("failed to read terminal event")? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if dispatch(app, key) {
                    return Ok(());
                }
            }
            _ => {}
        }
    }
}

/// Route one key press. Returns `true` when the app should exit.
fn dispatch(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return true,
            KeyCode::Char('s') => {
                app.handle_ctrl_s();
                return false;
            }
            _ => {}
        }
    }
    app.handle_key(key.code)
}

fn restore_terminal(terminal: &mut BrewTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")
}
