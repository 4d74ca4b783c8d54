use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{backend::CrosstermBackend, prelude::*};

mod browser;
mod dataset;
mod loader;
mod surface;
mod ui;

use browser::{RowBrowser, ViewSpec};
use ui::{Mode, TuiSurface};

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal row browser for delimited data")]
struct Args {
    /// Path to a CSV/TSV file with a header row
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Columns to display, in this order (comma-separated; defaults to all)
    #[arg(long, value_delimiter = ',')]
    show: Vec<String>,

    /// Columns to exclude (takes precedence over --show)
    #[arg(long, value_delimiter = ',')]
    remove: Vec<String>,

    /// Columns whose values can be edited inline
    #[arg(long, value_delimiter = ',')]
    editable: Vec<String>,
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> Result<()> {
    // Only active when RUST_LOG is set; writes to stderr, never stdout.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut dataset = loader::load_path(&args.path)?;
    if dataset.is_empty() {
        tracing::warn!("dataset has no rows");
    }
    let spec = ViewSpec {
        show: args.show,
        remove: args.remove,
        editable: args.editable,
    };

    let source = args
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.path.display().to_string());

    let mut browser = RowBrowser::new(&mut dataset, &spec);
    if browser.columns().is_empty() {
        tracing::warn!("no columns resolved; check --show/--remove");
    }
    let mut surface = TuiSurface::new(source);
    browser.render_current(&mut surface);

    let mut terminal = setup_terminal()?;
    let res = run_app(&mut terminal, &mut browser, &mut surface);
    restore_terminal(terminal)?;
    if let Err(e) = res {
        eprintln!("Error: {e:?}");
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    browser: &mut RowBrowser<'_>,
    surface: &mut TuiSurface,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, surface))?;

        if let Event::Key(key) = event::read()? {
            let should_exit = match surface.mode {
                Mode::Normal => handle_key_normal(browser, surface, key),
                Mode::Editing { .. } => {
                    handle_key_editing(surface, key);
                    false
                }
            };
            if should_exit {
                // The last screen's edits land in the dataset before exit.
                browser.commit_pending_edits(surface);
                tracing::debug!(
                    row = browser.cursor(),
                    rows = browser.data().len(),
                    "session ended"
                );
                return Ok(());
            }
        }
    }
}

fn handle_key_normal(
    browser: &mut RowBrowser<'_>,
    surface: &mut TuiSurface,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => browser.advance(surface),
        KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') => browser.retreat(surface),
        KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => surface.focus_next(),
        KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => surface.focus_prev(),
        KeyCode::Enter | KeyCode::Char('e') => surface.begin_edit(),
        KeyCode::Char('?') => surface.toggle_help(),
        _ => {}
    }
    false
}

fn handle_key_editing(surface: &mut TuiSurface, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => surface.end_edit(),
        KeyCode::Esc => surface.cancel_edit(),
        KeyCode::Backspace => surface.edit_backspace(),
        KeyCode::Delete => surface.edit_delete(),
        KeyCode::Left => surface.edit_left(),
        KeyCode::Right => surface.edit_right(),
        KeyCode::Home => surface.edit_home(),
        KeyCode::End => surface.edit_end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            surface.edit_insert(c)
        }
        _ => {}
    }
}
