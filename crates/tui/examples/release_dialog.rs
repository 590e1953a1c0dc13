//! Two-field release dialog: a "branch" and a "version" combo sharing one
//! history store. Typed values are persisted on quit and offered again on
//! the next run, with "main" always pinned at the top of the branch list.
//!
//! Tab switches fields, Up/Down pick a suggestion, Enter saves and quits,
//! Esc quits without saving.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::layout::{Constraint, Layout};
use tracing::info;
use tracing_subscriber::EnvFilter;

use recall_core::HistoryStore;
use tui::{ComboState, TerminalGuard};

fn main() -> Result<()> {
    let log_dir = std::env::temp_dir().join("recall-demo");
    let appender = tracing_appender::rolling::never(&log_dir, "release_dialog.log");
    let (writer, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let branch = ComboState::named("branch").shared();
    let version = ComboState::named("version").shared();

    let mut store = HistoryStore::open("release-dialog", vec!["main".to_string()])?;
    store.add(&branch);
    store.add(&version);
    store.load();

    let mut term = TerminalGuard::new()?;
    let mut focus = 0usize;
    let mut save_on_exit = false;

    loop {
        term.terminal.draw(|f| {
            let [left, right] =
                Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .areas(f.area());
            branch.borrow().render(f, left, "Branch", focus == 0);
            version.borrow().render(f, right, "Version", focus == 1);
        })?;

        if !event::poll(Duration::from_millis(120))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key.code {
                KeyCode::Esc => break,
                KeyCode::Enter => {
                    save_on_exit = true;
                    break;
                }
                KeyCode::Tab => focus = (focus + 1) % 2,
                _ => {
                    let target = if focus == 0 { &branch } else { &version };
                    target.borrow_mut().on_key(key);
                }
            }
        }
    }
    drop(term);

    if save_on_exit {
        info!(
            branch = %branch.borrow().text_value(),
            version = %version.borrow().text_value(),
            "saving dialog history"
        );
        store.save();
    }
    Ok(())
}
