//! Library entry point for the bug tracker TUI.
//!
//! [`run`] launches the Ratatui terminal UI against the REST API described
//! by a [`ClientConfig`]. Requests run on spawned tasks and report back to
//! the event loop through [`event::AppEvent`]s, so the UI never blocks on
//! the network.

mod app;
mod client;
mod event;
mod form;
mod state;
mod ui;

pub use client::{ApiClient, ClientError};
pub use form::{BugForm, FormField, FormMode};
pub use state::{Action, ListState, TrackerState, reduce};

use anyhow::anyhow;
use app::{App, Command};
use bugtracker_rs_config::ClientConfig;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use event::AppEvent;
use log::{debug, info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

/// Launch the TUI against the configured API.
///
/// The caller is responsible for initializing logging before calling `run`;
/// log output must not go to the terminal the UI draws on.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built or terminal setup or
/// the event loop fails. API failures are shown in the UI instead.
pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    let client = ApiClient::new(&config)?;
    let mut app = App::new(client.base_url());

    let mut terminal = setup_terminal()?;
    let (tx, mut rx) = mpsc::channel(256);
    spawn_input_handler(tx.clone());

    if let Some(command) = app.reload() {
        spawn_command(command, &client, tx.clone());
    }

    let result = async {
        loop {
            terminal.draw(|frame| ui::draw(frame, &mut app))?;
            let event = rx
                .recv()
                .await
                .ok_or_else(|| anyhow!("event channel closed unexpectedly"))?;
            match app.handle_event(event) {
                Some(Command::Quit) => break,
                Some(command) => spawn_command(command, &client, tx.clone()),
                None => {}
            }
        }
        anyhow::Ok(())
    }
    .await;

    restore_terminal(&mut terminal)?;
    info!("tui exited");
    result
}

/// Run an API request on its own task and report the outcome as an event.
fn spawn_command(command: Command, client: &ApiClient, sender: mpsc::Sender<AppEvent>) {
    debug!("spawning request (command={command:?})");
    let client = client.clone();
    tokio::spawn(async move {
        let event = match command {
            Command::Reload => AppEvent::Loaded(client.list_all().await.map_err(|err| {
                warn!("failed to load bugs (error={err})");
                err.to_string()
            })),
            Command::Create(body) => match client.create(&body).await {
                Ok(bug) => AppEvent::Created(bug),
                Err(err) => AppEvent::ActionError(err.to_string()),
            },
            Command::Update(id, body) => match client.update(&id, &body).await {
                Ok(bug) => AppEvent::Updated(bug),
                Err(err) => AppEvent::ActionError(err.to_string()),
            },
            Command::SetStatus(id, status) => match client.set_status(&id, status).await {
                Ok(bug) => AppEvent::Updated(bug),
                Err(err) => AppEvent::ActionError(err.to_string()),
            },
            Command::Delete(id) => match client.delete(&id).await {
                Ok(()) => AppEvent::Deleted(id),
                Err(err) => AppEvent::ActionError(err.to_string()),
            },
            Command::Quit => return,
        };
        let _ = sender.send(event).await;
    });
}

/// Spawn a background task that polls crossterm for keyboard input.
fn spawn_input_handler(sender: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        loop {
            if matches!(crossterm::event::poll(Duration::from_millis(30)), Ok(true)) {
                while matches!(crossterm::event::poll(Duration::from_millis(0)), Ok(true)) {
                    let event = match crossterm::event::read() {
                        Ok(event) => event,
                        Err(_) => break,
                    };
                    if let CrosstermEvent::Key(key) = event
                        && key.kind != KeyEventKind::Release
                        && sender.send(AppEvent::Input(key)).await.is_err()
                    {
                        return;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    });
}

/// Enter raw mode and the alternate screen.
fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    debug!("setting up terminal");
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal state on exit.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    debug!("restoring terminal");
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
