mod cli;
pub mod db;
pub mod events;
pub mod settings;
pub mod timer;
pub mod ui;
pub mod utils;

use std::{fs, io, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::time::MissedTickBehavior;

use cli::Args;
use db::Database;
use events::{drain, EventEmitter, EventReceiver};
use settings::SettingsStore;
use timer::SessionController;
use ui::App;

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

pub fn run() -> Result<()> {
    let args = Args::parse();

    let data_dir = args.data_dir();
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    utils::init_logging(&data_dir.join("tasky.log"))?;
    info!("tasky starting up...");

    let settings_store = SettingsStore::new(data_dir.join("settings.json"))?;
    info!("Settings loaded from {}", settings_store.path().display());
    let settings = settings_store.settings().clone();
    let session_secs = args
        .duration_override()
        .unwrap_or(settings.default_duration_secs);

    let db_path = args.db_path();
    let database = Database::new(db_path.clone())
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    info!("Using database at {}", database.path().display());

    let (emitter, mut events) = EventEmitter::channel();
    let mut app = App::new(
        SessionController::new(database, session_secs, emitter),
        settings,
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let res = runtime.block_on(run_app(&mut terminal, &mut app, &mut events));
    restore_terminal(&mut terminal)?;

    if let Err(err) = &res {
        error!("tasky stopped with an error: {err:#}");
    } else {
        info!("tasky shut down");
    }
    res
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Leave raw mode before the default hook prints, or the message is garbled.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));
}

async fn run_app(terminal: &mut Tui, app: &mut App<Database>, events: &mut EventReceiver) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut input = EventStream::new();

    loop {
        if app.needs_reload() {
            app.reload().await;
        }
        terminal.draw(|f| ui::render(f, app))?;

        tokio::select! {
            _ = ticker.tick() => app.on_tick().await,
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key).await
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err).context("failed to read terminal input"),
                None => break,
            },
            Some(event) = events.recv() => app.handle_event(event),
        }

        for event in drain(events) {
            app.handle_event(event);
        }
        if app.take_ticker_restart() {
            ticker.reset();
        }
        if app.take_bell() {
            execute!(terminal.backend_mut(), Print("\x07"))?;
        }
        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
