use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pomodoro::{
    app::App,
    config::{self, Config},
    input,
    ipc::server::{self, SocketGuard},
    runtime::{self, Request},
    ui, DesktopNotifier, FileJournal, PhaseController, PlayerCommand, TitleBar,
};

#[derive(Parser)]
#[command(name = "pomodoro")]
#[command(about = "Task/Break phase timer with a session journal", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run without the terminal UI, printing the title to stdout on every change
    #[arg(long)]
    headless: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;
    init_tracing(&cli)?;

    info!("Starting pomodoro v{}", env!("CARGO_PKG_VERSION"));

    let journal_path = config.journal_path()?;
    info!("Journal: {}", journal_path.display());
    let (journal, writer) = FileJournal::spawn(journal_path);
    let (titles, title_rx) = TitleBar::new();
    let controller = build_controller(&config, journal, titles);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let listener = server::bind(&config.socket_path)?;
    let _socket = SocketGuard(config.socket_path.clone());
    tokio::spawn(server::serve(listener, tx.clone()));

    let signal_tx = tx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = signal_tx.send(Request::Shutdown);
    });

    let mut app = App::new(controller, config);
    app.controller.launch()?;

    let result = if cli.headless {
        tokio::spawn(print_titles(title_rx));
        runtime::run(&mut app, &mut rx, |_| Ok(())).await
    } else {
        run_tui(&mut app, &mut rx, tx, title_rx).await
    };

    // Every exit path logs the final phase; quitting twice is harmless.
    app.controller.quit();
    // Dropping the controller closes the journal channel.
    drop(app);
    writer.finish().await;

    if let Err(err) = &result {
        error!("Error: {:?}", err);
    }
    result
}

fn build_controller(config: &Config, journal: FileJournal, titles: TitleBar) -> PhaseController {
    let mut controller = PhaseController::new(journal, titles);
    if config.media.enabled {
        controller = controller.with_media(PlayerCommand::new(config.media.command.clone()));
    }
    if config.notifications.enabled {
        controller = controller.with_notifier(DesktopNotifier);
    }
    controller
}

async fn run_tui(
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<Request>,
    tx: mpsc::UnboundedSender<Request>,
    mut title_rx: watch::Receiver<String>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    input::spawn(tx);
    let res = runtime::run(app, rx, |app| {
        terminal.draw(|f| ui::draw(f, app))?;
        if title_rx.has_changed().unwrap_or(false) {
            let title = title_rx.borrow_and_update().clone();
            execute!(terminal.backend_mut(), SetTitle(title))?;
        }
        Ok(())
    })
    .await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn print_titles(mut title_rx: watch::Receiver<String>) {
    println!("{}", *title_rx.borrow_and_update());
    while title_rx.changed().await.is_ok() {
        println!("{}", *title_rx.borrow_and_update());
    }
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    let mut term = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            let _ = ctrl_c.await;
            return;
        }
    };
    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = term.recv() => info!("Received SIGTERM"),
    }
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pomodoro={}", level)));

    if cli.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        // The terminal belongs to the UI, so diagnostics go to a file.
        let path = config::data_dir()?.join("pomodoro.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file at {:?}", path))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }
    Ok(())
}
