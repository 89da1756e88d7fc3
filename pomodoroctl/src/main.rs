use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pomodoro_ipc::{
    read_message, write_message, Command, IpcError, Response, SessionState, DEFAULT_SOCKET_PATH,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::BufReader;
use tokio::net::UnixStream;

#[derive(Parser)]
#[command(name = "pomodoroctl")]
#[command(about = "Control the Pomodoro timer", long_about = None)]
struct Cli {
    /// Socket of the running timer
    #[arg(short, long, default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// End the current phase and start a task
    Task,
    /// End the current phase and start a break
    Break,
    /// Pause the running phase, or continue a paused one
    #[command(visible_aliases = ["pause", "continue"])]
    Toggle,
    /// Log the final phase and stop the timer
    Quit,
    /// Show the current phase and remaining time
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Convert CLI command to IPC command
    let command = match cli.command {
        Commands::Task => Command::StartTask,
        Commands::Break => Command::StartBreak,
        Commands::Toggle => Command::Toggle,
        Commands::Quit => Command::Quit,
        Commands::Status => Command::Status,
    };

    // Send command and get response
    let response = send_command(&cli.socket, command).await?;

    // Handle response
    match response {
        Response::Ok => println!("OK"),
        Response::Status(status) => {
            let state = match status.state {
                SessionState::Uninitialized => "not started",
                SessionState::Running => "running",
                SessionState::Paused => "paused",
                SessionState::Terminated => "terminated",
            };
            println!("{} ({})", status.title, state);
        }
        Response::Error(e) => anyhow::bail!("{}", e),
    }

    Ok(())
}

async fn send_command(socket: &Path, cmd: Command) -> Result<Response> {
    let stream = UnixStream::connect(socket).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound | ErrorKind::ConnectionRefused => IpcError::ConnectionRefused,
        _ => IpcError::Io(e),
    })?;
    let (reader, mut writer) = stream.into_split();

    write_message(&mut writer, &cmd)
        .await
        .context("Failed to send command")?;
    let response = read_message(&mut BufReader::new(reader))
        .await
        .context("Failed to read response")?;

    Ok(response)
}
