//! Inter-process communication between pomodoro and pomodoroctl
//!
//! The running timer listens on a Unix domain socket. Every message is a
//! single line of JSON: the client writes one `Command`, the server answers
//! with one `Response`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Menu commands that pomodoroctl can send to pomodoro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    StartTask,
    StartBreak,
    /// Pause when running, continue when paused
    Toggle,
    Quit,
    Status,
}

/// Responses from pomodoro back to pomodoroctl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Ok,
    Status(SessionStatus),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub state: SessionState,
    /// One-letter phase code, `None` before the first phase starts
    pub phase: Option<String>,
    pub remaining_seconds: u32,
    /// Title as shown in the status line, e.g. `T24:59`
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Uninitialized,
    Running,
    Paused,
    Terminated,
}

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection closed before a message was received")]
    ConnectionClosed,

    #[error("Connection refused - is pomodoro running?")]
    ConnectionRefused,
}

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/pomodoro.sock";

/// Write one message as a JSON line.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<(), IpcError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut buf = serde_json::to_vec(message)?;
    buf.push(b'\n');
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one JSON line and decode it.
pub async fn read_message<R, T>(reader: &mut R) -> Result<T, IpcError>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Err(IpcError::ConnectionClosed);
    }
    Ok(serde_json::from_str(line.trim_end())?)
}
