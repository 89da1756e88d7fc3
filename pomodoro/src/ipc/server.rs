//! Unix domain socket server for IPC

use anyhow::{bail, Context, Result};
use pomodoro_ipc::{read_message, write_message, Command, IpcError, Response};
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::runtime::Request;

/// Bind the socket, replacing a stale one left by an earlier run.
///
/// Anything at `path` that is not a socket, or a socket some other timer is
/// still answering on, is left alone and reported as an error.
pub fn bind(path: &Path) -> Result<UnixListener> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if !meta.file_type().is_socket() => {
            bail!("Refusing to replace {:?}: not a socket", path);
        }
        Ok(_) => {
            if std::os::unix::net::UnixStream::connect(path).is_ok() {
                bail!("Another timer is already listening on {:?}", path);
            }
            info!("Removing stale IPC socket {}", path.display());
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove stale socket at {:?}", path))?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to inspect {:?}", path));
        }
    }
    let listener = UnixListener::bind(path)
        .with_context(|| format!("Failed to bind IPC socket at {:?}", path))?;
    info!("IPC server listening on {}", path.display());
    Ok(listener)
}

/// Accept clients forever, forwarding each command to the runtime.
pub async fn serve(listener: UnixListener, requests: mpsc::UnboundedSender<Request>) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let requests = requests.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, requests).await {
                        error!("Error handling client: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

/// Removes the socket file when dropped.
pub struct SocketGuard(pub PathBuf);

impl Drop for SocketGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

async fn handle_client(
    stream: UnixStream,
    requests: mpsc::UnboundedSender<Request>,
) -> Result<(), IpcError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let response = match read_message::<_, Command>(&mut reader).await {
        Ok(command) => dispatch(command, &requests).await,
        Err(IpcError::Serialization(e)) => Response::Error(format!("Invalid command: {}", e)),
        Err(e) => return Err(e),
    };

    write_message(&mut writer, &response).await
}

async fn dispatch(command: Command, requests: &mpsc::UnboundedSender<Request>) -> Response {
    let (reply_tx, reply_rx) = oneshot::channel();
    if requests.send(Request::Ipc(command, reply_tx)).is_err() {
        return Response::Error("Timer is shutting down".to_string());
    }
    reply_rx
        .await
        .unwrap_or_else(|_| Response::Error("Timer is shutting down".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::io::AsyncWriteExt;

    async fn roundtrip(path: &Path, line: &[u8]) -> Response {
        let stream = UnixStream::connect(path).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        writer.write_all(line).await.unwrap();
        read_message(&mut BufReader::new(reader)).await.unwrap()
    }

    #[tokio::test]
    async fn forwards_commands_to_the_runtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pomodoro.sock");
        let listener = bind(&path).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(serve(listener, tx));

        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                if let Request::Ipc(command, reply) = request {
                    let response = match command {
                        Command::Toggle => Response::Ok,
                        other => Response::Error(format!("{:?}", other)),
                    };
                    let _ = reply.send(response);
                }
            }
        });

        assert_eq!(roundtrip(&path, b"\"Toggle\"\n").await, Response::Ok);
        assert_eq!(
            roundtrip(&path, b"\"Quit\"\n").await,
            Response::Error("Quit".to_string())
        );
    }

    #[tokio::test]
    async fn malformed_command_gets_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pomodoro.sock");
        let listener = bind(&path).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        tokio::spawn(serve(listener, tx));

        match roundtrip(&path, b"{\"Dance\":1}\n").await {
            Response::Error(msg) => assert!(msg.starts_with("Invalid command")),
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[tokio::test]
    async fn stopped_runtime_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pomodoro.sock");
        let listener = bind(&path).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        tokio::spawn(serve(listener, tx));

        assert_eq!(
            roundtrip(&path, b"\"Status\"\n").await,
            Response::Error("Timer is shutting down".to_string())
        );
    }

    #[tokio::test]
    async fn bind_keeps_files_that_are_not_sockets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pomodoro.sock");
        std::fs::write(&path, "notes").unwrap();

        let err = bind(&path).unwrap_err();
        assert!(err.to_string().contains("not a socket"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "notes");
    }

    #[tokio::test]
    async fn bind_refuses_a_live_socket() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pomodoro.sock");
        let _running = bind(&path).unwrap();

        let err = bind(&path).unwrap_err();
        assert!(err.to_string().contains("already listening"));
        assert!(std::os::unix::net::UnixStream::connect(&path).is_ok());
    }

    #[tokio::test]
    async fn bind_replaces_a_stale_socket() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pomodoro.sock");
        drop(std::os::unix::net::UnixListener::bind(&path).unwrap());
        assert!(path.exists());

        let listener = bind(&path).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        tokio::spawn(serve(listener, tx));
        assert!(UnixStream::connect(&path).await.is_ok());
    }

    #[test]
    fn guard_removes_socket() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pomodoro.sock");
        std::fs::write(&path, "").unwrap();
        drop(SocketGuard(path.clone()));
        assert!(!path.exists());
    }
}
