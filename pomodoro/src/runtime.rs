//! The single event loop that owns the session.
//!
//! Ticks, key presses and IPC commands all arrive here, so the controller
//! only ever has one writer.

use anyhow::Result;
use crossterm::event::KeyEvent;
use pomodoro_ipc::{Command, Response};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::app::{App, MenuItem};

pub const TICK: Duration = Duration::from_secs(1);

pub enum Request {
    Key(KeyEvent),
    Redraw,
    Ipc(Command, oneshot::Sender<Response>),
    /// Quit the session, e.g. on SIGINT
    Shutdown,
}

/// Run until the session is quit or every request sender is gone.
///
/// `render` is called after every state change.
pub async fn run<F>(
    app: &mut App,
    requests: &mut mpsc::UnboundedReceiver<Request>,
    mut render: F,
) -> Result<()>
where
    F: FnMut(&App) -> Result<()>,
{
    let mut interval = time::interval(TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if app.controller.take_rearm() {
            interval.reset();
        }
        if let Err(e) = render(app) {
            // Still log how long the current phase ran.
            if let Err(quit_err) = app.activate(MenuItem::Quit) {
                warn!("Quit failed: {}", quit_err);
            }
            return Err(e);
        }
        if app.should_quit {
            info!("Session ended");
            return Ok(());
        }

        tokio::select! {
            _ = interval.tick(), if app.controller.clock_running() => app.tick(),
            request = requests.recv() => match request {
                Some(Request::Key(key)) => app.handle_key(key),
                Some(Request::Redraw) => {}
                Some(Request::Ipc(command, reply)) => {
                    debug!("IPC command {:?}", command);
                    let response = app.handle_command(command);
                    if reply.send(response).is_err() {
                        warn!("IPC client went away before the reply");
                    }
                }
                Some(Request::Shutdown) | None => {
                    info!("Shutdown requested");
                    if let Err(e) = app.activate(MenuItem::Quit) {
                        warn!("Quit failed: {}", e);
                    }
                }
            },
        }
    }
}
