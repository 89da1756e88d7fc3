//! Terminal key reader.

use crossterm::event::{self, Event, KeyEventKind};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};

use crate::runtime::Request;

/// Forward key presses to the runtime from a dedicated thread. The thread
/// exits once the runtime drops its receiver.
pub fn spawn(tx: UnboundedSender<Request>) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        if tx.is_closed() {
            debug!("Input reader stopping");
            return;
        }
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx.send(Request::Key(key)).is_err() {
                        return;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    if tx.send(Request::Redraw).is_err() {
                        return;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Failed to read terminal event: {}", e);
                    return;
                }
            },
            Ok(false) => {}
            Err(e) => {
                error!("Failed to poll terminal events: {}", e);
                return;
            }
        }
    })
}
