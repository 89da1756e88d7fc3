//! Status-line title rendering.

use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::phase::Phase;

/// `<code><MM>:<SS>`, with an empty code before the first phase.
pub fn format_title(phase: Option<Phase>, seconds: u32) -> String {
    format!(
        "{}{:02}:{:02}",
        phase.map(Phase::code).unwrap_or_default(),
        seconds / 60,
        seconds % 60
    )
}

pub trait TitleSink: Send {
    fn show(&mut self, title: &str);
}

/// Publishes the latest title to anyone holding a receiver.
pub struct TitleBar {
    tx: watch::Sender<String>,
}

impl TitleBar {
    pub fn new() -> (Self, watch::Receiver<String>) {
        let (tx, rx) = watch::channel(format_title(None, 0));
        (Self { tx }, rx)
    }
}

impl TitleSink for TitleBar {
    fn show(&mut self, title: &str) {
        self.tx.send_if_modified(|current| {
            if current == title {
                false
            } else {
                title.clone_into(current);
                true
            }
        });
    }
}

/// Keeps every title shown; clones share the same history.
#[derive(Clone, Default)]
pub struct MemoryTitles {
    titles: Arc<Mutex<Vec<String>>>,
}

impl MemoryTitles {
    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.titles().pop()
    }
}

impl TitleSink for MemoryTitles {
    fn show(&mut self, title: &str) {
        if let Ok(mut titles) = self.titles.lock() {
            titles.push(title.to_string());
        }
    }
}
