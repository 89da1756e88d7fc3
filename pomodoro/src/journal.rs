//! Append-only session journal.
//!
//! Every entry is one tab-separated line:
//!
//! ```text
//! 2016-09-03T10:15:00	begin	T
//! 2016-09-03T10:40:00	end	T	25
//! ```

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::phase::Phase;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent {
    Started,
    Begin(Phase),
    /// Phase ended after the given number of minutes
    End(Phase, u32),
    Paused(Phase),
    Continued(Phase),
    Quit,
}

impl LogEvent {
    pub fn fields(&self) -> Vec<String> {
        match *self {
            LogEvent::Started => vec!["started".into()],
            LogEvent::Begin(p) => vec!["begin".into(), p.code().into()],
            LogEvent::End(p, minutes) => {
                vec!["end".into(), p.code().into(), minutes.to_string()]
            }
            LogEvent::Paused(p) => vec!["paused".into(), p.code().into()],
            LogEvent::Continued(p) => vec!["continued".into(), p.code().into()],
            LogEvent::Quit => vec!["quit".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub at: DateTime<Local>,
    pub event: LogEvent,
}

impl JournalEntry {
    pub fn now(event: LogEvent) -> Self {
        Self {
            at: Local::now(),
            event,
        }
    }

    /// The full line including the trailing newline.
    pub fn to_line(&self) -> String {
        let mut fields = vec![self.at.format(TIMESTAMP_FORMAT).to_string()];
        fields.extend(self.event.fields());
        fields.join("\t") + "\n"
    }
}

/// Destination for journal entries. Recording must not block.
pub trait Journal: Send {
    fn record(&mut self, event: LogEvent);
}

/// Default journal location, `~/.pomodoro.txt`.
pub fn default_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".pomodoro.txt"))
}

/// Appends entries to a file from a background task.
///
/// The file is opened, appended to and closed for every entry, so other
/// tools may rotate or truncate it while the timer runs.
pub struct FileJournal {
    tx: mpsc::UnboundedSender<JournalEntry>,
}

/// Handle on the task writing a [`FileJournal`] to disk.
pub struct JournalWriter {
    handle: JoinHandle<()>,
}

impl FileJournal {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    pub fn spawn(path: impl Into<PathBuf>) -> (Self, JournalWriter) {
        let path = path.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(write_entries(path, rx));
        (Self { tx }, JournalWriter { handle })
    }
}

impl JournalWriter {
    /// Wait until every queued entry is written. The journal must have been
    /// dropped first, otherwise this waits forever.
    pub async fn finish(self) {
        if let Err(e) = self.handle.await {
            error!("Journal writer task failed: {}", e);
        }
    }
}

impl Journal for FileJournal {
    fn record(&mut self, event: LogEvent) {
        if self.tx.send(JournalEntry::now(event)).is_err() {
            error!("Journal writer is gone, dropping {:?}", event);
        }
    }
}

async fn write_entries(path: PathBuf, mut rx: mpsc::UnboundedReceiver<JournalEntry>) {
    while let Some(entry) = rx.recv().await {
        let line = entry.to_line();
        // A failed write loses this line only; the timer keeps going.
        if let Err(e) = append_line(&path, &line).await {
            error!("Failed to append to journal {}: {}", path.display(), e);
        } else {
            debug!("journal: {}", line.trim_end());
        }
    }
}

async fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}

/// In-memory journal; clones share the same entries.
#[derive(Clone, Default)]
pub struct MemoryJournal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl MemoryJournal {
    pub fn events(&self) -> Vec<LogEvent> {
        self.entries
            .lock()
            .map(|entries| entries.iter().map(|e| e.event).collect())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.iter().map(JournalEntry::to_line).collect())
            .unwrap_or_default()
    }
}

impl Journal for MemoryJournal {
    fn record(&mut self, event: LogEvent) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(JournalEntry::now(event));
        }
    }
}
