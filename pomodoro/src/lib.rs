//! Pomodoro - a Task/Break phase timer with an append-only session journal
//!
//! The engine is [`PhaseClock`] (the countdown) and [`PhaseController`]
//! (the Task/Break state machine). Everything the controller touches
//! outside itself goes through a small trait: [`Journal`], [`TitleSink`],
//! [`MediaControl`] and [`Notifier`].

pub mod app;
pub mod clock;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod input;
pub mod ipc;
pub mod journal;
pub mod media;
pub mod notify;
pub mod phase;
pub mod runtime;
pub mod ui;

// Re-export commonly used types
pub use clock::{PhaseClock, Tick};
pub use controller::PhaseController;
pub use display::{format_title, MemoryTitles, TitleBar, TitleSink};
pub use error::{ClockError, SessionError};
pub use journal::{FileJournal, Journal, JournalEntry, LogEvent, MemoryJournal};
pub use media::{MediaControl, NoMedia, PlayerCommand};
pub use notify::{DesktopNotifier, NoNotifier, Notifier};
pub use phase::Phase;
pub use pomodoro_ipc::{SessionState, SessionStatus};
