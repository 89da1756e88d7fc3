//! Control socket shared with pomodoroctl

pub mod server;
