use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pomodoro_ipc::{Command, Response};
use tracing::warn;

use crate::config::Config;
use crate::controller::PhaseController;
use crate::error::SessionError;

/// Entries of the status menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    StartTask,
    StartBreak,
    PauseContinue,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [
        MenuItem::StartTask,
        MenuItem::StartBreak,
        MenuItem::PauseContinue,
        MenuItem::Quit,
    ];

    /// Menu label; the pause entry reads "Continue" while paused.
    pub fn label(self, paused: bool) -> &'static str {
        match self {
            MenuItem::StartTask => "Start Task",
            MenuItem::StartBreak => "Start Break",
            MenuItem::PauseContinue if paused => "Continue",
            MenuItem::PauseContinue => "Pause",
            MenuItem::Quit => "Quit",
        }
    }

    pub fn shortcut(self) -> &'static str {
        match self {
            MenuItem::StartTask => "t",
            MenuItem::StartBreak => "b",
            MenuItem::PauseContinue => "space",
            MenuItem::Quit => "q",
        }
    }
}

pub struct App {
    pub controller: PhaseController,
    pub config: Config,
    pub selected: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(controller: PhaseController, config: Config) -> Self {
        Self {
            controller,
            config,
            selected: 0,
            should_quit: false,
        }
    }

    pub fn activate(&mut self, item: MenuItem) -> Result<(), SessionError> {
        match item {
            MenuItem::StartTask => self.controller.start_task(),
            MenuItem::StartBreak => self.controller.start_break(),
            MenuItem::PauseContinue => self.controller.pause_or_resume(),
            MenuItem::Quit => {
                self.controller.quit();
                self.should_quit = true;
                Ok(())
            }
        }
    }

    pub fn tick(&mut self) {
        if let Err(e) = self.controller.tick() {
            warn!("Tick failed: {}", e);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Raw mode swallows SIGINT, so Ctrl-C arrives as a key.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if let Err(e) = self.activate(MenuItem::Quit) {
                warn!("Quit failed: {}", e);
            }
            return;
        }
        let item = match key.code {
            KeyCode::Char('t') => Some(MenuItem::StartTask),
            KeyCode::Char('b') => Some(MenuItem::StartBreak),
            KeyCode::Char(' ') | KeyCode::Char('p') => Some(MenuItem::PauseContinue),
            KeyCode::Char('q') => Some(MenuItem::Quit),
            KeyCode::Enter => Some(MenuItem::ALL[self.selected]),
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection_up();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection_down();
                None
            }
            _ => None,
        };
        if let Some(item) = item {
            if let Err(e) = self.activate(item) {
                warn!("{:?} failed: {}", item, e);
            }
        }
    }

    pub fn handle_command(&mut self, command: Command) -> Response {
        let item = match command {
            Command::StartTask => MenuItem::StartTask,
            Command::StartBreak => MenuItem::StartBreak,
            Command::Toggle => MenuItem::PauseContinue,
            Command::Quit => MenuItem::Quit,
            Command::Status => return Response::Status(self.controller.status()),
        };
        match self.activate(item) {
            Ok(()) => Response::Ok,
            Err(e) => Response::Error(e.to_string()),
        }
    }

    pub fn move_selection_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        self.selected = (self.selected + 1).min(MenuItem::ALL.len() - 1);
    }

    /// 0.0 .. 1.0 progress through the current phase.
    pub fn progress(&self) -> f64 {
        match self.controller.phase() {
            Some(phase) => {
                let total = f64::from(phase.seconds());
                let remaining = f64::from(self.controller.remaining_seconds());
                (1.0 - remaining / total).clamp(0.0, 1.0)
            }
            None => 0.0,
        }
    }
}
