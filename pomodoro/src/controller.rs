//! Task/Break state machine.
//!
//! ```text
//! Uninitialized --launch--> Running(Task)
//! Running(p) --expiry--> Running(next(p))
//! Running(p) --pause--> Paused(p) --resume--> Running(p)
//! Running/Paused --start_task/start_break--> Running(requested)
//! any --quit--> Terminated
//! ```

use pomodoro_ipc::{SessionState, SessionStatus};
use tracing::{debug, info};

use crate::clock::{PhaseClock, Tick};
use crate::display::{format_title, TitleSink};
use crate::error::SessionError;
use crate::journal::{Journal, LogEvent};
use crate::media::{MediaControl, NoMedia};
use crate::notify::{NoNotifier, Notifier};
use crate::phase::Phase;

pub struct PhaseController {
    clock: PhaseClock,
    phase: Option<Phase>,
    paused: bool,
    terminated: bool,
    journal: Box<dyn Journal>,
    titles: Box<dyn TitleSink>,
    media: Box<dyn MediaControl>,
    notifier: Box<dyn Notifier>,
}

impl PhaseController {
    pub fn new(journal: impl Journal + 'static, titles: impl TitleSink + 'static) -> Self {
        Self {
            clock: PhaseClock::new(),
            phase: None,
            paused: false,
            terminated: false,
            journal: Box::new(journal),
            titles: Box::new(titles),
            media: Box::new(NoMedia),
            notifier: Box::new(NoNotifier),
        }
    }

    pub fn with_media(mut self, media: impl MediaControl + 'static) -> Self {
        self.media = Box::new(media);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.clock.remaining_seconds()
    }

    /// Whether the host should be delivering ticks.
    pub fn clock_running(&self) -> bool {
        self.clock.is_running() && !self.terminated
    }

    /// See [`PhaseClock::take_rearm`].
    pub fn take_rearm(&mut self) -> bool {
        self.clock.take_rearm()
    }

    pub fn title(&self) -> String {
        format_title(self.phase, self.clock.remaining_seconds())
    }

    pub fn status(&self) -> SessionStatus {
        let state = if self.terminated {
            SessionState::Terminated
        } else if self.phase.is_none() {
            SessionState::Uninitialized
        } else if self.paused {
            SessionState::Paused
        } else {
            SessionState::Running
        };
        SessionStatus {
            state,
            phase: self.phase.map(|p| p.code().to_string()),
            remaining_seconds: self.clock.remaining_seconds(),
            title: self.title(),
        }
    }

    /// Log process start and begin the first task.
    pub fn launch(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        if self.phase.is_some() {
            return Ok(());
        }
        self.titles.show(&format_title(None, 0));
        self.journal.record(LogEvent::Started);
        self.begin(Phase::Task)
    }

    pub fn start_task(&mut self) -> Result<(), SessionError> {
        self.switch_to(Phase::Task)
    }

    pub fn start_break(&mut self) -> Result<(), SessionError> {
        self.switch_to(Phase::Break)
    }

    /// Pause a running phase or continue a paused one. Does nothing before
    /// the first phase.
    pub fn pause_or_resume(&mut self) -> Result<(), SessionError> {
        self.ensure_active()?;
        let Some(phase) = self.phase else {
            return Ok(());
        };
        if self.paused {
            self.clock.start(None)?;
            self.journal.record(LogEvent::Continued(phase));
            info!("Continued {:?} with {}s left", phase, self.clock.remaining_seconds());
        } else {
            self.clock.pause();
            self.journal.record(LogEvent::Paused(phase));
            info!("Paused {:?} with {}s left", phase, self.clock.remaining_seconds());
        }
        self.paused = !self.paused;
        Ok(())
    }

    /// Deliver one host tick.
    pub fn tick(&mut self) -> Result<(), SessionError> {
        if self.terminated {
            return Ok(());
        }
        match self.clock.tick() {
            Tick::Idle => Ok(()),
            Tick::Remaining(seconds) => {
                self.titles.show(&format_title(self.phase, seconds));
                Ok(())
            }
            Tick::Expired => self.on_phase_expired(),
        }
    }

    /// End the session. Later calls are no-ops.
    pub fn quit(&mut self) {
        if self.terminated {
            return;
        }
        self.end_current();
        self.journal.record(LogEvent::Quit);
        self.terminated = true;
        info!("Session terminated");
    }

    fn on_phase_expired(&mut self) -> Result<(), SessionError> {
        let next = match self.phase {
            Some(phase) => {
                self.journal.record(LogEvent::End(phase, phase.minutes()));
                phase.next()
            }
            None => Phase::Task,
        };
        info!("Phase expired, moving to {:?}", next);
        self.notifier.phase_expired(next);
        self.begin(next)
    }

    fn switch_to(&mut self, phase: Phase) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.end_current();
        self.begin(phase)
    }

    /// Stop the clock and log how long the current phase actually ran.
    fn end_current(&mut self) {
        let remaining_minutes = self.clock.pause();
        if let Some(phase) = self.phase {
            let elapsed = phase.minutes().saturating_sub(remaining_minutes);
            self.journal.record(LogEvent::End(phase, elapsed));
        }
    }

    fn begin(&mut self, phase: Phase) -> Result<(), SessionError> {
        self.clock.start(Some(phase.minutes()))?;
        self.phase = Some(phase);
        self.paused = false;
        self.journal.record(LogEvent::Begin(phase));
        let title = self.title();
        self.titles.show(&title);
        match phase {
            Phase::Task => self.media.play(),
            Phase::Break => self.media.pause(),
        }
        debug!("Began {:?} for {} minutes", phase, phase.minutes());
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.terminated {
            Err(SessionError::Terminated)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MemoryTitles;
    use crate::journal::MemoryJournal;

    fn controller() -> (PhaseController, MemoryJournal, MemoryTitles) {
        let journal = MemoryJournal::default();
        let titles = MemoryTitles::default();
        let controller = PhaseController::new(journal.clone(), titles.clone());
        (controller, journal, titles)
    }

    fn ticks(controller: &mut PhaseController, n: u32) {
        for _ in 0..n {
            controller.tick().unwrap();
        }
    }

    #[test]
    fn launch_shows_empty_title_then_begins_task() {
        let (mut c, journal, titles) = controller();
        assert_eq!(c.status().state, SessionState::Uninitialized);

        c.launch().unwrap();

        assert_eq!(titles.titles(), ["00:00", "T25:00"]);
        assert_eq!(
            journal.events(),
            [LogEvent::Started, LogEvent::Begin(Phase::Task)]
        );
        assert_eq!(c.phase(), Some(Phase::Task));
        assert_eq!(c.remaining_seconds(), 1500);
        assert_eq!(c.status().state, SessionState::Running);
    }

    #[test]
    fn launch_twice_does_not_restart() {
        let (mut c, journal, _) = controller();
        c.launch().unwrap();
        ticks(&mut c, 10);
        c.launch().unwrap();
        assert_eq!(c.remaining_seconds(), 1490);
        assert_eq!(journal.events().len(), 2);
    }

    #[test]
    fn tick_pushes_title() {
        let (mut c, _, titles) = controller();
        c.launch().unwrap();
        c.tick().unwrap();
        assert_eq!(titles.last().as_deref(), Some("T24:59"));
    }

    #[test]
    fn pause_and_continue_are_logged() {
        let (mut c, journal, _) = controller();
        c.launch().unwrap();
        ticks(&mut c, 5);
        c.pause_or_resume().unwrap();
        assert!(c.is_paused());
        assert!(!c.clock_running());
        assert_eq!(c.status().state, SessionState::Paused);
        ticks(&mut c, 5);
        assert_eq!(c.remaining_seconds(), 1495);
        c.pause_or_resume().unwrap();
        assert!(!c.is_paused());
        assert_eq!(c.phase(), Some(Phase::Task));
        assert_eq!(
            journal.events()[2..],
            [
                LogEvent::Paused(Phase::Task),
                LogEvent::Continued(Phase::Task)
            ]
        );
    }

    #[test]
    fn toggle_before_launch_is_noop() {
        let (mut c, journal, _) = controller();
        c.pause_or_resume().unwrap();
        assert!(!c.is_paused());
        assert!(journal.events().is_empty());
    }

    #[test]
    fn start_break_while_paused_runs_again() {
        let (mut c, journal, _) = controller();
        c.launch().unwrap();
        ticks(&mut c, 300);
        c.pause_or_resume().unwrap();
        c.start_break().unwrap();

        assert!(!c.is_paused());
        assert!(c.clock_running());
        assert_eq!(c.phase(), Some(Phase::Break));
        assert_eq!(c.remaining_seconds(), 300);
        assert_eq!(
            journal.events()[3..],
            [LogEvent::End(Phase::Task, 5), LogEvent::Begin(Phase::Break)]
        );
    }

    #[test]
    fn operations_after_quit_fail() {
        let (mut c, journal, _) = controller();
        c.launch().unwrap();
        c.quit();
        c.quit();
        assert_eq!(c.start_task(), Err(SessionError::Terminated));
        assert_eq!(c.pause_or_resume(), Err(SessionError::Terminated));
        assert_eq!(c.status().state, SessionState::Terminated);
        assert_eq!(journal.events().last(), Some(&LogEvent::Quit));
        assert_eq!(
            journal
                .events()
                .iter()
                .filter(|e| **e == LogEvent::Quit)
                .count(),
            1
        );
    }

    #[test]
    fn quit_before_launch_logs_only_quit() {
        let (mut c, journal, _) = controller();
        c.quit();
        assert_eq!(journal.events(), [LogEvent::Quit]);
    }

    #[test]
    fn start_rearms_the_host_schedule() {
        let (mut c, _, _) = controller();
        c.launch().unwrap();
        assert!(c.take_rearm());
        ticks(&mut c, 3);
        assert!(!c.take_rearm());
        c.start_task().unwrap();
        assert!(c.take_rearm());
    }
}
