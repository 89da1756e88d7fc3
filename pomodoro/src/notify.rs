use tracing::warn;

use crate::phase::Phase;

/// Told when a phase runs to completion on its own.
pub trait Notifier: Send {
    fn phase_expired(&self, next: Phase);
}

pub struct NoNotifier;

impl Notifier for NoNotifier {
    fn phase_expired(&self, _next: Phase) {}
}

/// Desktop notification through the platform notification daemon.
pub struct DesktopNotifier;

impl DesktopNotifier {
    fn message(next: Phase) -> (&'static str, String) {
        match next {
            Phase::Break => (
                "Break time",
                format!("Task done. Take {} minutes off.", next.minutes()),
            ),
            Phase::Task => (
                "Back to work",
                format!("Break over. Next task runs {} minutes.", next.minutes()),
            ),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn phase_expired(&self, next: Phase) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let (summary, body) = Self::message(next);
        handle.spawn_blocking(move || {
            if let Err(e) = notify_rust::Notification::new()
                .summary(summary)
                .body(&body)
                .appname("pomodoro")
                .show()
            {
                warn!("Failed to send notification: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_mentions_next_duration() {
        let (summary, body) = DesktopNotifier::message(Phase::Break);
        assert_eq!(summary, "Break time");
        assert!(body.contains("5 minutes"));

        let (summary, body) = DesktopNotifier::message(Phase::Task);
        assert_eq!(summary, "Back to work");
        assert!(body.contains("25 minutes"));
    }
}
