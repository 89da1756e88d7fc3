//! External media playback control

use tokio::process::Command;
use tracing::{debug, warn};

/// Pauses or resumes whatever media player the user has running.
pub trait MediaControl: Send {
    fn play(&self);
    fn pause(&self);
}

/// Disabled media control.
pub struct NoMedia;

impl MediaControl for NoMedia {
    fn play(&self) {}
    fn pause(&self) {}
}

/// Runs `<program> play` / `<program> pause`, e.g. `playerctl`.
///
/// Commands are detached; their outcome is only logged.
pub struct PlayerCommand {
    program: String,
}

impl PlayerCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, action: &'static str) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime available for media command '{}'", action);
            return;
        };
        let program = self.program.clone();
        handle.spawn(async move {
            match Command::new(&program).arg(action).output().await {
                Ok(output) if output.status.success() => {
                    debug!("{} {} succeeded", program, action);
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    debug!("{} {} failed: {}", program, action, stderr.trim());
                }
                Err(e) => warn!("Failed to execute {} {}: {}", program, action, e),
            }
        });
    }
}

impl MediaControl for PlayerCommand {
    fn play(&self) {
        self.run("play");
    }

    fn pause(&self) {
        self.run("pause");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_ignored() {
        let media = PlayerCommand::new("definitely-not-a-media-player");
        media.play();
        media.pause();
        tokio::task::yield_now().await;
    }

    #[test]
    fn outside_a_runtime_is_ignored() {
        PlayerCommand::new("playerctl").pause();
    }
}
