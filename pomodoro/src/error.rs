use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("phase duration must be at least one minute, got {0}")]
    NonPositiveDuration(u32),

    #[error("phase duration of {0} minutes is too long")]
    DurationTooLong(u32),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error("session already terminated")]
    Terminated,
}
