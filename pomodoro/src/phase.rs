/// One of the two alternating timer modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Task,
    Break,
}

impl Phase {
    /// Nominal length of the phase.
    pub const fn minutes(self) -> u32 {
        match self {
            Phase::Task => 25,
            Phase::Break => 5,
        }
    }

    pub const fn seconds(self) -> u32 {
        self.minutes() * 60
    }

    /// One-letter code used in the title and the journal.
    pub const fn code(self) -> &'static str {
        match self {
            Phase::Task => "T",
            Phase::Break => "B",
        }
    }

    pub const fn next(self) -> Phase {
        match self {
            Phase::Task => Phase::Break,
            Phase::Break => Phase::Task,
        }
    }
}
