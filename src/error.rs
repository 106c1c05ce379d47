use thiserror::Error;

/// Errors raised by generation and by the editor operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Invalid roster size: {size} players (allowed {min}-{max})")]
    InvalidRosterSize { size: usize, min: usize, max: usize },

    #[error("Player listed twice in roster: {0}")]
    DuplicatePlayer(String),

    #[error("Manual goalkeeper for quarter {quarter} is not in the roster: {player}")]
    InvalidManualGoalkeeper { quarter: u32, player: String },

    #[error("Invalid match configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Quarter {0} does not exist")]
    QuarterNotFound(u32),

    #[error("Quarter {quarter} has no slot {slot}")]
    SlotNotFound { quarter: u32, slot: usize },

    #[error("Goalkeeper slots cannot be swapped")]
    CannotSwapGoalkeeper,

    #[error("{player} already plays in quarter {quarter}")]
    PlayerAlreadyPlaying { quarter: u32, player: String },

    #[error("{0} is not in the roster")]
    PlayerNotInRoster(String),

    #[error("{player} would hold two slots in the same wave of quarter {quarter}")]
    PlayerAlreadyInWave { quarter: u32, player: String },

    #[error("Fairness violation: playing time range {variance} min exceeds maximum {max} min")]
    FairnessViolation { variance: u32, max: u32 },

    #[error("Consecutive bench violation: {}", .players.join(", "))]
    ConsecutiveBenchViolation { players: Vec<String> },
}

impl AllocationError {
    /// True for errors detected from the request alone, before any hypothetical
    /// post-edit state is computed.
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            AllocationError::FairnessViolation { .. }
                | AllocationError::ConsecutiveBenchViolation { .. }
                | AllocationError::PlayerAlreadyInWave { .. }
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("quarter_count must be at least 1")]
    NoQuarters,

    #[error("position count for {0} must be at least 1")]
    EmptyPosition(&'static str),

    #[error("wave durations {first}+{second} do not sum to quarter duration {quarter}")]
    WaveMismatch { first: u32, second: u32, quarter: u32 },

    #[error("wave durations must be at least 1 minute")]
    EmptyWave,

    #[error("{field} is {value}, above the limit of {max}")]
    OutOfRange { field: &'static str, value: u32, max: u32 },

    #[error("could not read config: {0}")]
    Io(String),

    #[error("could not parse config: {0}")]
    Parse(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No player name column found in roster header")]
    MissingNameColumn,

    #[error("Goalkeeper quarter {quarter} for {player} is not a valid quarter")]
    InvalidGoalkeeperQuarter { player: String, quarter: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: {message}")]
    MalformedRow { row: usize, message: String },
}
