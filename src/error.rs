use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid rank: {0}")]
    InvalidRank(char),

    #[error("Invalid suit: {0}")]
    InvalidSuit(char),

    #[error("Invalid card notation: {0}")]
    InvalidCardNotation(String),

    #[error("Invalid board notation: {0}")]
    InvalidBoardNotation(String),

    #[error("Need at least {need} cards, got {got}")]
    NotEnoughCards { need: usize, got: usize },

    #[error("Cannot deal {requested} cards, only {available} remaining")]
    NotEnoughDeck { requested: usize, available: usize },

    #[error("Seat count {0} out of range (2-9)")]
    SeatCountOutOfRange(usize),

    #[error("Big blind must be at least 1")]
    NonPositiveBlind,

    #[error("Starting stack must be positive")]
    NonPositiveStack,

    #[error("Fewer than two seats have chips")]
    NotEnoughPlayers,

    #[error("Seat {got} acted out of turn (seat {expected} to act)")]
    OutOfTurn { expected: usize, got: usize },

    #[error("No seat is to act in the current phase")]
    NoActionPending,

    #[error("Cannot check facing a bet of {to_call}")]
    CheckFacingBet { to_call: u64 },

    #[error("Nothing to call")]
    NothingToCall,

    #[error("Big blind cannot fold an unopened pot")]
    FoldNotAllowed,

    #[error("Min raise is {minimum}, got {attempted}")]
    RaiseBelowMinimum { attempted: u64, minimum: u64 },

    #[error("Raise to {attempted} does not exceed the current bet of {target}")]
    RaiseNotAboveTarget { attempted: u64, target: u64 },

    #[error("Action is closed; only fold, call, or all-in allowed")]
    RaiseNotReopened,

    #[error("Seat {0} has no chips behind")]
    NoChipsBehind(usize),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
