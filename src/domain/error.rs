//! Domain layer error definitions.

use thiserror::Error;

use super::entity::RoomStatus;
use super::value_object::RoomCode;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// PlayerId validation error
    #[error("PlayerId cannot be empty")]
    PlayerIdEmpty,

    /// PlayerId too long error
    #[error("PlayerId cannot exceed {max} characters (got {actual})")]
    PlayerIdTooLong { max: usize, actual: usize },

    /// RoomCode format error
    #[error("RoomCode must be 6 alphanumeric characters (got: {0})")]
    RoomCodeInvalid(String),

    /// DisplayName validation error
    #[error("DisplayName cannot be empty")]
    DisplayNameEmpty,

    /// DisplayName too long error
    #[error("DisplayName cannot exceed {max} characters (got {actual})")]
    DisplayNameTooLong { max: usize, actual: usize },

    /// Question validation error
    #[error("Question cannot be empty")]
    QuestionEmpty,

    /// Answer validation error
    #[error("Answer cannot be empty")]
    AnswerEmpty,

    /// Guess validation error
    #[error("Guess cannot be empty")]
    GuessEmpty,
}

/// Errors for game commands, surfaced to the offending client as a single
/// error event. Messages are human-readable on purpose.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The referenced room does not exist (or was already cleaned up)
    #[error("Game \"{0}\" not found. Check the code or the game may have ended")]
    RoomNotFound(String),

    /// Joining is only possible while the room is waiting
    #[error("Game is {status}")]
    RoomNotJoinable { status: RoomStatus },

    /// Room reached its member capacity
    #[error("Game is full ({current}/{capacity} players)")]
    RoomFull { capacity: usize, current: usize },

    /// The player is already in a game
    #[error("You are already in a game")]
    AlreadyJoined,

    /// Round control is reserved to the game master
    #[error("Only the game master can start the round")]
    NotMaster,

    /// Not enough roster members to start a round
    #[error("Need at least 2 players to start")]
    InsufficientPlayers,

    /// Question or answer missing/empty
    #[error("Question and answer are required")]
    InvalidRound,

    /// The player has used up all attempts (or already guessed right)
    #[error("No attempts remaining")]
    NoAttemptsRemaining,

    /// Empty or whitespace-only guess; consumes no attempt
    #[error("Please enter a guess")]
    EmptyGuess,

    /// The player is not a member of the referenced room
    #[error("Player is not in this game")]
    PlayerNotInRoom,

    /// Guess submitted while no round is in progress
    #[error("Round is not in progress")]
    RoundNotActive,

    /// Start requested while a round is already running or being resolved
    #[error("Round is already in progress")]
    RoundAlreadyStarted,
}

/// Errors internal to the stores, never surfaced to clients
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Generated room code collided with a live room
    #[error("room code {0} already in use")]
    DuplicateCode(RoomCode),
}
