//! Domain layer for the guessing game.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod policy;
pub mod repository;
pub mod value_object;

pub use entity::{
    GuessRecord, Player, Room, RoomMember, RoomSnapshot, RoomStatus, TimerTick,
    DEFAULT_MEMBER_CAPACITY, MAX_ATTEMPTS, ROUND_TIMER_SECONDS, WIN_POINTS,
};
pub use error::{GameError, RepositoryError, ValueObjectError};
pub use factory::{PlayerIdFactory, RoomCodeFactory};
pub use policy::{evaluate_guess, next_master, GuessOutcome};
pub use repository::{ClientInfo, GuessApplied, LeaveOutcome, PlayerRegistry, RoomStore, ScoreEntry};
pub use value_object::{Answer, DisplayName, Guess, PlayerId, Question, RoomCode, Timestamp};
