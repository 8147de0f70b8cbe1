//! Core domain models for the guessing game.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    error::GameError,
    policy::{evaluate_guess, next_master, GuessOutcome},
    value_object::{Answer, DisplayName, Guess, PlayerId, Question, RoomCode, Timestamp},
};

/// Default maximum number of members allowed in a room
pub const DEFAULT_MEMBER_CAPACITY: usize = 10;

/// Countdown length of a round, in seconds
pub const ROUND_TIMER_SECONDS: u8 = 60;

/// Guess attempts granted to every member each round
pub const MAX_ATTEMPTS: u8 = 3;

/// Points awarded to the round winner
pub const WIN_POINTS: u32 = 10;

/// Represents a connected player, independent of any room.
///
/// The score is owned by the server and survives across rounds (and rooms)
/// for the lifetime of the connection's process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Player identifier, unique per connection
    pub id: PlayerId,
    /// Display name; defaults to a name derived from the id
    pub display_name: DisplayName,
    /// Accumulated score
    pub score: u32,
    /// The room the player is currently in, if any (at most one)
    pub current_room: Option<RoomCode>,
}

impl Player {
    /// Create a new player with a zero score and no room.
    pub fn new(id: PlayerId, display_name: DisplayName) -> Self {
        Self {
            id,
            display_name,
            score: 0,
            current_room: None,
        }
    }

    /// Default display name derived from the player id, `Player_` plus the
    /// first four characters.
    pub fn default_display_name(id: &PlayerId) -> DisplayName {
        DisplayName::new(format!("Player_{}", id.short()))
            .expect("derived default name is never empty")
    }
}

/// Room-scoped snapshot of a player.
///
/// Copies identity fields from [`Player`] and adds round-scoped state; the
/// two never share mutable structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMember {
    /// Player identifier (copied from the player record)
    pub id: PlayerId,
    /// Display name at join time
    pub display_name: DisplayName,
    /// Exactly one member per room holds this flag
    pub is_game_master: bool,
    /// Guesses left this round, 0..=3
    pub attempts_remaining: u8,
    /// Whether the member already answered correctly this round
    pub has_guessed_correctly: bool,
    /// Round-scoped winner flag, reset every round
    pub is_winner: bool,
}

impl RoomMember {
    /// Build a room member from a player record.
    pub fn from_player(player: &Player, is_game_master: bool) -> Self {
        Self {
            id: player.id.clone(),
            display_name: player.display_name.clone(),
            is_game_master,
            attempts_remaining: MAX_ATTEMPTS,
            has_guessed_correctly: false,
            is_winner: false,
        }
    }
}

/// Round state machine of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomStatus {
    Waiting,
    InProgress,
    Ended,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::InProgress => "in progress",
            RoomStatus::Ended => "ended",
        };
        write!(f, "{s}")
    }
}

/// Result of applying one guess to a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRecord {
    pub player_id: PlayerId,
    pub display_name: DisplayName,
    pub guess: Guess,
    pub correct: bool,
    pub attempts_left: u8,
}

/// Result of one countdown tick against a room.
#[derive(Debug, Clone)]
pub enum TimerTick {
    /// Timer decremented; round still running
    Ticked { snapshot: RoomSnapshot },
    /// Timer reached zero; round resolved as a timeout
    TimedOut { snapshot: RoomSnapshot },
    /// The room is no longer in progress; the countdown must stop
    Stopped,
}

/// Point-in-time read-only view of a room, safe to hand to clients.
///
/// The stored answer is only revealed once the round has ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub master_id: PlayerId,
    pub roster: Vec<RoomMember>,
    pub status: RoomStatus,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub winner_id: Option<PlayerId>,
    pub timer_seconds: u8,
}

impl RoomSnapshot {
    /// Ids of every roster member, in join order.
    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.roster.iter().map(|m| m.id.clone()).collect()
    }

    /// Number of roster members.
    pub fn member_count(&self) -> usize {
        self.roster.len()
    }

    /// Display name of the current master, if still rostered.
    pub fn master_name(&self) -> Option<&DisplayName> {
        self.roster
            .iter()
            .find(|m| m.id == self.master_id)
            .map(|m| &m.display_name)
    }

    /// Display name of the round winner, if any.
    pub fn winner_name(&self) -> Option<&DisplayName> {
        self.winner_id
            .as_ref()
            .and_then(|id| self.roster.iter().find(|m| &m.id == id))
            .map(|m| &m.display_name)
    }
}

/// A single game room: roster, master, and the state of the current round.
///
/// All mutation goes through the methods below; the store holds the room's
/// lock for the whole read-modify-write of each call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Six-character join code
    pub code: RoomCode,
    /// Current game master; always a roster member while the roster is
    /// non-empty
    pub master_id: PlayerId,
    /// Members in join order. The order is the stable ordering used by
    /// master rotation.
    pub roster: Vec<RoomMember>,
    /// Round state machine
    pub status: RoomStatus,
    /// Current question, present while a round is live or being resolved
    pub question: Option<Question>,
    /// Normalized answer for the current round
    pub answer: Option<Answer>,
    /// Winner of the current round, if resolved by a correct guess
    pub winner_id: Option<PlayerId>,
    /// Remaining seconds of the running round
    pub timer_seconds: u8,
    /// Maximum number of members (default: 10)
    pub member_capacity: usize,
    /// Timestamp when the room was created
    pub created_at: Timestamp,
    /// Timestamp when the current round started
    pub round_started_at: Option<Timestamp>,
}

impl Room {
    /// Create a new room with the creator as sole member and game master.
    pub fn new(code: RoomCode, mut creator: RoomMember, created_at: Timestamp) -> Self {
        creator.is_game_master = true;
        let master_id = creator.id.clone();
        Self {
            code,
            master_id,
            roster: vec![creator],
            status: RoomStatus::Waiting,
            question: None,
            answer: None,
            winner_id: None,
            timer_seconds: ROUND_TIMER_SECONDS,
            member_capacity: DEFAULT_MEMBER_CAPACITY,
            created_at,
            round_started_at: None,
        }
    }

    /// Create a room with a custom member capacity.
    pub fn with_capacity(
        code: RoomCode,
        creator: RoomMember,
        created_at: Timestamp,
        member_capacity: usize,
    ) -> Self {
        let mut room = Self::new(code, creator, created_at);
        room.member_capacity = member_capacity;
        room
    }

    /// Get a member by id.
    pub fn member(&self, player_id: &PlayerId) -> Option<&RoomMember> {
        self.roster.iter().find(|m| &m.id == player_id)
    }

    /// Whether the given player is on the roster.
    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.member(player_id).is_some()
    }

    /// Add a member to the roster.
    ///
    /// # Errors
    ///
    /// `RoomNotJoinable` unless the room is waiting, `RoomFull` at capacity,
    /// `AlreadyJoined` if the id is already rostered.
    pub fn add_member(&mut self, mut member: RoomMember) -> Result<(), GameError> {
        if self.status != RoomStatus::Waiting {
            return Err(GameError::RoomNotJoinable {
                status: self.status,
            });
        }
        if self.roster.len() >= self.member_capacity {
            return Err(GameError::RoomFull {
                capacity: self.member_capacity,
                current: self.roster.len(),
            });
        }
        if self.contains(&member.id) {
            return Err(GameError::AlreadyJoined);
        }
        member.is_game_master = false;
        self.roster.push(member);
        Ok(())
    }

    /// Remove a member from the roster.
    ///
    /// If the departing member was the master and the roster stays
    /// non-empty, the earliest surviving member (join order) takes over
    /// immediately. The round status is left untouched: an in-progress
    /// round keeps running.
    pub fn remove_member(&mut self, player_id: &PlayerId) -> Result<RoomMember, GameError> {
        let idx = self
            .roster
            .iter()
            .position(|m| &m.id == player_id)
            .ok_or(GameError::PlayerNotInRoom)?;
        let removed = self.roster.remove(idx);
        if !self.roster.is_empty()
            && self.master_id == *player_id
            && let Some(next) = next_master(&self.roster, &self.master_id)
        {
            self.set_master(next);
        }
        Ok(removed)
    }

    /// Make `player_id` the master and keep the flag exclusive.
    fn set_master(&mut self, player_id: PlayerId) {
        for m in &mut self.roster {
            m.is_game_master = m.id == player_id;
        }
        self.master_id = player_id;
    }

    /// Start a new round.
    ///
    /// # Errors
    ///
    /// `NotMaster` if the caller is not the master, `InsufficientPlayers`
    /// below two members, `RoundAlreadyStarted` unless the room is waiting.
    pub fn start_round(
        &mut self,
        caller: &PlayerId,
        question: Question,
        answer: Answer,
        now: Timestamp,
    ) -> Result<(), GameError> {
        if self.master_id != *caller {
            return Err(GameError::NotMaster);
        }
        if self.roster.len() < 2 {
            return Err(GameError::InsufficientPlayers);
        }
        if self.status != RoomStatus::Waiting {
            return Err(GameError::RoundAlreadyStarted);
        }
        self.status = RoomStatus::InProgress;
        self.question = Some(question);
        self.answer = Some(answer);
        self.winner_id = None;
        self.timer_seconds = ROUND_TIMER_SECONDS;
        self.round_started_at = Some(now);
        self.reset_members();
        Ok(())
    }

    /// Reset every member's round-scoped state (attempts and flags).
    fn reset_members(&mut self) {
        for m in &mut self.roster {
            m.attempts_remaining = MAX_ATTEMPTS;
            m.has_guessed_correctly = false;
            m.is_winner = false;
        }
    }

    /// Evaluate a guess against the running round.
    ///
    /// Correctness is decided before attempts are checked for exhaustion, so
    /// a correct guess on the last attempt still wins. Every evaluated guess
    /// consumes one attempt, right or wrong. A correct guess resolves the
    /// round immediately; a later guess (or the racing final tick) then sees
    /// `RoundNotActive` and cannot resolve it a second time.
    pub fn apply_guess(
        &mut self,
        player_id: &PlayerId,
        guess: &Guess,
    ) -> Result<GuessRecord, GameError> {
        if self.status != RoomStatus::InProgress {
            return Err(GameError::RoundNotActive);
        }
        let answer = self.answer.clone().ok_or(GameError::RoundNotActive)?;
        let member = self
            .roster
            .iter_mut()
            .find(|m| &m.id == player_id)
            .ok_or(GameError::PlayerNotInRoom)?;
        if member.has_guessed_correctly || member.attempts_remaining == 0 {
            return Err(GameError::NoAttemptsRemaining);
        }

        let correct = matches!(evaluate_guess(&answer, guess), GuessOutcome::Correct);
        member.attempts_remaining -= 1;
        if correct {
            member.has_guessed_correctly = true;
            member.is_winner = true;
        }
        let record = GuessRecord {
            player_id: player_id.clone(),
            display_name: member.display_name.clone(),
            guess: guess.clone(),
            correct,
            attempts_left: member.attempts_remaining,
        };

        if correct {
            self.winner_id = Some(player_id.clone());
            self.status = RoomStatus::Ended;
        }
        Ok(record)
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Stopped` once the room left `InProgress` so a stale
    /// countdown task can never emit a tick or resolve a finished round.
    pub fn tick(&mut self) -> TimerTick {
        if self.status != RoomStatus::InProgress {
            return TimerTick::Stopped;
        }
        self.timer_seconds = self.timer_seconds.saturating_sub(1);
        if self.timer_seconds == 0 {
            self.status = RoomStatus::Ended;
            TimerTick::TimedOut {
                snapshot: self.snapshot(),
            }
        } else {
            TimerTick::Ticked {
                snapshot: self.snapshot(),
            }
        }
    }

    /// Move an ended round back to waiting, rotating the master.
    ///
    /// Returns `None` (and changes nothing) unless the room is `Ended` —
    /// the guard that makes the delayed rotation callback idempotent.
    pub fn advance_round(&mut self) -> Option<RoomSnapshot> {
        if self.status != RoomStatus::Ended {
            return None;
        }
        let next = next_master(&self.roster, &self.master_id)?;
        self.set_master(next);
        self.reset_members();
        self.status = RoomStatus::Waiting;
        self.question = None;
        self.answer = None;
        self.winner_id = None;
        self.timer_seconds = ROUND_TIMER_SECONDS;
        self.round_started_at = None;
        Some(self.snapshot())
    }

    /// Point-in-time view for clients. The answer is included only after
    /// the round has ended.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            master_id: self.master_id.clone(),
            roster: self.roster.clone(),
            status: self.status,
            question: self.question.as_ref().map(|q| q.as_str().to_string()),
            answer: if self.status == RoomStatus::Ended {
                self.answer.as_ref().map(|a| a.as_str().to_string())
            } else {
                None
            },
            winner_id: self.winner_id.clone(),
            timer_seconds: self.timer_seconds,
        }
    }
}
