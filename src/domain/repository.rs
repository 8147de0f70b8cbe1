//! Repository traits for the two shared mutable stores.
//!
//! The domain defines the interfaces; infrastructure provides the in-memory
//! implementations (dependency inversion). Handlers and usecases never touch
//! a raw map — all access goes through these operations, and every
//! `RoomStore` operation performs its whole read-modify-write under a single
//! room's lock, so commands against one room behave as if serialized while
//! different rooms proceed in parallel.

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::{
    entity::{GuessRecord, Player, Room, RoomMember, RoomSnapshot, TimerTick},
    error::{GameError, RepositoryError},
    value_object::{Answer, DisplayName, Guess, PlayerId, Question, RoomCode, Timestamp},
};

/// Connection bookkeeping kept next to each player record.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Message sender channel for this connection
    pub sender: UnboundedSender<String>,
    /// Unix timestamp when connected (in JST, milliseconds)
    pub connected_at: Timestamp,
}

/// One scoreboard row, in roster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub display_name: DisplayName,
    pub score: u32,
}

/// Result of a member leaving a room.
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    /// The member that was removed
    pub removed: RoomMember,
    /// Post-leave view of the room; `None` when the roster emptied and the
    /// room was deleted
    pub room: Option<RoomSnapshot>,
}

/// Result of applying a guess, taken atomically under the room lock.
#[derive(Debug, Clone)]
pub struct GuessApplied {
    /// Per-guess record (correctness, attempts left)
    pub record: GuessRecord,
    /// Room view right after the guess was applied
    pub room: RoomSnapshot,
}

/// Authoritative registry of live rooms. Owns all room mutation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Insert a freshly created room.
    ///
    /// # Errors
    ///
    /// `DuplicateCode` when the code collides with a live room; the caller
    /// regenerates and retries without surfacing the collision.
    async fn insert(&self, room: Room) -> Result<(), RepositoryError>;

    /// Add a member to a waiting room and return the post-join view.
    async fn join_room(
        &self,
        code: &RoomCode,
        member: RoomMember,
    ) -> Result<RoomSnapshot, GameError>;

    /// Remove a member; deletes the room when the roster empties.
    async fn leave_room(
        &self,
        code: &RoomCode,
        player_id: &PlayerId,
    ) -> Result<LeaveOutcome, GameError>;

    /// Start a round on behalf of `caller`.
    async fn start_round(
        &self,
        code: &RoomCode,
        caller: &PlayerId,
        question: Question,
        answer: Answer,
        now: Timestamp,
    ) -> Result<RoomSnapshot, GameError>;

    /// Evaluate one guess against the running round.
    async fn apply_guess(
        &self,
        code: &RoomCode,
        player_id: &PlayerId,
        guess: &Guess,
    ) -> Result<GuessApplied, GameError>;

    /// Advance the room's countdown by one second.
    async fn tick_timer(&self, code: &RoomCode) -> Result<TimerTick, GameError>;

    /// Rotate the master and reopen an ended room for the next round.
    ///
    /// Guarded: returns `Ok(None)` when the room is no longer in the ended
    /// state, so the delayed rotation callback is idempotent.
    async fn advance_round(&self, code: &RoomCode) -> Result<Option<RoomSnapshot>, GameError>;

    /// Point-in-time view of a room.
    async fn snapshot(&self, code: &RoomCode) -> Result<RoomSnapshot, GameError>;

    /// Delete empty rooms older than `grace_ms` and return their codes.
    async fn purge_stale(&self, now: Timestamp, grace_ms: i64) -> Vec<RoomCode>;

    /// Number of live rooms.
    async fn count_rooms(&self) -> usize;
}

/// Registry of connected players and their outbound channels.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRegistry: Send + Sync {
    /// Register a freshly connected player.
    async fn register(&self, player: Player, sender: UnboundedSender<String>, connected_at: Timestamp);

    /// Remove a player record, returning it if present.
    async fn remove(&self, player_id: &PlayerId) -> Option<Player>;

    /// Look up a player record.
    async fn get(&self, player_id: &PlayerId) -> Option<Player>;

    /// Update a player's display name.
    async fn set_display_name(&self, player_id: &PlayerId, name: DisplayName);

    /// Record which room the player is in (or `None`).
    async fn set_current_room(&self, player_id: &PlayerId, room: Option<RoomCode>);

    /// Add points to a player's score, returning the new total.
    async fn add_score(&self, player_id: &PlayerId, points: u32) -> Option<u32>;

    /// Scoreboard rows for the given ids, preserving their order. Ids with
    /// no live record are skipped.
    async fn scores_for(&self, player_ids: &[PlayerId]) -> Vec<ScoreEntry>;

    /// Outbound channels for the given ids, skipping vanished connections.
    async fn senders_for(
        &self,
        player_ids: &[PlayerId],
    ) -> Vec<(PlayerId, UnboundedSender<String>)>;

    /// Outbound channel of a single player.
    async fn sender_for(&self, player_id: &PlayerId) -> Option<UnboundedSender<String>>;

    /// Number of connected players.
    async fn count(&self) -> usize;
}
