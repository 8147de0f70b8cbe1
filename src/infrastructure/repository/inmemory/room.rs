//! In-memory RoomStore implementation.
//!
//! Concrete implementation of the domain's `RoomStore` trait, using a
//! HashMap as the in-memory DB. Each room sits behind its own mutex and
//! every operation performs its whole read-modify-write under that lock, so
//! commands against one room are serialized while different rooms proceed
//! in parallel (the outer map is an RwLock: lookups share it, insert /
//! delete / sweep take it exclusively).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    Answer, GameError, Guess, GuessApplied, LeaveOutcome, PlayerId, Question, RepositoryError,
    Room, RoomCode, RoomMember, RoomSnapshot, RoomStore, TimerTick, Timestamp,
};

/// In-memory room store.
#[derive(Default)]
pub struct InMemoryRoomStore {
    rooms: RwLock<HashMap<RoomCode, Mutex<Room>>>,
}

impl InMemoryRoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn insert(&self, room: Room) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room.code) {
            return Err(RepositoryError::DuplicateCode(room.code.clone()));
        }
        rooms.insert(room.code.clone(), Mutex::new(room));
        Ok(())
    }

    async fn join_room(
        &self,
        code: &RoomCode,
        member: RoomMember,
    ) -> Result<RoomSnapshot, GameError> {
        let rooms = self.rooms.read().await;
        let cell = rooms
            .get(code)
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))?;
        let mut room = cell.lock().await;
        room.add_member(member)?;
        Ok(room.snapshot())
    }

    async fn leave_room(
        &self,
        code: &RoomCode,
        player_id: &PlayerId,
    ) -> Result<LeaveOutcome, GameError> {
        // Write guard up front: this operation may delete the room.
        let mut rooms = self.rooms.write().await;
        let cell = rooms
            .get(code)
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))?;
        let (removed, room) = {
            let mut room = cell.lock().await;
            let removed = room.remove_member(player_id)?;
            let snapshot = if room.roster.is_empty() {
                None
            } else {
                Some(room.snapshot())
            };
            (removed, snapshot)
        };
        if room.is_none() {
            rooms.remove(code);
            tracing::info!("room '{}' deleted (no members left)", code);
        }
        Ok(LeaveOutcome { removed, room })
    }

    async fn start_round(
        &self,
        code: &RoomCode,
        caller: &PlayerId,
        question: Question,
        answer: Answer,
        now: Timestamp,
    ) -> Result<RoomSnapshot, GameError> {
        let rooms = self.rooms.read().await;
        let cell = rooms
            .get(code)
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))?;
        let mut room = cell.lock().await;
        room.start_round(caller, question, answer, now)?;
        Ok(room.snapshot())
    }

    async fn apply_guess(
        &self,
        code: &RoomCode,
        player_id: &PlayerId,
        guess: &Guess,
    ) -> Result<GuessApplied, GameError> {
        let rooms = self.rooms.read().await;
        let cell = rooms
            .get(code)
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))?;
        let mut room = cell.lock().await;
        let record = room.apply_guess(player_id, guess)?;
        Ok(GuessApplied {
            record,
            room: room.snapshot(),
        })
    }

    async fn tick_timer(&self, code: &RoomCode) -> Result<TimerTick, GameError> {
        let rooms = self.rooms.read().await;
        let cell = rooms
            .get(code)
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))?;
        let mut room = cell.lock().await;
        Ok(room.tick())
    }

    async fn advance_round(&self, code: &RoomCode) -> Result<Option<RoomSnapshot>, GameError> {
        let rooms = self.rooms.read().await;
        let cell = rooms
            .get(code)
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))?;
        let mut room = cell.lock().await;
        Ok(room.advance_round())
    }

    async fn snapshot(&self, code: &RoomCode) -> Result<RoomSnapshot, GameError> {
        let rooms = self.rooms.read().await;
        let cell = rooms
            .get(code)
            .ok_or_else(|| GameError::RoomNotFound(code.to_string()))?;
        let room = cell.lock().await;
        Ok(room.snapshot())
    }

    async fn purge_stale(&self, now: Timestamp, grace_ms: i64) -> Vec<RoomCode> {
        let mut rooms = self.rooms.write().await;
        let mut stale = Vec::new();
        for (code, cell) in rooms.iter() {
            let room = cell.lock().await;
            if room.roster.is_empty() && now.value() - room.created_at.value() > grace_ms {
                stale.push(code.clone());
            }
        }
        for code in &stale {
            rooms.remove(code);
        }
        stale
    }

    async fn count_rooms(&self) -> usize {
        self.rooms.read().await.len()
    }
}
