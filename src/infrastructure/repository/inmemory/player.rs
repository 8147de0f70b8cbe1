//! In-memory PlayerRegistry implementation.
//!
//! One record per live connection: the player's game state plus the
//! outbound message channel used for broadcasts.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc::UnboundedSender, Mutex};

use crate::domain::{
    ClientInfo, DisplayName, Player, PlayerId, PlayerRegistry, RoomCode, ScoreEntry, Timestamp,
};

struct PlayerEntry {
    player: Player,
    client: ClientInfo,
}

/// In-memory player registry.
#[derive(Default)]
pub struct InMemoryPlayerRegistry {
    players: Mutex<HashMap<PlayerId, PlayerEntry>>,
}

impl InMemoryPlayerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerRegistry for InMemoryPlayerRegistry {
    async fn register(
        &self,
        player: Player,
        sender: UnboundedSender<String>,
        connected_at: Timestamp,
    ) {
        let mut players = self.players.lock().await;
        players.insert(
            player.id.clone(),
            PlayerEntry {
                player,
                client: ClientInfo {
                    sender,
                    connected_at,
                },
            },
        );
    }

    async fn remove(&self, player_id: &PlayerId) -> Option<Player> {
        let mut players = self.players.lock().await;
        players.remove(player_id).map(|entry| entry.player)
    }

    async fn get(&self, player_id: &PlayerId) -> Option<Player> {
        let players = self.players.lock().await;
        players.get(player_id).map(|entry| entry.player.clone())
    }

    async fn set_display_name(&self, player_id: &PlayerId, name: DisplayName) {
        let mut players = self.players.lock().await;
        if let Some(entry) = players.get_mut(player_id) {
            entry.player.display_name = name;
        }
    }

    async fn set_current_room(&self, player_id: &PlayerId, room: Option<RoomCode>) {
        let mut players = self.players.lock().await;
        if let Some(entry) = players.get_mut(player_id) {
            entry.player.current_room = room;
        }
    }

    async fn add_score(&self, player_id: &PlayerId, points: u32) -> Option<u32> {
        let mut players = self.players.lock().await;
        players.get_mut(player_id).map(|entry| {
            entry.player.score += points;
            entry.player.score
        })
    }

    async fn scores_for(&self, player_ids: &[PlayerId]) -> Vec<ScoreEntry> {
        let players = self.players.lock().await;
        player_ids
            .iter()
            .filter_map(|id| {
                players.get(id).map(|entry| ScoreEntry {
                    player_id: entry.player.id.clone(),
                    display_name: entry.player.display_name.clone(),
                    score: entry.player.score,
                })
            })
            .collect()
    }

    async fn senders_for(
        &self,
        player_ids: &[PlayerId],
    ) -> Vec<(PlayerId, UnboundedSender<String>)> {
        let players = self.players.lock().await;
        player_ids
            .iter()
            .filter_map(|id| {
                players
                    .get(id)
                    .map(|entry| (id.clone(), entry.client.sender.clone()))
            })
            .collect()
    }

    async fn sender_for(&self, player_id: &PlayerId) -> Option<UnboundedSender<String>> {
        let players = self.players.lock().await;
        players.get(player_id).map(|entry| entry.client.sender.clone())
    }

    async fn count(&self) -> usize {
        self.players.lock().await.len()
    }
}
