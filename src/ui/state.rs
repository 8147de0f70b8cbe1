//! Server state shared across handlers.

use std::sync::Arc;

use crate::{
    domain::{PlayerRegistry, RoomStore},
    infrastructure::repository::{InMemoryPlayerRegistry, InMemoryRoomStore},
    usecase::RoundLifecycle,
};

/// Shared application state
pub struct AppState {
    /// Room Store（データアクセス層の抽象化）
    pub rooms: Arc<dyn RoomStore>,
    /// Player Registry（接続とプレイヤーレコードの台帳）
    pub players: Arc<dyn PlayerRegistry>,
    /// Per-room countdown / rotation / sweep controller
    pub lifecycle: Arc<RoundLifecycle>,
}

impl AppState {
    /// Wire up the in-memory stores and the lifecycle controller.
    pub fn new() -> Self {
        let rooms: Arc<dyn RoomStore> = Arc::new(InMemoryRoomStore::new());
        let players: Arc<dyn PlayerRegistry> = Arc::new(InMemoryPlayerRegistry::new());
        let lifecycle = RoundLifecycle::new(rooms.clone(), players.clone());
        Self {
            rooms,
            players,
            lifecycle,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
