//! UseCase: ルーム状態取得処理
//!
//! スナップショットとスコアボードをまとめて返す読み取り専用ユースケース。
//! 消えたルームへの問い合わせは型付きエラーで返し、決して panic しない。

use std::sync::Arc;

use crate::domain::{GameError, PlayerRegistry, RoomCode, RoomSnapshot, RoomStore, ScoreEntry};

/// ルーム状態の読み取り結果
#[derive(Debug, Clone)]
pub struct RoomStateView {
    /// ルームのスナップショット
    pub snapshot: RoomSnapshot,
    /// ロスター順のスコアボード
    pub scores: Vec<ScoreEntry>,
}

/// ルーム状態取得のユースケース
pub struct GetRoomStateUseCase {
    /// Room Store（データアクセス層の抽象化）
    rooms: Arc<dyn RoomStore>,
    /// Player Registry（接続中プレイヤーの台帳）
    players: Arc<dyn PlayerRegistry>,
}

impl GetRoomStateUseCase {
    /// 新しい GetRoomStateUseCase を作成
    pub fn new(rooms: Arc<dyn RoomStore>, players: Arc<dyn PlayerRegistry>) -> Self {
        Self { rooms, players }
    }

    /// ルーム状態を取得
    pub async fn execute(&self, code: &RoomCode) -> Result<RoomStateView, GameError> {
        let snapshot = self.rooms.snapshot(code).await?;
        let scores = self.players.scores_for(&snapshot.member_ids()).await;
        Ok(RoomStateView { snapshot, scores })
    }
}
