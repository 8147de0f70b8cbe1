//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - ルーム参加処理（検証、ロスター追加、memberJoined の配信）
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：待機中のルームにのみ参加できる
//! - 「既にゲームに参加している」検証を保証（一人一ルームの不変条件）
//! - 参加イベントがルーム全員（参加者本人を含む）に配信されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規メンバーの参加
//! - 異常系：存在しないルーム、満員、進行中、二重参加

use std::sync::Arc;

use crate::{
    domain::{
        DisplayName, GameError, PlayerId, PlayerRegistry, RoomCode, RoomMember, RoomSnapshot,
        RoomStore,
    },
    infrastructure::dto::websocket::{EventType, MemberJoinedMessage, RoomMemberDto},
    usecase::round_lifecycle::broadcast_payload,
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Room Store（データアクセス層の抽象化）
    rooms: Arc<dyn RoomStore>,
    /// Player Registry（接続中プレイヤーの台帳）
    players: Arc<dyn PlayerRegistry>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(rooms: Arc<dyn RoomStore>, players: Arc<dyn PlayerRegistry>) -> Self {
        Self { rooms, players }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `code` - 参加先ルームコード
    /// * `player_id` - 参加するプレイヤーの ID
    /// * `display_name` - 任意の表示名更新
    ///
    /// # Returns
    ///
    /// * `Ok(RoomSnapshot)` - 参加直後のルームビュー
    /// * `Err(GameError)` - 参加失敗
    pub async fn execute(
        &self,
        code: &RoomCode,
        player_id: &PlayerId,
        display_name: Option<DisplayName>,
    ) -> Result<RoomSnapshot, GameError> {
        let mut player = self
            .players
            .get(player_id)
            .await
            .ok_or(GameError::PlayerNotInRoom)?;
        if player.current_room.is_some() {
            return Err(GameError::AlreadyJoined);
        }
        if let Some(name) = display_name {
            self.players.set_display_name(player_id, name.clone()).await;
            player.display_name = name;
        }

        let member = RoomMember::from_player(&player, false);
        let snapshot = self.rooms.join_room(code, member).await?;
        self.players
            .set_current_room(player_id, Some(code.clone()))
            .await;

        // 参加者本人を含むルーム全員に配信する
        let msg = MemberJoinedMessage {
            r#type: EventType::MemberJoined,
            roster: snapshot.roster.iter().map(RoomMemberDto::from).collect(),
            count: snapshot.member_count(),
        };
        broadcast_payload(
            &self.players,
            &snapshot.member_ids(),
            serde_json::to_string(&msg).unwrap(),
        )
        .await;

        tracing::info!(
            "player '{}' joined room '{}' ({} members)",
            player_id,
            code,
            snapshot.member_count()
        );
        Ok(snapshot)
    }
}
