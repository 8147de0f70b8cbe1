//! UseCase: ルーム作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//! - ルーム作成処理（コード採番、作成者のマスター任命、所属ルーム記録）
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：作成者が唯一のメンバーかつマスターになる
//! - コード衝突時に呼び出し側へ漏らさず再採番されることを保証
//! - Player.current_room と Room.roster の整合性を確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規ルームの作成（表示名の更新あり/なし）
//! - 異常系：既に別のルームに所属しているプレイヤーの作成試行

use std::sync::Arc;

use crate::{
    common::time::get_jst_timestamp,
    domain::{
        DisplayName, GameError, PlayerId, PlayerRegistry, RepositoryError, Room, RoomCodeFactory,
        RoomMember, RoomSnapshot, RoomStore, Timestamp,
    },
};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// Room Store（データアクセス層の抽象化）
    rooms: Arc<dyn RoomStore>,
    /// Player Registry（接続中プレイヤーの台帳）
    players: Arc<dyn PlayerRegistry>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(rooms: Arc<dyn RoomStore>, players: Arc<dyn PlayerRegistry>) -> Self {
        Self { rooms, players }
    }

    /// ルーム作成を実行
    ///
    /// # Arguments
    ///
    /// * `player_id` - 作成するプレイヤーの ID
    /// * `display_name` - 任意の表示名更新
    ///
    /// # Returns
    ///
    /// * `Ok(RoomSnapshot)` - 作成直後のルームビュー
    /// * `Err(GameError)` - 作成失敗
    pub async fn execute(
        &self,
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

        let creator = RoomMember::from_player(&player, true);
        let created_at = Timestamp::new(get_jst_timestamp());

        // コード衝突は呼び出し側に見せず再採番する
        let snapshot = loop {
            let code = RoomCodeFactory::generate();
            let room = Room::new(code, creator.clone(), created_at);
            let snapshot = room.snapshot();
            match self.rooms.insert(room).await {
                Ok(()) => break snapshot,
                Err(RepositoryError::DuplicateCode(code)) => {
                    tracing::debug!("room code '{}' collided, regenerating", code);
                }
            }
        };

        self.players
            .set_current_room(player_id, Some(snapshot.code.clone()))
            .await;
        tracing::info!("room '{}' created by '{}'", snapshot.code, player_id);
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Player;
    use crate::infrastructure::repository::{InMemoryPlayerRegistry, InMemoryRoomStore};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id.to_string()).unwrap()
    }

    fn stores() -> (Arc<dyn RoomStore>, Arc<dyn PlayerRegistry>) {
        (
            Arc::new(InMemoryRoomStore::new()),
            Arc::new(InMemoryPlayerRegistry::new()),
        )
    }

    async fn connect(players: &Arc<dyn PlayerRegistry>, id: &str) -> UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        let player_id = pid(id);
        let name = Player::default_display_name(&player_id);
        players
            .register(Player::new(player_id, name), tx, Timestamp::new(0))
            .await;
        rx
    }

    #[tokio::test]
    async fn test_create_room_success() {
        // テスト項目: 作成者が唯一のメンバーかつマスターになり、所属が記録される
        // given (前提条件):
        let (rooms, players) = stores();
        let _rx = connect(&players, "alice").await;
        let usecase = CreateRoomUseCase::new(rooms.clone(), players.clone());

        // when (操作):
        let snapshot = usecase.execute(&pid("alice"), None).await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.member_count(), 1);
        assert_eq!(snapshot.master_id, pid("alice"));
        assert!(snapshot.roster[0].is_game_master);
        assert_eq!(rooms.count_rooms().await, 1);
        assert_eq!(
            players.get(&pid("alice")).await.unwrap().current_room,
            Some(snapshot.code)
        );
    }

    #[tokio::test]
    async fn test_create_room_updates_display_name() {
        // テスト項目: 指定された表示名が台帳とロスターの両方に反映される
        // given (前提条件):
        let (rooms, players) = stores();
        let _rx = connect(&players, "alice").await;
        let usecase = CreateRoomUseCase::new(rooms.clone(), players.clone());

        // when (操作):
        let name = DisplayName::new("Quizmaster".to_string()).unwrap();
        let snapshot = usecase
            .execute(&pid("alice"), Some(name.clone()))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.roster[0].display_name, name);
        assert_eq!(
            players.get(&pid("alice")).await.unwrap().display_name,
            name
        );
    }

    #[tokio::test]
    async fn test_create_room_while_in_room_fails() {
        // テスト項目: 既に別ルームに所属しているプレイヤーは作成できない
        // given (前提条件):
        let (rooms, players) = stores();
        let _rx = connect(&players, "alice").await;
        let usecase = CreateRoomUseCase::new(rooms.clone(), players.clone());
        usecase.execute(&pid("alice"), None).await.unwrap();

        // when (操作):
        let result = usecase.execute(&pid("alice"), None).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), GameError::AlreadyJoined);
        assert_eq!(rooms.count_rooms().await, 1);
    }

    #[tokio::test]
    async fn test_create_room_unknown_player_fails() {
        // テスト項目: 未登録の接続からの作成は型付きエラーになる
        // given (前提条件):
        let (rooms, players) = stores();
        let usecase = CreateRoomUseCase::new(rooms, players);

        // when (操作):
        let result = usecase.execute(&pid("ghost"), None).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), GameError::PlayerNotInRoom);
    }
}
