//! UseCase: ルーム退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//! - 退出処理（ロスター削除、マスター引き継ぎ、memberLeft の配信、
//!   空ルームの削除とカウントダウン停止）
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：マスター退出時は他コマンドの処理前に
//!   新マスターが確定・配信される
//! - 最後のメンバーの退出でルームとタイマーが確実に片付くことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：通常の退出、マスターの退出
//! - エッジケース：最後のメンバーの退出（配信先なし）
//! - 異常系：所属していないルームからの退出

use std::sync::Arc;

use crate::{
    domain::{GameError, LeaveOutcome, PlayerId, PlayerRegistry, RoomCode, RoomStore},
    infrastructure::dto::websocket::{EventType, MemberLeftMessage, RoomMemberDto, ScoreEntryDto},
    usecase::round_lifecycle::{broadcast_payload, RoundLifecycle},
};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    /// Room Store（データアクセス層の抽象化）
    rooms: Arc<dyn RoomStore>,
    /// Player Registry（接続中プレイヤーの台帳）
    players: Arc<dyn PlayerRegistry>,
    /// ラウンドライフサイクル（ルーム削除時のカウントダウン停止）
    lifecycle: Arc<RoundLifecycle>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(
        rooms: Arc<dyn RoomStore>,
        players: Arc<dyn PlayerRegistry>,
        lifecycle: Arc<RoundLifecycle>,
    ) -> Self {
        Self {
            rooms,
            players,
            lifecycle,
        }
    }

    /// ルーム退出を実行
    ///
    /// # Arguments
    ///
    /// * `code` - 退出するルームコード
    /// * `player_id` - 退出するプレイヤーの ID
    ///
    /// # Returns
    ///
    /// * `Ok(LeaveOutcome)` - 退出後のルームビュー（削除時は None）
    /// * `Err(GameError)` - 退出失敗
    pub async fn execute(
        &self,
        code: &RoomCode,
        player_id: &PlayerId,
    ) -> Result<LeaveOutcome, GameError> {
        let outcome = self.rooms.leave_room(code, player_id).await?;
        self.players.set_current_room(player_id, None).await;

        match &outcome.room {
            None => {
                // ロスターが空になりルームは削除済み。走っている
                // カウントダウンも止める
                self.lifecycle.cancel_countdown(code).await;
            }
            Some(snapshot) => {
                let targets = snapshot.member_ids();
                let scores = self.players.scores_for(&targets).await;
                let msg = MemberLeftMessage {
                    r#type: EventType::MemberLeft,
                    player_id: player_id.to_string(),
                    roster: snapshot.roster.iter().map(RoomMemberDto::from).collect(),
                    master_id: snapshot.master_id.to_string(),
                    scores: scores.iter().map(ScoreEntryDto::from).collect(),
                };
                broadcast_payload(
                    &self.players,
                    &targets,
                    serde_json::to_string(&msg).unwrap(),
                )
                .await;
            }
        }

        tracing::info!("player '{}' left room '{}'", player_id, code);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Player, RoomStatus, Timestamp};
    use crate::infrastructure::repository::{InMemoryPlayerRegistry, InMemoryRoomStore};
    use crate::usecase::{CreateRoomUseCase, JoinRoomUseCase, StartRoundUseCase};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id.to_string()).unwrap()
    }

    struct Fixture {
        rooms: Arc<dyn RoomStore>,
        players: Arc<dyn PlayerRegistry>,
        lifecycle: Arc<RoundLifecycle>,
    }

    impl Fixture {
        fn new() -> Self {
            let rooms: Arc<dyn RoomStore> = Arc::new(InMemoryRoomStore::new());
            let players: Arc<dyn PlayerRegistry> = Arc::new(InMemoryPlayerRegistry::new());
            let lifecycle = RoundLifecycle::new(rooms.clone(), players.clone());
            Self {
                rooms,
                players,
                lifecycle,
            }
        }

        async fn connect(&self, id: &str) -> UnboundedReceiver<String> {
            let (tx, rx) = mpsc::unbounded_channel();
            let player_id = pid(id);
            let name = Player::default_display_name(&player_id);
            self.players
                .register(Player::new(player_id, name), tx, Timestamp::new(0))
                .await;
            rx
        }

        async fn room_with(&self, joiners: &[&str]) -> RoomCode {
            let code = CreateRoomUseCase::new(self.rooms.clone(), self.players.clone())
                .execute(&pid("alice"), None)
                .await
                .unwrap()
                .code;
            let join = JoinRoomUseCase::new(self.rooms.clone(), self.players.clone());
            for id in joiners {
                join.execute(&code, &pid(id), None).await.unwrap();
            }
            code
        }

        fn usecase(&self) -> LeaveRoomUseCase {
            LeaveRoomUseCase::new(
                self.rooms.clone(),
                self.players.clone(),
                self.lifecycle.clone(),
            )
        }
    }

    async fn next_event_of(
        rx: &mut UnboundedReceiver<String>,
        event_type: &str,
    ) -> serde_json::Value {
        loop {
            let json = rx.recv().await.expect("channel closed");
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            if value["type"] == event_type {
                return value;
            }
        }
    }

    #[tokio::test]
    async fn test_master_leave_broadcasts_new_master() {
        // テスト項目: マスター退出で新マスターが即座に配信される
        // given (前提条件):
        let fx = Fixture::new();
        let _alice_rx = fx.connect("alice").await;
        let mut bob_rx = fx.connect("bob").await;
        let _carol_rx = fx.connect("carol").await;
        let code = fx.room_with(&["bob", "carol"]).await;

        // when (操作):
        let outcome = fx.usecase().execute(&code, &pid("alice")).await.unwrap();

        // then (期待する結果): 参加順で bob が引き継ぐ
        assert!(outcome.removed.is_game_master);
        let value = next_event_of(&mut bob_rx, "memberLeft").await;
        assert_eq!(value["playerId"], "alice");
        assert_eq!(value["masterId"], "bob");
        assert_eq!(value["roster"].as_array().unwrap().len(), 2);
        assert_eq!(value["scores"].as_array().unwrap().len(), 2);

        // 台帳の所属も解除される
        assert_eq!(fx.players.get(&pid("alice")).await.unwrap().current_room, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_leave_deletes_room_and_cancels_countdown() {
        // テスト項目: 最後のメンバーの退出でルームが消え、tick も止まる
        // given (前提条件): ラウンド進行中のルーム
        let fx = Fixture::new();
        let mut alice_rx = fx.connect("alice").await;
        let _bob_rx = fx.connect("bob").await;
        let code = fx.room_with(&["bob"]).await;
        StartRoundUseCase::new(
            fx.rooms.clone(),
            fx.players.clone(),
            fx.lifecycle.clone(),
        )
        .execute(&code, &pid("alice"), "2+2?".to_string(), "4".to_string())
        .await
        .unwrap();

        // when (操作): 二人とも退出する
        let usecase = fx.usecase();
        usecase.execute(&code, &pid("bob")).await.unwrap();
        let outcome = usecase.execute(&code, &pid("alice")).await.unwrap();

        // then (期待する結果):
        assert!(outcome.room.is_none());
        assert_eq!(fx.rooms.count_rooms().await, 0);

        // カウントダウンは止まっており、以降 tick は届かない
        while alice_rx.try_recv().is_ok() {}
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_leave_not_in_room_fails() {
        // テスト項目: 所属していないプレイヤーの退出は PlayerNotInRoom
        // given (前提条件):
        let fx = Fixture::new();
        let _alice_rx = fx.connect("alice").await;
        let _dave_rx = fx.connect("dave").await;
        let code = fx.room_with(&[]).await;

        // when (操作):
        let result = fx.usecase().execute(&code, &pid("dave")).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), GameError::PlayerNotInRoom);
    }

    #[tokio::test(start_paused = true)]
    async fn test_leave_during_round_does_not_abort_it() {
        // テスト項目: 退出してもラウンドは中断されない（明示的な仕様）
        // given (前提条件):
        let fx = Fixture::new();
        let _alice_rx = fx.connect("alice").await;
        let _bob_rx = fx.connect("bob").await;
        let _carol_rx = fx.connect("carol").await;
        let code = fx.room_with(&["bob", "carol"]).await;
        StartRoundUseCase::new(
            fx.rooms.clone(),
            fx.players.clone(),
            fx.lifecycle.clone(),
        )
        .execute(&code, &pid("alice"), "2+2?".to_string(), "4".to_string())
        .await
        .unwrap();

        // when (操作):
        fx.usecase().execute(&code, &pid("carol")).await.unwrap();

        // then (期待する結果):
        let snapshot = fx.rooms.snapshot(&code).await.unwrap();
        assert_eq!(snapshot.status, RoomStatus::InProgress);
        assert_eq!(snapshot.member_count(), 2);
        fx.lifecycle.cancel_countdown(&code).await;
    }
}
