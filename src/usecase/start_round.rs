//! UseCase: ラウンド開始処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - StartRoundUseCase::execute() メソッド
//! - ラウンド開始処理（検証、roundStarted の配信、カウントダウン起動）
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：マスターのみが 2 人以上のルームで開始できる
//! - 問題文・解答の空チェックが試行前に行われることを保証
//! - 開始と同時にカウントダウンが動き出すことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ラウンド開始と tick の配信
//! - 異常系：マスター以外、人数不足、空の問題文/解答

use std::sync::Arc;

use crate::{
    common::time::get_jst_timestamp,
    domain::{
        Answer, GameError, PlayerId, PlayerRegistry, Question, RoomCode, RoomSnapshot, RoomStore,
        Timestamp, MAX_ATTEMPTS,
    },
    infrastructure::dto::websocket::{EventType, RoundStartedMessage},
    usecase::round_lifecycle::{broadcast_payload, RoundLifecycle},
};

/// ラウンド開始のユースケース
pub struct StartRoundUseCase {
    /// Room Store（データアクセス層の抽象化）
    rooms: Arc<dyn RoomStore>,
    /// Player Registry（接続中プレイヤーの台帳）
    players: Arc<dyn PlayerRegistry>,
    /// ラウンドライフサイクル（カウントダウンの起動先）
    lifecycle: Arc<RoundLifecycle>,
}

impl StartRoundUseCase {
    /// 新しい StartRoundUseCase を作成
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

    /// ラウンド開始を実行
    ///
    /// # Arguments
    ///
    /// * `code` - 対象ルームコード
    /// * `caller` - 開始を要求したプレイヤーの ID（マスターであること）
    /// * `question` - 問題文（空は InvalidRound）
    /// * `answer` - 解答（正規化して保存される）
    ///
    /// # Returns
    ///
    /// * `Ok(RoomSnapshot)` - 開始直後のルームビュー
    /// * `Err(GameError)` - 開始失敗
    pub async fn execute(
        &self,
        code: &RoomCode,
        caller: &PlayerId,
        question: String,
        answer: String,
    ) -> Result<RoomSnapshot, GameError> {
        let question = Question::new(question).map_err(|_| GameError::InvalidRound)?;
        let answer = Answer::new(answer).map_err(|_| GameError::InvalidRound)?;
        let now = Timestamp::new(get_jst_timestamp());

        let snapshot = self
            .rooms
            .start_round(code, caller, question, answer, now)
            .await?;

        let msg = RoundStartedMessage {
            r#type: EventType::RoundStarted,
            question: snapshot.question.clone().unwrap_or_default(),
            timer: snapshot.timer_seconds,
            attempts: MAX_ATTEMPTS,
        };
        broadcast_payload(
            &self.players,
            &snapshot.member_ids(),
            serde_json::to_string(&msg).unwrap(),
        )
        .await;

        self.lifecycle.spawn_countdown(code.clone()).await;
        tracing::info!("room '{}' round started by '{}'", code, caller);
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Player, RoomStatus};
    use crate::infrastructure::repository::{InMemoryPlayerRegistry, InMemoryRoomStore};
    use crate::usecase::{CreateRoomUseCase, JoinRoomUseCase};
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

        async fn room_with_two(&self) -> RoomCode {
            let code = CreateRoomUseCase::new(self.rooms.clone(), self.players.clone())
                .execute(&pid("alice"), None)
                .await
                .unwrap()
                .code;
            JoinRoomUseCase::new(self.rooms.clone(), self.players.clone())
                .execute(&code, &pid("bob"), None)
                .await
                .unwrap();
            code
        }

        fn usecase(&self) -> StartRoundUseCase {
            StartRoundUseCase::new(
                self.rooms.clone(),
                self.players.clone(),
                self.lifecycle.clone(),
            )
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_round_broadcasts_and_ticks() {
        // テスト項目: 開始で roundStarted が配信され、カウントダウンが動き出す
        // given (前提条件):
        let fx = Fixture::new();
        let _alice_rx = fx.connect("alice").await;
        let mut bob_rx = fx.connect("bob").await;
        let code = fx.room_with_two().await;

        // when (操作):
        let snapshot = fx
            .usecase()
            .execute(&code, &pid("alice"), "2+2?".to_string(), " 4 ".to_string())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.status, RoomStatus::InProgress);
        assert_eq!(snapshot.timer_seconds, 60);

        // bob には直前の memberJoined が残っているので読み飛ばす
        let joined = bob_rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&joined).unwrap();
        assert_eq!(value["type"], "memberJoined");

        let started = bob_rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&started).unwrap();
        assert_eq!(value["type"], "roundStarted");
        assert_eq!(value["question"], "2+2?");
        assert_eq!(value["timer"], 60);
        assert_eq!(value["attempts"], 3);
        // 問題文は配るが解答は配らない
        assert!(!started.contains("answer"));

        // カウントダウン 1 tick 目
        let tick = bob_rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&tick).unwrap();
        assert_eq!(value["type"], "timerTick");
        assert_eq!(value["timer"], 59);

        fx.lifecycle.cancel_countdown(&code).await;
    }

    #[tokio::test]
    async fn test_start_round_not_master_fails() {
        // テスト項目: マスター以外の開始要求は NotMaster
        // given (前提条件):
        let fx = Fixture::new();
        let _alice_rx = fx.connect("alice").await;
        let _bob_rx = fx.connect("bob").await;
        let code = fx.room_with_two().await;

        // when (操作):
        let result = fx
            .usecase()
            .execute(&code, &pid("bob"), "q".to_string(), "a".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), GameError::NotMaster);
    }

    #[tokio::test]
    async fn test_start_round_insufficient_players_fails() {
        // テスト項目: 一人だけのルームでは開始できない
        // given (前提条件):
        let fx = Fixture::new();
        let _alice_rx = fx.connect("alice").await;
        let code = CreateRoomUseCase::new(fx.rooms.clone(), fx.players.clone())
            .execute(&pid("alice"), None)
            .await
            .unwrap()
            .code;

        // when (操作):
        let result = fx
            .usecase()
            .execute(&code, &pid("alice"), "q".to_string(), "a".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), GameError::InsufficientPlayers);
    }

    #[tokio::test]
    async fn test_start_round_empty_question_or_answer_fails() {
        // テスト項目: 空白のみの問題文・解答は InvalidRound
        // given (前提条件):
        let fx = Fixture::new();
        let _alice_rx = fx.connect("alice").await;
        let _bob_rx = fx.connect("bob").await;
        let code = fx.room_with_two().await;

        // when (操作) / then (期待する結果):
        let result = fx
            .usecase()
            .execute(&code, &pid("alice"), "  ".to_string(), "a".to_string())
            .await;
        assert_eq!(result.unwrap_err(), GameError::InvalidRound);

        let result = fx
            .usecase()
            .execute(&code, &pid("alice"), "q".to_string(), "\t".to_string())
            .await;
        assert_eq!(result.unwrap_err(), GameError::InvalidRound);

        // 状態は変わっていない
        assert_eq!(
            fx.rooms.snapshot(&code).await.unwrap().status,
            RoomStatus::Waiting
        );
    }
}
