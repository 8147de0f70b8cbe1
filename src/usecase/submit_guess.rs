//! UseCase: 推測処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SubmitGuessUseCase::execute() メソッド
//! - 推測の評価、guessResult の配信、正解時のラウンド解決一式
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：正誤にかかわらず試行回数を 1 消費する
//! - 正解時に加点 → roundEnded 配信 → 交代予約が一度だけ行われることを保証
//! - 空の推測が試行を消費しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：不正解（試行減）、正解（即時解決、+10 点、約 5 秒後の交代）
//! - 異常系：空の推測、試行切れ、ラウンド外の推測

use std::sync::Arc;

use crate::{
    domain::{
        GameError, Guess, GuessRecord, PlayerId, PlayerRegistry, RoomCode, RoomStore, WIN_POINTS,
    },
    infrastructure::dto::websocket::{
        EventType, GuessResultMessage, RoundEndedMessage, ScoreEntryDto,
    },
    usecase::round_lifecycle::{broadcast_payload, RoundLifecycle},
};

/// 推測送信のユースケース
pub struct SubmitGuessUseCase {
    /// Room Store（データアクセス層の抽象化）
    rooms: Arc<dyn RoomStore>,
    /// Player Registry（接続中プレイヤーの台帳）
    players: Arc<dyn PlayerRegistry>,
    /// ラウンドライフサイクル（正解時のカウントダウン停止と交代予約）
    lifecycle: Arc<RoundLifecycle>,
}

impl SubmitGuessUseCase {
    /// 新しい SubmitGuessUseCase を作成
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

    /// 推測を実行
    ///
    /// # Arguments
    ///
    /// * `code` - 対象ルームコード
    /// * `player_id` - 推測したプレイヤーの ID
    /// * `guess` - 推測テキスト（空白のみは試行を消費せず拒否）
    ///
    /// # Returns
    ///
    /// * `Ok(GuessRecord)` - 評価結果（正誤と残り試行回数）
    /// * `Err(GameError)` - 推測失敗
    pub async fn execute(
        &self,
        code: &RoomCode,
        player_id: &PlayerId,
        guess: String,
    ) -> Result<GuessRecord, GameError> {
        let guess = Guess::new(guess).map_err(|_| GameError::EmptyGuess)?;
        let applied = self.rooms.apply_guess(code, player_id, &guess).await?;
        let targets = applied.room.member_ids();
        let record = applied.record;

        let msg = GuessResultMessage {
            r#type: EventType::GuessResult,
            player_id: record.player_id.to_string(),
            display_name: record.display_name.to_string(),
            guess: record.guess.to_string(),
            correct: record.correct,
            attempts_left: record.attempts_left,
        };
        broadcast_payload(
            &self.players,
            &targets,
            serde_json::to_string(&msg).unwrap(),
        )
        .await;

        if record.correct {
            // 勝者が確定した時点でカウントダウンを止め、加点してから
            // スコアボードを作る
            self.lifecycle.cancel_countdown(code).await;
            self.players.add_score(player_id, WIN_POINTS).await;
            let scores = self.players.scores_for(&targets).await;

            let ended = RoundEndedMessage {
                r#type: EventType::RoundEnded,
                winner_id: Some(record.player_id.to_string()),
                winner_name: Some(record.display_name.to_string()),
                answer: applied.room.answer.clone().unwrap_or_default(),
                scores: scores.iter().map(ScoreEntryDto::from).collect(),
                timed_out: false,
            };
            broadcast_payload(
                &self.players,
                &targets,
                serde_json::to_string(&ended).unwrap(),
            )
            .await;

            tracing::info!(
                "player '{}' won room '{}' with \"{}\"",
                record.player_id,
                code,
                record.guess
            );
            self.lifecycle.schedule_rotation(code.clone());
        }

        Ok(record)
    }
}
