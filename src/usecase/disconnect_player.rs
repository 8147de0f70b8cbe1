//! UseCase: プレイヤー切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectPlayerUseCase::execute() メソッド
//! - 切断処理（所属ルームからの退出 → 台帳からの削除）
//!
//! ### なぜこのテストが必要か
//! - 切断は明示的な退出と同じ経路を通ることを保証（仕様）
//! - ルーム未所属の切断でも台帳が確実に片付くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム所属中の切断、未所属の切断
//! - エッジケース：ルームが先に消えていた場合（退出失敗を握りつぶす）

use std::sync::Arc;

use crate::{
    domain::{PlayerId, PlayerRegistry, RoomStore},
    usecase::{round_lifecycle::RoundLifecycle, LeaveRoomUseCase},
};

/// プレイヤー切断のユースケース
pub struct DisconnectPlayerUseCase {
    /// Room Store（データアクセス層の抽象化）
    rooms: Arc<dyn RoomStore>,
    /// Player Registry（接続中プレイヤーの台帳）
    players: Arc<dyn PlayerRegistry>,
    /// ラウンドライフサイクル（退出経路で利用）
    lifecycle: Arc<RoundLifecycle>,
}

impl DisconnectPlayerUseCase {
    /// 新しい DisconnectPlayerUseCase を作成
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

    /// 切断を実行
    ///
    /// 所属ルームがあれば明示的な退出と同一の処理を行い、その後
    /// 台帳からプレイヤーレコードを削除する。途中でルームが消えていても
    /// 台帳の削除は必ず行う。
    pub async fn execute(&self, player_id: &PlayerId) {
        if let Some(player) = self.players.get(player_id).await
            && let Some(code) = player.current_room
        {
            let leave = LeaveRoomUseCase::new(
                self.rooms.clone(),
                self.players.clone(),
                self.lifecycle.clone(),
            );
            if let Err(e) = leave.execute(&code, player_id).await {
                tracing::warn!(
                    "leave on disconnect failed for player '{}' in room '{}': {}",
                    player_id,
                    code,
                    e
                );
            }
        }

        self.players.remove(player_id).await;
        tracing::info!("player '{}' disconnected and removed", player_id);
    }
}
