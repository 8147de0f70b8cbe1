//! ラウンドライフサイクル制御
//!
//! ルームごとのカウントダウン、タイムアウト解決、5 秒後のマスター交代、
//! 空ルームの定期回収を司るコントローラ。
//!
//! ## 設計メモ
//!
//! - カウントダウンはルームコードをキーにした `JoinHandle` 索引で管理し、
//!   ラウンドが InProgress を離れた時点で abort できる
//! - tick / 交代は Store 側の状態ガードを通るため、ハンドルの abort が
//!   間に合わなくても stale な tick や二重解決は起こらない

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle};

use crate::{
    common::time::get_jst_timestamp,
    domain::{PlayerId, PlayerRegistry, RoomCode, RoomSnapshot, RoomStore, TimerTick, Timestamp},
    infrastructure::dto::websocket::{
        EventType, NextRoundMessage, RoomMemberDto, RoundEndedMessage, ScoreEntryDto,
        TimerTickMessage,
    },
};

/// Delay between a round ending and the master rotating
pub const ROTATION_DELAY: Duration = Duration::from_secs(5);

/// Interval of the empty-room cleanup sweep
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Grace period before an orphaned empty room is reclaimed
pub const ROOM_GRACE_MS: i64 = 5 * 60 * 1000;

/// Send a serialized event to every listed player, skipping (and logging)
/// connections whose channel has gone away. Broadcasts are fire-and-forget
/// relative to the committed room state.
pub(crate) async fn broadcast_payload(
    players: &Arc<dyn PlayerRegistry>,
    targets: &[PlayerId],
    payload: String,
) {
    for (player_id, sender) in players.senders_for(targets).await {
        if sender.send(payload.clone()).is_err() {
            tracing::warn!("failed to send event to player '{}'", player_id);
        }
    }
}

/// Drives each room's countdown and the post-round transitions.
pub struct RoundLifecycle {
    rooms: Arc<dyn RoomStore>,
    players: Arc<dyn PlayerRegistry>,
    /// Running countdown task per room
    countdowns: Mutex<HashMap<RoomCode, JoinHandle<()>>>,
}

impl RoundLifecycle {
    pub fn new(rooms: Arc<dyn RoomStore>, players: Arc<dyn PlayerRegistry>) -> Arc<Self> {
        Arc::new(Self {
            rooms,
            players,
            countdowns: Mutex::new(HashMap::new()),
        })
    }

    /// Start the per-second countdown for a freshly started round.
    ///
    /// Any stale task for the same room is aborted first. The task exits on
    /// its own when the round resolves (win, timeout) or the room vanishes.
    pub async fn spawn_countdown(self: &Arc<Self>, code: RoomCode) {
        let mut countdowns = self.countdowns.lock().await;
        if let Some(stale) = countdowns.remove(&code) {
            stale.abort();
        }

        let this = Arc::clone(self);
        let task_code = code.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                match this.rooms.tick_timer(&task_code).await {
                    Ok(TimerTick::Ticked { snapshot }) => {
                        let msg = TimerTickMessage {
                            r#type: EventType::TimerTick,
                            timer: snapshot.timer_seconds,
                        };
                        broadcast_payload(
                            &this.players,
                            &snapshot.member_ids(),
                            serde_json::to_string(&msg).unwrap(),
                        )
                        .await;
                    }
                    Ok(TimerTick::TimedOut { snapshot }) => {
                        this.resolve_timeout(task_code, snapshot).await;
                        break;
                    }
                    Ok(TimerTick::Stopped) => break,
                    Err(_) => break, // room deleted out from under the round
                }
            }
        });
        countdowns.insert(code, handle);
    }

    /// Abort the countdown for a room (win path, room deletion, sweep).
    pub async fn cancel_countdown(&self, code: &RoomCode) {
        let mut countdowns = self.countdowns.lock().await;
        if let Some(handle) = countdowns.remove(code) {
            handle.abort();
        }
    }

    /// Broadcast the timeout resolution and schedule the rotation.
    async fn resolve_timeout(self: &Arc<Self>, code: RoomCode, snapshot: RoomSnapshot) {
        let targets = snapshot.member_ids();

        let tick = TimerTickMessage {
            r#type: EventType::TimerTick,
            timer: 0,
        };
        broadcast_payload(
            &self.players,
            &targets,
            serde_json::to_string(&tick).unwrap(),
        )
        .await;

        let scores = self.players.scores_for(&targets).await;
        let ended = RoundEndedMessage {
            r#type: EventType::RoundEnded,
            winner_id: None,
            winner_name: None,
            answer: snapshot.answer.clone().unwrap_or_default(),
            scores: scores.iter().map(ScoreEntryDto::from).collect(),
            timed_out: true,
        };
        broadcast_payload(
            &self.players,
            &targets,
            serde_json::to_string(&ended).unwrap(),
        )
        .await;
        tracing::info!("room '{}' round timed out", code);

        self.schedule_rotation(code);
    }

    /// Rotate the master after [`ROTATION_DELAY`].
    ///
    /// The one-shot task is guarded by `advance_round`: if the room was
    /// deleted, or is no longer ended when the delay elapses, it is a no-op.
    pub fn schedule_rotation(self: &Arc<Self>, code: RoomCode) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(ROTATION_DELAY).await;
            match this.rooms.advance_round(&code).await {
                Ok(Some(snapshot)) => {
                    let targets = snapshot.member_ids();
                    let scores = this.players.scores_for(&targets).await;
                    let msg = NextRoundMessage {
                        r#type: EventType::NextRound,
                        master_id: snapshot.master_id.to_string(),
                        master_name: snapshot
                            .master_name()
                            .map(|n| n.to_string())
                            .unwrap_or_default(),
                        roster: snapshot.roster.iter().map(RoomMemberDto::from).collect(),
                        scores: scores.iter().map(ScoreEntryDto::from).collect(),
                        status: snapshot.status,
                        timer: snapshot.timer_seconds,
                    };
                    broadcast_payload(
                        &this.players,
                        &targets,
                        serde_json::to_string(&msg).unwrap(),
                    )
                    .await;
                    tracing::info!(
                        "room '{}' rotated master to '{}'",
                        code,
                        snapshot.master_id
                    );
                }
                Ok(None) => {
                    tracing::debug!("room '{}' already advanced; rotation skipped", code);
                }
                Err(_) => {
                    tracing::debug!("room '{}' gone before rotation fired", code);
                }
            }
        });
    }

    /// Periodically reclaim orphaned empty rooms (safety net; rooms are
    /// normally deleted the moment their roster empties).
    pub fn spawn_cleanup_sweep(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await; // the first tick completes immediately
            loop {
                interval.tick().await;
                let now = Timestamp::new(get_jst_timestamp());
                for code in this.rooms.purge_stale(now, ROOM_GRACE_MS).await {
                    this.cancel_countdown(&code).await;
                    tracing::info!("cleaned up empty room '{}'", code);
                }
            }
        })
    }
}
