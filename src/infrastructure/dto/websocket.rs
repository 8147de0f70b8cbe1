//! WebSocket message DTOs for the guessing game.
//!
//! Inbound commands arrive as one internally tagged enum; outbound events
//! are one struct per event with a typed `r#type` discriminant. All field
//! names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::domain::{RoomMember, RoomSnapshot, RoomStatus, ScoreEntry};

/// Inbound client command, dispatched by the `"type"` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientCommand {
    #[serde(rename_all = "camelCase")]
    CreateRoom { display_name: Option<String> },
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
        display_name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    StartRound {
        room_id: String,
        question: String,
        answer: String,
    },
    #[serde(rename_all = "camelCase")]
    SubmitGuess { room_id: String, guess: String },
    #[serde(rename_all = "camelCase")]
    GetState { room_id: String },
    #[serde(rename_all = "camelCase")]
    LeaveRoom { room_id: String },
}

/// Outbound event type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    Connected,
    RoomCreated,
    JoinSuccess,
    MemberJoined,
    RoundStarted,
    GuessResult,
    RoundEnded,
    TimerTick,
    NextRound,
    MemberLeft,
    RoomState,
    CommandError,
}

/// One roster member as sent to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMemberDto {
    pub id: String,
    pub display_name: String,
    pub is_game_master: bool,
    pub attempts_remaining: u8,
    pub has_guessed_correctly: bool,
    pub is_winner: bool,
}

impl From<&RoomMember> for RoomMemberDto {
    fn from(member: &RoomMember) -> Self {
        Self {
            id: member.id.to_string(),
            display_name: member.display_name.to_string(),
            is_game_master: member.is_game_master,
            attempts_remaining: member.attempts_remaining,
            has_guessed_correctly: member.has_guessed_correctly,
            is_winner: member.is_winner,
        }
    }
}

/// Point-in-time room view as sent to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshotDto {
    pub id: String,
    pub master_id: String,
    pub roster: Vec<RoomMemberDto>,
    pub status: RoomStatus,
    pub question: Option<String>,
    /// Revealed only once the round has ended
    pub answer: Option<String>,
    pub winner_id: Option<String>,
    pub timer: u8,
}

impl From<&RoomSnapshot> for RoomSnapshotDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            id: snapshot.code.to_string(),
            master_id: snapshot.master_id.to_string(),
            roster: snapshot.roster.iter().map(RoomMemberDto::from).collect(),
            status: snapshot.status,
            question: snapshot.question.clone(),
            answer: snapshot.answer.clone(),
            winner_id: snapshot.winner_id.as_ref().map(|id| id.to_string()),
            timer: snapshot.timer_seconds,
        }
    }
}

/// One scoreboard row as sent to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntryDto {
    pub id: String,
    pub display_name: String,
    pub score: u32,
}

impl From<&ScoreEntry> for ScoreEntryDto {
    fn from(entry: &ScoreEntry) -> Self {
        Self {
            id: entry.player_id.to_string(),
            display_name: entry.display_name.to_string(),
            score: entry.score,
        }
    }
}

/// Sent to a client right after its connection is registered
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub r#type: EventType,
    pub player_id: String,
}

/// Reply to a successful createRoom
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreatedMessage {
    pub r#type: EventType,
    pub room_id: String,
    pub snapshot: RoomSnapshotDto,
}

/// Reply to the joining client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSuccessMessage {
    pub r#type: EventType,
    pub room_id: String,
    pub roster: Vec<RoomMemberDto>,
    pub master_id: String,
}

/// Broadcast to the whole room when a member joins
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberJoinedMessage {
    pub r#type: EventType,
    pub roster: Vec<RoomMemberDto>,
    pub count: usize,
}

/// Broadcast when the master starts a round
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStartedMessage {
    pub r#type: EventType,
    pub question: String,
    pub timer: u8,
    pub attempts: u8,
}

/// Broadcast for every evaluated guess
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResultMessage {
    pub r#type: EventType,
    pub player_id: String,
    pub display_name: String,
    pub guess: String,
    pub correct: bool,
    pub attempts_left: u8,
}

/// Broadcast when a round resolves (win or timeout)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundEndedMessage {
    pub r#type: EventType,
    pub winner_id: Option<String>,
    pub winner_name: Option<String>,
    pub answer: String,
    pub scores: Vec<ScoreEntryDto>,
    pub timed_out: bool,
}

/// Broadcast every second while a round is running
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerTickMessage {
    pub r#type: EventType,
    pub timer: u8,
}

/// Broadcast when the room reopens for the next round
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextRoundMessage {
    pub r#type: EventType,
    pub master_id: String,
    pub master_name: String,
    pub roster: Vec<RoomMemberDto>,
    pub scores: Vec<ScoreEntryDto>,
    pub status: RoomStatus,
    pub timer: u8,
}

/// Broadcast to the remaining members when someone leaves
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberLeftMessage {
    pub r#type: EventType,
    pub player_id: String,
    pub roster: Vec<RoomMemberDto>,
    pub master_id: String,
    pub scores: Vec<ScoreEntryDto>,
}

/// Reply to getState, sent to the requester only
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStateMessage {
    pub r#type: EventType,
    pub snapshot: RoomSnapshotDto,
    pub master_name: Option<String>,
    pub winner_name: Option<String>,
    pub scores: Vec<ScoreEntryDto>,
}

/// Error reply, sent to the offending client only
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandErrorMessage {
    pub r#type: EventType,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_command_parses_create_room() {
        // テスト項目: createRoom コマンドを type タグで判別できる
        // given (前提条件):
        let json = r#"{"type":"createRoom","displayName":"alice"}"#;

        // when (操作):
        let cmd: ClientCommand = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert!(matches!(
            cmd,
            ClientCommand::CreateRoom {
                display_name: Some(name)
            } if name == "alice"
        ));
    }

    #[test]
    fn test_client_command_parses_submit_guess() {
        // テスト項目: submitGuess コマンドの camelCase フィールドを読める
        // given (前提条件):
        let json = r#"{"type":"submitGuess","roomId":"AB12CD","guess":"piano"}"#;

        // when (操作):
        let cmd: ClientCommand = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        match cmd {
            ClientCommand::SubmitGuess { room_id, guess } => {
                assert_eq!(room_id, "AB12CD");
                assert_eq!(guess, "piano");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_client_command_unknown_type_fails() {
        // テスト項目: 未知の type はパースエラーになる
        // given (前提条件):
        let json = r#"{"type":"hackTheGibson"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientCommand>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_event_serializes_with_camel_case_type() {
        // テスト項目: イベントの type とフィールドは camelCase で出力される
        // given (前提条件):
        let msg = TimerTickMessage {
            r#type: EventType::TimerTick,
            timer: 42,
        };

        // when (操作):
        let json = serde_json::to_string(&msg).unwrap();

        // then (期待する結果):
        assert_eq!(json, r#"{"type":"timerTick","timer":42}"#);
    }

    #[test]
    fn test_round_ended_serializes_status_fields() {
        // テスト項目: roundEnded は winnerId/timedOut を camelCase で含む
        // given (前提条件):
        let msg = RoundEndedMessage {
            r#type: EventType::RoundEnded,
            winner_id: None,
            winner_name: None,
            answer: "piano".to_string(),
            scores: vec![],
            timed_out: true,
        };

        // when (操作):
        let json = serde_json::to_string(&msg).unwrap();

        // then (期待する結果):
        assert!(json.contains(r#""type":"roundEnded""#));
        assert!(json.contains(r#""winnerId":null"#));
        assert!(json.contains(r#""timedOut":true"#));
    }

    #[test]
    fn test_room_status_serializes_kebab_case() {
        // テスト項目: ルーム状態は waiting / in-progress / ended で出力される
        // then (期待する結果):
        assert_eq!(
            serde_json::to_string(&RoomStatus::InProgress).unwrap(),
            r#""in-progress""#
        );
        assert_eq!(
            serde_json::to_string(&RoomStatus::Waiting).unwrap(),
            r#""waiting""#
        );
    }
}
