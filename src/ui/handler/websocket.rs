//! WebSocket connection handler — the event gateway.
//!
//! Translates inbound client commands into usecase calls and failures into
//! `commandError` events for the offending connection only. Broadcasts to
//! room members are emitted by the usecases through the registry channels;
//! this handler owns the per-connection pump between that channel and the
//! socket.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    common::time::get_jst_timestamp,
    domain::{DisplayName, GameError, Player, PlayerId, PlayerIdFactory, RoomCode, Timestamp},
    infrastructure::dto::websocket::{
        ClientCommand, CommandErrorMessage, ConnectedMessage, EventType, JoinSuccessMessage,
        RoomCreatedMessage, RoomMemberDto, RoomSnapshotDto, RoomStateMessage, ScoreEntryDto,
    },
    ui::state::AppState,
    usecase::{
        CreateRoomUseCase, DisconnectPlayerUseCase, GetRoomStateUseCase, JoinRoomUseCase,
        LeaveRoomUseCase, StartRoundUseCase, SubmitGuessUseCase,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // Every connection gets an ephemeral player identity and a default
    // display name derived from it.
    let player_id = PlayerIdFactory::generate();
    let display_name = Player::default_display_name(&player_id);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let connected_at = Timestamp::new(get_jst_timestamp());
    state
        .players
        .register(
            Player::new(player_id.clone(), display_name),
            tx.clone(),
            connected_at,
        )
        .await;
    tracing::info!("player '{}' connected", player_id);

    // Send the player their id immediately. Going through the registry
    // channel keeps this ordered with later broadcasts.
    let connected = ConnectedMessage {
        r#type: EventType::Connected,
        player_id: player_id.to_string(),
    };
    let _ = tx.send(serde_json::to_string(&connected).unwrap());

    let (mut sender, mut receiver) = socket.split();

    let recv_state = state.clone();
    let recv_player_id = player_id.clone();

    // Task receiving commands from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_command(&recv_state, &recv_player_id, &text).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("player '{}' requested close", recv_player_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Task forwarding events from the registry channel to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Disconnection runs the leave path for the player's current room, then
    // drops the registry record.
    let disconnect = DisconnectPlayerUseCase::new(
        state.rooms.clone(),
        state.players.clone(),
        state.lifecycle.clone(),
    );
    disconnect.execute(&player_id).await;
}

/// Parse and dispatch one inbound frame, reporting any failure to the
/// sender only.
async fn handle_command(state: &Arc<AppState>, player_id: &PlayerId, text: &str) {
    let command = match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!("unparseable command from '{}': {}", player_id, e);
            reply_error(state, player_id, "Unrecognized command").await;
            return;
        }
    };

    if let Err(e) = dispatch(state, player_id, command).await {
        tracing::debug!("command from '{}' rejected: {}", player_id, e);
        reply_error(state, player_id, &e.to_string()).await;
    }
}

async fn dispatch(
    state: &Arc<AppState>,
    player_id: &PlayerId,
    command: ClientCommand,
) -> Result<(), GameError> {
    match command {
        ClientCommand::CreateRoom { display_name } => {
            let name = parse_display_name(display_name);
            let snapshot = CreateRoomUseCase::new(state.rooms.clone(), state.players.clone())
                .execute(player_id, name)
                .await?;
            let msg = RoomCreatedMessage {
                r#type: EventType::RoomCreated,
                room_id: snapshot.code.to_string(),
                snapshot: RoomSnapshotDto::from(&snapshot),
            };
            reply(state, player_id, serde_json::to_string(&msg).unwrap()).await;
        }
        ClientCommand::JoinRoom {
            room_id,
            display_name,
        } => {
            let code = parse_room_code(&room_id)?;
            let name = parse_display_name(display_name);
            let snapshot = JoinRoomUseCase::new(state.rooms.clone(), state.players.clone())
                .execute(&code, player_id, name)
                .await?;
            let msg = JoinSuccessMessage {
                r#type: EventType::JoinSuccess,
                room_id: snapshot.code.to_string(),
                roster: snapshot.roster.iter().map(RoomMemberDto::from).collect(),
                master_id: snapshot.master_id.to_string(),
            };
            reply(state, player_id, serde_json::to_string(&msg).unwrap()).await;
        }
        ClientCommand::StartRound {
            room_id,
            question,
            answer,
        } => {
            let code = parse_room_code(&room_id)?;
            StartRoundUseCase::new(
                state.rooms.clone(),
                state.players.clone(),
                state.lifecycle.clone(),
            )
            .execute(&code, player_id, question, answer)
            .await?;
        }
        ClientCommand::SubmitGuess { room_id, guess } => {
            let code = parse_room_code(&room_id)?;
            SubmitGuessUseCase::new(
                state.rooms.clone(),
                state.players.clone(),
                state.lifecycle.clone(),
            )
            .execute(&code, player_id, guess)
            .await?;
        }
        ClientCommand::GetState { room_id } => {
            let code = parse_room_code(&room_id)?;
            let view = GetRoomStateUseCase::new(state.rooms.clone(), state.players.clone())
                .execute(&code)
                .await?;
            let msg = RoomStateMessage {
                r#type: EventType::RoomState,
                master_name: view.snapshot.master_name().map(|n| n.to_string()),
                winner_name: view.snapshot.winner_name().map(|n| n.to_string()),
                scores: view.scores.iter().map(ScoreEntryDto::from).collect(),
                snapshot: RoomSnapshotDto::from(&view.snapshot),
            };
            reply(state, player_id, serde_json::to_string(&msg).unwrap()).await;
        }
        ClientCommand::LeaveRoom { room_id } => {
            let code = parse_room_code(&room_id)?;
            LeaveRoomUseCase::new(
                state.rooms.clone(),
                state.players.clone(),
                state.lifecycle.clone(),
            )
            .execute(&code, player_id)
            .await?;
        }
    }
    Ok(())
}

/// A malformed code can never name a live room, so it is reported the same
/// way as a vanished one.
fn parse_room_code(room_id: &str) -> Result<RoomCode, GameError> {
    RoomCode::new(room_id.to_string()).map_err(|_| GameError::RoomNotFound(room_id.to_string()))
}

/// Invalid display names fall back to the default rather than failing the
/// command.
fn parse_display_name(raw: Option<String>) -> Option<DisplayName> {
    raw.and_then(|name| DisplayName::new(name).ok())
}

async fn reply(state: &Arc<AppState>, player_id: &PlayerId, payload: String) {
    if let Some(sender) = state.players.sender_for(player_id).await
        && sender.send(payload).is_err()
    {
        tracing::warn!("failed to send reply to player '{}'", player_id);
    }
}

async fn reply_error(state: &Arc<AppState>, player_id: &PlayerId, message: &str) {
    let msg = CommandErrorMessage {
        r#type: EventType::CommandError,
        message: message.to_string(),
    };
    reply(state, player_id, serde_json::to_string(&msg).unwrap()).await;
}
