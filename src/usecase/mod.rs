//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod create_room;
pub mod disconnect_player;
pub mod get_room_state;
pub mod join_room;
pub mod leave_room;
pub mod round_lifecycle;
pub mod start_round;
pub mod submit_guess;

pub use create_room::CreateRoomUseCase;
pub use disconnect_player::DisconnectPlayerUseCase;
pub use get_room_state::{GetRoomStateUseCase, RoomStateView};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use round_lifecycle::RoundLifecycle;
pub use start_round::StartRoundUseCase;
pub use submit_guess::SubmitGuessUseCase;
