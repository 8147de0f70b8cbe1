//! Real-time multiplayer guessing game server library.
//!
//! One player creates a room and becomes game master, others join with a
//! six-character room code, the master posts a question/answer pair and the
//! server resolves timed guesses, scores and master rotation over WebSocket.

pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod logger;
pub mod ui;
pub mod usecase;

// Re-export entry point
pub use ui::run;
pub use ui::runner::ServerConfig;
