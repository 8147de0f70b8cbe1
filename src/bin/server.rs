//! Real-time guessing game server over WebSocket.
//!
//! Players create rooms with short join codes, the game master posts a
//! question/answer pair, and the server resolves timed guesses, scores and
//! master rotation.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin nazotoki-server -- --port 3001
//! ```

use clap::Parser;

use nazotoki_server::{logger::setup_logger, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "nazotoki-server", version, about)]
struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3001)]
    port: u16,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };

    // Run the server
    if let Err(e) = nazotoki_server::run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
