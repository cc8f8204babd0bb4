use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use hexrules::game::GameConfig;
use hexrules::server::{AppState, serve};
use hexrules::session::Lobby;

#[derive(Debug, Parser, Clone)]
#[command(name = "hexrules-server")]
#[command(about = "Authoritative game server: lobby over HTTP, play over WebSocket")]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Seed every game with this value for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    /// Victory points needed to win
    #[arg(long, default_value_t = 10)]
    vps_to_win: u8,

    /// Comma-separated origins allowed to connect
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://127.0.0.1:5173,http://localhost:5173"
    )]
    allowed_origins: Vec<String>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let addr: SocketAddr = match format!("{}:{}", args.host, args.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Error: invalid address {}:{}: {e}", args.host, args.port);
            std::process::exit(1);
        }
    };

    let config = GameConfig {
        seed: args.seed,
        vps_to_win: args.vps_to_win,
        ..GameConfig::default()
    };
    let state = AppState {
        lobby: Arc::new(Lobby::new(config)),
        allowed_origins: Arc::new(args.allowed_origins),
    };

    if let Err(e) = serve(addr, state).await {
        eprintln!("Error: server stopped: {e}");
        std::process::exit(1);
    }
}
