use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::session::{GameId, Lobby, SessionError};
use crate::types::PlayerId;

#[derive(Clone)]
pub struct AppState {
    pub lobby: Arc<Lobby>,
    pub allowed_origins: Arc<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct JoinRequest {
    game_id: GameId,
}

#[derive(Debug, Serialize)]
struct SeatResponse {
    game_id: GameId,
    player_id: PlayerId,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = match self {
            SessionError::GameNotFound(_) | SessionError::UnknownSeat(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        let body = MessageResponse {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn create_game(State(state): State<AppState>) -> Json<SeatResponse> {
    let (game_id, player_id) = state.lobby.create().await;
    Json(SeatResponse { game_id, player_id })
}

async fn join_game(
    State(state): State<AppState>,
    Json(request): Json<JoinRequest>,
) -> Result<Json<SeatResponse>, SessionError> {
    let player_id = state.lobby.join(request.game_id).await?;
    Ok(Json(SeatResponse {
        game_id: request.game_id,
        player_id,
    }))
}

async fn start_game(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
) -> Result<Json<MessageResponse>, SessionError> {
    state.lobby.start(game_id).await?;
    Ok(Json(MessageResponse {
        message: "Game started".to_string(),
    }))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Path((game_id, player_id)): Path<(GameId, PlayerId)>,
    State(state): State<AppState>,
) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !state.allowed_origins.iter().any(|allowed| allowed == origin) {
        log::warn!("rejected socket for game {game_id} from origin {origin:?}");
        return StatusCode::FORBIDDEN.into_response();
    }
    ws.on_upgrade(move |socket| player_connection(socket, state, game_id, player_id))
}

async fn player_connection(socket: WebSocket, state: AppState, game_id: GameId, player_id: PlayerId) {
    let (mut sender, mut receiver) = socket.split();

    let mut outbound = match state.lobby.connect(game_id, player_id).await {
        Ok(outbound) => outbound,
        Err(err) => {
            log::info!("refused socket for game {game_id} seat {player_id}: {err}");
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };
    log::info!("player {player_id} connected to game {game_id}");

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            match serde_json::to_string(&message) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => log::error!("failed to serialize message: {e}"),
            }
        }
    });

    let lobby = state.lobby.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => {
                    if let Err(e) = lobby.handle_message(game_id, player_id, text.as_str()).await {
                        log::debug!("game {game_id} seat {player_id}: {e}");
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    log::info!("player {player_id} disconnected from game {game_id}");
    if let Err(e) = state.lobby.leave(game_id, player_id).await {
        log::debug!("cleanup for game {game_id}: {e}");
    }
}

pub fn router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(origins);

    Router::new()
        .route("/create", post(create_game))
        .route("/join", post(join_game))
        .route("/game/{game_id}/start", post(start_game))
        .route("/ws/{game_id}/{player_id}", get(ws_handler))
        .with_state(state)
        .layer(cors)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on {addr}");
    axum::serve(listener, router(state)).await
}
