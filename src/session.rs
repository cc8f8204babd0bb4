use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tokio::sync::{Mutex, mpsc};

use crate::game::{Action, ActionOutcome, ErrorKind, Game, GameConfig, GameError, PlayerView};
use crate::types::PlayerId;

pub type GameId = u16;

pub const MAX_SEATS: PlayerId = 4;
pub const MIN_SEATS: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Game not found")]
    GameNotFound(GameId),
    #[error("Game is full")]
    GameFull,
    #[error("Game has already started")]
    AlreadyStarted,
    #[error("Game has not started")]
    NotStarted,
    #[error("Not enough players to start the game")]
    NotEnoughPlayers,
    #[error("No seat {0} in this game")]
    UnknownSeat(PlayerId),
    #[error(transparent)]
    Engine(#[from] GameError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Notice {
    PlayerJoined {
        player_id: PlayerId,
    },
    GameStarted,
    ActionFailed {
        kind: ErrorKind,
        reason: String,
    },
    GameOver {
        #[serde(skip_serializing_if = "Option::is_none")]
        winner: Option<PlayerId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    PlayerDisconnected {
        player_id: PlayerId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "lobby_state")]
pub struct LobbyState {
    pub players: Vec<PlayerId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Notice(Notice),
    Lobby(LobbyState),
    State(Box<PlayerView>),
}

type Outbox = mpsc::UnboundedSender<ServerMessage>;

struct Session {
    seats: BTreeMap<PlayerId, Option<Outbox>>,
    game: Option<Game>,
    finished: bool,
}

impl Session {
    fn new() -> Self {
        Self {
            seats: BTreeMap::new(),
            game: None,
            finished: false,
        }
    }

    fn send(&self, player: PlayerId, message: ServerMessage) {
        if let Some(Some(outbox)) = self.seats.get(&player) {
            let _ = outbox.send(message);
        }
    }

    fn broadcast(&self, message: ServerMessage) {
        for outbox in self.seats.values().flatten() {
            let _ = outbox.send(message.clone());
        }
    }

    fn deliver(&self, views: BTreeMap<PlayerId, PlayerView>) {
        for (player, view) in views {
            self.send(player, ServerMessage::State(Box::new(view)));
        }
    }

    fn reject(&self, player: PlayerId, kind: ErrorKind, reason: String) {
        self.send(
            player,
            ServerMessage::Notice(Notice::ActionFailed { kind, reason }),
        );
    }
}

/// Registry of live sessions. Each session sits behind its own lock, so
/// actions within one game apply strictly one at a time while separate
/// games proceed independently.
pub struct Lobby {
    config: GameConfig,
    sessions: Mutex<HashMap<GameId, Arc<Mutex<Session>>>>,
}

impl Lobby {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    async fn session(&self, game_id: GameId) -> Result<Arc<Mutex<Session>>, SessionError> {
        self.sessions
            .lock()
            .await
            .get(&game_id)
            .cloned()
            .ok_or(SessionError::GameNotFound(game_id))
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn create(&self) -> (GameId, PlayerId) {
        let mut sessions = self.sessions.lock().await;
        let mut rng = rand::thread_rng();
        let mut game_id: GameId = rng.gen_range(1000..=9999);
        while sessions.contains_key(&game_id) {
            game_id = rng.gen_range(1000..=9999);
        }
        let mut session = Session::new();
        session.seats.insert(1, None);
        sessions.insert(game_id, Arc::new(Mutex::new(session)));
        log::info!("created game {game_id}");
        (game_id, 1)
    }

    pub async fn join(&self, game_id: GameId) -> Result<PlayerId, SessionError> {
        let session = self.session(game_id).await?;
        let mut session = session.lock().await;
        if session.game.is_some() {
            return Err(SessionError::AlreadyStarted);
        }
        let seat = (1..=MAX_SEATS)
            .find(|id| !session.seats.contains_key(id))
            .ok_or(SessionError::GameFull)?;
        session.seats.insert(seat, None);
        session.broadcast(ServerMessage::Notice(Notice::PlayerJoined { player_id: seat }));
        log::info!("player {seat} joined game {game_id}");
        Ok(seat)
    }

    pub async fn start(&self, game_id: GameId) -> Result<(), SessionError> {
        let session = self.session(game_id).await?;
        let mut session = session.lock().await;
        if session.game.is_some() {
            return Err(SessionError::AlreadyStarted);
        }
        if session.seats.len() < MIN_SEATS {
            return Err(SessionError::NotEnoughPlayers);
        }
        let mut game = Game::new(self.config.clone());
        for seat in session.seats.keys() {
            game.add_player(*seat)?;
        }
        let views = game.start_game()?;
        session.game = Some(game);
        session.broadcast(ServerMessage::Notice(Notice::GameStarted));
        session.deliver(views);
        Ok(())
    }

    pub async fn connect(
        &self,
        game_id: GameId,
        player: PlayerId,
    ) -> Result<mpsc::UnboundedReceiver<ServerMessage>, SessionError> {
        let session = self.session(game_id).await?;
        let mut session = session.lock().await;
        let Some(seat) = session.seats.get_mut(&player) else {
            return Err(SessionError::UnknownSeat(player));
        };
        let (outbox, inbox) = mpsc::unbounded_channel();
        *seat = Some(outbox);

        let players = session.seats.keys().copied().collect();
        session.send(player, ServerMessage::Lobby(LobbyState { players }));
        if let Some(game) = &session.game {
            session.send(player, ServerMessage::State(Box::new(game.view_for(player))));
        }
        Ok(inbox)
    }

    pub async fn handle_message(
        &self,
        game_id: GameId,
        player: PlayerId,
        text: &str,
    ) -> Result<(), SessionError> {
        match serde_json::from_str::<Action>(text) {
            Ok(action) => self.act(game_id, player, &action).await,
            Err(err) => {
                let session = self.session(game_id).await?;
                session
                    .lock()
                    .await
                    .reject(player, ErrorKind::MalformedAction, err.to_string());
                Ok(())
            }
        }
    }

    pub async fn act(
        &self,
        game_id: GameId,
        player: PlayerId,
        action: &Action,
    ) -> Result<(), SessionError> {
        let session = self.session(game_id).await?;
        let mut session = session.lock().await;
        let Some(game) = session.game.as_mut() else {
            session.reject(player, ErrorKind::WrongPhase, SessionError::NotStarted.to_string());
            return Ok(());
        };
        match game.call_action(player, action) {
            Ok(ActionOutcome::Updated(views)) => session.deliver(views),
            Ok(ActionOutcome::Won { winner }) => {
                session.finished = true;
                session.broadcast(ServerMessage::Notice(Notice::GameOver {
                    winner: Some(winner),
                    message: None,
                }));
            }
            Err(err) => session.reject(player, err.kind(), err.to_string()),
        }
        Ok(())
    }

    /// Releases a seat. Empty sessions are dropped; a started game that
    /// falls below two players ends.
    pub async fn leave(&self, game_id: GameId, player: PlayerId) -> Result<(), SessionError> {
        let handle = self.session(game_id).await?;
        let mut session = handle.lock().await;
        session.seats.remove(&player);
        log::info!("player {player} left game {game_id}");
        if session.seats.is_empty() {
            drop(session);
            self.drop_if_empty(game_id, &handle).await;
            return Ok(());
        }

        session.broadcast(ServerMessage::Notice(Notice::PlayerDisconnected { player_id: player }));
        let mut remaining = None;
        if let Some(game) = session.game.as_mut() {
            if game.state.players.contains_key(&player) {
                game.remove_player(player)?;
            }
            remaining = Some(game.player_count());
        }
        match remaining {
            Some(count) if count < MIN_SEATS && !session.finished => {
                session.finished = true;
                session.broadcast(ServerMessage::Notice(Notice::GameOver {
                    winner: None,
                    message: Some("Not enough players to continue the game".to_string()),
                }));
            }
            Some(_) if !session.finished => {
                if let Some(views) = session.game.as_mut().map(Game::views) {
                    session.deliver(views);
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn drop_if_empty(&self, game_id: GameId, handle: &Arc<Mutex<Session>>) {
        let mut sessions = self.sessions.lock().await;
        if !sessions.get(&game_id).is_some_and(|h| Arc::ptr_eq(h, handle)) {
            return;
        }
        // Held means a join or another leave is in flight.
        let idle = handle.try_lock().is_ok_and(|s| s.seats.is_empty());
        if idle {
            sessions.remove(&game_id);
            log::info!("dropped empty game {game_id}");
        }
    }
}
