pub mod action;
pub mod bank;
mod building;
mod dev_cards;
pub mod error;
pub mod game;
pub mod players;
mod production;
pub mod resources;
mod robber;
pub mod roads;
pub mod state;
pub mod trade;
pub mod view;

pub use action::Action;
pub use bank::Bank;
pub use error::{ErrorKind, GameError};
pub use game::{ActionOutcome, Game};
pub use players::{DevelopmentCards, PlayerState};
pub use resources::{
    COST_CITY, COST_DEVELOPMENT, COST_ROAD, COST_SETTLEMENT, ResourceBundle, ResourceError,
};
pub use state::{GameConfig, GameEvent, GamePhase, GameState, StepOutcome};
pub use trade::{PendingTrade, TradeTerms};
pub use view::{PlayerEntry, PlayerView, PrivatePlayerView, PublicPlayerView};
