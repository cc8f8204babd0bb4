#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod board;
pub mod coords;
pub mod game;
pub mod server;
pub mod session;
pub mod types;

pub use board::{Board, Tile};
pub use game::{Action, Game, GameConfig, GameError, GameState};
pub use types::{DevelopmentCard, PlayerId, Resource};
