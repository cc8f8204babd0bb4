use std::collections::BTreeMap;

use uuid::Uuid;

use crate::board::Board;
use crate::game::action::Action;
use crate::game::error::GameError;
use crate::game::state::{GameConfig, GameEvent, GameState, StepOutcome};
use crate::game::view::PlayerView;
use crate::types::PlayerId;

#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Updated(BTreeMap<PlayerId, PlayerView>),
    Won { winner: PlayerId },
}

pub struct Game {
    pub id: Uuid,
    pub state: GameState,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: GameState::new(config),
        }
    }

    pub fn with_board(config: GameConfig, board: Board) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: GameState::with_board(config, board),
        }
    }

    pub fn add_player(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.state.add_player(player)
    }

    pub fn remove_player(&mut self, player: PlayerId) -> Result<(), GameError> {
        let started = self.state.current_turn.is_some();
        self.state.remove_player(player)?;
        if started {
            log::warn!(
                "game {}: player {player} removed, {} remain",
                self.id,
                self.state.players.len()
            );
        }
        Ok(())
    }

    pub fn start_game(&mut self) -> Result<BTreeMap<PlayerId, PlayerView>, GameError> {
        let first = self.state.start()?;
        log::info!(
            "game {}: started with {} players, player {first} places first",
            self.id,
            self.state.players.len()
        );
        Ok(self.state.views())
    }

    pub fn call_action(
        &mut self,
        player: PlayerId,
        action: &Action,
    ) -> Result<ActionOutcome, GameError> {
        match self.state.step(player, action) {
            Ok(outcome) => Ok(self.finish(player, action, outcome)),
            Err(err) => {
                log::debug!("game {}: player {player} {:?} rejected: {err}", self.id, action.kind());
                Err(err)
            }
        }
    }

    pub fn call_roll(
        &mut self,
        player: PlayerId,
        dice: (u8, u8),
    ) -> Result<ActionOutcome, GameError> {
        let outcome = self.state.apply_roll(player, dice)?;
        Ok(self.finish(player, &Action::RollDice, outcome))
    }

    fn finish(&mut self, player: PlayerId, action: &Action, outcome: StepOutcome) -> ActionOutcome {
        log::debug!("game {}: player {player} {:?} accepted", self.id, action.kind());
        self.log_events(&outcome.events);
        match outcome.winner {
            Some(winner) => ActionOutcome::Won { winner },
            None => ActionOutcome::Updated(self.state.views()),
        }
    }

    fn log_events(&self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::TurnAdvanced { next_player } => {
                    log::info!("game {}: turn passes to player {next_player}", self.id)
                }
                GameEvent::LongestRoadChanged { holder } => {
                    log::info!("game {}: longest road now held by {holder:?}", self.id)
                }
                GameEvent::LargestArmyChanged { holder } => {
                    log::info!("game {}: largest army now held by {holder:?}", self.id)
                }
                GameEvent::GameWon { winner } => {
                    log::info!("game {}: player {winner} wins", self.id)
                }
                other => log::debug!("game {}: {other:?}", self.id),
            }
        }
    }

    pub fn views(&mut self) -> BTreeMap<PlayerId, PlayerView> {
        self.state.views()
    }

    pub fn view_for(&self, player: PlayerId) -> PlayerView {
        self.state.view_for(player)
    }

    pub fn player_count(&self) -> usize {
        self.state.players.len()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.state.winner()
    }
}
