use crate::board::{EdgeId, VertexId};
use crate::types::{ForcedAction, PlayerId};

use super::error::GameError;
use super::resources::{COST_CITY, COST_ROAD, COST_SETTLEMENT};
use super::state::GameState;

impl GameState {
    pub(crate) fn build_settlement(
        &mut self,
        player: PlayerId,
        vertex: VertexId,
    ) -> Result<(), GameError> {
        self.ensure_can_act_after_roll(player)?;
        if self.player(player)?.settlements == 0 {
            return Err(GameError::NoPiecesLeft("settlement"));
        }
        self.board.check_settlement(vertex, player, true)?;
        self.pay_cost(player, &COST_SETTLEMENT)?;

        self.board.place_settlement(vertex, player);
        let ports = self.board.ports_of(player);
        let state = self.player_mut(player)?;
        state.settlements -= 1;
        state.ports = ports;
        log::debug!("player {player} built a settlement on vertex {vertex}");
        Ok(())
    }

    pub(crate) fn build_city(&mut self, player: PlayerId, vertex: VertexId) -> Result<(), GameError> {
        self.ensure_can_act_after_roll(player)?;
        if self.player(player)?.cities == 0 {
            return Err(GameError::NoPiecesLeft("city"));
        }
        self.board.check_city(vertex, player)?;
        self.pay_cost(player, &COST_CITY)?;

        self.board.place_city(vertex, player);
        let state = self.player_mut(player)?;
        state.cities -= 1;
        state.settlements += 1;
        log::debug!("player {player} upgraded vertex {vertex} to a city");
        Ok(())
    }

    pub(crate) fn build_road(&mut self, player: PlayerId, edge: EdgeId) -> Result<(), GameError> {
        self.ensure_can_act_after_roll(player)?;
        if self.player(player)?.roads == 0 {
            return Err(GameError::NoPiecesLeft("road"));
        }
        self.board.check_road(edge, player, None)?;
        self.pay_cost(player, &COST_ROAD)?;

        self.board.place_road(edge, player);
        self.player_mut(player)?.roads -= 1;
        Ok(())
    }

    pub(crate) fn place_free_road(&mut self, player: PlayerId, edge: EdgeId) -> Result<(), GameError> {
        let forced = self.forced_action;
        if self.player(player)?.roads == 0 {
            return Err(GameError::NoPiecesLeft("road"));
        }
        self.board.check_road(edge, player, None)?;

        self.board.place_road(edge, player);
        let state = self.player_mut(player)?;
        state.roads -= 1;
        let roads_left = state.roads;
        self.forced_action = match forced {
            Some(ForcedAction::PlaceRoad1) if roads_left > 0 => Some(ForcedAction::PlaceRoad2),
            _ => None,
        };
        Ok(())
    }
}
