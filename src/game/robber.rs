use rand::Rng;

use crate::board::TileId;
use crate::types::{ActionType, ForcedAction, PlayerId, Resource};

use super::error::GameError;
use super::state::{GameEvent, GameState, StepOutcome};

impl GameState {
    pub(crate) fn move_robber(
        &mut self,
        player: PlayerId,
        tile: TileId,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        self.expect_forced(ForcedAction::MoveRobber, ActionType::MoveRobber)?;
        self.board.check_robber_target(tile)?;

        self.board.move_robber(tile);
        let mut candidates = self.board.players_on_tile(tile, player);
        candidates.retain(|id| self.players.contains_key(id));
        outcome.events.push(GameEvent::RobberMoved { player, tile });
        if candidates.is_empty() {
            self.robber_candidates.clear();
            self.pending_robber_tile = None;
            self.forced_action = None;
        } else {
            self.robber_candidates = candidates;
            self.pending_robber_tile = Some(tile);
            self.forced_action = Some(ForcedAction::StealResource);
        }
        Ok(())
    }

    pub(crate) fn steal(
        &mut self,
        player: PlayerId,
        victim: PlayerId,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        self.expect_forced(ForcedAction::StealResource, ActionType::RobberSteal)?;
        if !self.robber_candidates.contains(&victim) {
            return Err(GameError::NotARobberCandidate(victim));
        }
        let hand = self.player(victim)?.hand;

        let total = hand.total();
        if total > 0 {
            let mut pick = self.rng.gen_range(0..total);
            let mut taken: Option<Resource> = None;
            for (resource, amount) in hand.iter() {
                if pick < amount as u32 {
                    taken = Some(resource);
                    break;
                }
                pick -= amount as u32;
            }
            if let Some(resource) = taken {
                self.player_mut(victim)?.hand.subtract(resource, 1)?;
                self.player_mut(player)?.hand.add(resource, 1);
                outcome.events.push(GameEvent::ResourceStolen {
                    thief: player,
                    victim,
                });
            }
        }

        self.robber_candidates.clear();
        self.pending_robber_tile = None;
        self.forced_action = None;
        Ok(())
    }
}
