use rand::Rng;

use crate::types::{ActionType, ForcedAction, PlayerId, Resource};

use super::error::GameError;
use super::resources::ResourceBundle;
use super::state::{GameEvent, GameState, StepOutcome};

pub const ROBBER_ROLL: u8 = 7;

impl GameState {
    pub(crate) fn roll(
        &mut self,
        player: PlayerId,
        dice: Option<(u8, u8)>,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        if self.player(player)?.dice_rolled {
            return Err(GameError::DiceAlreadyRolled);
        }
        let dice = match dice {
            Some(dice) => dice,
            None => (self.rng.gen_range(1..=6), self.rng.gen_range(1..=6)),
        };
        let sum = dice.0 + dice.1;
        self.last_roll = Some(dice);
        self.player_mut(player)?.dice_rolled = true;
        outcome.events.push(GameEvent::DiceRolled { player, dice });

        if sum == ROBBER_ROLL {
            self.begin_discard_phase();
        } else {
            self.distribute_resources(sum, outcome);
        }
        Ok(())
    }

    fn distribute_resources(&mut self, number: u8, outcome: &mut StepOutcome) {
        let mut demand: Vec<(PlayerId, ResourceBundle)> = Vec::new();
        for tile in self.board.producing_tiles(number) {
            let Some(resource) = tile.resource else {
                continue;
            };
            for building in self.board.buildings_on_tile(tile) {
                if !self.players.contains_key(&building.owner) {
                    continue;
                }
                let idx = match demand.iter().position(|(id, _)| *id == building.owner) {
                    Some(idx) => idx,
                    None => {
                        demand.push((building.owner, ResourceBundle::zero()));
                        demand.len() - 1
                    }
                };
                demand[idx].1.add(resource, building.yield_amount());
            }
        }

        let mut total = ResourceBundle::zero();
        for (_, bundle) in &demand {
            total.add_bundle(bundle);
        }
        // Nobody is paid a resource the bank cannot cover in full.
        let short: Vec<Resource> = total
            .iter()
            .filter(|(resource, amount)| *amount > self.bank.available(*resource))
            .map(|(resource, _)| resource)
            .collect();
        for resource in &short {
            log::debug!("bank short of {resource}, no {resource} produced");
            outcome
                .events
                .push(GameEvent::ProductionBlocked { resource: *resource });
        }

        for (player, mut bundle) in demand {
            for resource in &short {
                bundle.take_all(*resource);
            }
            if bundle.is_empty() || self.bank.dispense(&bundle).is_err() {
                continue;
            }
            if let Some(state) = self.players.get_mut(&player) {
                state.add_resources(&bundle);
            }
            outcome
                .events
                .push(GameEvent::ResourcesProduced { player, bundle });
        }
    }

    fn begin_discard_phase(&mut self) {
        self.pending_discard.clear();
        let limit = self.config.discard_limit as u32;
        for (id, state) in &self.players {
            let hand = state.hand_size();
            if hand > limit {
                self.pending_discard.insert(*id, hand / 2);
            }
        }
        self.forced_action = Some(if self.pending_discard.is_empty() {
            ForcedAction::MoveRobber
        } else {
            ForcedAction::Discard
        });
    }

    pub(crate) fn discard(
        &mut self,
        player: PlayerId,
        resources: &ResourceBundle,
    ) -> Result<(), GameError> {
        self.expect_forced(ForcedAction::Discard, ActionType::DiscardResources)?;
        let owed = match self.pending_discard.get(&player) {
            Some(owed) if *owed > 0 => *owed,
            _ => return Err(GameError::NothingToDiscard(player)),
        };
        let offered = resources.total();
        if offered != owed {
            return Err(GameError::WrongDiscardAmount { owed, offered });
        }
        self.pay_cost(player, resources)?;

        self.pending_discard.remove(&player);
        if self.pending_discard.is_empty() {
            self.forced_action = Some(ForcedAction::MoveRobber);
        }
        log::debug!("player {player} discarded {resources}");
        Ok(())
    }
}
