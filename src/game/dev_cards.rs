use crate::types::{ActionType, DevelopmentCard, ForcedAction, PlayerId, Resource};

use super::error::GameError;
use super::resources::{COST_DEVELOPMENT, ResourceBundle};
use super::state::{GameEvent, GameState, StepOutcome};

impl GameState {
    pub(crate) fn buy_development_card(
        &mut self,
        player: PlayerId,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        self.ensure_can_act_after_roll(player)?;
        if self.bank.development_deck_len() == 0 {
            return Err(GameError::DeckEmpty);
        }
        self.pay_cost(player, &COST_DEVELOPMENT)?;

        let Some(card) = self.bank.draw_development_card() else {
            return Err(GameError::DeckEmpty);
        };
        self.player_mut(player)?.development_cards.add(card);
        self.cards_bought_this_turn.add(card);
        outcome
            .events
            .push(GameEvent::DevelopmentCardBought { player });
        Ok(())
    }

    fn ensure_playable(&self, player: PlayerId, card: DevelopmentCard) -> Result<(), GameError> {
        let bought = self.cards_bought_this_turn.get(card);
        if !self.player(player)?.can_play(card, bought) {
            return Err(GameError::CardNotPlayable(card));
        }
        Ok(())
    }

    fn play_card(
        &mut self,
        player: PlayerId,
        card: DevelopmentCard,
        then: ForcedAction,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        self.player_mut(player)?.record_play(card);
        self.forced_action = Some(then);
        outcome
            .events
            .push(GameEvent::DevelopmentCardPlayed { player, card });
        log::debug!("player {player} played {card}");
        Ok(())
    }

    pub(crate) fn play_knight(
        &mut self,
        player: PlayerId,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        self.ensure_playable(player, DevelopmentCard::Knight)?;
        self.play_card(
            player,
            DevelopmentCard::Knight,
            ForcedAction::MoveRobber,
            outcome,
        )
    }

    pub(crate) fn play_road_building(
        &mut self,
        player: PlayerId,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        self.ensure_playable(player, DevelopmentCard::RoadBuilding)?;
        if self.player(player)?.roads == 0 {
            return Err(GameError::NoPiecesLeft("road"));
        }
        self.play_card(
            player,
            DevelopmentCard::RoadBuilding,
            ForcedAction::PlaceRoad1,
            outcome,
        )
    }

    pub(crate) fn play_year_of_plenty(
        &mut self,
        player: PlayerId,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        self.ensure_playable(player, DevelopmentCard::YearOfPlenty)?;
        self.play_card(
            player,
            DevelopmentCard::YearOfPlenty,
            ForcedAction::YearOfPlenty,
            outcome,
        )
    }

    pub(crate) fn play_monopoly(
        &mut self,
        player: PlayerId,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        self.ensure_playable(player, DevelopmentCard::Monopoly)?;
        self.play_card(
            player,
            DevelopmentCard::Monopoly,
            ForcedAction::Monopoly,
            outcome,
        )
    }

    pub(crate) fn take_year_of_plenty(
        &mut self,
        player: PlayerId,
        resources: [Resource; 2],
    ) -> Result<(), GameError> {
        self.expect_forced(ForcedAction::YearOfPlenty, ActionType::YearOfPlenty)?;
        let mut bundle = ResourceBundle::zero();
        for resource in resources {
            bundle.add(resource, 1);
        }
        if let Some(short) = resources
            .into_iter()
            .find(|r| self.bank.available(*r) < bundle.get(*r))
        {
            return Err(GameError::BankCannotCover(short));
        }
        self.bank.dispense(&bundle)?;
        self.player_mut(player)?.add_resources(&bundle);
        self.forced_action = None;
        Ok(())
    }

    pub(crate) fn take_monopoly(&mut self, player: PlayerId, resource: Resource) -> Result<(), GameError> {
        self.expect_forced(ForcedAction::Monopoly, ActionType::Monopoly)?;
        let mut collected = 0u8;
        for (id, state) in self.players.iter_mut() {
            if *id != player {
                collected = collected.saturating_add(state.hand.take_all(resource));
            }
        }
        self.player_mut(player)?.hand.add(resource, collected);
        self.forced_action = None;
        log::debug!("player {player} collected {collected} {resource} by monopoly");
        Ok(())
    }
}
