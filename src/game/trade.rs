use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{ForcedAction, PlayerId};

use super::error::GameError;
use super::resources::ResourceBundle;
use super::state::{GameEvent, GameState, StepOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeTerms {
    pub offer: ResourceBundle,
    pub request: ResourceBundle,
}

/// The single open player-to-player proposal. Every other player sits in
/// exactly one of `awaiting`, `declined` or `accepted_by`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTrade {
    pub trader_id: PlayerId,
    pub offer: ResourceBundle,
    pub request: ResourceBundle,
    pub awaiting: BTreeSet<PlayerId>,
    pub declined: BTreeSet<PlayerId>,
    pub accepted_by: BTreeSet<PlayerId>,
    pub target: Option<PlayerId>,
}

impl PendingTrade {
    fn terms(&self) -> TradeTerms {
        TradeTerms {
            offer: self.offer,
            request: self.request,
        }
    }

    fn exhausted(&self) -> bool {
        self.awaiting.is_empty() && self.accepted_by.is_empty()
    }
}

fn check_terms(offer: &ResourceBundle, request: &ResourceBundle) -> Result<(), GameError> {
    if offer.is_empty() || request.is_empty() {
        return Err(GameError::EmptyTrade);
    }
    if offer.overlaps(request) {
        return Err(GameError::OverlappingTrade);
    }
    Ok(())
}

impl GameState {
    /// Trades with the bank at the player's best ratio per offered resource.
    /// Each offered amount must be a whole multiple of its ratio, and the
    /// request must total exactly the number of lots offered.
    pub(crate) fn bank_trade(
        &mut self,
        player: PlayerId,
        offer: &ResourceBundle,
        request: &ResourceBundle,
    ) -> Result<(), GameError> {
        self.ensure_can_act_after_roll(player)?;
        check_terms(offer, request)?;
        let mut lots = 0u32;
        for (resource, amount) in offer.iter().filter(|(_, amount)| *amount > 0) {
            let ratio = self.board.trade_ratio(player, resource);
            if amount % ratio != 0 {
                return Err(GameError::InvalidTradeRatio);
            }
            lots += (amount / ratio) as u32;
        }
        if lots != request.total() {
            return Err(GameError::InvalidTradeRatio);
        }
        let mut hand = self.player(player)?.hand;
        hand.subtract_bundle(offer)?;
        if let Some((resource, _)) = request
            .iter()
            .find(|(resource, amount)| self.bank.available(*resource) < *amount)
        {
            return Err(GameError::BankCannotCover(resource));
        }

        self.pay_cost(player, offer)?;
        self.bank.dispense(request)?;
        self.player_mut(player)?.add_resources(request);
        log::debug!("player {player} traded {offer} to the bank for {request}");
        Ok(())
    }

    pub(crate) fn propose_trade(
        &mut self,
        player: PlayerId,
        offer: &ResourceBundle,
        request: &ResourceBundle,
    ) -> Result<(), GameError> {
        self.ensure_can_act_after_roll(player)?;
        if self.pending_trade.is_some() {
            return Err(GameError::TradeAlreadyPending);
        }
        check_terms(offer, request)?;
        let mut hand = self.player(player)?.hand;
        hand.subtract_bundle(offer)?;
        let awaiting: BTreeSet<PlayerId> =
            self.players.keys().copied().filter(|id| *id != player).collect();
        if awaiting.is_empty() {
            return Err(GameError::NoTradePartners);
        }

        self.pending_trade = Some(PendingTrade {
            trader_id: player,
            offer: *offer,
            request: *request,
            awaiting,
            declined: BTreeSet::new(),
            accepted_by: BTreeSet::new(),
            target: None,
        });
        self.forced_action = Some(ForcedAction::TradePending);
        log::debug!("player {player} proposed {offer} for {request}");
        Ok(())
    }

    pub(crate) fn accept_trade(&mut self, player: PlayerId) -> Result<(), GameError> {
        let trade = self.pending_trade.as_ref().ok_or(GameError::NoPendingTrade)?;
        if trade.trader_id == player {
            return Err(GameError::TraderCannotRespond);
        }
        if !trade.awaiting.contains(&player) {
            return Err(GameError::NotAwaitingResponse(player));
        }
        let request = trade.request;
        let mut hand = self.player(player)?.hand;
        hand.subtract_bundle(&request)?;

        if let Some(trade) = self.pending_trade.as_mut() {
            trade.awaiting.remove(&player);
            trade.accepted_by.insert(player);
        }
        Ok(())
    }

    pub(crate) fn decline_trade(&mut self, player: PlayerId) -> Result<(), GameError> {
        let trade = self.pending_trade.as_mut().ok_or(GameError::NoPendingTrade)?;
        if trade.trader_id == player {
            return Err(GameError::TraderCannotRespond);
        }
        if !trade.awaiting.remove(&player) && !trade.accepted_by.remove(&player) {
            return Err(GameError::NotAwaitingResponse(player));
        }
        trade.declined.insert(player);
        if trade.exhausted() {
            let (trader, terms) = (trade.trader_id, trade.terms());
            self.no_partner.insert(trader, terms);
        }
        Ok(())
    }

    pub(crate) fn confirm_trade(
        &mut self,
        player: PlayerId,
        target: PlayerId,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        let trade = self.pending_trade.as_ref().ok_or(GameError::NoPendingTrade)?;
        if trade.trader_id != player {
            return Err(GameError::NotTheTrader(trade.trader_id));
        }
        if !trade.accepted_by.contains(&target) {
            return Err(GameError::PartnerNotAccepted(target));
        }
        let TradeTerms { offer, request } = trade.terms();
        let mut trader_hand = self.player(player)?.hand;
        trader_hand.subtract_bundle(&offer)?;
        let mut partner_hand = self.player(target)?.hand;
        partner_hand.subtract_bundle(&request)?;
        trader_hand.add_bundle(&request);
        partner_hand.add_bundle(&offer);

        self.player_mut(player)?.hand = trader_hand;
        self.player_mut(target)?.hand = partner_hand;
        self.close_trade();
        outcome.events.push(GameEvent::TradeCompleted {
            trader: player,
            partner: target,
        });
        Ok(())
    }

    pub(crate) fn end_trade(&mut self, player: PlayerId) -> Result<(), GameError> {
        let trade = self.pending_trade.as_ref().ok_or(GameError::NoPendingTrade)?;
        if trade.trader_id != player {
            return Err(GameError::NotTheTrader(trade.trader_id));
        }
        self.close_trade();
        Ok(())
    }

    fn close_trade(&mut self) {
        self.pending_trade = None;
        if self.forced_action == Some(ForcedAction::TradePending) {
            self.forced_action = None;
        }
    }

    pub(crate) fn withdraw_from_trade(&mut self, player: PlayerId) {
        let Some(trade) = self.pending_trade.as_mut() else {
            return;
        };
        if trade.trader_id == player {
            self.close_trade();
            return;
        }
        let was_responder = trade.awaiting.remove(&player) | trade.accepted_by.remove(&player);
        trade.declined.remove(&player);
        if was_responder && trade.exhausted() {
            let (trader, terms) = (trade.trader_id, trade.terms());
            self.no_partner.insert(trader, terms);
        }
    }
}
