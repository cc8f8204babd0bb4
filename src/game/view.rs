use std::collections::BTreeMap;

use serde::Serialize;

use crate::board::{Board, PortKind, TileId};
use crate::types::{ForcedAction, PlayerId};

use super::players::{DevelopmentCards, PlayerState};
use super::resources::ResourceBundle;
use super::state::{GamePhase, GameState};
use super::trade::{PendingTrade, TradeTerms};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicPlayerView {
    pub total_hand: u32,
    pub total_development_cards: u32,
    pub victory_points: u8,
    pub played_knights: u8,
    pub longest_road_length: u8,
    pub settlements: u8,
    pub cities: u8,
    pub roads: u8,
    pub ports: Vec<PortKind>,
    pub longest_road: bool,
    pub largest_army: bool,
    pub played_card_this_turn: bool,
    pub dice_rolled: bool,
    pub current_turn: bool,
}

impl From<&PlayerState> for PublicPlayerView {
    fn from(state: &PlayerState) -> Self {
        Self {
            total_hand: state.hand_size(),
            total_development_cards: state.development_cards.total(),
            victory_points: state.visible_victory_points(),
            played_knights: state.played_knights,
            longest_road_length: state.longest_road_length,
            settlements: state.settlements,
            cities: state.cities,
            roads: state.roads,
            ports: state.ports.clone(),
            longest_road: state.longest_road,
            largest_army: state.largest_army,
            played_card_this_turn: state.played_card_this_turn,
            dice_rolled: state.dice_rolled,
            current_turn: state.current_turn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrivatePlayerView {
    #[serde(flatten)]
    pub public: PublicPlayerView,
    pub hand: ResourceBundle,
    pub development_cards: DevelopmentCards,
    pub played_development_cards: DevelopmentCards,
    pub total_victory_points: u8,
}

impl From<&PlayerState> for PrivatePlayerView {
    fn from(state: &PlayerState) -> Self {
        Self {
            public: PublicPlayerView::from(state),
            hand: state.hand,
            development_cards: state.development_cards,
            played_development_cards: state.played_development_cards,
            total_victory_points: state.victory_points(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PlayerEntry {
    Private(PrivatePlayerView),
    Public(PublicPlayerView),
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub board: Board,
    pub players: BTreeMap<PlayerId, PlayerEntry>,
    pub bank: ResourceBundle,
    pub development_cards_remaining: usize,
    pub current_turn: Option<PlayerId>,
    pub current_roll: Option<u8>,
    pub dice: Option<(u8, u8)>,
    pub initial_placement_order: Option<PlayerId>,
    pub forced_action: Option<ForcedAction>,
    pub must_discard: u32,
    pub robber_candidates: Vec<PlayerId>,
    pub pending_robber_tile: Option<TileId>,
    pub pending_trade: Option<PendingTrade>,
    pub no_partner: Option<TradeTerms>,
    pub winner: Option<PlayerId>,
}

impl GameState {
    pub fn view_for(&self, viewer: PlayerId) -> PlayerView {
        let players = self
            .players
            .iter()
            .map(|(id, state)| {
                let entry = if *id == viewer {
                    PlayerEntry::Private(state.into())
                } else {
                    PlayerEntry::Public(state.into())
                };
                (*id, entry)
            })
            .collect();
        let must_discard = match self.forced_action {
            Some(ForcedAction::Discard) => self.pending_discard.get(&viewer).copied().unwrap_or(0),
            _ => 0,
        };
        PlayerView {
            board: self.board.clone(),
            players,
            bank: *self.bank.resources(),
            development_cards_remaining: self.bank.development_deck_len(),
            current_turn: self.current_turn,
            current_roll: self.last_roll.map(|(a, b)| a + b),
            dice: self.last_roll,
            initial_placement_order: self.placement_cursor(),
            forced_action: self.forced_action,
            must_discard,
            robber_candidates: self.robber_candidates.clone(),
            pending_robber_tile: self.pending_robber_tile,
            pending_trade: self.pending_trade.clone(),
            no_partner: self.no_partner.get(&viewer).copied(),
            winner: match self.phase {
                GamePhase::Completed { winner } => Some(winner),
                _ => None,
            },
        }
    }

    pub fn views(&mut self) -> BTreeMap<PlayerId, PlayerView> {
        let views: BTreeMap<PlayerId, PlayerView> = self
            .players
            .keys()
            .map(|id| (*id, self.view_for(*id)))
            .collect();
        self.no_partner.clear();
        views
    }
}
