use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::PortKind;
use crate::game::resources::{ResourceBundle, ResourceError};
use crate::types::{DevelopmentCard, PlayerId};

pub const MAX_ROADS: u8 = 15;
pub const MAX_SETTLEMENTS: u8 = 5;
pub const MAX_CITIES: u8 = 4;
pub const BADGE_POINTS: u8 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<DevelopmentCard, u8>",
    into = "BTreeMap<DevelopmentCard, u8>"
)]
pub struct DevelopmentCards {
    counts: [u8; DevelopmentCard::ALL.len()],
}

impl DevelopmentCards {
    pub fn get(&self, card: DevelopmentCard) -> u8 {
        self.counts[card.index()]
    }

    pub fn add(&mut self, card: DevelopmentCard) {
        self.counts[card.index()] += 1;
    }

    pub fn remove(&mut self, card: DevelopmentCard) -> bool {
        let slot = &mut self.counts[card.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| c as u32).sum()
    }
}

impl From<BTreeMap<DevelopmentCard, u8>> for DevelopmentCards {
    fn from(map: BTreeMap<DevelopmentCard, u8>) -> Self {
        let mut cards = DevelopmentCards::default();
        for (card, count) in map {
            cards.counts[card.index()] = count;
        }
        cards
    }
}

impl From<DevelopmentCards> for BTreeMap<DevelopmentCard, u8> {
    fn from(cards: DevelopmentCards) -> Self {
        DevelopmentCard::ALL
            .into_iter()
            .map(|card| (card, cards.get(card)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub hand: ResourceBundle,
    pub development_cards: DevelopmentCards,
    pub played_development_cards: DevelopmentCards,
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

impl PlayerState {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            hand: ResourceBundle::zero(),
            development_cards: DevelopmentCards::default(),
            played_development_cards: DevelopmentCards::default(),
            played_knights: 0,
            longest_road_length: 0,
            settlements: MAX_SETTLEMENTS,
            cities: MAX_CITIES,
            roads: MAX_ROADS,
            ports: Vec::new(),
            longest_road: false,
            largest_army: false,
            played_card_this_turn: false,
            dice_rolled: false,
            current_turn: false,
        }
    }

    pub fn reset_for_new_turn(&mut self) {
        self.dice_rolled = false;
        self.played_card_this_turn = false;
        self.current_turn = false;
    }

    pub fn add_resources(&mut self, bundle: &ResourceBundle) {
        self.hand.add_bundle(bundle);
    }

    pub fn remove_resources(&mut self, bundle: &ResourceBundle) -> Result<(), ResourceError> {
        self.hand.subtract_bundle(bundle)
    }

    pub fn hand_size(&self) -> u32 {
        self.hand.total()
    }

    pub fn can_play(&self, card: DevelopmentCard, bought_this_turn: u8) -> bool {
        !self.played_card_this_turn
            && self.development_cards.get(card).saturating_sub(bought_this_turn) > 0
    }

    pub fn record_play(&mut self, card: DevelopmentCard) {
        if self.development_cards.remove(card) {
            self.played_development_cards.add(card);
        }
        if card == DevelopmentCard::Knight {
            self.played_knights += 1;
        }
        self.played_card_this_turn = true;
    }

    pub fn development_cards_owned(&self) -> u32 {
        self.development_cards.total() + self.played_development_cards.total()
    }

    pub fn settlements_built(&self) -> u8 {
        MAX_SETTLEMENTS - self.settlements
    }

    pub fn cities_built(&self) -> u8 {
        MAX_CITIES - self.cities
    }

    pub fn roads_built(&self) -> u8 {
        MAX_ROADS - self.roads
    }

    pub fn victory_points(&self) -> u8 {
        self.visible_victory_points() + self.development_cards.get(DevelopmentCard::VictoryPoint)
    }

    pub fn visible_victory_points(&self) -> u8 {
        self.settlements_built() + self.cities_built() * 2 + self.bonus_points()
    }

    pub fn bonus_points(&self) -> u8 {
        let mut bonus = 0;
        if self.longest_road {
            bonus += BADGE_POINTS;
        }
        if self.largest_army {
            bonus += BADGE_POINTS;
        }
        bonus
    }
}
