use std::collections::VecDeque;

use rand::seq::SliceRandom;
use serde::Serialize;

use crate::game::resources::{ResourceBundle, ResourceError};
use crate::types::{DevelopmentCard, Resource};

pub const DEVELOPMENT_DECK_SIZE: usize = 25;

#[derive(Debug, Clone, Serialize)]
pub struct Bank {
    resources: ResourceBundle,
    #[serde(skip)]
    development_deck: VecDeque<DevelopmentCard>,
}

impl Bank {
    pub fn standard(supply: u8, rng: &mut impl rand::Rng) -> Self {
        let mut deck = build_development_deck();
        deck.shuffle(rng);
        Self {
            resources: ResourceBundle::from_counts([supply; Resource::ALL.len()]),
            development_deck: deck.into(),
        }
    }

    pub fn resources(&self) -> &ResourceBundle {
        &self.resources
    }

    pub fn receive(&mut self, bundle: &ResourceBundle) {
        self.resources.add_bundle(bundle);
    }

    pub fn dispense(&mut self, bundle: &ResourceBundle) -> Result<(), ResourceError> {
        self.resources.subtract_bundle(bundle)
    }

    pub fn available(&self, resource: Resource) -> u8 {
        self.resources.get(resource)
    }

    pub fn draw_development_card(&mut self) -> Option<DevelopmentCard> {
        self.development_deck.pop_front()
    }

    pub fn development_deck_len(&self) -> usize {
        self.development_deck.len()
    }
}

fn build_development_deck() -> Vec<DevelopmentCard> {
    let mut deck = Vec::with_capacity(DEVELOPMENT_DECK_SIZE);
    for card in DevelopmentCard::ALL {
        deck.extend(std::iter::repeat(card).take(card.deck_count()));
    }
    deck
}
