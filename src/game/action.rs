use serde::{Deserialize, Serialize};

use crate::board::{EdgeId, TileId, VertexId};
use crate::game::resources::ResourceBundle;
use crate::types::{ActionType, PlayerId, Resource};

/// A player's request, as received from the client: `{"type": ..., ...}`.
///
/// Each variant carries only the fields its kind needs; a message with a
/// missing or ill-typed field fails to deserialize and never reaches the
/// engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    RollDice,
    EndTurn,
    PlaceSettlement {
        vertex_id: VertexId,
    },
    PlaceRoad {
        edge_id: EdgeId,
    },
    PlaceCity {
        vertex_id: VertexId,
    },
    BuyDevelopmentCard,
    DiscardResources {
        resources: ResourceBundle,
    },
    MoveRobber {
        target_tile: TileId,
    },
    RobberSteal {
        victim_id: PlayerId,
    },
    PlayKnightCard,
    PlayRoadBuildingCard,
    PlayYearOfPlentyCard,
    PlayMonopolyCard,
    #[serde(rename = "Year of Plenty")]
    YearOfPlenty {
        resources: [Resource; 2],
    },
    #[serde(rename = "Monopoly")]
    Monopoly {
        resource: Resource,
    },
    BankTrade {
        offer: ResourceBundle,
        request: ResourceBundle,
    },
    ProposeTrade {
        offer: ResourceBundle,
        request: ResourceBundle,
    },
    AcceptTrade,
    DeclineTrade,
    ConfirmTrade {
        target: PlayerId,
    },
    EndTrade,
}

impl Action {
    pub fn kind(&self) -> ActionType {
        match self {
            Action::RollDice => ActionType::RollDice,
            Action::EndTurn => ActionType::EndTurn,
            Action::PlaceSettlement { .. } => ActionType::PlaceSettlement,
            Action::PlaceRoad { .. } => ActionType::PlaceRoad,
            Action::PlaceCity { .. } => ActionType::PlaceCity,
            Action::BuyDevelopmentCard => ActionType::BuyDevelopmentCard,
            Action::DiscardResources { .. } => ActionType::DiscardResources,
            Action::MoveRobber { .. } => ActionType::MoveRobber,
            Action::RobberSteal { .. } => ActionType::RobberSteal,
            Action::PlayKnightCard => ActionType::PlayKnightCard,
            Action::PlayRoadBuildingCard => ActionType::PlayRoadBuildingCard,
            Action::PlayYearOfPlentyCard => ActionType::PlayYearOfPlentyCard,
            Action::PlayMonopolyCard => ActionType::PlayMonopolyCard,
            Action::YearOfPlenty { .. } => ActionType::YearOfPlenty,
            Action::Monopoly { .. } => ActionType::Monopoly,
            Action::BankTrade { .. } => ActionType::BankTrade,
            Action::ProposeTrade { .. } => ActionType::ProposeTrade,
            Action::AcceptTrade => ActionType::AcceptTrade,
            Action::DeclineTrade => ActionType::DeclineTrade,
            Action::ConfirmTrade { .. } => ActionType::ConfirmTrade,
            Action::EndTrade => ActionType::EndTrade,
        }
    }
}
