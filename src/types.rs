use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub type PlayerId = u8;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];

    pub const fn index(self) -> usize {
        match self {
            Resource::Wood => 0,
            Resource::Brick => 1,
            Resource::Sheep => 2,
            Resource::Wheat => 3,
            Resource::Ore => 4,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DevelopmentCard {
    Knight,
    VictoryPoint,
    RoadBuilding,
    YearOfPlenty,
    Monopoly,
}

impl DevelopmentCard {
    pub const ALL: [DevelopmentCard; 5] = [
        DevelopmentCard::Knight,
        DevelopmentCard::VictoryPoint,
        DevelopmentCard::RoadBuilding,
        DevelopmentCard::YearOfPlenty,
        DevelopmentCard::Monopoly,
    ];

    pub const fn index(self) -> usize {
        match self {
            DevelopmentCard::Knight => 0,
            DevelopmentCard::VictoryPoint => 1,
            DevelopmentCard::RoadBuilding => 2,
            DevelopmentCard::YearOfPlenty => 3,
            DevelopmentCard::Monopoly => 4,
        }
    }

    pub const fn deck_count(self) -> usize {
        match self {
            DevelopmentCard::Knight => 14,
            DevelopmentCard::VictoryPoint => 5,
            DevelopmentCard::RoadBuilding => 2,
            DevelopmentCard::YearOfPlenty => 2,
            DevelopmentCard::Monopoly => 2,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BuildingKind {
    Settlement,
    City,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ForcedAction {
    #[serde(rename = "Discard")]
    #[strum(serialize = "Discard")]
    Discard,
    #[serde(rename = "Move Robber")]
    #[strum(serialize = "Move Robber")]
    MoveRobber,
    #[serde(rename = "Steal Resource")]
    #[strum(serialize = "Steal Resource")]
    StealResource,
    #[serde(rename = "Place Road 1")]
    #[strum(serialize = "Place Road 1")]
    PlaceRoad1,
    #[serde(rename = "Place Road 2")]
    #[strum(serialize = "Place Road 2")]
    PlaceRoad2,
    #[serde(rename = "Year of Plenty")]
    #[strum(serialize = "Year of Plenty")]
    YearOfPlenty,
    #[serde(rename = "Monopoly")]
    #[strum(serialize = "Monopoly")]
    Monopoly,
    #[serde(rename = "Trade Pending")]
    #[strum(serialize = "Trade Pending")]
    TradePending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionType {
    RollDice,
    EndTurn,
    PlaceSettlement,
    PlaceRoad,
    PlaceCity,
    BuyDevelopmentCard,
    DiscardResources,
    MoveRobber,
    RobberSteal,
    PlayKnightCard,
    PlayRoadBuildingCard,
    PlayYearOfPlentyCard,
    PlayMonopolyCard,
    YearOfPlenty,
    Monopoly,
    BankTrade,
    ProposeTrade,
    AcceptTrade,
    DeclineTrade,
    ConfirmTrade,
    EndTrade,
}

impl ActionType {
    pub fn resolves(self, forced: ForcedAction) -> bool {
        match forced {
            ForcedAction::Discard => self == ActionType::DiscardResources,
            ForcedAction::MoveRobber => self == ActionType::MoveRobber,
            ForcedAction::StealResource => self == ActionType::RobberSteal,
            ForcedAction::PlaceRoad1 | ForcedAction::PlaceRoad2 => self == ActionType::PlaceRoad,
            ForcedAction::YearOfPlenty => self == ActionType::YearOfPlenty,
            ForcedAction::Monopoly => self == ActionType::Monopoly,
            ForcedAction::TradePending => matches!(
                self,
                ActionType::AcceptTrade
                    | ActionType::DeclineTrade
                    | ActionType::ConfirmTrade
                    | ActionType::EndTrade
            ),
        }
    }

    pub fn is_out_of_turn(self) -> bool {
        matches!(
            self,
            ActionType::AcceptTrade | ActionType::DeclineTrade | ActionType::DiscardResources
        )
    }
}
