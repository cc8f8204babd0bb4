use serde::Serialize;
use strum::Display;

use crate::board::PlacementError;
use crate::game::resources::ResourceError;
use crate::types::{ActionType, DevelopmentCard, ForcedAction, PlayerId, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    WrongTurn,
    WrongPhase,
    InvalidTarget,
    InsufficientResources,
    InvalidTradeState,
    MalformedAction,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("game has not started")]
    GameNotStarted,
    #[error("game already started")]
    GameAlreadyStarted,
    #[error("game already completed")]
    GameFinished,
    #[error("a game needs 2 to 4 players, found {0}")]
    PlayerCount(usize),
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("player {0} is already seated")]
    DuplicatePlayer(PlayerId),
    #[error("player {actual} acted but player {expected} is to move")]
    NotYourTurn { expected: PlayerId, actual: PlayerId },
    #[error("{action} not allowed while {forced} is pending")]
    ForcedActionPending {
        forced: ForcedAction,
        action: ActionType,
    },
    #[error("expected {expected} during initial placement, got {actual}")]
    UnexpectedPlacementAction {
        expected: ActionType,
        actual: ActionType,
    },
    #[error("{0} is not expected now")]
    ActionNotExpected(ActionType),
    #[error("dice already rolled this turn")]
    DiceAlreadyRolled,
    #[error("roll the dice first")]
    DiceNotRolled,
    #[error("die value {0} out of range")]
    InvalidDie(u8),
    #[error("player {0} owes no discard")]
    NothingToDiscard(PlayerId),
    #[error("must discard exactly {owed} cards, offered {offered}")]
    WrongDiscardAmount { owed: u32, offered: u32 },
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error("player {0} cannot be robbed here")]
    NotARobberCandidate(PlayerId),
    #[error("no {0} pieces left")]
    NoPiecesLeft(&'static str),
    #[error(transparent)]
    InsufficientResources(#[from] ResourceError),
    #[error("bank cannot supply {0}")]
    BankCannotCover(Resource),
    #[error("development deck is empty")]
    DeckEmpty,
    #[error("{0} card cannot be played now")]
    CardNotPlayable(DevelopmentCard),
    #[error("trade must offer and request at least one card")]
    EmptyTrade,
    #[error("trade offers and requests the same resource")]
    OverlappingTrade,
    #[error("offer does not match the available trade ratios")]
    InvalidTradeRatio,
    #[error("a trade is already pending")]
    TradeAlreadyPending,
    #[error("no trade is pending")]
    NoPendingTrade,
    #[error("no other players to trade with")]
    NoTradePartners,
    #[error("only the proposing player {0} may do that")]
    NotTheTrader(PlayerId),
    #[error("the proposing player cannot answer their own trade")]
    TraderCannotRespond,
    #[error("player {0} is not awaiting this trade")]
    NotAwaitingResponse(PlayerId),
    #[error("player {0} has not accepted this trade")]
    PartnerNotAccepted(PlayerId),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        use GameError::*;
        match self {
            UnknownPlayer(_) | NotYourTurn { .. } => ErrorKind::WrongTurn,
            GameNotStarted
            | GameAlreadyStarted
            | GameFinished
            | PlayerCount(_)
            | DuplicatePlayer(_)
            | ForcedActionPending { .. }
            | UnexpectedPlacementAction { .. }
            | ActionNotExpected(_)
            | DiceAlreadyRolled
            | DiceNotRolled
            | NothingToDiscard(_)
            | CardNotPlayable(_) => ErrorKind::WrongPhase,
            Placement(_) | NotARobberCandidate(_) => ErrorKind::InvalidTarget,
            NoPiecesLeft(_) | InsufficientResources(_) | BankCannotCover(_) | DeckEmpty => {
                ErrorKind::InsufficientResources
            }
            TradeAlreadyPending
            | NoPendingTrade
            | NoTradePartners
            | NotTheTrader(_)
            | TraderCannotRespond
            | NotAwaitingResponse(_)
            | PartnerNotAccepted(_) => ErrorKind::InvalidTradeState,
            InvalidDie(_) | WrongDiscardAmount { .. } | EmptyTrade | OverlappingTrade
            | InvalidTradeRatio => ErrorKind::MalformedAction,
        }
    }
}
