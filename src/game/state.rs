use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::board::{Board, TileId, VertexId};
use crate::types::{ActionType, DevelopmentCard, ForcedAction, PlayerId, Resource};

use super::{
    action::Action,
    bank::Bank,
    error::GameError,
    players::{DevelopmentCards, PlayerState},
    resources::ResourceBundle,
    roads::{LARGEST_ARMY_MIN, LONGEST_ROAD_MIN, award_badge, longest_road},
    trade::{PendingTrade, TradeTerms},
};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub seed: Option<u64>,
    pub vps_to_win: u8,
    pub discard_limit: u8,
    pub bank_supply: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            vps_to_win: 10,
            discard_limit: 7,
            bank_supply: 19,
        }
    }
}

#[derive(Debug, Clone)]
pub enum GamePhase {
    Lobby,
    InitialPlacement(PlacementOrder),
    Playing,
    Completed { winner: PlayerId },
}

#[derive(Debug, Clone)]
pub struct PlacementOrder {
    steps: Vec<PlayerId>,
    counter: usize,
    last_vertex: Option<VertexId>,
}

impl PlacementOrder {
    fn new(rotation: &[PlayerId]) -> Self {
        let snake = rotation.iter().chain(rotation.iter().rev());
        let steps = snake.flat_map(|id| [*id, *id]).collect();
        Self {
            steps,
            counter: 0,
            last_vertex: None,
        }
    }

    pub fn expected(&self) -> Option<PlayerId> {
        self.steps.get(self.counter).copied()
    }

    fn is_settlement_step(&self) -> bool {
        self.counter % 2 == 0
    }

    fn is_second_round(&self) -> bool {
        self.counter >= self.steps.len() / 2
    }

    fn advance(&mut self) {
        if self.counter < self.steps.len() {
            self.counter += 1;
        }
    }

    fn is_complete(&self) -> bool {
        self.counter >= self.steps.len()
    }

    fn remove_player(&mut self, player: PlayerId) {
        let before = self.steps[..self.counter.min(self.steps.len())]
            .iter()
            .filter(|id| **id == player)
            .count();
        if self.counter % 2 == 1 && self.steps.get(self.counter) == Some(&player) {
            self.last_vertex = None;
        }
        self.steps.retain(|id| *id != player);
        self.counter -= before;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    DiceRolled {
        player: PlayerId,
        dice: (u8, u8),
    },
    ResourcesProduced {
        player: PlayerId,
        bundle: ResourceBundle,
    },
    ProductionBlocked {
        resource: Resource,
    },
    RobberMoved {
        player: PlayerId,
        tile: TileId,
    },
    ResourceStolen {
        thief: PlayerId,
        victim: PlayerId,
    },
    DevelopmentCardBought {
        player: PlayerId,
    },
    DevelopmentCardPlayed {
        player: PlayerId,
        card: DevelopmentCard,
    },
    TradeCompleted {
        trader: PlayerId,
        partner: PlayerId,
    },
    LongestRoadChanged {
        holder: Option<PlayerId>,
    },
    LargestArmyChanged {
        holder: Option<PlayerId>,
    },
    TurnAdvanced {
        next_player: PlayerId,
    },
    GameWon {
        winner: PlayerId,
    },
}

#[derive(Debug, Clone, Default)]
pub struct StepOutcome {
    pub events: Vec<GameEvent>,
    pub winner: Option<PlayerId>,
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub board: Board,
    pub bank: Bank,
    pub players: BTreeMap<PlayerId, PlayerState>,
    pub phase: GamePhase,
    pub current_turn: Option<PlayerId>,
    pub last_roll: Option<(u8, u8)>,
    pub forced_action: Option<ForcedAction>,
    pub pending_discard: BTreeMap<PlayerId, u32>,
    pub robber_candidates: Vec<PlayerId>,
    pub pending_robber_tile: Option<TileId>,
    pub cards_bought_this_turn: DevelopmentCards,
    pub pending_trade: Option<PendingTrade>,
    pub no_partner: BTreeMap<PlayerId, TradeTerms>,
    pub(crate) rng: StdRng,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let board = Board::standard(&mut rng);
        Self::assemble(config, board, rng)
    }

    pub fn with_board(config: GameConfig, board: Board) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::assemble(config, board, rng)
    }

    fn assemble(config: GameConfig, board: Board, mut rng: StdRng) -> Self {
        let bank = Bank::standard(config.bank_supply, &mut rng);
        Self {
            config,
            board,
            bank,
            players: BTreeMap::new(),
            phase: GamePhase::Lobby,
            current_turn: None,
            last_roll: None,
            forced_action: None,
            pending_discard: BTreeMap::new(),
            robber_candidates: Vec::new(),
            pending_robber_tile: None,
            cards_bought_this_turn: DevelopmentCards::default(),
            pending_trade: None,
            no_partner: BTreeMap::new(),
            rng,
        }
    }

    pub fn add_player(&mut self, player: PlayerId) -> Result<(), GameError> {
        if !matches!(self.phase, GamePhase::Lobby) {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.contains_key(&player) {
            return Err(GameError::DuplicatePlayer(player));
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::PlayerCount(self.players.len() + 1));
        }
        self.players.insert(player, PlayerState::new(player));
        Ok(())
    }

    pub fn start(&mut self) -> Result<PlayerId, GameError> {
        if !matches!(self.phase, GamePhase::Lobby) {
            return Err(GameError::GameAlreadyStarted);
        }
        let count = self.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(GameError::PlayerCount(count));
        }
        let seats: Vec<PlayerId> = self.players.keys().copied().collect();
        let first = *seats
            .choose(&mut self.rng)
            .ok_or(GameError::PlayerCount(count))?;
        let offset = seats.iter().position(|id| *id == first).unwrap_or(0);
        let mut rotation = seats;
        rotation.rotate_left(offset);

        self.phase = GamePhase::InitialPlacement(PlacementOrder::new(&rotation));
        self.current_turn = Some(first);
        if let Some(state) = self.players.get_mut(&first) {
            state.current_turn = true;
        }
        Ok(first)
    }

    pub fn step(&mut self, player: PlayerId, action: &Action) -> Result<StepOutcome, GameError> {
        self.process(player, action, None)
    }

    pub fn apply_roll(&mut self, player: PlayerId, dice: (u8, u8)) -> Result<StepOutcome, GameError> {
        for die in [dice.0, dice.1] {
            if !(1..=6).contains(&die) {
                return Err(GameError::InvalidDie(die));
            }
        }
        self.process(player, &Action::RollDice, Some(dice))
    }

    fn process(
        &mut self,
        player: PlayerId,
        action: &Action,
        dice: Option<(u8, u8)>,
    ) -> Result<StepOutcome, GameError> {
        match self.phase {
            GamePhase::Lobby => return Err(GameError::GameNotStarted),
            GamePhase::Completed { .. } => return Err(GameError::GameFinished),
            _ => {}
        }
        if !self.players.contains_key(&player) {
            return Err(GameError::UnknownPlayer(player));
        }

        let mut outcome = StepOutcome::default();
        if matches!(self.phase, GamePhase::InitialPlacement(_)) {
            self.handle_placement_action(player, action, &mut outcome)?;
        } else {
            self.handle_play_action(player, action, dice, &mut outcome)?;
        }

        self.update_awards(&mut outcome);
        self.check_victory(player, &mut outcome);
        Ok(outcome)
    }

    pub fn placement_cursor(&self) -> Option<PlayerId> {
        match &self.phase {
            GamePhase::InitialPlacement(order) => order.expected(),
            _ => None,
        }
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            GamePhase::Completed { winner } => Some(winner),
            _ => None,
        }
    }

    fn handle_placement_action(
        &mut self,
        player: PlayerId,
        action: &Action,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        let GamePhase::InitialPlacement(order) = &self.phase else {
            return Err(GameError::ActionNotExpected(action.kind()));
        };
        let expected = order
            .expected()
            .ok_or(GameError::ActionNotExpected(action.kind()))?;
        if player != expected {
            return Err(GameError::NotYourTurn {
                expected,
                actual: player,
            });
        }
        let settlement_step = order.is_settlement_step();
        let second_round = order.is_second_round();
        let anchor = order.last_vertex;

        let last_vertex = match (settlement_step, action) {
            (true, Action::PlaceSettlement { vertex_id }) => {
                self.board.check_settlement(*vertex_id, player, false)?;
                self.board.place_settlement(*vertex_id, player);
                let ports = self.board.ports_of(player);
                let state = self.player_mut(player)?;
                state.settlements -= 1;
                state.ports = ports;
                if second_round {
                    self.grant_starting_resources(player, *vertex_id, outcome);
                }
                Some(*vertex_id)
            }
            (false, Action::PlaceRoad { edge_id }) => {
                let anchor = anchor.ok_or(GameError::ActionNotExpected(ActionType::PlaceRoad))?;
                self.board.check_road(*edge_id, player, Some(anchor))?;
                self.board.place_road(*edge_id, player);
                self.player_mut(player)?.roads -= 1;
                None
            }
            (true, other) => {
                return Err(GameError::UnexpectedPlacementAction {
                    expected: ActionType::PlaceSettlement,
                    actual: other.kind(),
                });
            }
            (false, other) => {
                return Err(GameError::UnexpectedPlacementAction {
                    expected: ActionType::PlaceRoad,
                    actual: other.kind(),
                });
            }
        };

        let mut complete = false;
        if let GamePhase::InitialPlacement(order) = &mut self.phase {
            order.last_vertex = last_vertex;
            order.advance();
            complete = order.is_complete();
        }
        if complete {
            self.phase = GamePhase::Playing;
            log::info!("initial placement complete, player {:?} to roll", self.current_turn);
        }
        Ok(())
    }

    fn grant_starting_resources(
        &mut self,
        player: PlayerId,
        vertex: VertexId,
        outcome: &mut StepOutcome,
    ) {
        let mut bundle = ResourceBundle::zero();
        for tile in self.board.tiles_of_vertex(vertex) {
            if let Some(resource) = self.board.tiles[*tile as usize].resource {
                if self.bank.available(resource) > bundle.get(resource) {
                    bundle.add(resource, 1);
                }
            }
        }
        if bundle.is_empty() || self.bank.dispense(&bundle).is_err() {
            return;
        }
        if let Some(state) = self.players.get_mut(&player) {
            state.add_resources(&bundle);
        }
        outcome
            .events
            .push(GameEvent::ResourcesProduced { player, bundle });
    }

    fn handle_play_action(
        &mut self,
        player: PlayerId,
        action: &Action,
        dice: Option<(u8, u8)>,
        outcome: &mut StepOutcome,
    ) -> Result<(), GameError> {
        let kind = action.kind();
        let current = self.current_turn.ok_or(GameError::GameNotStarted)?;
        if player != current && !kind.is_out_of_turn() {
            return Err(GameError::NotYourTurn {
                expected: current,
                actual: player,
            });
        }
        if kind == ActionType::ProposeTrade && self.pending_trade.is_some() {
            return Err(GameError::TradeAlreadyPending);
        }
        if let Some(forced) = self.forced_action {
            if !kind.resolves(forced) {
                return Err(GameError::ForcedActionPending {
                    forced,
                    action: kind,
                });
            }
        }

        match action {
            Action::RollDice => self.roll(player, dice, outcome),
            Action::EndTurn => self.end_turn(player, outcome),
            Action::PlaceSettlement { vertex_id } => self.build_settlement(player, *vertex_id),
            Action::PlaceRoad { edge_id } => match self.forced_action {
                Some(ForcedAction::PlaceRoad1 | ForcedAction::PlaceRoad2) => {
                    self.place_free_road(player, *edge_id)
                }
                _ => self.build_road(player, *edge_id),
            },
            Action::PlaceCity { vertex_id } => self.build_city(player, *vertex_id),
            Action::BuyDevelopmentCard => self.buy_development_card(player, outcome),
            Action::DiscardResources { resources } => self.discard(player, resources),
            Action::MoveRobber { target_tile } => self.move_robber(player, *target_tile, outcome),
            Action::RobberSteal { victim_id } => self.steal(player, *victim_id, outcome),
            Action::PlayKnightCard => self.play_knight(player, outcome),
            Action::PlayRoadBuildingCard => self.play_road_building(player, outcome),
            Action::PlayYearOfPlentyCard => self.play_year_of_plenty(player, outcome),
            Action::PlayMonopolyCard => self.play_monopoly(player, outcome),
            Action::YearOfPlenty { resources } => self.take_year_of_plenty(player, *resources),
            Action::Monopoly { resource } => self.take_monopoly(player, *resource),
            Action::BankTrade { offer, request } => self.bank_trade(player, offer, request),
            Action::ProposeTrade { offer, request } => self.propose_trade(player, offer, request),
            Action::AcceptTrade => self.accept_trade(player),
            Action::DeclineTrade => self.decline_trade(player),
            Action::ConfirmTrade { target } => self.confirm_trade(player, *target, outcome),
            Action::EndTrade => self.end_trade(player),
        }
    }

    fn end_turn(&mut self, player: PlayerId, outcome: &mut StepOutcome) -> Result<(), GameError> {
        self.ensure_can_act_after_roll(player)?;
        if self.pending_trade.is_some() {
            return Err(GameError::ForcedActionPending {
                forced: ForcedAction::TradePending,
                action: ActionType::EndTurn,
            });
        }
        self.advance_turn(player, outcome);
        Ok(())
    }

    fn advance_turn(&mut self, finished: PlayerId, outcome: &mut StepOutcome) {
        if let Some(state) = self.players.get_mut(&finished) {
            state.reset_for_new_turn();
        }
        self.last_roll = None;
        self.cards_bought_this_turn = DevelopmentCards::default();
        self.clear_sub_phases();

        let next = self.next_in_rotation(finished);
        self.current_turn = next;
        if let Some(next) = next {
            if let Some(state) = self.players.get_mut(&next) {
                state.current_turn = true;
            }
            outcome
                .events
                .push(GameEvent::TurnAdvanced { next_player: next });
        }
    }

    fn clear_sub_phases(&mut self) {
        self.forced_action = None;
        self.pending_discard.clear();
        self.robber_candidates.clear();
        self.pending_robber_tile = None;
        self.pending_trade = None;
    }

    fn next_in_rotation(&self, player: PlayerId) -> Option<PlayerId> {
        self.players
            .range((Excluded(player), Unbounded))
            .next()
            .or_else(|| self.players.iter().next())
            .map(|(id, _)| *id)
    }

    pub fn remove_player(&mut self, player: PlayerId) -> Result<(), GameError> {
        let Some(state) = self.players.remove(&player) else {
            return Err(GameError::UnknownPlayer(player));
        };
        if matches!(self.phase, GamePhase::Lobby) {
            return Ok(());
        }
        self.bank.receive(&state.hand);
        self.no_partner.remove(&player);

        let mut placement_done = false;
        if let GamePhase::InitialPlacement(order) = &mut self.phase {
            order.remove_player(player);
            placement_done = order.is_complete();
        }
        if placement_done {
            self.phase = GamePhase::Playing;
        }

        self.withdraw_from_trade(player);

        if self.pending_discard.remove(&player).is_some()
            && self.pending_discard.is_empty()
            && self.forced_action == Some(ForcedAction::Discard)
        {
            self.forced_action = Some(ForcedAction::MoveRobber);
        }

        self.robber_candidates.retain(|id| *id != player);
        if self.robber_candidates.is_empty()
            && self.forced_action == Some(ForcedAction::StealResource)
        {
            self.forced_action = None;
            self.pending_robber_tile = None;
        }

        if self.current_turn == Some(player) && !matches!(self.phase, GamePhase::Completed { .. })
        {
            let mut outcome = StepOutcome::default();
            self.advance_turn(player, &mut outcome);
        }
        let mut outcome = StepOutcome::default();
        self.update_awards(&mut outcome);
        Ok(())
    }

    fn update_awards(&mut self, outcome: &mut StepOutcome) {
        let lengths: Vec<(PlayerId, u8)> = self
            .players
            .keys()
            .map(|id| (*id, longest_road(&self.board, *id)))
            .collect();
        for (id, length) in &lengths {
            if let Some(state) = self.players.get_mut(id) {
                state.longest_road_length = *length;
            }
        }
        let incumbent = self.holder(|p| p.longest_road);
        let holder = award_badge(&lengths, incumbent, LONGEST_ROAD_MIN);
        if holder != incumbent {
            for state in self.players.values_mut() {
                state.longest_road = Some(state.id) == holder;
            }
            outcome
                .events
                .push(GameEvent::LongestRoadChanged { holder });
        }

        let armies: Vec<(PlayerId, u8)> = self
            .players
            .values()
            .map(|p| (p.id, p.played_knights))
            .collect();
        let incumbent = self.holder(|p| p.largest_army);
        let holder = award_badge(&armies, incumbent, LARGEST_ARMY_MIN);
        if holder != incumbent {
            for state in self.players.values_mut() {
                state.largest_army = Some(state.id) == holder;
            }
            outcome
                .events
                .push(GameEvent::LargestArmyChanged { holder });
        }
    }

    fn holder(&self, has_badge: impl Fn(&PlayerState) -> bool) -> Option<PlayerId> {
        self.players.values().find(|p| has_badge(p)).map(|p| p.id)
    }

    fn check_victory(&mut self, player: PlayerId, outcome: &mut StepOutcome) {
        let won = self
            .players
            .get(&player)
            .is_some_and(|p| p.victory_points() >= self.config.vps_to_win);
        if won {
            self.phase = GamePhase::Completed { winner: player };
            outcome.winner = Some(player);
            outcome.events.push(GameEvent::GameWon { winner: player });
        }
    }

    pub(crate) fn player(&self, player: PlayerId) -> Result<&PlayerState, GameError> {
        self.players
            .get(&player)
            .ok_or(GameError::UnknownPlayer(player))
    }

    pub(crate) fn player_mut(&mut self, player: PlayerId) -> Result<&mut PlayerState, GameError> {
        self.players
            .get_mut(&player)
            .ok_or(GameError::UnknownPlayer(player))
    }

    pub(crate) fn ensure_can_act_after_roll(&self, player: PlayerId) -> Result<(), GameError> {
        if !self.player(player)?.dice_rolled {
            return Err(GameError::DiceNotRolled);
        }
        Ok(())
    }

    pub(crate) fn pay_cost(
        &mut self,
        player: PlayerId,
        cost: &ResourceBundle,
    ) -> Result<(), GameError> {
        self.player_mut(player)?.remove_resources(cost)?;
        self.bank.receive(cost);
        Ok(())
    }

    pub(crate) fn expect_forced(
        &self,
        forced: ForcedAction,
        action: ActionType,
    ) -> Result<(), GameError> {
        if self.forced_action != Some(forced) {
            return Err(GameError::ActionNotExpected(action));
        }
        Ok(())
    }
}
