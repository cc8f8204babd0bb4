//! End-to-end rules tests driven through the public action entry points.
//!
//! Every game here runs on the beginner board with a fixed seed. Opening
//! settlements go on the lowest free vertex, which keeps them inland and
//! away from harbours.

use std::collections::BTreeMap;

use serde_json::json;

use hexrules::board::{Board, EdgeId, PlacementError, TileId, VertexId};
use hexrules::game::bank::DEVELOPMENT_DECK_SIZE;
use hexrules::game::{
    Action, ActionOutcome, COST_CITY, COST_DEVELOPMENT, COST_SETTLEMENT, ErrorKind, Game,
    GameConfig, GameError, GameEvent, GamePhase, GameState, ResourceBundle, TradeTerms,
};
use hexrules::types::{ActionType, DevelopmentCard, ForcedAction, PlayerId, Resource};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const QUIET_ROLLS: [(u8, u8); 5] = [(1, 1), (2, 1), (4, 4), (6, 5), (6, 6)];

fn config(seed: u64) -> GameConfig {
    GameConfig {
        seed: Some(seed),
        ..GameConfig::default()
    }
}

fn lobby(ids: &[PlayerId]) -> GameState {
    let mut state = GameState::with_board(config(11), Board::beginner());
    for id in ids {
        state.add_player(*id).unwrap();
    }
    state
}

fn first_free_vertex(state: &GameState, player: PlayerId) -> VertexId {
    (0..state.board.vertices.len() as VertexId)
        .find(|v| state.board.check_settlement(*v, player, false).is_ok())
        .expect("a free vertex")
}

fn free_connected_edge(state: &GameState, player: PlayerId) -> EdgeId {
    state
        .board
        .edges
        .iter()
        .find(|e| state.board.check_road(e.id, player, None).is_ok())
        .expect("a connected edge")
        .id
}

/// Places the current placer's settlement and the road next to it.
fn place_opening(state: &mut GameState, player: PlayerId) -> (VertexId, EdgeId) {
    let vertex = first_free_vertex(state, player);
    state
        .step(player, &Action::PlaceSettlement { vertex_id: vertex })
        .unwrap();
    let edge = state
        .board
        .edges_of_vertex(vertex)
        .iter()
        .copied()
        .find(|e| state.board.check_road(*e, player, Some(vertex)).is_ok())
        .expect("a free edge");
    state.step(player, &Action::PlaceRoad { edge_id: edge }).unwrap();
    (vertex, edge)
}

fn finish_placement(state: &mut GameState) {
    while let Some(player) = state.placement_cursor() {
        place_opening(state, player);
    }
    assert!(matches!(state.phase, GamePhase::Playing));
}

/// Started game past the opening, with every hand back in the bank.
fn playing(ids: &[PlayerId]) -> GameState {
    let mut state = lobby(ids);
    state.start().unwrap();
    finish_placement(&mut state);
    clear_hands(&mut state);
    state
}

fn clear_hands(state: &mut GameState) {
    for player in state.players.values_mut() {
        state.bank.receive(&player.hand);
        player.hand = ResourceBundle::zero();
    }
}

fn give(state: &mut GameState, player: PlayerId, bundle: ResourceBundle) {
    state.bank.dispense(&bundle).unwrap();
    state.players.get_mut(&player).unwrap().add_resources(&bundle);
}

fn grant_card(state: &mut GameState, player: PlayerId, card: DevelopmentCard) {
    state
        .players
        .get_mut(&player)
        .unwrap()
        .development_cards
        .add(card);
}

fn hand(state: &GameState, player: PlayerId) -> ResourceBundle {
    state.players[&player].hand
}

fn next_seat(state: &GameState, player: PlayerId) -> PlayerId {
    state
        .players
        .keys()
        .copied()
        .find(|id| *id > player)
        .or_else(|| state.players.keys().next().copied())
        .unwrap()
}

fn others(state: &GameState, player: PlayerId) -> Vec<PlayerId> {
    state
        .players
        .keys()
        .copied()
        .filter(|id| *id != player)
        .collect()
}

fn dice_for(number: u8) -> (u8, u8) {
    let first = (number - 1).min(6);
    (first, number - first)
}

fn owed_on(state: &GameState, number: u8) -> BTreeMap<PlayerId, ResourceBundle> {
    let mut owed = BTreeMap::new();
    for tile in state.board.producing_tiles(number) {
        let Some(resource) = tile.resource else {
            continue;
        };
        for building in state.board.buildings_on_tile(tile) {
            owed.entry(building.owner)
                .or_insert_with(ResourceBundle::zero)
                .add(resource, building.yield_amount());
        }
    }
    owed
}

fn settle_on(state: &mut GameState, tile: TileId, player: PlayerId) -> bool {
    if state.board.players_on_tile(tile, 0).contains(&player) {
        return true;
    }
    let free = state.board.tiles[tile as usize]
        .vertices
        .iter()
        .copied()
        .find(|v| state.board.check_settlement(*v, player, false).is_ok());
    match free {
        Some(vertex) => {
            state.board.place_settlement(vertex, player);
            true
        }
        None => false,
    }
}

fn untouched(state: &GameState, vertex: VertexId) -> bool {
    let v = &state.board.vertices[vertex as usize];
    v.building.is_none()
        && v.edges
            .iter()
            .all(|e| state.board.edges[*e as usize].road.is_none())
}

fn extend_trail(
    state: &GameState,
    path: &mut Vec<VertexId>,
    edges: &mut Vec<EdgeId>,
    length: usize,
) -> bool {
    if edges.len() == length {
        return true;
    }
    let Some(&at) = path.last() else {
        return false;
    };
    for &edge in state.board.edges_of_vertex(at) {
        let next = state.board.edges[edge as usize].other_end(at);
        if path.contains(&next) || !untouched(state, next) {
            continue;
        }
        path.push(next);
        edges.push(edge);
        if extend_trail(state, path, edges, length) {
            return true;
        }
        path.pop();
        edges.pop();
    }
    false
}

fn find_trail(state: &GameState, length: usize) -> Option<Vec<EdgeId>> {
    (0..state.board.vertices.len() as VertexId)
        .filter(|v| untouched(state, *v))
        .find_map(|start| {
            let mut path = vec![start];
            let mut edges = Vec::new();
            extend_trail(state, &mut path, &mut edges, length).then_some(edges)
        })
}

// Lays a simple path of `length` roads for `player` on vertices no road or
// building touches yet, so it stays a separate network.
fn lay_trail(state: &mut GameState, player: PlayerId, length: usize) {
    let edges = find_trail(state, length).expect("room for a trail");
    for edge in edges {
        state.board.place_road(edge, player);
    }
}

fn road_changed(events: &[GameEvent]) -> Option<Option<PlayerId>> {
    events.iter().find_map(|e| match e {
        GameEvent::LongestRoadChanged { holder } => Some(*holder),
        _ => None,
    })
}

fn army_changed(events: &[GameEvent]) -> Option<Option<PlayerId>> {
    events.iter().find_map(|e| match e {
        GameEvent::LargestArmyChanged { holder } => Some(*holder),
        _ => None,
    })
}

fn blocked(events: &[GameEvent]) -> Vec<Resource> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::ProductionBlocked { resource } => Some(*resource),
            _ => None,
        })
        .collect()
}

fn assert_conserved(state: &GameState) {
    for resource in Resource::ALL {
        let held: u32 = state
            .players
            .values()
            .map(|p| p.hand.get(resource) as u32)
            .sum();
        assert_eq!(
            held + state.bank.available(resource) as u32,
            state.config.bank_supply as u32,
            "{resource}"
        );
    }
    let drawn: u32 = state
        .players
        .values()
        .map(|p| p.development_cards_owned())
        .sum();
    assert_eq!(
        drawn as usize + state.bank.development_deck_len(),
        DEVELOPMENT_DECK_SIZE
    );
}

// ---------------------------------------------------------------------------
// Opening placement
// ---------------------------------------------------------------------------

#[test]
fn opening_placement_snakes_and_pays_the_second_settlement() {
    let mut state = lobby(&[1, 2, 3]);
    let first = state.start().unwrap();
    let mut placers = Vec::new();
    while let Some(player) = state.placement_cursor() {
        let before = hand(&state, player).total();
        let second_round = placers.len() >= 3;
        let (vertex, _) = place_opening(&mut state, player);
        let producing = state
            .board
            .tiles_of_vertex(vertex)
            .iter()
            .filter(|t| state.board.tiles[**t as usize].resource.is_some())
            .count() as u32;
        let gained = hand(&state, player).total() - before;
        assert_eq!(gained, if second_round { producing } else { 0 });
        placers.push(player);
    }

    assert_eq!(placers.len(), 6);
    assert_eq!(placers[0], first);
    let mut back = placers[..3].to_vec();
    back.reverse();
    assert_eq!(placers[3..], back[..]);
    assert_eq!(state.current_turn, Some(first));
    assert!(matches!(state.phase, GamePhase::Playing));
    for player in state.players.values() {
        assert_eq!(player.settlements_built(), 2);
        assert_eq!(player.roads_built(), 2);
        assert_eq!(player.visible_victory_points(), 2);
    }
    assert_conserved(&state);
}

#[test]
fn opening_placement_rejects_out_of_order_moves() {
    let mut state = lobby(&[1, 2]);
    let first = state.start().unwrap();
    let second = next_seat(&state, first);
    let vertex = first_free_vertex(&state, first);

    assert_eq!(
        state
            .step(second, &Action::PlaceSettlement { vertex_id: vertex })
            .unwrap_err(),
        GameError::NotYourTurn {
            expected: first,
            actual: second
        }
    );
    assert_eq!(
        state.step(first, &Action::RollDice).unwrap_err(),
        GameError::UnexpectedPlacementAction {
            expected: ActionType::PlaceSettlement,
            actual: ActionType::RollDice
        }
    );

    state
        .step(first, &Action::PlaceSettlement { vertex_id: vertex })
        .unwrap();
    let far = state
        .board
        .edges
        .iter()
        .find(|e| !e.touches(vertex))
        .unwrap()
        .id;
    assert_eq!(
        state
            .step(first, &Action::PlaceRoad { edge_id: far })
            .unwrap_err(),
        GameError::Placement(PlacementError::NotConnected)
    );
    assert_eq!(
        state
            .step(first, &Action::PlaceSettlement { vertex_id: vertex })
            .unwrap_err()
            .kind(),
        ErrorKind::WrongPhase
    );
    assert_eq!(state.placement_cursor(), Some(first));
}

// ---------------------------------------------------------------------------
// Turn flow
// ---------------------------------------------------------------------------

#[test]
fn turn_passes_only_after_rolling() {
    let mut state = playing(&[1, 2, 3]);
    let current = state.current_turn.unwrap();
    let next = next_seat(&state, current);

    assert_eq!(
        state.step(current, &Action::EndTurn).unwrap_err(),
        GameError::DiceNotRolled
    );
    assert_eq!(
        state.step(next, &Action::RollDice).unwrap_err(),
        GameError::NotYourTurn {
            expected: current,
            actual: next
        }
    );
    assert_eq!(
        state.step(9, &Action::RollDice).unwrap_err(),
        GameError::UnknownPlayer(9)
    );
    assert_eq!(
        state.apply_roll(current, (0, 3)).unwrap_err(),
        GameError::InvalidDie(0)
    );

    state.apply_roll(current, (2, 1)).unwrap();
    assert_eq!(state.last_roll, Some((2, 1)));
    assert_eq!(state.view_for(next).current_roll, Some(3));
    assert_eq!(
        state.apply_roll(current, (2, 1)).unwrap_err(),
        GameError::DiceAlreadyRolled
    );

    let outcome = state.step(current, &Action::EndTurn).unwrap();
    assert!(outcome.events.iter().any(
        |e| matches!(e, GameEvent::TurnAdvanced { next_player } if *next_player == next)
    ));
    assert_eq!(state.current_turn, Some(next));
    assert_eq!(state.last_roll, None);
    assert!(!state.players[&current].dice_rolled);
    assert!(!state.players[&current].current_turn);
    assert!(state.players[&next].current_turn);
}

#[test]
fn cards_are_conserved_across_turns() {
    let mut state = playing(&[1, 2, 3, 4]);
    for dice in QUIET_ROLLS.iter().cycle().take(16) {
        let current = state.current_turn.unwrap();
        state.apply_roll(current, *dice).unwrap();
        if hand(&state, current).can_afford(&COST_DEVELOPMENT) {
            state.step(current, &Action::BuyDevelopmentCard).unwrap();
        }
        state.step(current, &Action::EndTurn).unwrap();
        assert_conserved(&state);
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

#[test]
fn settlements_respect_distance_and_connection() {
    let mut state = playing(&[1, 2]);
    let current = state.current_turn.unwrap();
    state.apply_roll(current, (1, 1)).unwrap();
    clear_hands(&mut state);
    give(&mut state, current, COST_SETTLEMENT);

    let own = state
        .board
        .vertices
        .iter()
        .find(|v| v.owner() == Some(current))
        .unwrap()
        .id;
    let neighbor = state.board.vertices[own as usize].neighbors[0];
    assert_eq!(
        state
            .step(current, &Action::PlaceSettlement { vertex_id: neighbor })
            .unwrap_err(),
        GameError::Placement(PlacementError::DistanceRule(neighbor))
    );

    let lonely = (0..state.board.vertices.len() as VertexId)
        .find(|v| {
            state.board.check_settlement(*v, current, false).is_ok()
                && state.board.check_settlement(*v, current, true).is_err()
        })
        .unwrap();
    let err = state
        .step(current, &Action::PlaceSettlement { vertex_id: lonely })
        .unwrap_err();
    assert_eq!(err, GameError::Placement(PlacementError::NotConnected));
    assert_eq!(err.kind(), ErrorKind::InvalidTarget);
    assert_eq!(hand(&state, current), COST_SETTLEMENT);

    let edge = state
        .board
        .edges_of_vertex(lonely)
        .iter()
        .copied()
        .find(|e| state.board.edges[*e as usize].road.is_none())
        .unwrap();
    state.board.place_road(edge, current);
    state
        .step(current, &Action::PlaceSettlement { vertex_id: lonely })
        .unwrap();
    assert_eq!(state.players[&current].settlements_built(), 3);
    assert!(hand(&state, current).is_empty());

    give(&mut state, current, COST_CITY);
    state
        .step(current, &Action::PlaceCity { vertex_id: lonely })
        .unwrap();
    let player = &state.players[&current];
    assert_eq!(player.cities_built(), 1);
    assert_eq!(player.settlements_built(), 2);
    assert_eq!(player.visible_victory_points(), 4);
    assert_eq!(
        state
            .step(current, &Action::PlaceCity { vertex_id: lonely })
            .unwrap_err(),
        GameError::Placement(PlacementError::NotOwnSettlement(lonely))
    );
    assert_conserved(&state);
}

// ---------------------------------------------------------------------------
// Trading
// ---------------------------------------------------------------------------

#[test]
fn bank_trade_four_for_one_without_a_port() {
    let mut state = playing(&[1, 2]);
    let current = state.current_turn.unwrap();
    let other = next_seat(&state, current);
    state.apply_roll(current, (1, 1)).unwrap();
    clear_hands(&mut state);
    assert_eq!(state.board.trade_ratio(current, Resource::Wood), 4);

    let trade = Action::BankTrade {
        offer: ResourceBundle::of(Resource::Wood, 4),
        request: ResourceBundle::of(Resource::Brick, 1),
    };

    give(&mut state, current, ResourceBundle::of(Resource::Wood, 3));
    let err = state.step(current, &trade).unwrap_err();
    assert!(matches!(err, GameError::InsufficientResources(_)));
    assert_eq!(err.kind(), ErrorKind::InsufficientResources);
    assert_eq!(hand(&state, current), ResourceBundle::of(Resource::Wood, 3));

    give(&mut state, current, ResourceBundle::of(Resource::Wood, 1));
    give(&mut state, other, ResourceBundle::of(Resource::Brick, 19));
    assert_eq!(
        state.step(current, &trade).unwrap_err(),
        GameError::BankCannotCover(Resource::Brick)
    );
    assert_eq!(hand(&state, current), ResourceBundle::of(Resource::Wood, 4));

    let uneven = Action::BankTrade {
        offer: ResourceBundle::of(Resource::Wood, 4),
        request: ResourceBundle::of(Resource::Ore, 2),
    };
    assert_eq!(
        state.step(current, &uneven).unwrap_err(),
        GameError::InvalidTradeRatio
    );

    state.players.get_mut(&other).unwrap().hand = ResourceBundle::zero();
    state
        .bank
        .receive(&ResourceBundle::of(Resource::Brick, 19));
    state.step(current, &trade).unwrap();
    assert_eq!(hand(&state, current), ResourceBundle::of(Resource::Brick, 1));
    assert_eq!(state.bank.available(Resource::Wood), 19);
    assert_eq!(state.bank.available(Resource::Brick), 18);
    assert_conserved(&state);
}

#[test]
fn one_trade_at_a_time_and_only_with_acceptors() {
    let mut state = playing(&[1, 2, 3]);
    let current = state.current_turn.unwrap();
    let partners = others(&state, current);
    let (keen, broke) = (partners[0], partners[1]);
    state.apply_roll(current, (1, 1)).unwrap();
    clear_hands(&mut state);
    give(&mut state, current, ResourceBundle::of(Resource::Wood, 1));
    give(&mut state, keen, ResourceBundle::of(Resource::Brick, 1));

    let propose = Action::ProposeTrade {
        offer: ResourceBundle::of(Resource::Wood, 1),
        request: ResourceBundle::of(Resource::Brick, 1),
    };
    state.step(current, &propose).unwrap();
    assert_eq!(state.forced_action, Some(ForcedAction::TradePending));
    assert_eq!(
        state.step(current, &propose).unwrap_err(),
        GameError::TradeAlreadyPending
    );
    assert_eq!(
        state
            .step(current, &Action::ConfirmTrade { target: keen })
            .unwrap_err(),
        GameError::PartnerNotAccepted(keen)
    );
    assert_eq!(
        state
            .step(current, &Action::BuyDevelopmentCard)
            .unwrap_err(),
        GameError::ForcedActionPending {
            forced: ForcedAction::TradePending,
            action: ActionType::BuyDevelopmentCard
        }
    );
    assert_eq!(
        state.step(current, &Action::AcceptTrade).unwrap_err(),
        GameError::TraderCannotRespond
    );

    assert!(matches!(
        state.step(broke, &Action::AcceptTrade).unwrap_err(),
        GameError::InsufficientResources(_)
    ));
    state.step(broke, &Action::DeclineTrade).unwrap();
    assert_eq!(
        state.step(broke, &Action::AcceptTrade).unwrap_err(),
        GameError::NotAwaitingResponse(broke)
    );

    state.step(keen, &Action::AcceptTrade).unwrap();
    assert_eq!(
        state
            .step(keen, &Action::ConfirmTrade { target: keen })
            .unwrap_err()
            .kind(),
        ErrorKind::WrongTurn
    );
    let outcome = state
        .step(current, &Action::ConfirmTrade { target: keen })
        .unwrap();
    assert!(outcome.events.iter().any(|e| matches!(
        e,
        GameEvent::TradeCompleted { trader, partner } if *trader == current && *partner == keen
    )));
    assert_eq!(hand(&state, current), ResourceBundle::of(Resource::Brick, 1));
    assert_eq!(hand(&state, keen), ResourceBundle::of(Resource::Wood, 1));
    assert_eq!(state.pending_trade, None);
    assert_eq!(state.forced_action, None);
    assert_conserved(&state);
}

#[test]
fn trader_hears_once_when_everyone_declines() {
    let mut state = playing(&[1, 2]);
    let current = state.current_turn.unwrap();
    let other = next_seat(&state, current);
    state.apply_roll(current, (1, 1)).unwrap();
    clear_hands(&mut state);
    give(&mut state, current, ResourceBundle::of(Resource::Sheep, 2));

    let terms = TradeTerms {
        offer: ResourceBundle::of(Resource::Sheep, 2),
        request: ResourceBundle::of(Resource::Ore, 1),
    };
    state
        .step(
            current,
            &Action::ProposeTrade {
                offer: terms.offer,
                request: terms.request,
            },
        )
        .unwrap();
    state.step(other, &Action::DeclineTrade).unwrap();

    let views = state.views();
    assert_eq!(views[&current].no_partner, Some(terms));
    assert_eq!(views[&other].no_partner, None);
    assert_eq!(state.views()[&current].no_partner, None);
    assert!(state.pending_trade.is_some());

    state.step(current, &Action::EndTrade).unwrap();
    assert_eq!(state.forced_action, None);
    state.step(current, &Action::EndTurn).unwrap();
    assert_eq!(state.current_turn, Some(other));
}

// ---------------------------------------------------------------------------
// Robber
// ---------------------------------------------------------------------------

#[test]
fn seven_makes_large_hands_discard_then_robber_moves() {
    let mut state = playing(&[1, 2]);
    let current = state.current_turn.unwrap();
    let other = next_seat(&state, current);
    give(&mut state, current, ResourceBundle::from_counts([2, 1, 1, 1, 1]));
    give(&mut state, other, ResourceBundle::from_counts([2, 2, 2, 2, 1]));

    state.apply_roll(current, (3, 4)).unwrap();
    assert_eq!(state.forced_action, Some(ForcedAction::Discard));
    assert_eq!(state.pending_discard, BTreeMap::from([(other, 4)]));
    assert_eq!(state.view_for(other).must_discard, 4);
    assert_eq!(state.view_for(current).must_discard, 0);
    let wire = serde_json::to_value(state.view_for(other)).unwrap();
    assert_eq!(wire["forced_action"], json!("Discard"));

    assert_eq!(
        state.step(current, &Action::EndTurn).unwrap_err(),
        GameError::ForcedActionPending {
            forced: ForcedAction::Discard,
            action: ActionType::EndTurn
        }
    );
    assert_eq!(
        state
            .step(
                current,
                &Action::DiscardResources {
                    resources: ResourceBundle::of(Resource::Wood, 3)
                }
            )
            .unwrap_err(),
        GameError::NothingToDiscard(current)
    );
    assert_eq!(
        state
            .step(
                other,
                &Action::DiscardResources {
                    resources: ResourceBundle::from_counts([1, 1, 1, 0, 0])
                }
            )
            .unwrap_err(),
        GameError::WrongDiscardAmount {
            owed: 4,
            offered: 3
        }
    );

    state
        .step(
            other,
            &Action::DiscardResources {
                resources: ResourceBundle::from_counts([1, 1, 1, 1, 0]),
            },
        )
        .unwrap();
    assert_eq!(hand(&state, other).total(), 5);
    assert_eq!(state.forced_action, Some(ForcedAction::MoveRobber));
    assert!(state.pending_discard.is_empty());

    let start = state.board.robber_tile;
    assert_eq!(
        state
            .step(current, &Action::MoveRobber { target_tile: start })
            .unwrap_err(),
        GameError::Placement(PlacementError::RobberAlreadyThere(start))
    );
    let target = state
        .board
        .tiles
        .iter()
        .map(|t| t.id)
        .find(|t| *t != start && state.board.players_on_tile(*t, current) == vec![other])
        .unwrap();
    state
        .step(current, &Action::MoveRobber { target_tile: target })
        .unwrap();
    assert_eq!(state.forced_action, Some(ForcedAction::StealResource));
    assert_eq!(state.robber_candidates, vec![other]);
    assert_eq!(
        state
            .step(current, &Action::RobberSteal { victim_id: current })
            .unwrap_err(),
        GameError::NotARobberCandidate(current)
    );

    state
        .step(current, &Action::RobberSteal { victim_id: other })
        .unwrap();
    assert_eq!(hand(&state, current).total(), 7);
    assert_eq!(hand(&state, other).total(), 4);
    assert_eq!(state.forced_action, None);
    assert!(state.board.tiles[target as usize].robber);
    assert_conserved(&state);
    state.step(current, &Action::EndTurn).unwrap();
}

#[test]
fn robbed_tile_produces_nothing() {
    let mut state = playing(&[1, 2]);
    let current = state.current_turn.unwrap();
    let (tile, number) = state
        .board
        .tiles
        .iter()
        .find_map(|t| match t.number {
            Some(n) if state.board.buildings_on_tile(t).next().is_some() => Some((t.id, n)),
            _ => None,
        })
        .unwrap();
    state.board.move_robber(tile);

    assert!(state.board.producing_tiles(number).all(|t| t.id != tile));
    let expected = owed_on(&state, number);

    state.apply_roll(current, dice_for(number)).unwrap();
    for (id, player) in &state.players {
        let owed = expected.get(id).map(ResourceBundle::total).unwrap_or(0);
        assert_eq!(player.hand_size(), owed);
    }
    assert_conserved(&state);
}

// ---------------------------------------------------------------------------
// Production
// ---------------------------------------------------------------------------

#[test]
fn drained_bank_pays_nobody_that_resource() {
    let mut state = playing(&[1, 2]);
    let current = state.current_turn.unwrap();
    let (number, resource) = state
        .board
        .tiles
        .iter()
        .find_map(|t| match (t.number, t.resource) {
            (Some(n), Some(r)) if state.board.buildings_on_tile(t).next().is_some() => {
                Some((n, r))
            }
            _ => None,
        })
        .unwrap();
    let stock = state.bank.available(resource);
    give(&mut state, current, ResourceBundle::of(resource, stock));
    let before: BTreeMap<PlayerId, u8> = state
        .players
        .iter()
        .map(|(id, p)| (*id, p.hand.get(resource)))
        .collect();

    let rolled = state.apply_roll(current, dice_for(number)).unwrap();
    assert_eq!(blocked(&rolled.events), vec![resource]);
    for (id, player) in &state.players {
        assert_eq!(player.hand.get(resource), before[id], "player {id}");
    }
    assert_eq!(state.bank.available(resource), 0);
    assert_conserved(&state);
}

// Finds a roll with two resources on it, then seats both players on a tile
// of the first and player 1 on a tile of the second.
fn contested_roll(state: &GameState) -> (GameState, u8, Resource, Resource) {
    for number in (2..=12).filter(|n| *n != 7) {
        let tiles: Vec<(TileId, Resource)> = state
            .board
            .producing_tiles(number)
            .filter_map(|t| t.resource.map(|r| (t.id, r)))
            .collect();
        for &(contested_tile, contested) in &tiles {
            for &(paid_tile, paid) in &tiles {
                if paid == contested {
                    continue;
                }
                let mut trial = state.clone();
                if settle_on(&mut trial, contested_tile, 1)
                    && settle_on(&mut trial, contested_tile, 2)
                    && settle_on(&mut trial, paid_tile, 1)
                {
                    return (trial, number, contested, paid);
                }
            }
        }
    }
    panic!("no roll produces two different resources");
}

#[test]
fn bank_one_short_pays_neither_claimant() {
    let (mut state, number, contested, paid) = contested_roll(&playing(&[1, 2]));
    let current = state.current_turn.unwrap();
    let owed = owed_on(&state, number);
    assert!(owed[&1].get(contested) > 0 && owed[&2].get(contested) > 0);
    let demand: u8 = owed.values().map(|b| b.get(contested)).sum();

    let surplus = state.bank.available(contested) - (demand - 1);
    give(&mut state, current, ResourceBundle::of(contested, surplus));
    let before: BTreeMap<PlayerId, ResourceBundle> =
        state.players.iter().map(|(id, p)| (*id, p.hand)).collect();

    let rolled = state.apply_roll(current, dice_for(number)).unwrap();
    assert_eq!(blocked(&rolled.events), vec![contested]);
    assert_eq!(state.bank.available(contested), demand - 1);
    for (id, player) in &state.players {
        assert_eq!(player.hand.get(contested), before[id].get(contested), "player {id}");
        let due = owed.get(id).map(|b| b.get(paid)).unwrap_or(0);
        assert_eq!(player.hand.get(paid), before[id].get(paid) + due, "player {id}");
    }
    assert!(owed[&1].get(paid) > 0);
    assert_conserved(&state);
}

// ---------------------------------------------------------------------------
// Development cards
// ---------------------------------------------------------------------------

#[test]
fn knight_bought_this_turn_waits_for_a_later_turn() {
    let mut state = playing(&[1, 2]);
    let current = state.current_turn.unwrap();
    let other = next_seat(&state, current);
    state.apply_roll(current, (1, 1)).unwrap();

    let mut buys = 0;
    while state.players[&current]
        .development_cards
        .get(DevelopmentCard::Knight)
        == 0
    {
        give(&mut state, current, COST_DEVELOPMENT);
        state.step(current, &Action::BuyDevelopmentCard).unwrap();
        buys += 1;
        assert!(buys <= 12);
    }
    assert_conserved(&state);
    assert_eq!(
        state.step(current, &Action::PlayKnightCard).unwrap_err(),
        GameError::CardNotPlayable(DevelopmentCard::Knight)
    );

    state.step(current, &Action::EndTurn).unwrap();
    state.apply_roll(other, (1, 1)).unwrap();
    state.step(other, &Action::EndTurn).unwrap();

    state.step(current, &Action::PlayKnightCard).unwrap();
    assert_eq!(state.forced_action, Some(ForcedAction::MoveRobber));
    let player = &state.players[&current];
    assert_eq!(player.played_knights, 1);
    assert_eq!(
        player.played_development_cards.get(DevelopmentCard::Knight),
        1
    );
    assert!(player.played_card_this_turn);
    assert_conserved(&state);
}

#[test]
fn road_building_lays_two_free_roads() {
    let mut state = playing(&[1, 2]);
    let current = state.current_turn.unwrap();
    grant_card(&mut state, current, DevelopmentCard::RoadBuilding);
    grant_card(&mut state, current, DevelopmentCard::Monopoly);
    let roads = state.players[&current].roads;

    state
        .step(current, &Action::PlayRoadBuildingCard)
        .unwrap();
    assert_eq!(state.forced_action, Some(ForcedAction::PlaceRoad1));
    assert_eq!(
        state.step(current, &Action::RollDice).unwrap_err(),
        GameError::ForcedActionPending {
            forced: ForcedAction::PlaceRoad1,
            action: ActionType::RollDice
        }
    );
    for then in [Some(ForcedAction::PlaceRoad2), None] {
        let edge = free_connected_edge(&state, current);
        state
            .step(current, &Action::PlaceRoad { edge_id: edge })
            .unwrap();
        assert_eq!(state.forced_action, then);
    }
    assert_eq!(state.players[&current].roads, roads - 2);
    assert!(hand(&state, current).is_empty());

    assert_eq!(
        state.step(current, &Action::PlayMonopolyCard).unwrap_err(),
        GameError::CardNotPlayable(DevelopmentCard::Monopoly)
    );
    let edge = free_connected_edge(&state, current);
    assert_eq!(
        state
            .step(current, &Action::PlaceRoad { edge_id: edge })
            .unwrap_err(),
        GameError::DiceNotRolled
    );
}

#[test]
fn monopoly_collects_from_every_opponent() {
    let mut state = playing(&[1, 2, 3]);
    let current = state.current_turn.unwrap();
    let rivals = others(&state, current);
    give(&mut state, rivals[0], ResourceBundle::of(Resource::Wheat, 3));
    give(&mut state, rivals[1], ResourceBundle::from_counts([0, 1, 0, 2, 0]));
    grant_card(&mut state, current, DevelopmentCard::Monopoly);

    state.step(current, &Action::PlayMonopolyCard).unwrap();
    assert_eq!(state.forced_action, Some(ForcedAction::Monopoly));
    assert_eq!(
        state.step(current, &Action::EndTurn).unwrap_err(),
        GameError::ForcedActionPending {
            forced: ForcedAction::Monopoly,
            action: ActionType::EndTurn
        }
    );

    state
        .step(
            current,
            &Action::Monopoly {
                resource: Resource::Wheat,
            },
        )
        .unwrap();
    assert_eq!(hand(&state, current), ResourceBundle::of(Resource::Wheat, 5));
    assert!(hand(&state, rivals[0]).is_empty());
    assert_eq!(hand(&state, rivals[1]), ResourceBundle::of(Resource::Brick, 1));
    assert_eq!(state.forced_action, None);
    assert_eq!(
        state.players[&current]
            .played_development_cards
            .get(DevelopmentCard::Monopoly),
        1
    );
}

#[test]
fn year_of_plenty_needs_the_bank_to_cover_both_cards() {
    let mut state = playing(&[1, 2]);
    let current = state.current_turn.unwrap();
    let other = next_seat(&state, current);
    let pick = Action::YearOfPlenty {
        resources: [Resource::Ore, Resource::Ore],
    };
    assert_eq!(
        state.step(current, &pick).unwrap_err(),
        GameError::ActionNotExpected(ActionType::YearOfPlenty)
    );

    grant_card(&mut state, current, DevelopmentCard::YearOfPlenty);
    give(&mut state, other, ResourceBundle::of(Resource::Ore, 18));
    state
        .step(current, &Action::PlayYearOfPlentyCard)
        .unwrap();
    assert_eq!(
        state.step(current, &pick).unwrap_err(),
        GameError::BankCannotCover(Resource::Ore)
    );
    assert_eq!(state.forced_action, Some(ForcedAction::YearOfPlenty));

    state
        .step(
            current,
            &Action::YearOfPlenty {
                resources: [Resource::Ore, Resource::Wheat],
            },
        )
        .unwrap();
    assert_eq!(
        hand(&state, current),
        ResourceBundle::from_counts([0, 0, 0, 1, 1])
    );
    assert_eq!(state.bank.available(Resource::Ore), 0);
    assert_eq!(state.forced_action, None);
}

// ---------------------------------------------------------------------------
// Awards
// ---------------------------------------------------------------------------

#[test]
fn third_knight_brings_the_largest_army() {
    let mut state = playing(&[1, 2]);
    let knight = state.current_turn.unwrap();
    let other = next_seat(&state, knight);

    for played in 1..=3u8 {
        grant_card(&mut state, knight, DevelopmentCard::Knight);
        state.apply_roll(knight, (1, 1)).unwrap();
        let outcome = state.step(knight, &Action::PlayKnightCard).unwrap();
        assert_eq!(state.players[&knight].played_knights, played);
        if played < 3 {
            assert_eq!(army_changed(&outcome.events), None);
            assert!(!state.players[&knight].largest_army);
        } else {
            assert_eq!(army_changed(&outcome.events), Some(Some(knight)));
        }

        let target = (0..state.board.tiles.len() as TileId)
            .find(|t| *t != state.board.robber_tile)
            .unwrap();
        state
            .step(knight, &Action::MoveRobber { target_tile: target })
            .unwrap();
        if state.forced_action == Some(ForcedAction::StealResource) {
            let victim = state.robber_candidates[0];
            state
                .step(knight, &Action::RobberSteal { victim_id: victim })
                .unwrap();
        }
        state.step(knight, &Action::EndTurn).unwrap();
        state.apply_roll(other, (1, 1)).unwrap();
        state.step(other, &Action::EndTurn).unwrap();
    }

    let player = &state.players[&knight];
    assert!(player.largest_army);
    assert_eq!(player.bonus_points(), 2);
    assert_eq!(player.visible_victory_points(), 4);
    assert!(!state.players[&other].largest_army);
    assert_eq!(state.players[&other].visible_victory_points(), 2);
}

#[test]
fn longest_road_stays_with_the_incumbent_until_beaten() {
    let mut state = playing(&[1, 2]);
    let first = state.current_turn.unwrap();
    let second = next_seat(&state, first);

    lay_trail(&mut state, first, 5);
    let rolled = state.apply_roll(first, (1, 1)).unwrap();
    assert_eq!(road_changed(&rolled.events), Some(Some(first)));
    assert_eq!(state.players[&first].longest_road_length, 5);
    assert!(state.players[&first].longest_road);
    assert_eq!(state.players[&first].visible_victory_points(), 4);

    lay_trail(&mut state, second, 5);
    let ended = state.step(first, &Action::EndTurn).unwrap();
    assert_eq!(road_changed(&ended.events), None);
    assert_eq!(state.players[&second].longest_road_length, 5);
    assert!(state.players[&first].longest_road);
    assert!(!state.players[&second].longest_road);

    lay_trail(&mut state, second, 6);
    let rolled = state.apply_roll(second, (1, 1)).unwrap();
    assert_eq!(road_changed(&rolled.events), Some(Some(second)));
    assert_eq!(state.players[&second].longest_road_length, 6);
    assert!(!state.players[&first].longest_road);
    assert!(state.players[&second].longest_road);
    assert_eq!(state.players[&first].visible_victory_points(), 2);
    assert_eq!(state.players[&second].visible_victory_points(), 4);
}

// ---------------------------------------------------------------------------
// Victory and departures
// ---------------------------------------------------------------------------

#[test]
fn game_ends_when_the_acting_player_reaches_the_target() {
    let mut game = Game::with_board(
        GameConfig {
            seed: Some(4),
            vps_to_win: 4,
            ..GameConfig::default()
        },
        Board::beginner(),
    );
    game.add_player(1).unwrap();
    game.add_player(2).unwrap();
    game.start_game().unwrap();
    finish_placement(&mut game.state);

    let current = game.state.current_turn.unwrap();
    let other = next_seat(&game.state, current);
    grant_card(&mut game.state, current, DevelopmentCard::VictoryPoint);
    grant_card(&mut game.state, current, DevelopmentCard::VictoryPoint);
    assert_eq!(game.view_for(other).winner, None);

    match game.call_roll(current, (1, 1)).unwrap() {
        ActionOutcome::Won { winner } => assert_eq!(winner, current),
        outcome => panic!("expected a win, got {outcome:?}"),
    }
    assert_eq!(game.winner(), Some(current));
    assert_eq!(game.view_for(other).winner, Some(current));
    assert_eq!(
        game.call_action(current, &Action::EndTurn).unwrap_err(),
        GameError::GameFinished
    );
}

#[test]
fn leaving_mid_discard_lets_the_robber_move() {
    let mut state = playing(&[1, 2, 3]);
    let current = state.current_turn.unwrap();
    let rivals = others(&state, current);
    give(&mut state, rivals[0], ResourceBundle::from_counts([2, 2, 2, 2, 0]));

    state.apply_roll(current, (5, 2)).unwrap();
    assert_eq!(state.pending_discard, BTreeMap::from([(rivals[0], 4)]));

    state.remove_player(rivals[0]).unwrap();
    assert_eq!(state.forced_action, Some(ForcedAction::MoveRobber));
    assert!(state.pending_discard.is_empty());
    assert_conserved(&state);

    let start = state.board.robber_tile;
    let target = state
        .board
        .tiles
        .iter()
        .map(|t| t.id)
        .find(|t| *t != start)
        .unwrap();
    state
        .step(current, &Action::MoveRobber { target_tile: target })
        .unwrap();
    assert!(!state.robber_candidates.contains(&rivals[0]));

    state.remove_player(current).unwrap();
    assert_eq!(state.current_turn, Some(rivals[1]));
    assert_eq!(state.forced_action, None);
    assert!(state.players[&rivals[1]].current_turn);
    assert_eq!(
        state.remove_player(current).unwrap_err(),
        GameError::UnknownPlayer(current)
    );
}

#[test]
fn leaving_during_placement_hands_the_cursor_on() {
    let mut state = lobby(&[1, 2, 3]);
    let first = state.start().unwrap();
    let next = next_seat(&state, first);

    state.remove_player(first).unwrap();
    assert_eq!(state.placement_cursor(), Some(next));
    assert_eq!(state.current_turn, Some(next));

    finish_placement(&mut state);
    assert_eq!(state.current_turn, Some(next));
    for player in state.players.values() {
        assert_eq!(player.settlements_built(), 2);
    }
    assert_conserved(&state);
}
