use crate::board::{Board, VertexId};
use crate::types::PlayerId;

pub const LONGEST_ROAD_MIN: u8 = 5;
pub const LARGEST_ARMY_MIN: u8 = 3;

/// Length of the longest simple path through `player`'s roads.
///
/// A path may end at a vertex holding an opponent's building but cannot
/// continue through it.
pub fn longest_road(board: &Board, player: PlayerId) -> u8 {
    let mut visited = vec![false; board.edges.len()];
    let mut best = 0;
    for edge in board.edges.iter().filter(|e| e.road == Some(player)) {
        for start in [edge.vertices.0, edge.vertices.1] {
            best = best.max(walk(board, player, start, &mut visited));
        }
    }
    best
}

fn walk(board: &Board, player: PlayerId, from: VertexId, visited: &mut [bool]) -> u8 {
    let mut best = 0;
    for &edge_id in board.edges_of_vertex(from) {
        let edge = &board.edges[edge_id as usize];
        if edge.road != Some(player) || visited[edge_id as usize] {
            continue;
        }
        let next = edge.other_end(from);
        visited[edge_id as usize] = true;
        let onward = if blocked(board, player, next) {
            0
        } else {
            walk(board, player, next, visited)
        };
        visited[edge_id as usize] = false;
        best = best.max(1 + onward);
    }
    best
}

fn blocked(board: &Board, player: PlayerId, vertex: VertexId) -> bool {
    board.vertices[vertex as usize]
        .owner()
        .is_some_and(|owner| owner != player)
}

/// Decides who holds a badge given everyone's score.
///
/// The holder needs at least `threshold` and the strict maximum. The
/// incumbent keeps the badge while tied for the maximum; a tie among
/// challengers leaves nobody holding it.
pub fn award_badge(
    scores: &[(PlayerId, u8)],
    incumbent: Option<PlayerId>,
    threshold: u8,
) -> Option<PlayerId> {
    let max = scores.iter().map(|(_, score)| *score).max()?;
    if max < threshold {
        return None;
    }
    if let Some(holder) = incumbent {
        if scores.iter().any(|(id, score)| *id == holder && *score == max) {
            return Some(holder);
        }
    }
    let mut leaders = scores.iter().filter(|(_, score)| *score == max);
    match (leaders.next(), leaders.next()) {
        (Some((id, _)), None) => Some(*id),
        _ => None,
    }
}
