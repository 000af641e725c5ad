//! Move legalization: turns two chosen dots into the unit edges to draw.
//!
//! Planning never touches the board. `apply_plan` is the only writer.

use crate::engine::models::PlayerId;
use crate::games::diamond::errors::MoveError;
use crate::games::diamond::lattice::Lattice;
use crate::games::diamond::types::*;

/// Allowed deviation, in degrees, from a lattice axis.
pub const ANGLE_TOLERANCE: f64 = 1.5;
const COLLINEAR_EPSILON: f64 = 1e-6;
const LATTICE_ANGLES: [f64; 4] = [0.0, 60.0, 120.0, 180.0];

/// A legal move, ready to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// Dots on the line, sorted along it.
    pub chain: Vec<GridPos>,
    /// Every unit edge covered by the line.
    pub segments: Vec<EdgeId>,
    /// Segments not drawn yet; these become owned by the mover.
    pub fresh: Vec<EdgeId>,
    /// Segments already owned by someone else; marked as shared.
    pub shared: Vec<EdgeId>,
}

/// Angle of `a -> b` in degrees, in `(-180, 180]`.
pub fn segment_angle(a: &Dot, b: &Dot) -> f64 {
    (b.y - a.y).atan2(b.x - a.x).to_degrees()
}

pub fn is_lattice_direction(angle: f64) -> bool {
    let abs = angle.abs();
    LATTICE_ANGLES.iter().any(|t| (abs - t).abs() < ANGLE_TOLERANCE)
}

/// All dots lying on segment `a`-`b`, ordered by x and then by y.
pub fn collinear_chain(lattice: &Lattice, a: &Dot, b: &Dot) -> Vec<GridPos> {
    let min_x = a.x.min(b.x) - 1.0;
    let max_x = a.x.max(b.x) + 1.0;
    let min_y = a.y.min(b.y) - 1.0;
    let max_y = a.y.max(b.y) + 1.0;

    let mut on_line: Vec<&Dot> = lattice
        .dots()
        .iter()
        .filter(|p| p.x >= min_x && p.x <= max_x && p.y >= min_y && p.y <= max_y)
        .filter(|p| {
            let cross = (b.y - a.y) * (p.x - b.x) - (p.y - b.y) * (b.x - a.x);
            cross.abs() < COLLINEAR_EPSILON
        })
        .collect();

    on_line.sort_by(|p, q| {
        if (p.x - q.x).abs() > COLLINEAR_EPSILON {
            p.x.total_cmp(&q.x)
        } else {
            p.y.total_cmp(&q.y)
        }
    });
    on_line.into_iter().map(|d| d.pos).collect()
}

/// Validate a chord from `from` to `to` for `player`.
pub fn plan_chord(
    lattice: &Lattice,
    edges: &[EdgeState],
    player: PlayerId,
    from: GridPos,
    to: GridPos,
    limit: &DrawLimit,
) -> Result<MovePlan, MoveError> {
    let a = lattice.dot_at(from).ok_or(MoveError::UnknownDot { pos: from })?;
    let b = lattice.dot_at(to).ok_or(MoveError::UnknownDot { pos: to })?;

    if from != to {
        let angle = segment_angle(a, b);
        if !is_lattice_direction(angle) {
            return Err(MoveError::InvalidDirection { angle });
        }
    }

    let chain = collinear_chain(lattice, a, b);
    let segment_count = chain.len().saturating_sub(1);
    if segment_count == 0 {
        return Err(MoveError::NoSegments);
    }

    match limit {
        DrawLimit::Invalid(raw) => {
            return Err(MoveError::InvalidConfiguration {
                reason: format!("{raw:?} is not a number greater than 0"),
            });
        }
        DrawLimit::Segments(max) if segment_count > *max => {
            return Err(MoveError::TooLong {
                segments: segment_count,
                limit: *max,
            });
        }
        DrawLimit::Segments(_) => {}
    }

    let mut segments = Vec::with_capacity(segment_count);
    for pair in chain.windows(2) {
        let key = EdgeKey::new(pair[0], pair[1]);
        let id = lattice.edge_id(&key).ok_or(MoveError::Misaligned { key })?;
        segments.push(id);
    }

    classify(chain, segments, edges, player)
}

/// Validate drawing the single edge `key` for `player`.
pub fn plan_edge(
    lattice: &Lattice,
    edges: &[EdgeState],
    player: PlayerId,
    key: EdgeKey,
) -> Result<MovePlan, MoveError> {
    let id = lattice.edge_id(&key).ok_or(MoveError::UnknownEdge { key })?;
    let (a, b) = key.endpoints();
    classify(vec![a, b], vec![id], edges, player)
}

fn classify(
    chain: Vec<GridPos>,
    segments: Vec<EdgeId>,
    edges: &[EdgeState],
    player: PlayerId,
) -> Result<MovePlan, MoveError> {
    let mut fresh = Vec::new();
    let mut shared = Vec::new();
    for &id in &segments {
        let edge = &edges[id];
        if !edge.drawn {
            fresh.push(id);
        } else if edge.owner.is_some_and(|owner| owner != player) {
            shared.push(id);
        }
    }
    if fresh.is_empty() {
        return Err(MoveError::NoOp);
    }
    Ok(MovePlan {
        chain,
        segments,
        fresh,
        shared,
    })
}

/// Write a plan onto the board. Scoring and turn order are handled elsewhere.
pub fn apply_plan(state: &mut DiamondState, plan: &MovePlan, player: PlayerId) {
    for &id in &plan.fresh {
        let edge = &mut state.edges[id];
        edge.drawn = true;
        edge.owner = Some(player);
    }
    for &id in &plan.shared {
        state.edges[id].shared_by = Some(player);
    }
    state.drawn_count += plan.fresh.len();
}
