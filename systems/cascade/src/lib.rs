#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pop and cascade resolution for a validated trail.
//!
//! Popping is a breadth-first propagation driven by a FIFO work queue: every
//! popped cell grows its orthogonal neighbours, and a neighbour whose stage
//! reaches [`POP_STAGE`] is queued to pop in turn. Queue order is the only
//! source of ordering, so identical boards and trails always cascade
//! identically.

use std::collections::VecDeque;

use tilefall_core::{Board, Cell, ColumnMarks, Tile, Trail, POP_STAGE};

/// Points granted per trail tile before stage and length scaling.
const TILE_POINTS: u64 = 10;
/// Divisor applied to each scaled trail tile contribution.
const TILE_DIVISOR: u64 = 4;
/// Divisor applied to the chain bonus.
const CHAIN_DIVISOR: u64 = 5;

/// Result of resolving one trail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Score contributed by the trail tiles alone.
    pub base_score: u64,
    /// Number of distinct cells popped, trail cells included.
    pub chain: u32,
    /// Score to add to the session.
    pub score_delta: u64,
    /// Lowest popped row per column, consumed by gravity.
    pub marks: ColumnMarks,
    /// Popped cells in pop order.
    pub popped: Vec<Cell>,
}

/// Score granted for a trail: the base plus a fifth of the base per chained pop.
#[must_use]
pub fn score_delta(base_score: u64, chain: u32) -> u64 {
    base_score + base_score * u64::from(chain) / CHAIN_DIVISOR
}

/// Contribution of one trail tile to the base score.
#[must_use]
pub fn tile_score(stage: u8, trail_length: usize) -> u64 {
    let length = u64::try_from(trail_length).unwrap_or(u64::MAX);
    TILE_POINTS.saturating_mul((u64::from(stage) + 1).saturating_mul(length)) / TILE_DIVISOR
}

/// Pops the trail and every cascade it triggers, mutating `board` in place.
///
/// The trail is expected to have passed validation; cells that are already
/// empty (repeated cells) are skipped rather than scored twice.
pub fn resolve(board: &mut Board, trail: &Trail) -> CascadeOutcome {
    let mut queue: VecDeque<Cell> = VecDeque::with_capacity(trail.len());
    let mut base_score = 0;

    for &cell in trail.cells() {
        let Some(Tile::Piece { stage, .. }) = board.tile(cell) else {
            continue;
        };
        base_score += tile_score(stage, trail.len());
        let _ = board.set(cell, Tile::Empty);
        queue.push_back(cell);
    }

    let mut marks = ColumnMarks::new();
    let mut popped = Vec::with_capacity(queue.len());
    while let Some(cell) = queue.pop_front() {
        let _ = board.set(cell, Tile::Empty);
        marks.record(cell);
        popped.push(cell);

        for neighbor in cell.orthogonal_neighbors().into_iter().flatten() {
            if board.grow(neighbor) == Some(POP_STAGE) {
                log::trace!("{neighbor} reached pop stage after {cell} popped");
                queue.push_back(neighbor);
            }
        }
    }

    let chain = u32::try_from(popped.len()).unwrap_or(u32::MAX);
    let score_delta = score_delta(base_score, chain);
    log::debug!("cascade popped {chain} cells, base {base_score}, delta {score_delta}");

    CascadeOutcome {
        base_score,
        chain,
        score_delta,
        marks,
        popped,
    }
}
