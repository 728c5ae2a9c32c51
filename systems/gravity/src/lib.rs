#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Gravity and refill applied after a cascade settles.
//!
//! Only columns that saw a pop are touched. Each is scanned from its lowest
//! popped row up to the top while tallying the gaps below; pieces drop by the
//! tally and the topmost gaps receive fresh pieces. Blocked cells count as
//! gaps so pieces compact around them, but they never move.

use tilefall_core::{Board, Cell, ColumnMarks, Tile, TileSource};

/// Summary of a settle pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettleReport {
    /// Pieces that dropped to a lower row.
    pub moved: u32,
    /// Cells that received freshly generated pieces.
    pub refilled: u32,
}

/// Drops surviving pieces in every marked column and refills the top.
pub fn settle(board: &mut Board, marks: &ColumnMarks, source: &mut dyn TileSource) -> SettleReport {
    let mut report = SettleReport::default();

    for (column, lowest) in marks.iter() {
        let mut gaps: u32 = 0;
        for row in (0..=lowest).rev() {
            let cell = Cell::new(column, row);
            let Some(tile) = board.tile(cell) else {
                continue;
            };
            if !tile.is_piece() {
                gaps += 1;
                continue;
            }

            let mut destination = row + gaps;
            while destination > row && is_blocked(board, Cell::new(column, destination)) {
                gaps -= 1;
                destination -= 1;
            }
            if destination != row && board.set(Cell::new(column, destination), tile) {
                report.moved += 1;
            }
        }

        for row in 0..gaps {
            let cell = Cell::new(column, row);
            if is_blocked(board, cell) {
                continue;
            }
            if board.set(cell, source.refill_piece()) {
                report.refilled += 1;
            }
        }
        log::trace!("column {column} settled from row {lowest} with {gaps} gaps");
    }

    log::debug!(
        "gravity moved {} pieces and refilled {} cells",
        report.moved,
        report.refilled
    );
    report
}

fn is_blocked(board: &Board, cell: Cell) -> bool {
    board.tile(cell).map_or(false, |tile| matches!(tile, Tile::Blocked))
}
