#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure move validation system.
//!
//! Turns a line of player text into a [`Trail`] and checks the trail against
//! an immutable [`Board`] before the world is allowed to resolve it. Nothing
//! in this crate mutates the board.

use thiserror::Error;
use tilefall_core::{Board, Cell, MoveRejection, Trail, MIN_TRAIL_LENGTH};

/// Keywords that end the session. Matched exactly, before whitespace stripping.
pub const QUIT_KEYWORDS: [&str; 2] = ["quit", "Quit"];

/// Characters used by a single encoded point plus its trailing separator.
const POINT_STRIDE: usize = 6;

/// Shortest encoding that can hold one point: `{(x,y)}`.
const MIN_ENCODED_LENGTH: usize = POINT_STRIDE + 1;

/// Decoded line of player input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerInput {
    /// The player asked to leave the game.
    Quit,
    /// The player submitted a trail.
    Trail(Trail),
}

/// Reasons a line of move text could not be decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum InputFormatError {
    /// The stripped text does not have the length of a whole number of points.
    #[error("move text of length {length} is not a list of points")]
    Length {
        /// Length of the whitespace-stripped text.
        length: usize,
    },
    /// The text is not wrapped in braces.
    #[error("move text must be wrapped in braces")]
    MissingBraces,
    /// A point is not written as `(x,y)` with single digits.
    #[error("point {position} is not written as (x,y)")]
    MalformedPoint {
        /// One-based position of the point.
        position: usize,
    },
    /// Two points are not separated by a comma.
    #[error("point {position} is not followed by a comma")]
    MissingSeparator {
        /// One-based position of the point before the separator.
        position: usize,
    },
}

/// Decodes a raw input line into a quit request or a trail.
pub fn parse_input(line: &str) -> Result<PlayerInput, InputFormatError> {
    if QUIT_KEYWORDS.contains(&line) {
        return Ok(PlayerInput::Quit);
    }

    let compact: Vec<u8> = line
        .chars()
        .filter(|character| !character.is_whitespace())
        .collect::<String>()
        .into_bytes();
    let length = compact.len();
    if length < MIN_ENCODED_LENGTH || length % POINT_STRIDE != 1 {
        return Err(InputFormatError::Length { length });
    }
    if compact.first() != Some(&b'{') || compact.last() != Some(&b'}') {
        return Err(InputFormatError::MissingBraces);
    }

    let point_count = (length - 1) / POINT_STRIDE;
    let mut cells = Vec::with_capacity(point_count);
    for (index, chunk) in compact[1..].chunks_exact(POINT_STRIDE).enumerate() {
        let position = index + 1;
        let cell = parse_point(&chunk[..POINT_STRIDE - 1])
            .ok_or(InputFormatError::MalformedPoint { position })?;
        let expected_separator = if position == point_count { b'}' } else { b',' };
        if chunk[POINT_STRIDE - 1] != expected_separator {
            return Err(InputFormatError::MissingSeparator { position });
        }
        cells.push(cell);
    }

    log::trace!("parsed trail of {} points", cells.len());
    Ok(PlayerInput::Trail(Trail::new(cells)))
}

fn parse_point(point: &[u8]) -> Option<Cell> {
    match point {
        [b'(', column, b',', row, b')'] if column.is_ascii_digit() && row.is_ascii_digit() => {
            Some(Cell::new(u32::from(column - b'0'), u32::from(row - b'0')))
        }
        _ => None,
    }
}

/// Checks a trail against the board without mutating it.
///
/// Checks run in a fixed order: length, bounds, starting tile, then each
/// consecutive pair for adjacency followed by category.
pub fn validate(board: &Board, trail: &Trail) -> Result<(), MoveRejection> {
    let cells = trail.cells();
    if cells.len() < MIN_TRAIL_LENGTH {
        return Err(MoveRejection::TooShort {
            length: cells.len(),
        });
    }

    if let Some(index) = cells.iter().position(|cell| !Board::contains(*cell)) {
        return Err(MoveRejection::OutOfBounds { position: index + 1 });
    }

    let category = trail
        .first()
        .and_then(|cell| board.tile(cell))
        .and_then(|tile| tile.category())
        .ok_or(MoveRejection::UnplayableStart)?;

    for (index, pair) in cells.windows(2).enumerate() {
        let position = index + 2;
        if pair[0].chebyshev_distance(pair[1]) != 1 {
            return Err(MoveRejection::NotAdjacent { position });
        }
        if board.tile(pair[1]).and_then(|tile| tile.category()) != Some(category) {
            return Err(MoveRejection::CategoryMismatch { position });
        }
    }

    Ok(())
}
