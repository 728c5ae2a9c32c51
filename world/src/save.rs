//! Plain-text save format for an in-progress session.
//!
//! ```text
//! -JGRAPHFALL2021CULTICE SCORE-
//! #<score>
//! #<turns>
//! <column 0: six hex digits, top row first>
//! ...
//! <column 8>
//! ```
//!
//! Each digit packs a piece as `3 * category + stage`; `f` marks a blocked
//! cell.

use std::fmt::Write as _;

use thiserror::Error;
use tilefall_core::{
    Board, Category, Cell, SessionSnapshot, Tile, BOARD_COLUMNS, BOARD_ROWS, MAX_STAGE,
    STARTING_TURNS,
};

/// First line of every save file.
pub const SAVE_HEADER: &str = "-JGRAPHFALL2021CULTICE SCORE-";

/// First line written over the save file once the game ends.
pub const GAME_OVER_HEADER: &str = "SAVE COMPLETE, GAME OVER";

const COUNTER_PREFIX: char = '#';
const BLOCKED_DIGIT: u32 = 0xf;
const STAGES_PER_CATEGORY: u32 = MAX_STAGE as u32 + 1;

/// Errors raised while encoding or decoding a save.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SaveError {
    /// The first line is not [`SAVE_HEADER`].
    #[error("save file does not start with the expected header")]
    InvalidHeader,
    /// A counter line is missing, lacks its `#` prefix, or is not a number.
    #[error("{field} line {line:?} is not a '#' followed by digits")]
    InvalidCounter {
        /// Which counter was being read.
        field: &'static str,
        /// Offending line, empty when the file ended early.
        line: String,
    },
    /// The stored turn budget lies outside `1..=10`.
    #[error("turn count {turns} is outside 1..={STARTING_TURNS}")]
    TurnsOutOfRange {
        /// Parsed turn count.
        turns: u64,
    },
    /// The file ended before every column was read.
    #[error("column {column} is missing")]
    MissingColumn {
        /// Zero-based column index.
        column: u32,
    },
    /// A column line does not hold exactly one digit per row.
    #[error("column {column} holds {length} digits, expected {BOARD_ROWS}")]
    InvalidColumnLength {
        /// Zero-based column index.
        column: u32,
        /// Number of characters found.
        length: usize,
    },
    /// A column holds a character that does not decode to a tile.
    #[error("column {column} row {row} holds invalid digit {digit:?}")]
    InvalidDigit {
        /// Zero-based column index.
        column: u32,
        /// Zero-based row index.
        row: u32,
        /// Offending character.
        digit: char,
    },
    /// A corner decoded to something other than a blocked cell.
    #[error("corner {cell} must be blocked")]
    CornerNotBlocked {
        /// Offending corner.
        cell: Cell,
    },
    /// The board still holds an empty cell and cannot be written.
    #[error("cell {cell} is empty; only settled boards can be saved")]
    UnsettledBoard {
        /// First empty cell found.
        cell: Cell,
    },
    /// A piece carries a stage that cannot be packed into one digit.
    #[error("piece at {cell} is past the highest stage")]
    OvergrownPiece {
        /// Offending cell.
        cell: Cell,
    },
}

/// Serialises a settled session into the save format.
pub fn encode(snapshot: &SessionSnapshot) -> Result<String, SaveError> {
    let mut text = String::with_capacity(64 + (BOARD_COLUMNS * (BOARD_ROWS + 1)) as usize);
    let _ = writeln!(text, "{SAVE_HEADER}");
    let _ = writeln!(text, "{COUNTER_PREFIX}{}", snapshot.score);
    let _ = writeln!(text, "{COUNTER_PREFIX}{}", snapshot.turns_remaining);

    for column in 0..BOARD_COLUMNS {
        for row in 0..BOARD_ROWS {
            let cell = Cell::new(column, row);
            let digit = match snapshot.board.tile(cell) {
                Some(Tile::Blocked) | None => BLOCKED_DIGIT,
                Some(Tile::Empty) => return Err(SaveError::UnsettledBoard { cell }),
                Some(Tile::Piece { category, stage }) => {
                    if stage > MAX_STAGE {
                        return Err(SaveError::OvergrownPiece { cell });
                    }
                    u32::from(category.index()) * STAGES_PER_CATEGORY + u32::from(stage)
                }
            };
            if let Some(symbol) = char::from_digit(digit, 16) {
                text.push(symbol);
            }
        }
        text.push('\n');
    }

    Ok(text)
}

/// Parses a save produced by [`encode`].
pub fn decode(text: &str) -> Result<SessionSnapshot, SaveError> {
    let mut lines = text.lines();
    if lines.next() != Some(SAVE_HEADER) {
        return Err(SaveError::InvalidHeader);
    }

    let score = parse_counter("score", lines.next())?;
    let turns = parse_counter("turns", lines.next())?;
    if turns == 0 || turns > u64::from(STARTING_TURNS) {
        return Err(SaveError::TurnsOutOfRange { turns });
    }
    let turns_remaining = u32::try_from(turns).map_err(|_| SaveError::TurnsOutOfRange { turns })?;

    let mut tiles = vec![Tile::Blocked; (BOARD_COLUMNS * BOARD_ROWS) as usize];
    for column in 0..BOARD_COLUMNS {
        let line = lines.next().ok_or(SaveError::MissingColumn { column })?;
        let length = line.chars().count();
        if length != BOARD_ROWS as usize {
            return Err(SaveError::InvalidColumnLength { column, length });
        }
        for (row, digit) in (0..BOARD_ROWS).zip(line.chars()) {
            let cell = Cell::new(column, row);
            let tile = decode_digit(digit).ok_or(SaveError::InvalidDigit { column, row, digit })?;
            if Board::is_corner(cell) && !tile.is_blocked() {
                return Err(SaveError::CornerNotBlocked { cell });
            }
            tiles[(column * BOARD_ROWS + row) as usize] = tile;
        }
    }

    let board = Board::from_fn(|cell| tiles[(cell.column() * BOARD_ROWS + cell.row()) as usize]);

    Ok(SessionSnapshot {
        board,
        score,
        turns_remaining,
    })
}

/// Text written over the save file once the game is over.
#[must_use]
pub fn game_over_note(score: u64) -> String {
    format!("{GAME_OVER_HEADER}\nSCORE: {score}\n")
}

fn parse_counter(field: &'static str, line: Option<&str>) -> Result<u64, SaveError> {
    let invalid = || SaveError::InvalidCounter {
        field,
        line: line.unwrap_or_default().to_owned(),
    };
    let digits = line
        .and_then(|line| line.strip_prefix(COUNTER_PREFIX))
        .ok_or_else(invalid)?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(invalid());
    }
    digits.parse().map_err(|_| invalid())
}

fn decode_digit(digit: char) -> Option<Tile> {
    let value = digit.to_digit(16)?;
    if value == BLOCKED_DIGIT {
        return Some(Tile::Blocked);
    }
    let category = Category::from_index(u8::try_from(value / STAGES_PER_CATEGORY).ok()?)?;
    let stage = u8::try_from(value % STAGES_PER_CATEGORY).ok()?;
    Some(Tile::piece(category, stage))
}
