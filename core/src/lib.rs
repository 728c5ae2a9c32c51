#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tilefall engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point and broadcasts [`Event`] values describing what
//! happened. Systems operate on [`Board`] values and never own session state.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tilefall.";

/// Number of columns on the board.
pub const BOARD_COLUMNS: u32 = 9;

/// Number of rows on the board. Row zero is the top of the board.
pub const BOARD_ROWS: u32 = 6;

/// Turn budget granted to a new game.
pub const STARTING_TURNS: u32 = 10;

/// Minimum number of cells a trail must contain.
pub const MIN_TRAIL_LENGTH: usize = 3;

/// Highest stage a surviving piece may carry.
pub const MAX_STAGE: u8 = 2;

/// Stage at which a piece pops on its own.
pub const POP_STAGE: u8 = 3;

const CELL_COUNT: usize = (BOARD_COLUMNS * BOARD_ROWS) as usize;

/// Playable tile categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Red cross.
    Red,
    /// Green triangle.
    Green,
    /// Blue circle.
    Blue,
    /// Purple diamond.
    Purple,
    /// Yellow star.
    Yellow,
}

impl Category {
    /// Every playable category ordered by index.
    pub const ALL: [Category; 5] = [
        Category::Red,
        Category::Green,
        Category::Blue,
        Category::Purple,
        Category::Yellow,
    ];

    /// Zero-based index of the category.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
            Self::Purple => 3,
            Self::Yellow => 4,
        }
    }

    /// Looks up the category stored at the provided index.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Red),
            1 => Some(Self::Green),
            2 => Some(Self::Blue),
            3 => Some(Self::Purple),
            4 => Some(Self::Yellow),
            _ => None,
        }
    }

    /// Lowercase name of the category.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Yellow => "yellow",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Contents of a single board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Permanently unusable cell. Never moves and never changes.
    Blocked,
    /// Cell emptied by a pop and awaiting gravity.
    Empty,
    /// Playable piece.
    Piece {
        /// Category the piece belongs to.
        category: Category,
        /// Growth stage; surviving pieces stay within `0..=MAX_STAGE`.
        stage: u8,
    },
}

impl Tile {
    /// Creates a playable piece.
    #[must_use]
    pub const fn piece(category: Category, stage: u8) -> Self {
        Self::Piece { category, stage }
    }

    /// Category of the tile when it is a piece.
    #[must_use]
    pub const fn category(&self) -> Option<Category> {
        match self {
            Self::Piece { category, .. } => Some(*category),
            Self::Blocked | Self::Empty => None,
        }
    }

    /// Stage of the tile when it is a piece.
    #[must_use]
    pub const fn stage(&self) -> Option<u8> {
        match self {
            Self::Piece { stage, .. } => Some(*stage),
            Self::Blocked | Self::Empty => None,
        }
    }

    /// Reports whether the tile is blocked.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// Reports whether the tile has been emptied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Reports whether the tile is a playable piece.
    #[must_use]
    pub const fn is_piece(&self) -> bool {
        matches!(self, Self::Piece { .. })
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    column: u32,
    row: u32,
}

impl Cell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell, counted from the top.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Chebyshev distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: Cell) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }

    /// Orthogonal neighbours in left, right, below, above order.
    ///
    /// Neighbours that would fall off the top or left edge are `None`;
    /// callers still need to bounds check the right and bottom edges.
    #[must_use]
    pub fn orthogonal_neighbors(self) -> [Option<Cell>; 4] {
        [
            self.column.checked_sub(1).map(|column| Cell::new(column, self.row)),
            Some(Cell::new(self.column + 1, self.row)),
            Some(Cell::new(self.column, self.row + 1)),
            self.row.checked_sub(1).map(|row| Cell::new(self.column, row)),
        ]
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.column, self.row)
    }
}

/// Source of freshly generated pieces.
///
/// Implementations must draw categories uniformly over [`Category::ALL`] and
/// stages uniformly over `0..=MAX_STAGE`. Keeping the source injectable lets
/// tests replay cascades deterministically.
pub trait TileSource: fmt::Debug {
    /// Draws the category of the next generated piece.
    fn next_category(&mut self) -> Category;

    /// Draws the starting stage of the next generated piece.
    fn next_stage(&mut self) -> u8;

    /// Generates a piece for a brand-new board.
    fn fresh_piece(&mut self) -> Tile {
        let category = self.next_category();
        Tile::piece(category, self.next_stage())
    }

    /// Generates a piece used to refill the top of a column.
    fn refill_piece(&mut self) -> Tile {
        Tile::piece(self.next_category(), 0)
    }
}

/// Fixed 9×6 board whose four corners are always blocked.
///
/// Serialized as its column-major tile list; deserialization rejects lists
/// that break the board shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct Board {
    tiles: Vec<Tile>,
}

impl Board {
    /// Builds a board by asking `fill` for every non-corner cell.
    ///
    /// Corners are blocked regardless of what `fill` would return for them.
    pub fn from_fn<F>(mut fill: F) -> Self
    where
        F: FnMut(Cell) -> Tile,
    {
        let tiles = Self::cells()
            .map(|cell| {
                if Self::is_corner(cell) {
                    Tile::Blocked
                } else {
                    fill(cell)
                }
            })
            .collect();
        Self { tiles }
    }

    /// Builds a board where every non-corner cell holds the same tile.
    #[must_use]
    pub fn uniform(tile: Tile) -> Self {
        Self::from_fn(|_| tile)
    }

    /// Generates a new random board from the provided source.
    pub fn generate(source: &mut dyn TileSource) -> Self {
        Self::from_fn(|_| source.fresh_piece())
    }

    /// Reports whether the cell is one of the four permanently blocked corners.
    #[must_use]
    pub const fn is_corner(cell: Cell) -> bool {
        (cell.column == 0 || cell.column == BOARD_COLUMNS - 1)
            && (cell.row == 0 || cell.row == BOARD_ROWS - 1)
    }

    /// Reports whether the cell lies within the board.
    #[must_use]
    pub const fn contains(cell: Cell) -> bool {
        cell.column < BOARD_COLUMNS && cell.row < BOARD_ROWS
    }

    /// Iterates every cell in column-major order, top to bottom within a column.
    pub fn cells() -> impl Iterator<Item = Cell> {
        (0..BOARD_COLUMNS).flat_map(|column| (0..BOARD_ROWS).map(move |row| Cell::new(column, row)))
    }

    /// Tile stored at the provided cell, if it lies within the board.
    #[must_use]
    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        Self::index(cell).and_then(|index| self.tiles.get(index).copied())
    }

    /// Replaces the tile stored at the provided cell.
    ///
    /// Returns `false` and leaves the board untouched when the cell is out of
    /// bounds or a corner.
    pub fn set(&mut self, cell: Cell, tile: Tile) -> bool {
        if Self::is_corner(cell) {
            return false;
        }
        match Self::index(cell).and_then(|index| self.tiles.get_mut(index)) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    /// Increments the stage of the piece at `cell`, returning the new stage.
    ///
    /// Blocked, empty, and out-of-bounds cells are left untouched.
    pub fn grow(&mut self, cell: Cell) -> Option<u8> {
        let slot = Self::index(cell).and_then(|index| self.tiles.get_mut(index))?;
        match slot {
            Tile::Piece { stage, .. } => {
                *stage = stage.saturating_add(1);
                Some(*stage)
            }
            Tile::Blocked | Tile::Empty => None,
        }
    }

    /// Iterates every cell together with its tile in column-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, Tile)> + '_ {
        Self::cells().zip(self.tiles.iter().copied())
    }

    /// First empty cell in column-major order, if any.
    #[must_use]
    pub fn first_empty(&self) -> Option<Cell> {
        self.iter()
            .find(|(_, tile)| tile.is_empty())
            .map(|(cell, _)| cell)
    }

    fn index(cell: Cell) -> Option<usize> {
        if !Self::contains(cell) {
            return None;
        }
        let index = usize::try_from(cell.column * BOARD_ROWS + cell.row).ok()?;
        (index < CELL_COUNT).then_some(index)
    }
}

/// Reasons a column-major tile list cannot form a [`Board`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BoardShapeError {
    /// The list does not hold exactly one tile per cell.
    #[error("board holds {length} tiles, expected {}", CELL_COUNT)]
    WrongLength {
        /// Number of tiles supplied.
        length: usize,
    },
    /// A corner holds something other than [`Tile::Blocked`].
    #[error("corner {cell} is not blocked")]
    CornerNotBlocked {
        /// Offending corner.
        cell: Cell,
    },
}

impl TryFrom<Vec<Tile>> for Board {
    type Error = BoardShapeError;

    fn try_from(tiles: Vec<Tile>) -> Result<Self, Self::Error> {
        if tiles.len() != CELL_COUNT {
            return Err(BoardShapeError::WrongLength {
                length: tiles.len(),
            });
        }
        let board = Self { tiles };
        let open_corner = board
            .iter()
            .find(|&(cell, tile)| Self::is_corner(cell) && !tile.is_blocked());
        match open_corner {
            Some((cell, _)) => Err(BoardShapeError::CornerNotBlocked { cell }),
            None => Ok(board),
        }
    }
}

impl From<Board> for Vec<Tile> {
    fn from(board: Board) -> Self {
        board.tiles
    }
}

/// Per-column record of the lowest popped row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColumnMarks {
    lowest: [Option<u32>; BOARD_COLUMNS as usize],
}

impl ColumnMarks {
    /// Creates an empty set of marks.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lowest: [None; BOARD_COLUMNS as usize],
        }
    }

    /// Records a pop at `cell`, keeping the largest row index per column.
    pub fn record(&mut self, cell: Cell) {
        let Some(slot) = usize::try_from(cell.column)
            .ok()
            .and_then(|column| self.lowest.get_mut(column))
        else {
            return;
        };
        if slot.map_or(true, |row| row < cell.row) {
            *slot = Some(cell.row);
        }
    }

    /// Lowest popped row within `column`, if any pop occurred there.
    #[must_use]
    pub fn lowest(&self, column: u32) -> Option<u32> {
        usize::try_from(column)
            .ok()
            .and_then(|column| self.lowest.get(column).copied().flatten())
    }

    /// Iterates `(column, lowest_row)` for every column that saw a pop.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..BOARD_COLUMNS).filter_map(|column| self.lowest(column).map(|row| (column, row)))
    }

    /// Reports whether no pop was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lowest.iter().all(Option::is_none)
    }
}

/// Ordered list of cells submitted as one move.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trail {
    cells: Vec<Cell>,
}

impl Trail {
    /// Creates a trail from the provided cells.
    #[must_use]
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Cells composing the trail in submission order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells in the trail, repeats included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the trail has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First cell of the trail.
    #[must_use]
    pub fn first(&self) -> Option<Cell> {
        self.cells.first().copied()
    }
}

impl From<Vec<Cell>> for Trail {
    fn from(cells: Vec<Cell>) -> Self {
        Self::new(cells)
    }
}

/// Captured session state used for persistence and restoration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Board layout.
    pub board: Board,
    /// Accumulated score.
    pub score: u64,
    /// Turns left before the game ends.
    pub turns_remaining: u32,
}

/// Lifecycle of the running game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// Moves are accepted.
    Playing,
    /// The turn budget is exhausted.
    Finished,
}

/// Reasons a trail is refused before any mutation happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MoveRejection {
    /// The trail holds fewer than [`MIN_TRAIL_LENGTH`] cells.
    #[error("Moves should be 3+ tiles.")]
    TooShort {
        /// Number of cells that were submitted.
        length: usize,
    },
    /// A cell lies outside the board.
    #[error("Move {position} is outside the board. Cannot do move.")]
    OutOfBounds {
        /// One-based position of the offending cell.
        position: usize,
    },
    /// The first cell is blocked or empty.
    #[error("Move 1 does not start on a playable tile. Cannot do move.")]
    UnplayableStart,
    /// Two consecutive cells are not 8-directionally adjacent.
    #[error("Move {position} not adjacent tiles. Cannot do move.")]
    NotAdjacent {
        /// One-based position of the second cell of the pair.
        position: usize,
    },
    /// A cell holds a different category than the first cell.
    #[error("Move {position} not same type. Cannot do move.")]
    CategoryMismatch {
        /// One-based position of the offending cell.
        position: usize,
    },
    /// The turn budget has already been spent.
    #[error("The game is over, no more moves are accepted.")]
    GameFinished,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Discards the current session and deals a fresh random board.
    NewGame,
    /// Replaces the current session with a previously captured snapshot.
    Restore {
        /// Session state to adopt.
        snapshot: SessionSnapshot,
    },
    /// Plays a trail as the next turn.
    PlayTrail {
        /// Cells submitted by the player.
        trail: Trail,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A fresh game was dealt.
    GameStarted {
        /// Turn budget of the new game.
        turns_remaining: u32,
    },
    /// A snapshot was adopted.
    SessionRestored {
        /// Score carried over from the snapshot.
        score: u64,
        /// Turns carried over from the snapshot.
        turns_remaining: u32,
    },
    /// A trail was refused; the board is unchanged.
    TrailRejected {
        /// Why the trail was refused.
        reason: MoveRejection,
    },
    /// Cells emptied by the trail and the cascade it triggered, in pop order.
    TilesPopped {
        /// Popped cells.
        cells: Vec<Cell>,
    },
    /// Score granted for the resolved turn.
    ScoreAwarded {
        /// Base score contributed by the trail tiles.
        base: u64,
        /// Number of popped cells.
        chain: u32,
        /// Score added to the session.
        delta: u64,
        /// Session score after the award.
        total: u64,
    },
    /// Gravity compacted the marked columns and refilled the top.
    BoardSettled {
        /// Number of cells that received fresh pieces.
        refilled: u32,
    },
    /// A turn was spent.
    TurnConsumed {
        /// Turns left after the move.
        turns_remaining: u32,
    },
    /// The turn budget is exhausted.
    GameOver {
        /// Score at the end of the game.
        final_score: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn corners_are_blocked_on_every_constructor() {
        let board = Board::uniform(Tile::piece(Category::Red, 0));
        for cell in [
            Cell::new(0, 0),
            Cell::new(0, BOARD_ROWS - 1),
            Cell::new(BOARD_COLUMNS - 1, 0),
            Cell::new(BOARD_COLUMNS - 1, BOARD_ROWS - 1),
        ] {
            assert_eq!(board.tile(cell), Some(Tile::Blocked));
        }
        let blocked = board.iter().filter(|(_, tile)| tile.is_blocked()).count();
        assert_eq!(blocked, 4);
    }

    #[test]
    fn set_refuses_corners_and_out_of_bounds_cells() {
        let mut board = Board::uniform(Tile::piece(Category::Blue, 1));
        assert!(!board.set(Cell::new(0, 0), Tile::Empty));
        assert!(!board.set(Cell::new(BOARD_COLUMNS, 0), Tile::Empty));
        assert!(board.set(Cell::new(4, 3), Tile::Empty));
        assert_eq!(board.tile(Cell::new(0, 0)), Some(Tile::Blocked));
        assert_eq!(board.first_empty(), Some(Cell::new(4, 3)));
    }

    #[test]
    fn grow_only_affects_pieces() {
        let mut board = Board::uniform(Tile::piece(Category::Green, 2));
        assert_eq!(board.grow(Cell::new(1, 1)), Some(3));
        assert_eq!(board.grow(Cell::new(0, 0)), None);
        assert!(board.set(Cell::new(2, 2), Tile::Empty));
        assert_eq!(board.grow(Cell::new(2, 2)), None);
        assert_eq!(board.tile(Cell::new(2, 2)), Some(Tile::Empty));
    }

    #[test]
    fn chebyshev_distance_counts_diagonals_as_one() {
        let origin = Cell::new(3, 3);
        assert_eq!(origin.chebyshev_distance(Cell::new(4, 4)), 1);
        assert_eq!(origin.chebyshev_distance(Cell::new(3, 3)), 0);
        assert_eq!(origin.chebyshev_distance(Cell::new(1, 4)), 2);
    }

    #[test]
    fn orthogonal_neighbors_follow_left_right_below_above() {
        assert_eq!(
            Cell::new(2, 3).orthogonal_neighbors(),
            [
                Some(Cell::new(1, 3)),
                Some(Cell::new(3, 3)),
                Some(Cell::new(2, 4)),
                Some(Cell::new(2, 2)),
            ]
        );
        let corner = Cell::new(0, 0).orthogonal_neighbors();
        assert_eq!(corner[0], None);
        assert_eq!(corner[3], None);
    }

    #[test]
    fn column_marks_keep_lowest_row() {
        let mut marks = ColumnMarks::new();
        assert!(marks.is_empty());
        marks.record(Cell::new(2, 1));
        marks.record(Cell::new(2, 4));
        marks.record(Cell::new(2, 3));
        marks.record(Cell::new(5, 0));
        assert_eq!(marks.lowest(2), Some(4));
        assert_eq!(marks.iter().collect::<Vec<_>>(), vec![(2, 4), (5, 0)]);
    }

    #[test]
    fn category_index_matches_lookup() {
        for category in Category::ALL {
            assert_eq!(Category::from_index(category.index()), Some(category));
        }
        assert_eq!(Category::from_index(5), None);
    }

    #[test]
    fn board_round_trips_through_bincode() {
        let board = Board::from_fn(|cell| {
            let category = Category::ALL[(cell.column() as usize) % Category::ALL.len()];
            Tile::piece(category, (cell.row() % 3) as u8)
        });
        assert_round_trip(&board);
    }

    #[test]
    fn deserializing_a_misshapen_board_fails() {
        let short = bincode::serialize(&vec![Tile::Blocked; CELL_COUNT - 1]).expect("serialize");
        assert!(bincode::deserialize::<Board>(&short).is_err());

        let mut tiles = vec![Tile::piece(Category::Red, 0); CELL_COUNT];
        tiles[0] = Tile::Blocked;
        tiles[5] = Tile::Blocked;
        tiles[48] = Tile::Blocked;
        let open_corner = bincode::serialize(&tiles).expect("serialize");
        assert!(bincode::deserialize::<Board>(&open_corner).is_err());

        assert_eq!(
            Board::try_from(tiles),
            Err(BoardShapeError::CornerNotBlocked {
                cell: Cell::new(BOARD_COLUMNS - 1, BOARD_ROWS - 1)
            })
        );
        assert_eq!(
            Board::try_from(Vec::new()),
            Err(BoardShapeError::WrongLength { length: 0 })
        );
    }

    #[test]
    fn move_rejection_round_trips_through_bincode() {
        assert_round_trip(&MoveRejection::NotAdjacent { position: 4 });
    }

    #[test]
    fn rejection_messages_use_one_based_positions() {
        assert_eq!(
            MoveRejection::CategoryMismatch { position: 3 }.to_string(),
            "Move 3 not same type. Cannot do move."
        );
    }
}
