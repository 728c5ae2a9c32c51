use tilefall_core::{Board, Category, Cell, ColumnMarks, Tile, TileSource, Trail};
use tilefall_system_cascade::resolve;
use tilefall_system_gravity::{settle, SettleReport};

/// Cycles through categories and always offers the highest stage so refills
/// visibly reset it.
#[derive(Debug, Default)]
struct CyclingTiles {
    next: usize,
}

impl TileSource for CyclingTiles {
    fn next_category(&mut self) -> Category {
        let category = Category::ALL[self.next % Category::ALL.len()];
        self.next += 1;
        category
    }

    fn next_stage(&mut self) -> u8 {
        2
    }
}

fn pop(board: &mut Board, marks: &mut ColumnMarks, cell: Cell) {
    assert!(board.set(cell, Tile::Empty));
    marks.record(cell);
}

#[test]
fn pieces_drop_over_gaps_and_top_is_refilled() {
    let column = 3;
    let pieces: Vec<Tile> = (0..6)
        .map(|row| Tile::piece(Category::ALL[row % 5], (row % 3) as u8))
        .collect();
    let mut board = Board::from_fn(|cell| pieces[cell.row() as usize]);
    let mut marks = ColumnMarks::new();
    pop(&mut board, &mut marks, Cell::new(column, 2));
    pop(&mut board, &mut marks, Cell::new(column, 4));

    let mut source = CyclingTiles::default();
    let report = settle(&mut board, &marks, &mut source);

    assert_eq!(report, SettleReport { moved: 3, refilled: 2 });
    assert_eq!(board.tile(Cell::new(column, 0)), Some(Tile::piece(Category::Red, 0)));
    assert_eq!(board.tile(Cell::new(column, 1)), Some(Tile::piece(Category::Green, 0)));
    assert_eq!(board.tile(Cell::new(column, 2)), Some(pieces[0]));
    assert_eq!(board.tile(Cell::new(column, 3)), Some(pieces[1]));
    assert_eq!(board.tile(Cell::new(column, 4)), Some(pieces[3]));
    assert_eq!(board.tile(Cell::new(column, 5)), Some(pieces[5]));
}

#[test]
fn corner_column_refill_skips_blocked_top() {
    let mut board = Board::uniform(Tile::piece(Category::Blue, 1));
    let survivor = Tile::piece(Category::Yellow, 2);
    assert!(board.set(Cell::new(0, 1), survivor));
    let mut marks = ColumnMarks::new();
    pop(&mut board, &mut marks, Cell::new(0, 2));

    let report = settle(&mut board, &marks, &mut CyclingTiles::default());

    assert_eq!(report, SettleReport { moved: 1, refilled: 1 });
    assert_eq!(board.tile(Cell::new(0, 0)), Some(Tile::Blocked));
    assert_eq!(board.tile(Cell::new(0, 1)), Some(Tile::piece(Category::Red, 0)));
    assert_eq!(board.tile(Cell::new(0, 2)), Some(survivor));
    assert_eq!(board.tile(Cell::new(0, 5)), Some(Tile::Blocked));
}

#[test]
fn pieces_compact_around_interior_blocks() {
    let column = 4;
    let a = Tile::piece(Category::Red, 0);
    let b = Tile::piece(Category::Green, 1);
    let c = Tile::piece(Category::Blue, 2);
    let d = Tile::piece(Category::Purple, 0);
    let mut board = Board::uniform(Tile::piece(Category::Yellow, 0));
    for (row, tile) in [(0, d), (1, c), (2, b), (3, a), (4, Tile::Blocked)] {
        assert!(board.set(Cell::new(column, row), tile));
    }
    let mut marks = ColumnMarks::new();
    pop(&mut board, &mut marks, Cell::new(column, 5));

    let _ = settle(&mut board, &marks, &mut CyclingTiles::default());

    let settled: Vec<Option<Tile>> = (0..6)
        .map(|row| board.tile(Cell::new(column, row)))
        .collect();
    assert_eq!(
        settled,
        vec![
            Some(Tile::piece(Category::Red, 0)),
            Some(d),
            Some(c),
            Some(b),
            Some(Tile::Blocked),
            Some(a),
        ]
    );
}

#[test]
fn unmarked_columns_are_untouched() {
    let mut board = Board::uniform(Tile::piece(Category::Red, 1));
    let before = board.clone();
    let report = settle(&mut board, &ColumnMarks::new(), &mut CyclingTiles::default());
    assert_eq!(report, SettleReport::default());
    assert_eq!(board, before);
}

#[test]
fn cascade_then_settle_leaves_a_full_board() {
    let mut board = Board::from_fn(|cell| {
        Tile::piece(Category::Green, ((cell.column() + cell.row()) % 3) as u8)
    });
    let trail = Trail::new(vec![Cell::new(3, 2), Cell::new(4, 2), Cell::new(5, 3)]);
    let outcome = resolve(&mut board, &trail);

    let report = settle(&mut board, &outcome.marks, &mut CyclingTiles::default());

    assert_eq!(report.refilled, outcome.chain);
    assert_eq!(board.first_empty(), None);
    for cell in [Cell::new(0, 0), Cell::new(0, 5), Cell::new(8, 0), Cell::new(8, 5)] {
        assert_eq!(board.tile(cell), Some(Tile::Blocked));
    }
}
