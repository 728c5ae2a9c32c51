//! Layout of the board and game-over screens as jgraph documents.

use tilefall_core::{Board, Category, Cell, Tile, BOARD_COLUMNS, BOARD_ROWS, MAX_STAGE};

use crate::{
    jgraph::{Axis, BoundingBox, Canvas, Curve, Fill, Graph, Mark, Point, Shape, Size, Text},
    BoardFrame, Color,
};

const PAGE_WIDTH_INCHES: f32 = 6.0;
const PAGE_HEIGHT_INCHES: f32 = 4.0;
const POINTS_PER_INCH: f32 = 72.0;
/// Extra headroom above the grid for the score and turn panels.
const PANEL_HEIGHT_INCHES: f32 = 1.0;

const FONT: &str = "Arial";
const PANEL_COLOR: Color = Color::new(0.8, 0.7, 1.0);
const PANEL_SIZE: f32 = 1.975;
const CORNER_SIZE: f32 = 1.975;
const PIECE_SIZE: f32 = 0.925;
const CIRCLE_SIZE: f32 = 0.850;

const CROSS_OUTLINE: [(f32, f32); 12] = [
    (-1.0, -0.25),
    (-1.0, 0.25),
    (-0.25, 0.25),
    (-0.25, 1.0),
    (0.25, 1.0),
    (0.25, 0.25),
    (1.0, 0.25),
    (1.0, -0.25),
    (0.25, -0.25),
    (0.25, -1.0),
    (-0.25, -1.0),
    (-0.25, -0.25),
];

const STAR_OUTLINE: [(f32, f32); 8] = [
    (-1.0, -1.0),
    (-0.5, 0.0),
    (-1.0, 1.0),
    (0.0, 0.5),
    (1.0, 1.0),
    (0.5, 0.0),
    (1.0, -1.0),
    (0.0, -0.5),
];

const SCORE_PANEL_OUTLINE: [(f32, f32); 4] = [(0.0, 0.0), (0.0, 5.0), (5.0, 5.0), (3.0, 0.0)];
const TURN_PANEL_OUTLINE: [(f32, f32); 4] = [(5.0, 5.0), (0.0, 5.0), (3.0, 0.0), (5.0, 0.0)];

/// Fill color of pieces of the category.
#[must_use]
pub const fn fill_color(category: Category) -> Color {
    match category {
        Category::Red => Color::new(1.0, 0.2, 0.2),
        Category::Green => Color::new(0.0, 0.5, 0.17),
        Category::Blue => Color::new(0.0, 0.47, 0.7),
        Category::Purple => Color::new(0.9, 0.0, 0.75),
        Category::Yellow => Color::new(1.0, 0.9, 0.0),
    }
}

const fn outline_color(category: Category) -> Color {
    match category {
        Category::Red => Color::new(0.2, 0.0, 0.0),
        Category::Green => Color::new(0.0, 0.2, 0.0),
        Category::Blue => Color::new(0.0, 0.0, 0.2),
        Category::Purple => Color::new(0.2, 0.0, 0.2),
        Category::Yellow => Color::new(0.2, 0.2, 0.0),
    }
}

/// Mark size of a piece: a third of the full size at stage 0, two thirds at
/// stage 1, full at stage 2.
#[must_use]
pub fn piece_size(category: Category, stage: u8) -> f32 {
    let full = match category {
        Category::Blue => CIRCLE_SIZE,
        _ => PIECE_SIZE,
    };
    let stage = stage.min(MAX_STAGE);
    full * f32::from(stage + 1) / f32::from(MAX_STAGE + 1)
}

/// Graph coordinates of the centre of a cell; row 0 is drawn at the top.
#[must_use]
pub fn cell_center(cell: Cell) -> Point {
    Point::new(
        cell.column() as f32 + 0.5,
        (BOARD_ROWS - 1 - cell.row()) as f32 + 0.5,
    )
}

fn piece_mark(category: Category, stage: u8) -> Mark {
    let size = Some(Size::square(piece_size(category, stage)));
    let color = fill_color(category);
    match category {
        Category::Red => Mark::General {
            outline: outline(&CROSS_OUTLINE),
            size,
            fill: Some(Fill::rotated(color, 15.0)),
        },
        Category::Green => Mark::Shape {
            shape: Shape::Triangle,
            size,
            fill: Some(Fill::rotated(color, 30.0)),
        },
        Category::Blue => Mark::Shape {
            shape: Shape::Circle,
            size,
            fill: Some(Fill::solid(color)),
        },
        Category::Purple => Mark::Shape {
            shape: Shape::Diamond,
            size,
            fill: Some(Fill::solid(color)),
        },
        Category::Yellow => Mark::General {
            outline: outline(&STAR_OUTLINE),
            size,
            fill: Some(Fill::solid(color)),
        },
    }
}

fn outline(points: &[(f32, f32)]) -> Vec<Point> {
    points.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn grid_axis(size_inches: f32, cells: u32) -> Axis {
    Axis {
        draw: false,
        size_inches: Some(size_inches),
        min: Some(0.0),
        max: Some(cells as f32),
        hash_spacing: Some(1.0),
        minor_hashes: Some(0),
        grid_lines: true,
    }
}

fn page() -> Canvas {
    Canvas {
        size: Some(Size {
            width: PAGE_WIDTH_INCHES,
            height: PAGE_HEIGHT_INCHES,
        }),
        bounding_box: Some(BoundingBox {
            x: 0.0,
            y: -3.0,
            width: PAGE_WIDTH_INCHES * POINTS_PER_INCH,
            height: (PAGE_HEIGHT_INCHES + PANEL_HEIGHT_INCHES) * POINTS_PER_INCH,
        }),
        graphs: Vec::new(),
    }
}

fn grid_graph(curves: Vec<Curve>) -> Graph {
    Graph {
        x_axis: grid_axis(PAGE_WIDTH_INCHES, BOARD_COLUMNS),
        y_axis: grid_axis(PAGE_HEIGHT_INCHES, BOARD_ROWS),
        curves,
    }
}

fn label(at: Point, font_size: f32, color: Option<Color>, content: String) -> Curve {
    Curve {
        points: vec![at],
        mark: Mark::Text(Text {
            font: Some(FONT.to_owned()),
            font_size: Some(font_size),
            line_spacing: Some(20.0),
            color,
            content,
        }),
        color: None,
    }
}

fn panel(at: Point, shape: &[(f32, f32)]) -> Curve {
    Curve {
        points: vec![at],
        mark: Mark::General {
            outline: outline(shape),
            size: Some(Size::square(PANEL_SIZE)),
            fill: Some(Fill::solid(PANEL_COLOR)),
        },
        color: Some(Color::gray(0.0)),
    }
}

fn piece_curves(board: &Board) -> Vec<Curve> {
    let mut curves = Vec::new();
    for stage in 0..=MAX_STAGE {
        for category in Category::ALL {
            let points: Vec<Point> = board
                .iter()
                .filter(|(_, tile)| *tile == Tile::piece(category, stage))
                .map(|(cell, _)| cell_center(cell))
                .collect();
            if points.is_empty() {
                continue;
            }
            curves.push(Curve {
                points,
                mark: piece_mark(category, stage),
                color: Some(outline_color(category)),
            });
        }
    }
    curves
}

fn corner_curve() -> Curve {
    let right = BOARD_COLUMNS as f32;
    let top = BOARD_ROWS as f32;
    Curve {
        points: vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, top),
            Point::new(right, 0.0),
            Point::new(right, top),
        ],
        mark: Mark::Shape {
            shape: Shape::Box,
            size: Some(Size::square(CORNER_SIZE)),
            fill: Some(Fill::solid(Color::gray(1.0))),
        },
        color: Some(Color::gray(1.0)),
    }
}

/// Board screen: one curve per category and stage, masks over the blocked
/// corners, then the score and turn panels above the grid.
#[must_use]
pub fn board_canvas(frame: &BoardFrame) -> Canvas {
    let top = BOARD_ROWS as f32;
    let mut curves = piece_curves(&frame.board);
    curves.push(corner_curve());
    curves.push(panel(Point::new(0.0, top + 0.5), &SCORE_PANEL_OUTLINE));
    curves.push(panel(Point::new(4.25, top + 0.5), &TURN_PANEL_OUTLINE));
    curves.push(label(
        Point::new(1.5, top + 1.0),
        20.0,
        None,
        format!("Score: \n{}", frame.score),
    ));
    curves.push(label(
        Point::new(8.0, top + 1.0),
        20.0,
        None,
        format!("Turns: \n{}", frame.turns_remaining),
    ));

    let mut canvas = page();
    canvas.graphs.push(grid_graph(curves));
    canvas
}

/// Game-over screen: the final score in white over a black field.
#[must_use]
pub fn game_over_canvas(score: u64) -> Canvas {
    let black = Color::gray(0.0);
    let background = Curve {
        points: vec![Point::new(3.0, 3.0)],
        mark: Mark::Shape {
            shape: Shape::Box,
            size: Some(Size::square(50.0)),
            fill: Some(Fill::solid(black)),
        },
        color: Some(black),
    };
    let text = label(
        Point::new(4.5, 3.0),
        40.0,
        Some(Color::gray(1.0)),
        format!("GAME OVER \n Score: {score}"),
    );

    let mut canvas = page();
    canvas.graphs.push(grid_graph(vec![background, text]));
    canvas
}
