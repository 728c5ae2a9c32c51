#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Tilefall.
//!
//! The [`World`] owns the board, score, and turn budget. Adapters never touch
//! that state directly: they submit [`Command`] values through [`apply`] and
//! read the resulting [`Event`] stream plus the [`query`] views.

pub mod save;
mod tiles;

pub use tiles::RandomTiles;

use tilefall_core::{
    Board, Command, Event, GameStatus, MoveRejection, SessionSnapshot, TileSource, Trail,
    STARTING_TURNS,
};
use tilefall_system_cascade as cascade;
use tilefall_system_gravity as gravity;
use tilefall_system_validation as validation;

/// Represents the authoritative Tilefall session.
#[derive(Debug)]
pub struct World {
    board: Board,
    score: u64,
    turns_remaining: u32,
    status: GameStatus,
    tiles: Box<dyn TileSource>,
}

impl World {
    /// Creates a fresh game whose pieces are drawn from a seeded generator.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_source(Box::new(RandomTiles::seeded(seed)))
    }

    /// Creates a fresh game drawing pieces from the provided source.
    #[must_use]
    pub fn with_source(mut tiles: Box<dyn TileSource>) -> Self {
        let board = Board::generate(tiles.as_mut());
        Self {
            board,
            score: 0,
            turns_remaining: STARTING_TURNS,
            status: GameStatus::Playing,
            tiles,
        }
    }

    fn deal(&mut self) {
        self.board = Board::generate(self.tiles.as_mut());
        self.score = 0;
        self.turns_remaining = STARTING_TURNS;
        self.status = GameStatus::Playing;
    }

    fn restore(&mut self, snapshot: SessionSnapshot) {
        self.board = snapshot.board;
        self.score = snapshot.score;
        self.turns_remaining = snapshot.turns_remaining;
        self.status = if self.turns_remaining == 0 {
            GameStatus::Finished
        } else {
            GameStatus::Playing
        };
    }

    fn play(&mut self, trail: Trail, out_events: &mut Vec<Event>) {
        if self.status == GameStatus::Finished {
            out_events.push(Event::TrailRejected {
                reason: MoveRejection::GameFinished,
            });
            return;
        }

        if let Err(reason) = validation::validate(&self.board, &trail) {
            log::debug!("trail rejected: {reason}");
            out_events.push(Event::TrailRejected { reason });
            return;
        }

        let outcome = cascade::resolve(&mut self.board, &trail);
        self.score = self.score.saturating_add(outcome.score_delta);
        out_events.push(Event::TilesPopped {
            cells: outcome.popped,
        });
        out_events.push(Event::ScoreAwarded {
            base: outcome.base_score,
            chain: outcome.chain,
            delta: outcome.score_delta,
            total: self.score,
        });

        let report = gravity::settle(&mut self.board, &outcome.marks, self.tiles.as_mut());
        out_events.push(Event::BoardSettled {
            refilled: report.refilled,
        });

        self.turns_remaining = self.turns_remaining.saturating_sub(1);
        out_events.push(Event::TurnConsumed {
            turns_remaining: self.turns_remaining,
        });

        if self.turns_remaining == 0 {
            self.status = GameStatus::Finished;
            log::info!("game over with score {}", self.score);
            out_events.push(Event::GameOver {
                final_score: self.score,
            });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::NewGame => {
            world.deal();
            out_events.push(Event::GameStarted {
                turns_remaining: world.turns_remaining,
            });
        }
        Command::Restore { snapshot } => {
            world.restore(snapshot);
            out_events.push(Event::SessionRestored {
                score: world.score,
                turns_remaining: world.turns_remaining,
            });
        }
        Command::PlayTrail { trail } => world.play(trail, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tilefall_core::{Board, GameStatus, SessionSnapshot, WELCOME_BANNER};

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(_world: &World) -> &'static str {
        WELCOME_BANNER
    }

    /// Current board layout.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(world: &World) -> u64 {
        world.score
    }

    /// Turns left before the game ends.
    #[must_use]
    pub fn turns_remaining(world: &World) -> u32 {
        world.turns_remaining
    }

    /// Lifecycle state of the game.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Captures the session for persistence.
    #[must_use]
    pub fn snapshot(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            board: world.board.clone(),
            score: world.score,
            turns_remaining: world.turns_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use tilefall_core::{Category, Cell, Tile};

    use super::*;

    fn red_session(turns_remaining: u32) -> World {
        let mut world = World::new(11);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Restore {
                snapshot: SessionSnapshot {
                    board: Board::uniform(Tile::piece(Category::Red, 0)),
                    score: 0,
                    turns_remaining,
                },
            },
            &mut events,
        );
        world
    }

    fn corner_trail() -> Trail {
        Trail::new(vec![Cell::new(1, 0), Cell::new(1, 1), Cell::new(0, 1)])
    }

    #[test]
    fn new_game_starts_with_full_budget_and_board() {
        let world = World::new(3);
        assert_eq!(query::turns_remaining(&world), STARTING_TURNS);
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::status(&world), GameStatus::Playing);
        assert_eq!(query::board(&world).first_empty(), None);
    }

    #[test]
    fn same_seed_deals_same_board() {
        let first = World::new(1234);
        let second = World::new(1234);
        assert_eq!(query::board(&first), query::board(&second));
    }

    #[test]
    fn corner_trail_consumes_a_turn_and_scores() {
        let mut world = red_session(STARTING_TURNS);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlayTrail {
                trail: corner_trail(),
            },
            &mut events,
        );

        assert_eq!(query::score(&world), 33);
        assert_eq!(query::turns_remaining(&world), STARTING_TURNS - 1);
        assert_eq!(query::board(&world).first_empty(), None);
        assert!(events.contains(&Event::ScoreAwarded {
            base: 21,
            chain: 3,
            delta: 33,
            total: 33,
        }));
        assert!(events.contains(&Event::BoardSettled { refilled: 3 }));
        assert_eq!(
            events.last(),
            Some(&Event::TurnConsumed {
                turns_remaining: STARTING_TURNS - 1
            })
        );
    }

    #[test]
    fn rejected_trail_leaves_session_untouched() {
        let mut world = red_session(4);
        let before = query::snapshot(&world);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlayTrail {
                trail: Trail::new(vec![Cell::new(1, 1), Cell::new(3, 1), Cell::new(4, 1)]),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TrailRejected {
                reason: MoveRejection::NotAdjacent { position: 2 }
            }]
        );
        assert_eq!(query::snapshot(&world), before);
    }

    #[test]
    fn last_turn_finishes_the_game() {
        let mut world = red_session(1);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlayTrail {
                trail: corner_trail(),
            },
            &mut events,
        );

        assert_eq!(events.last(), Some(&Event::GameOver { final_score: 33 }));
        assert_eq!(query::status(&world), GameStatus::Finished);

        let mut late = Vec::new();
        apply(
            &mut world,
            Command::PlayTrail {
                trail: corner_trail(),
            },
            &mut late,
        );
        assert_eq!(
            late,
            vec![Event::TrailRejected {
                reason: MoveRejection::GameFinished
            }]
        );
    }

    #[test]
    fn new_game_resets_score_and_turns() {
        let mut world = red_session(2);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlayTrail {
                trail: corner_trail(),
            },
            &mut events,
        );
        events.clear();

        apply(&mut world, Command::NewGame, &mut events);

        assert_eq!(
            events,
            vec![Event::GameStarted {
                turns_remaining: STARTING_TURNS
            }]
        );
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::turns_remaining(&world), STARTING_TURNS);
    }
}
