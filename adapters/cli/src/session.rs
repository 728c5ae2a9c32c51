//! Turn controller driving one interactive game over a line-based terminal.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use tilefall_core::{Command, Event, Trail};
use tilefall_rendering::{BoardFrame, RenderingBackend, Scene};
use tilefall_system_validation::{parse_input, PlayerInput};
use tilefall_world::{apply, query, World};

use crate::save_file;

const PROMPT: &str = "Provide next move in the format: \n\
                      {(x0,y0),(x1,y1),(x2,y2)....}\n\
                      To exit, type quit or Quit";
const FORMAT_ERROR: &str = "Format of move is incorrect. Try again. ";

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The player quit; the session was saved when a save file was selected.
    Quit,
    /// The turn budget ran out.
    GameOver {
        /// Final score.
        score: u64,
    },
    /// Input closed before the player quit; nothing was saved.
    EndOfInput,
}

enum State {
    AwaitingInput,
    Validating(String),
    Resolving(Trail),
    Rendering,
    Saving,
    GameOver(u64),
    Terminated(Outcome),
}

/// Interactive session wiring the world to a terminal and a renderer.
pub(crate) struct Session<R, W, B> {
    world: World,
    input: R,
    output: W,
    backend: B,
    save_path: Option<PathBuf>,
}

impl<R, W, B> Session<R, W, B>
where
    R: BufRead,
    W: Write,
    B: RenderingBackend,
{
    pub(crate) fn new(
        world: World,
        input: R,
        output: W,
        backend: B,
        save_path: Option<PathBuf>,
    ) -> Self {
        Self {
            world,
            input,
            output,
            backend,
            save_path,
        }
    }

    /// Draws the current board, then plays turns until the game ends.
    pub(crate) fn run(&mut self) -> Result<Outcome> {
        let scene = self.board_scene();
        self.present(&scene)?;

        let mut state = State::AwaitingInput;
        loop {
            state = match state {
                State::AwaitingInput => self.read_move()?,
                State::Validating(line) => self.interpret(&line)?,
                State::Resolving(trail) => self.resolve(trail)?,
                State::Rendering => {
                    let scene = self.board_scene();
                    self.present(&scene)?;
                    State::AwaitingInput
                }
                State::Saving => {
                    if let Some(path) = &self.save_path {
                        save_file::store(path, &query::snapshot(&self.world))
                            .context("failed to save the session")?;
                    }
                    State::Terminated(Outcome::Quit)
                }
                State::GameOver(score) => self.finish(score)?,
                State::Terminated(outcome) => return Ok(outcome),
            };
        }
    }

    fn read_move(&mut self) -> Result<State> {
        writeln!(self.output, "{PROMPT}")?;
        self.output.flush()?;

        let mut bytes = Vec::new();
        if self.input.read_until(b'\n', &mut bytes)? == 0 {
            log::info!("input closed, leaving without saving");
            return Ok(State::Terminated(Outcome::EndOfInput));
        }
        match String::from_utf8(bytes) {
            Ok(line) => Ok(State::Validating(
                line.trim_end_matches(['\n', '\r']).to_owned(),
            )),
            Err(error) => {
                log::debug!("move is not valid UTF-8: {error}");
                writeln!(self.output, "{FORMAT_ERROR}")?;
                Ok(State::AwaitingInput)
            }
        }
    }

    fn interpret(&mut self, line: &str) -> Result<State> {
        match parse_input(line) {
            Ok(PlayerInput::Quit) => Ok(State::Saving),
            Ok(PlayerInput::Trail(trail)) => Ok(State::Resolving(trail)),
            Err(error) => {
                log::debug!("unparseable move {line:?}: {error}");
                writeln!(self.output, "{FORMAT_ERROR}")?;
                Ok(State::AwaitingInput)
            }
        }
    }

    fn resolve(&mut self, trail: Trail) -> Result<State> {
        let mut events = Vec::new();
        apply(&mut self.world, Command::PlayTrail { trail }, &mut events);

        let mut next = State::Rendering;
        for event in events {
            match event {
                Event::TrailRejected { reason } => {
                    writeln!(self.output, "{reason}")?;
                    next = State::AwaitingInput;
                }
                Event::ScoreAwarded {
                    chain, delta, total, ..
                } => log::info!("popped {chain} tiles for {delta} points, score {total}"),
                Event::GameOver { final_score } => next = State::GameOver(final_score),
                _ => {}
            }
        }
        Ok(next)
    }

    fn finish(&mut self, score: u64) -> Result<State> {
        self.present(&Scene::GameOver { score })?;
        if let Some(path) = &self.save_path {
            save_file::store_game_over(path, score).context("failed to record the final score")?;
        }
        writeln!(self.output, "Game over! Score : {score}")?;
        Ok(State::Terminated(Outcome::GameOver { score }))
    }

    fn board_scene(&self) -> Scene {
        Scene::Board(BoardFrame {
            board: query::board(&self.world).clone(),
            score: query::score(&self.world),
            turns_remaining: query::turns_remaining(&self.world),
        })
    }

    fn present(&mut self, scene: &Scene) -> Result<()> {
        match self.backend.present(scene) {
            Ok(()) => Ok(()),
            Err(error) if error.is_fatal() => Err(error).context("rendering is unavailable"),
            Err(error) => {
                log::warn!("failed to render the board: {error}");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Cursor, process};

    use tilefall_core::{Board, Category, SessionSnapshot, Tile, STARTING_TURNS};
    use tilefall_rendering::RenderError;
    use tilefall_world::save;

    use super::*;

    #[derive(Default)]
    struct RecordingBackend {
        scenes: Vec<Scene>,
        failure: Option<fn() -> RenderError>,
    }

    impl RenderingBackend for RecordingBackend {
        fn present(&mut self, scene: &Scene) -> Result<(), RenderError> {
            self.scenes.push(scene.clone());
            match self.failure {
                Some(failure) => Err(failure()),
                None => Ok(()),
            }
        }
    }

    type TestSession = Session<Cursor<Vec<u8>>, Vec<u8>, RecordingBackend>;

    fn red_world(turns_remaining: u32) -> World {
        let mut world = World::new(17);
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

    fn session(world: World, input: &str, save_path: Option<PathBuf>) -> TestSession {
        Session::new(
            world,
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            RecordingBackend::default(),
            save_path,
        )
    }

    fn transcript(session: &TestSession) -> String {
        String::from_utf8(session.output.clone()).expect("utf-8 output")
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tilefall-session-{}-{name}", process::id()))
    }

    #[test]
    fn board_is_drawn_before_the_first_prompt() {
        let mut session = session(red_world(STARTING_TURNS), "", None);

        let outcome = session.run().expect("session runs");

        assert_eq!(outcome, Outcome::EndOfInput);
        assert_eq!(session.backend.scenes.len(), 1);
        assert!(transcript(&session).starts_with("Provide next move in the format: \n"));
    }

    #[test]
    fn malformed_and_rejected_moves_reprompt() {
        let input = "(1,0),(1,1)\n{(1,1),(3,1),(4,1)}\n{(1,0),(1,1)}\n";
        let mut session = session(red_world(STARTING_TURNS), input, None);

        let outcome = session.run().expect("session runs");

        let output = transcript(&session);
        assert_eq!(outcome, Outcome::EndOfInput);
        assert!(output.contains("Format of move is incorrect. Try again. \n"));
        assert!(output.contains("Move 2 not adjacent tiles. Cannot do move.\n"));
        assert!(output.contains("Moves should be 3+ tiles.\n"));
        assert_eq!(output.matches("To exit, type quit or Quit").count(), 4);
        assert_eq!(query::turns_remaining(&session.world), STARTING_TURNS);
        assert_eq!(session.backend.scenes.len(), 1);
    }

    #[test]
    fn undecodable_line_reprompts_and_play_continues() {
        let mut input = vec![0xff, b'\n'];
        input.extend_from_slice(b"{(1,0),(1,1),(0,1)}\n");
        let mut session = Session::new(
            red_world(STARTING_TURNS),
            Cursor::new(input),
            Vec::new(),
            RecordingBackend::default(),
            None,
        );

        let outcome = session.run().expect("session runs");

        assert_eq!(outcome, Outcome::EndOfInput);
        assert!(transcript(&session).contains("Format of move is incorrect. Try again. \n"));
        assert_eq!(query::turns_remaining(&session.world), STARTING_TURNS - 1);
        assert_eq!(query::score(&session.world), 33);
    }

    #[test]
    fn played_move_redraws_the_board() {
        let mut session = session(red_world(STARTING_TURNS), "{(1,0),(1,1),(0,1)}\n", None);

        let _ = session.run().expect("session runs");

        assert_eq!(session.backend.scenes.len(), 2);
        let Scene::Board(frame) = &session.backend.scenes[1] else {
            panic!("expected a board scene");
        };
        assert_eq!(frame.score, 33);
        assert_eq!(frame.turns_remaining, STARTING_TURNS - 1);
    }

    #[test]
    fn quit_saves_the_session() {
        let path = scratch_path("quit.sav");
        let mut session = session(
            red_world(STARTING_TURNS),
            "{(1,0),(1,1),(0,1)}\nquit\n",
            Some(path.clone()),
        );

        let outcome = session.run().expect("session runs");

        assert_eq!(outcome, Outcome::Quit);
        let saved = save::decode(&fs::read_to_string(&path).expect("save written"))
            .expect("save decodes");
        assert_eq!(saved, query::snapshot(&session.world));
        assert_eq!(saved.score, 33);
        fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn quit_keyword_must_match_exactly() {
        let mut session = session(red_world(STARTING_TURNS), " quit\nQUIT\n", None);

        let outcome = session.run().expect("session runs");

        assert_eq!(outcome, Outcome::EndOfInput);
        assert_eq!(transcript(&session).matches("Format of move is incorrect").count(), 2);
    }

    #[test]
    fn final_turn_ends_the_game() {
        let path = scratch_path("final.sav");
        let mut session = session(
            red_world(1),
            "{(1,0),(1,1),(0,1)}\n{(1,0),(1,1),(0,1)}\n",
            Some(path.clone()),
        );

        let outcome = session.run().expect("session runs");

        assert_eq!(outcome, Outcome::GameOver { score: 33 });
        assert!(transcript(&session).ends_with("Game over! Score : 33\n"));
        assert_eq!(
            session.backend.scenes.last(),
            Some(&Scene::GameOver { score: 33 })
        );
        assert_eq!(
            fs::read_to_string(&path).expect("note written"),
            save::game_over_note(33)
        );
        fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn render_failures_only_stop_the_game_when_fatal() {
        let mut tolerant = session(red_world(STARTING_TURNS), "{(1,0),(1,1),(0,1)}\n", None);
        tolerant.backend.failure = Some(|| RenderError::Exit {
            program: "convert".to_owned(),
            status: "exit status: 1".to_owned(),
        });
        assert_eq!(tolerant.run().expect("session runs"), Outcome::EndOfInput);
        assert_eq!(tolerant.backend.scenes.len(), 2);

        let mut fatal = session(red_world(STARTING_TURNS), "", None);
        fatal.backend.failure = Some(|| RenderError::Launch {
            program: "jgraph".to_owned(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        let error = fatal.run().expect_err("launch failure stops the session");
        assert!(format!("{error:#}").contains("jgraph"));
    }
}
