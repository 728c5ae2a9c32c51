#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tilefall adapters.
//!
//! Adapters describe what should be shown with a [`Scene`]; [`Scene::canvas`]
//! lays it out as a jgraph document and a [`RenderingBackend`] turns that
//! document into an image.

pub mod compose;
pub mod jgraph;

use std::{fmt, io};

use thiserror::Error;
use tilefall_core::Board;

/// RGB color with channels in the range 0.0..=1.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity.
    pub red: f32,
    /// Green channel intensity.
    pub green: f32,
    /// Blue channel intensity.
    pub blue: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Creates a gray with the same intensity on every channel.
    #[must_use]
    pub const fn gray(level: f32) -> Self {
        Self::new(level, level, level)
    }
}

/// Snapshot of the session drawn after every turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardFrame {
    /// Board layout.
    pub board: Board,
    /// Accumulated score.
    pub score: u64,
    /// Turns left before the game ends.
    pub turns_remaining: u32,
}

/// What a backend should present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scene {
    /// The playing field with score and turn panels.
    Board(BoardFrame),
    /// Final screen shown once the turn budget is spent.
    GameOver {
        /// Final score.
        score: u64,
    },
}

impl Scene {
    /// Lays the scene out as a jgraph document.
    #[must_use]
    pub fn canvas(&self) -> jgraph::Canvas {
        match self {
            Self::Board(frame) => compose::board_canvas(frame),
            Self::GameOver { score } => compose::game_over_canvas(*score),
        }
    }
}

/// Rendering backend capable of presenting Tilefall scenes.
pub trait RenderingBackend {
    /// Presents the scene, blocking until the output is complete.
    fn present(&mut self, scene: &Scene) -> Result<(), RenderError>;
}

/// Errors raised while presenting a scene.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An external program could not be started.
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        /// Program that failed to start.
        program: String,
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },
    /// Communicating with a running program failed.
    #[error("i/o with `{program}` failed: {source}")]
    Io {
        /// Program being talked to.
        program: String,
        /// Underlying pipe failure.
        #[source]
        source: io::Error,
    },
    /// A program exited unsuccessfully.
    #[error("`{program}` exited with {status}")]
    Exit {
        /// Program that failed.
        program: String,
        /// Exit status as reported by the platform.
        status: String,
    },
    /// The jgraph document could not be serialised.
    #[error("failed to write jgraph script")]
    Script(#[from] fmt::Error),
}

impl RenderError {
    /// Whether the session cannot continue after this error.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Launch { .. })
    }
}
