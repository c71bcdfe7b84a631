//! Where the character is drawn. The orchestrator only needs to show a frame,
//! show a caption, and move; a GUI shell implements [`Stage`] on top of its
//! window, the command-line front end uses [`LogStage`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("stage is closed")]
    Closed,
}

/// Top-left corner of the character on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// A random position keeping a `surface`-sized sprite fully on a
    /// `screen`-sized display.
    pub fn random_within<R: Rng + ?Sized>(
        rng: &mut R,
        screen: (u32, u32),
        surface: (u32, u32),
    ) -> Self {
        let max_x = screen.0.saturating_sub(surface.0);
        let max_y = screen.1.saturating_sub(surface.1);
        Self {
            x: i32::try_from(rng.gen_range(0..=max_x)).unwrap_or(i32::MAX),
            y: i32::try_from(rng.gen_range(0..=max_y)).unwrap_or(i32::MAX),
        }
    }
}

pub trait Stage: Send {
    fn show_frame(&mut self, frame: &Path) -> Result<(), StageError>;
    /// Shows or, with `None`, hides the speech caption.
    fn show_caption(&mut self, caption: Option<&str>) -> Result<(), StageError>;
    fn move_to(&mut self, position: Position) -> Result<(), StageError>;
}

/// Writes stage changes to the log; frames at trace level since they change
/// every tick.
#[derive(Debug, Default)]
pub struct LogStage {
    position: Position,
}

impl Stage for LogStage {
    fn show_frame(&mut self, frame: &Path) -> Result<(), StageError> {
        log::trace!("frame {}", frame.display());
        Ok(())
    }

    fn show_caption(&mut self, caption: Option<&str>) -> Result<(), StageError> {
        match caption {
            Some(text) => log::info!("caption: {text}"),
            None => log::debug!("caption cleared"),
        }
        Ok(())
    }

    fn move_to(&mut self, position: Position) -> Result<(), StageError> {
        log::debug!(
            "moving from ({}, {}) to ({}, {})",
            self.position.x,
            self.position.y,
            position.x,
            position.y
        );
        self.position = position;
        Ok(())
    }
}

/// Something that happened on a [`RecordingStage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageAction {
    Frame(PathBuf),
    Caption(Option<String>),
    Move(Position),
}

/// Keeps every stage call in a shared list; handy for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct RecordingStage {
    actions: Arc<Mutex<Vec<StageAction>>>,
}

impl RecordingStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<StageAction> {
        self.actions
            .lock()
            .map(|actions| actions.clone())
            .unwrap_or_default()
    }

    fn record(&self, action: StageAction) -> Result<(), StageError> {
        self.actions
            .lock()
            .map_err(|_| StageError::Closed)?
            .push(action);
        Ok(())
    }
}

impl Stage for RecordingStage {
    fn show_frame(&mut self, frame: &Path) -> Result<(), StageError> {
        self.record(StageAction::Frame(frame.to_path_buf()))
    }

    fn show_caption(&mut self, caption: Option<&str>) -> Result<(), StageError> {
        self.record(StageAction::Caption(caption.map(str::to_string)))
    }

    fn move_to(&mut self, position: Position) -> Result<(), StageError> {
        self.record(StageAction::Move(position))
    }
}
