//! Read-only view of a session, built once per tick for the renderer.

use crate::input::ControlMode;
use crate::pipe::Pipe;
use crate::session::{GameState, Scenery};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirdPose {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeView {
    pub x: f64,
    pub width: u32,
    pub top_height: u32,
    /// Y of the bottom segment's upper edge.
    pub bottom_y: u32,
    pub bottom_height: u32,
    pub passed: bool,
}

impl From<&Pipe> for PipeView {
    fn from(pipe: &Pipe) -> Self {
        Self {
            x: pipe.x,
            width: pipe.width,
            top_height: pipe.top_height,
            bottom_y: pipe.top_height.saturating_add(pipe.gap),
            bottom_height: pipe.bottom_height,
            passed: pipe.passed,
        }
    }
}

/// Play-field dimensions in game units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSize {
    pub width: u32,
    pub height: u32,
    pub ground_height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: GameState,
    pub score: u32,
    pub bird: BirdPose,
    pub pipes: Vec<PipeView>,
    pub scenery: Scenery,
    pub field: FieldSize,
    pub base_speed: f64,
    pub control_mode: ControlMode,
    pub input_device: usize,
}

impl Snapshot {
    pub fn ground_y(&self) -> u32 {
        self.field.height.saturating_sub(self.field.ground_height)
    }
}
