//! Flappy Bird simulation core plus the terminal, audio and input glue
//! around it.
//!
//! The core is [`GameSession`]: feed it [`Intent`]s and call
//! [`GameSession::update`] once per tick, then draw its [`Snapshot`] and play
//! whatever [`SoundEvent`]s it queued.

pub mod audio;
pub mod bird;
pub mod clock;
pub mod config;
pub mod difficulty;
pub mod geometry;
pub mod input;
pub mod pipe;
pub mod render;
pub mod session;
pub mod snapshot;

pub use audio::{AudioSink, SilentAudio, SoundEvent};
pub use bird::Bird;
pub use clock::{ClockSource, FramePacer, ManualClock, SystemClock};
pub use config::{ConfigError, GameConfig, Hitbox};
pub use difficulty::{DifficultyController, FixedInterval, SpawnCurve, Stepped};
pub use geometry::Rect;
pub use input::{ControlMode, InputPoll, InputSource, Intent};
pub use pipe::{Pipe, PipeField};
pub use session::{Flow, GameSession, GameState, Scenery};
pub use snapshot::Snapshot;
