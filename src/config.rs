//! Game configuration.
//!
//! Every tunable constant of the simulation lives here and is handed to
//! [`GameSession`](crate::GameSession) at construction. Defaults reproduce the
//! classic 1200x600 layout with an 800 px wide play field.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which rectangle of the bird sprite takes part in pipe collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hitbox {
    /// Centered half-size box: `(x + w/4, y + h/4, w/2, h/2)`.
    #[default]
    Inset,
    /// The whole sprite.
    Full,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
    /// Width of the play field; the rest of the screen is side panel.
    pub game_width: u32,
    pub ground_height: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            game_width: 800,
            ground_height: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BirdConfig {
    pub x: f64,
    pub width: u32,
    pub height: u32,
    /// Added to the velocity every tick.
    pub gravity: f64,
    /// Velocity set by a jump (negative is up).
    pub jump_strength: f64,
    pub max_angle: f64,
    pub min_angle: f64,
    /// Degrees per tick.
    pub rotation_speed: f64,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            x: 200.0,
            width: 40,
            height: 30,
            gravity: 0.8,
            jump_strength: -12.0,
            max_angle: 30.0,
            min_angle: -90.0,
            rotation_speed: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    pub gap: u32,
    pub width: u32,
    /// Minimum height of either pipe segment.
    pub edge_margin: u32,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            gap: 180,
            width: 80,
            edge_margin: 50,
        }
    }
}

/// How the spawn interval reacts to the score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpawnCurveConfig {
    Fixed { interval_ms: u64 },
    Stepped { start_ms: u64, step_ms: u64, floor_ms: u64 },
}

impl Default for SpawnCurveConfig {
    fn default() -> Self {
        SpawnCurveConfig::Fixed { interval_ms: 1500 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    pub base_speed: f64,
    pub speed_step: f64,
    /// Score step at which the speed goes up.
    pub interval: u32,
    pub spawn: SpawnCurveConfig,
    /// Extra wait before the first pipe of a session.
    pub initial_delay_ms: u64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            base_speed: 4.0,
            speed_step: 0.5,
            interval: 5,
            spawn: SpawnCurveConfig::default(),
            initial_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneryConfig {
    pub background_speed: f64,
    pub ground_speed: f64,
}

impl Default for SceneryConfig {
    fn default() -> Self {
        Self {
            background_speed: 1.0,
            ground_speed: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub bird: BirdConfig,
    pub pipes: PipeConfig,
    pub difficulty: DifficultyConfig,
    pub scenery: SceneryConfig,
    pub hitbox: Hitbox,
    /// Ticks per second.
    pub tick_rate: u32,
    /// Fixed RNG seed; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen: ScreenConfig::default(),
            bird: BirdConfig::default(),
            pipes: PipeConfig::default(),
            difficulty: DifficultyConfig::default(),
            scenery: SceneryConfig::default(),
            hitbox: Hitbox::default(),
            tick_rate: 60,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the cross-field invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.screen;
        if s.width == 0 || s.height == 0 || s.game_width == 0 {
            return Err(invalid("screen dimensions must be positive"));
        }
        if s.game_width > s.width {
            return Err(invalid("game_width exceeds screen width"));
        }
        if s.ground_height >= s.height {
            return Err(invalid("ground_height must be below screen height"));
        }
        if self.bird.width == 0 || self.bird.height == 0 {
            return Err(invalid("bird dimensions must be positive"));
        }
        if self.bird.min_angle > self.bird.max_angle {
            return Err(invalid("bird.min_angle is above bird.max_angle"));
        }
        let p = &self.pipes;
        if p.width == 0 || p.gap == 0 {
            return Err(invalid("pipe width and gap must be positive"));
        }
        if u64::from(p.gap) + 2 * u64::from(p.edge_margin) > u64::from(s.height) {
            return Err(invalid(format!(
                "pipe gap {} with margin {} does not fit a {} px screen",
                p.gap, p.edge_margin, s.height
            )));
        }
        if self.difficulty.interval == 0 {
            return Err(invalid("difficulty.interval must be at least 1"));
        }
        if let SpawnCurveConfig::Stepped {
            start_ms, floor_ms, ..
        } = self.difficulty.spawn
        {
            if floor_ms > start_ms {
                return Err(invalid("stepped spawn floor is above its start"));
            }
        }
        if self.tick_rate == 0 {
            return Err(invalid("tick_rate must be at least 1"));
        }
        Ok(())
    }

    /// Highest legal `top_height` for a freshly spawned pipe.
    pub fn max_top_height(&self) -> u32 {
        self.screen
            .height
            .saturating_sub(self.pipes.gap)
            .saturating_sub(self.pipes.edge_margin)
    }

    /// Y coordinate of the top of the ground strip.
    pub fn ground_y(&self) -> f64 {
        f64::from(self.screen.height.saturating_sub(self.screen.ground_height))
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}
