//! Difficulty progression: pipe speed steps up every `interval` points and
//! the spawn interval follows a pluggable [`SpawnCurve`].

use std::fmt;

use crate::config::{DifficultyConfig, SpawnCurveConfig};

/// Maps the current score to the delay between pipe spawns.
pub trait SpawnCurve: fmt::Debug + Send {
    fn interval_ms(&self, score: u32, difficulty_interval: u32) -> u64;
}

/// The same interval regardless of score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedInterval(pub u64);

impl SpawnCurve for FixedInterval {
    fn interval_ms(&self, _score: u32, _difficulty_interval: u32) -> u64 {
        self.0
    }
}

/// `max(floor, start - (score / interval) * step)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stepped {
    pub start_ms: u64,
    pub step_ms: u64,
    pub floor_ms: u64,
}

impl SpawnCurve for Stepped {
    fn interval_ms(&self, score: u32, difficulty_interval: u32) -> u64 {
        let steps = u64::from(score / difficulty_interval.max(1));
        self.start_ms
            .saturating_sub(steps.saturating_mul(self.step_ms))
            .max(self.floor_ms)
    }
}

impl From<&SpawnCurveConfig> for Box<dyn SpawnCurve> {
    fn from(config: &SpawnCurveConfig) -> Self {
        match *config {
            SpawnCurveConfig::Fixed { interval_ms } => Box::new(FixedInterval(interval_ms)),
            SpawnCurveConfig::Stepped {
                start_ms,
                step_ms,
                floor_ms,
            } => Box::new(Stepped {
                start_ms,
                step_ms,
                floor_ms,
            }),
        }
    }
}

#[derive(Debug)]
pub struct DifficultyController {
    initial_speed: f64,
    base_speed: f64,
    speed_step: f64,
    interval: u32,
    curve: Box<dyn SpawnCurve>,
}

impl DifficultyController {
    pub fn new(config: &DifficultyConfig) -> Self {
        Self::with_curve(config, (&config.spawn).into())
    }

    pub fn with_curve(config: &DifficultyConfig, curve: Box<dyn SpawnCurve>) -> Self {
        Self {
            initial_speed: config.base_speed,
            base_speed: config.base_speed,
            speed_step: config.speed_step,
            interval: config.interval.max(1),
            curve,
        }
    }

    pub fn base_speed(&self) -> f64 {
        self.base_speed
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn spawn_interval_ms(&self, score: u32) -> u64 {
        self.curve.interval_ms(score, self.interval)
    }

    /// Feed the score reached after a single point. Returns the new speed when
    /// the score lands on a multiple of the interval.
    pub fn on_score(&mut self, score: u32) -> Option<f64> {
        if score == 0 || score % self.interval != 0 {
            return None;
        }
        self.base_speed += self.speed_step;
        Some(self.base_speed)
    }

    pub fn reset(&mut self) {
        self.base_speed = self.initial_speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> DifficultyController {
        DifficultyController::new(&DifficultyConfig::default())
    }

    #[test]
    fn speed_steps_on_multiples_of_the_interval() {
        let mut d = controller();
        let mut bumps = Vec::new();
        for score in 1..=15 {
            if let Some(speed) = d.on_score(score) {
                bumps.push((score, speed));
            }
        }
        assert_eq!(bumps, vec![(5, 4.5), (10, 5.0), (15, 5.5)]);
        assert_eq!(d.base_speed(), 5.5);
    }

    #[test]
    fn reset_restores_initial_speed() {
        let mut d = controller();
        d.on_score(5);
        d.reset();
        assert_eq!(d.base_speed(), 4.0);
    }

    #[test]
    fn fixed_curve_ignores_score() {
        let d = controller();
        assert_eq!(d.spawn_interval_ms(0), 1500);
        assert_eq!(d.spawn_interval_ms(999), 1500);
    }

    #[test]
    fn stepped_curve_shrinks_to_its_floor() {
        let curve = Stepped {
            start_ms: 2500,
            step_ms: 100,
            floor_ms: 1800,
        };
        assert_eq!(curve.interval_ms(0, 5), 2500);
        assert_eq!(curve.interval_ms(4, 5), 2500);
        assert_eq!(curve.interval_ms(5, 5), 2400);
        assert_eq!(curve.interval_ms(34, 5), 1900);
        assert_eq!(curve.interval_ms(35, 5), 1800);
        assert_eq!(curve.interval_ms(500, 5), 1800);
    }

    #[test]
    fn custom_curve_plugs_in() {
        #[derive(Debug)]
        struct Halving;
        impl SpawnCurve for Halving {
            fn interval_ms(&self, score: u32, _: u32) -> u64 {
                2000 >> score.min(3)
            }
        }
        let d = DifficultyController::with_curve(&DifficultyConfig::default(), Box::new(Halving));
        assert_eq!(d.spawn_interval_ms(1), 1000);
        assert_eq!(d.spawn_interval_ms(9), 250);
    }
}
