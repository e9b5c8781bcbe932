//! Obstacles: a single [`Pipe`] pair and the [`PipeField`] that spawns,
//! scrolls and culls them.

use rand::Rng;

use crate::config::GameConfig;
use crate::geometry::Rect;

/// A top and bottom segment with a gap between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f64,
    pub width: u32,
    pub gap: u32,
    pub top_height: u32,
    pub bottom_height: u32,
    pub passed: bool,
    pub speed: f64,
}

impl Pipe {
    /// The bottom segment takes whatever height is left below the gap.
    pub fn new(x: f64, top_height: u32, width: u32, gap: u32, screen_height: u32, speed: f64) -> Self {
        let bottom_height = screen_height.saturating_sub(top_height.saturating_add(gap));
        Self {
            x,
            width,
            gap,
            top_height,
            bottom_height,
            passed: false,
            speed,
        }
    }

    pub fn update(&mut self) {
        self.x -= self.speed;
    }

    pub fn top_rect(&self) -> Rect {
        Rect::new(self.x, 0.0, f64::from(self.width), f64::from(self.top_height))
    }

    pub fn bottom_rect(&self) -> Rect {
        Rect::new(
            self.x,
            f64::from(self.top_height + self.gap),
            f64::from(self.width),
            f64::from(self.bottom_height),
        )
    }

    pub fn collides(&self, rect: &Rect) -> bool {
        rect.intersects(&self.top_rect()) || rect.intersects(&self.bottom_rect())
    }

    pub fn right(&self) -> f64 {
        self.x + f64::from(self.width)
    }

    /// Flip `passed` once the trailing edge is left of `bird_x`.
    /// Returns true only on the tick the flag flips.
    pub fn check_passed(&mut self, bird_x: f64) -> bool {
        if !self.passed && self.right() < bird_x {
            self.passed = true;
            return true;
        }
        false
    }

    pub fn is_off_screen(&self) -> bool {
        self.right() < 0.0
    }
}

/// What happened to the pipes during one [`PipeField::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipeTick {
    pub collided: bool,
    /// Pipes whose `passed` flag flipped this tick.
    pub passed: u32,
}

/// Live pipes in spawn order, plus the spawn timer.
#[derive(Debug, Clone)]
pub struct PipeField {
    pipes: Vec<Pipe>,
    last_spawn_ms: u64,
    spawn_x: f64,
    width: u32,
    gap: u32,
    top_range: (u32, u32),
    screen_height: u32,
}

impl PipeField {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            pipes: Vec::new(),
            last_spawn_ms: 0,
            spawn_x: f64::from(config.screen.game_width),
            width: config.pipes.width,
            gap: config.pipes.gap,
            top_range: (config.pipes.edge_margin, config.max_top_height()),
            screen_height: config.screen.height,
        }
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    pub fn last_spawn_ms(&self) -> u64 {
        self.last_spawn_ms
    }

    /// Restart the spawn timer at `now_ms`, holding the first spawn back by
    /// an extra `grace_ms`.
    pub fn reset_timer(&mut self, now_ms: u64, grace_ms: u64) {
        self.last_spawn_ms = now_ms.saturating_add(grace_ms);
    }

    /// Inclusive range of legal top-segment heights.
    pub fn top_height_range(&self) -> (u32, u32) {
        self.top_range
    }

    /// Spawn a pipe at the right edge of the play field when more than
    /// `interval_ms` has elapsed since the last spawn.
    pub fn try_spawn<R: Rng>(&mut self, now_ms: u64, interval_ms: u64, speed: f64, rng: &mut R) -> bool {
        if now_ms.saturating_sub(self.last_spawn_ms) <= interval_ms {
            return false;
        }
        let (lo, hi) = self.top_height_range();
        let top_height = rng.gen_range(lo..=hi);
        self.push(Pipe::new(
            self.spawn_x,
            top_height,
            self.width,
            self.gap,
            self.screen_height,
            speed,
        ));
        self.last_spawn_ms = now_ms;
        true
    }

    pub fn push(&mut self, pipe: Pipe) {
        self.pipes.push(pipe);
    }

    pub fn set_speed(&mut self, speed: f64) {
        for pipe in &mut self.pipes {
            pipe.speed = speed;
        }
    }

    /// Move, collide, score, cull, in that order. Culling runs last so the
    /// collision and pass checks see every pipe that was on screen this tick.
    /// Pipes cleared on a collision tick still count.
    pub fn tick(&mut self, bird_bounds: &Rect, bird_x: f64) -> PipeTick {
        for pipe in &mut self.pipes {
            pipe.update();
        }

        let collided = self.pipes.iter().any(|p| p.collides(bird_bounds));

        let mut passed = 0;
        for pipe in &mut self.pipes {
            if pipe.check_passed(bird_x) {
                passed += 1;
            }
        }

        self.pipes.retain(|p| !p.is_off_screen());

        PipeTick { collided, passed }
    }
}
