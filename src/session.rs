//! The game session: owns the bird, the pipes and the difficulty state, and
//! drives them through Welcome -> Playing -> GameOver -> Playing.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::audio::SoundEvent;
use crate::bird::Bird;
use crate::config::{ConfigError, GameConfig};
use crate::difficulty::{DifficultyController, SpawnCurve};
use crate::input::{ControlMode, InputPoll, Intent};
use crate::pipe::{Pipe, PipeField};
use crate::snapshot::{BirdPose, FieldSize, PipeView, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    Welcome,
    Playing,
    GameOver,
}

/// Whether the main loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Background and ground scroll offsets, always in `[0, width)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scenery {
    pub background_x: f64,
    pub ground_x: f64,
}

impl Scenery {
    fn advance(&mut self, background_speed: f64, ground_speed: f64, width: f64) {
        self.background_x = (self.background_x - background_speed).rem_euclid(width);
        self.ground_x = (self.ground_x - ground_speed).rem_euclid(width);
    }
}

#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    state: GameState,
    score: u32,
    bird: Bird,
    pipes: PipeField,
    difficulty: DifficultyController,
    scenery: Scenery,
    rng: StdRng,
    // Survive restarts.
    control_mode: ControlMode,
    input_device: usize,
    sounds: Vec<SoundEvent>,
}

impl GameSession {
    /// Seeded from `config.seed` when set, otherwise from entropy.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Fails when `config` does not pass [`GameConfig::validate`].
    pub fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: GameState::Welcome,
            score: 0,
            bird: new_bird(&config),
            pipes: PipeField::new(&config),
            difficulty: DifficultyController::new(&config.difficulty),
            scenery: Scenery::default(),
            rng,
            control_mode: ControlMode::Keyboard,
            input_device: 0,
            sounds: Vec::new(),
            config,
        })
    }

    /// Replace the spawn-interval policy chosen by the config.
    pub fn with_spawn_curve(mut self, curve: Box<dyn SpawnCurve>) -> Self {
        self.difficulty = DifficultyController::with_curve(&self.config.difficulty, curve);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    /// Direct access for scripted scenarios and tools.
    pub fn bird_mut(&mut self) -> &mut Bird {
        &mut self.bird
    }

    pub fn pipes(&self) -> &[Pipe] {
        self.pipes.pipes()
    }

    /// Place a pipe by hand, moving at the current speed.
    pub fn insert_pipe(&mut self, x: f64, top_height: u32) {
        let c = &self.config;
        self.pipes.push(Pipe::new(
            x,
            top_height,
            c.pipes.width,
            c.pipes.gap,
            c.screen.height,
            self.difficulty.base_speed(),
        ));
    }

    pub fn base_speed(&self) -> f64 {
        self.difficulty.base_speed()
    }

    pub fn spawn_interval_ms(&self) -> u64 {
        self.difficulty.spawn_interval_ms(self.score)
    }

    pub fn last_spawn_ms(&self) -> u64 {
        self.pipes.last_spawn_ms()
    }

    pub fn scenery(&self) -> Scenery {
        self.scenery
    }

    pub fn control_mode(&self) -> ControlMode {
        self.control_mode
    }

    pub fn set_control_mode(&mut self, mode: ControlMode) {
        if self.control_mode != mode {
            info!(?mode, "control mode changed");
            self.control_mode = mode;
        }
    }

    /// Fall back to the keyboard after the gesture source gave up.
    pub fn downgrade_control_mode(&mut self) {
        self.set_control_mode(ControlMode::Keyboard);
    }

    pub fn input_device(&self) -> usize {
        self.input_device
    }

    /// Sounds queued since the last drain, in order.
    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }

    /// Apply a whole poll: the downgrade first, then each intent in order.
    pub fn handle_poll(&mut self, poll: InputPoll, now_ms: u64) -> Flow {
        if poll.downgrade {
            self.downgrade_control_mode();
        }
        for intent in poll.intents {
            if self.handle_intent(intent, now_ms) == Flow::Quit {
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    pub fn handle_intent(&mut self, intent: Intent, now_ms: u64) -> Flow {
        match intent {
            Intent::Quit => return Flow::Quit,
            Intent::Jump => match self.state {
                GameState::Welcome => self.start(now_ms),
                GameState::Playing => self.jump(),
                GameState::GameOver => {
                    self.reset();
                    self.start(now_ms);
                }
            },
            Intent::ToggleControlMode => self.set_control_mode(self.control_mode.toggled()),
            Intent::SwitchInputDevice => {
                self.input_device = self.input_device.wrapping_add(1);
                debug!(device = self.input_device, "input device switched");
            }
        }
        Flow::Continue
    }

    /// Advance one tick. Only Playing moves anything.
    pub fn update(&mut self, now_ms: u64) {
        if self.state != GameState::Playing {
            return;
        }

        self.bird.update();
        let s = &self.config.scenery;
        self.scenery.advance(
            s.background_speed,
            s.ground_speed,
            f64::from(self.config.screen.game_width),
        );

        let interval = self.difficulty.spawn_interval_ms(self.score);
        let speed = self.difficulty.base_speed();
        if self.pipes.try_spawn(now_ms, interval, speed, &mut self.rng) {
            debug!(now_ms, interval, live = self.pipes.len(), "pipe spawned");
        }

        let bounds = self.bird.collision_bounds(self.config.hitbox);
        let tick = self.pipes.tick(&bounds, self.bird.x);
        for _ in 0..tick.passed {
            self.award_point();
        }
        if tick.collided {
            self.sounds.push(SoundEvent::Hit);
            self.game_over("pipe");
            return;
        }

        if self.bird.bottom() >= self.config.ground_y() {
            self.game_over("ground");
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            score: self.score,
            bird: BirdPose {
                x: self.bird.x,
                y: self.bird.y,
                angle: self.bird.angle,
                width: self.bird.width,
                height: self.bird.height,
            },
            pipes: self.pipes.pipes().iter().map(PipeView::from).collect(),
            scenery: self.scenery,
            field: FieldSize {
                width: self.config.screen.game_width,
                height: self.config.screen.height,
                ground_height: self.config.screen.ground_height,
            },
            base_speed: self.difficulty.base_speed(),
            control_mode: self.control_mode,
            input_device: self.input_device,
        }
    }

    /// Rebuild every per-round entity from the config. Control mode, input
    /// device and the RNG stream carry over.
    pub fn reset(&mut self) {
        self.state = GameState::Welcome;
        self.score = 0;
        self.bird = new_bird(&self.config);
        self.pipes = PipeField::new(&self.config);
        self.difficulty.reset();
        self.scenery = Scenery::default();
        self.sounds.clear();
    }

    fn start(&mut self, now_ms: u64) {
        self.state = GameState::Playing;
        self.pipes
            .reset_timer(now_ms, self.config.difficulty.initial_delay_ms);
        info!(now_ms, "round started");
        self.jump();
    }

    fn jump(&mut self) {
        self.bird.jump();
        self.sounds.push(SoundEvent::Jump);
    }

    fn award_point(&mut self) {
        self.score += 1;
        self.sounds.push(SoundEvent::Score);
        if let Some(speed) = self.difficulty.on_score(self.score) {
            self.pipes.set_speed(speed);
            info!(score = self.score, speed, "difficulty up");
        }
    }

    fn game_over(&mut self, cause: &str) {
        self.state = GameState::GameOver;
        info!(score = self.score, cause, "game over");
    }
}

fn new_bird(config: &GameConfig) -> Bird {
    Bird::new(&config.bird, f64::from(config.screen.height / 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::FixedInterval;

    fn session() -> GameSession {
        GameSession::with_rng(GameConfig::default(), StdRng::seed_from_u64(7)).unwrap()
    }

    fn playing() -> GameSession {
        let mut s = session();
        s.handle_intent(Intent::Jump, 0);
        s
    }

    #[test]
    fn starts_in_welcome_and_is_inert() {
        let mut s = session();
        assert_eq!(s.state(), GameState::Welcome);
        let before = s.bird().clone();
        for t in 0..100 {
            s.update(t * 16);
        }
        assert_eq!(s.bird(), &before);
        assert!(s.pipes().is_empty());
        assert_eq!(s.scenery(), Scenery::default());
    }

    #[test]
    fn jump_from_welcome_starts_and_flaps() {
        let mut s = session();
        assert_eq!(s.handle_intent(Intent::Jump, 1234), Flow::Continue);
        assert_eq!(s.state(), GameState::Playing);
        assert_eq!(s.last_spawn_ms(), 1234);
        assert_eq!(s.bird().velocity, -12.0);
        assert_eq!(s.drain_sounds(), vec![SoundEvent::Jump]);
    }

    #[test]
    fn quit_from_any_state() {
        let mut s = session();
        assert_eq!(s.handle_intent(Intent::Quit, 0), Flow::Quit);
        s.handle_intent(Intent::Jump, 0);
        assert_eq!(s.handle_intent(Intent::Quit, 0), Flow::Quit);
    }

    #[test]
    fn ground_contact_ends_round_without_hit_sound() {
        let mut s = playing();
        s.drain_sounds();
        let mut t = 0;
        while s.state() == GameState::Playing {
            t += 16;
            s.update(t);
            assert!(t < 10_000, "bird never landed");
        }
        assert_eq!(s.state(), GameState::GameOver);
        assert!(s.bird().bottom() >= 550.0);
        assert!(!s.drain_sounds().contains(&SoundEvent::Hit));
    }

    #[test]
    fn ground_threshold_is_inclusive() {
        let mut s = playing();
        // Velocity cancels to zero, leaving the bottom edge exactly on the ground.
        s.bird_mut().y = 520.0;
        s.bird_mut().velocity = -0.8;
        s.update(16);
        assert_eq!(s.state(), GameState::GameOver);
    }

    #[test]
    fn restart_rebuilds_round_but_keeps_preferences() {
        let mut s = playing();
        s.handle_intent(Intent::ToggleControlMode, 0);
        s.handle_intent(Intent::SwitchInputDevice, 0);
        s.insert_pipe(123.0, 200);
        s.update(16);
        assert_eq!(s.score(), 1);
        while s.state() == GameState::Playing {
            s.update(16);
        }
        s.handle_intent(Intent::Jump, 5000);

        assert_eq!(s.state(), GameState::Playing);
        assert_eq!(s.score(), 0);
        assert!(s.pipes().is_empty());
        assert_eq!(s.base_speed(), 4.0);
        assert_eq!(s.bird().y, 300.0);
        assert_eq!(s.bird().velocity, -12.0);
        assert_eq!(s.last_spawn_ms(), 5000);
        assert_eq!(s.control_mode(), ControlMode::Gesture);
        assert_eq!(s.input_device(), 1);
    }

    #[test]
    fn downgrade_poll_falls_back_to_keyboard() {
        let mut s = session();
        s.set_control_mode(ControlMode::Gesture);
        let flow = s.handle_poll(InputPoll::failed(), 0);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(s.control_mode(), ControlMode::Keyboard);
    }

    #[test]
    fn poll_stops_at_quit() {
        let mut s = session();
        let poll = InputPoll {
            intents: vec![Intent::Quit, Intent::Jump],
            downgrade: false,
        };
        assert_eq!(s.handle_poll(poll, 0), Flow::Quit);
        assert_eq!(s.state(), GameState::Welcome);
    }

    #[test]
    fn scenery_scrolls_and_wraps_while_playing() {
        let mut s = playing();
        s.update(16);
        assert_eq!(s.scenery().background_x, 799.0);
        assert_eq!(s.scenery().ground_x, 797.0);
    }

    #[test]
    fn first_pipe_waits_one_interval() {
        let mut s = playing();
        s.update(1500);
        assert!(s.pipes().is_empty());
        s.update(1501);
        assert_eq!(s.pipes().len(), 1);
        assert_eq!(s.pipes()[0].x, 796.0);
    }

    #[test]
    fn stepped_curve_shortens_spawns_with_score() {
        let mut config = GameConfig::default();
        config.difficulty.spawn = crate::config::SpawnCurveConfig::Stepped {
            start_ms: 2500,
            step_ms: 100,
            floor_ms: 1800,
        };
        let mut s = GameSession::with_rng(config, StdRng::seed_from_u64(1)).unwrap();
        s.handle_intent(Intent::Jump, 0);
        assert_eq!(s.spawn_interval_ms(), 2500);
        for _ in 0..5 {
            s.insert_pipe(123.0, 200);
        }
        s.update(16);
        assert_eq!(s.score(), 5);
        assert_eq!(s.spawn_interval_ms(), 2400);
    }

    #[test]
    fn custom_spawn_curve_survives_restart() {
        let mut s = session().with_spawn_curve(Box::new(FixedInterval(100)));
        s.handle_intent(Intent::Jump, 0);
        assert_eq!(s.spawn_interval_ms(), 100);
        s.update(100);
        assert!(s.pipes().is_empty());
        s.update(101);
        assert_eq!(s.pipes().len(), 1);

        while s.state() == GameState::Playing {
            s.update(101);
        }
        s.handle_intent(Intent::Jump, 1000);
        assert_eq!(s.spawn_interval_ms(), 100);
    }

    #[test]
    fn pipe_cleared_on_the_crash_tick_still_scores() {
        let mut s = playing();
        s.drain_sounds();
        s.insert_pipe(123.0, 200);
        s.insert_pipe(180.0, 200);
        s.bird_mut().y = 100.0;
        s.bird_mut().velocity = -0.8;

        s.update(16);

        assert_eq!(s.state(), GameState::GameOver);
        assert_eq!(s.score(), 1);
        assert_eq!(s.drain_sounds(), vec![SoundEvent::Score, SoundEvent::Hit]);
    }

    #[test]
    fn rejects_config_that_cannot_place_pipes() {
        let mut config = GameConfig::default();
        config.pipes.gap = 560;
        let err = GameSession::with_rng(config, StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn snapshot_mirrors_state() {
        let mut s = playing();
        s.insert_pipe(600.0, 120);
        let snap = s.snapshot();
        assert_eq!(snap.state, GameState::Playing);
        assert_eq!(snap.bird.x, 200.0);
        assert_eq!(snap.bird.angle, 30.0);
        assert_eq!(snap.pipes.len(), 1);
        assert_eq!(snap.pipes[0].bottom_y, 300);
        assert_eq!(snap.pipes[0].bottom_height, 300);
        assert_eq!(snap.ground_y(), 550);
    }
}
