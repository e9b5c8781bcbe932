use crate::config::{BirdConfig, Hitbox};
use crate::geometry::Rect;

/// The player. `y` is the top edge of the sprite; `x` never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub x: f64,
    pub y: f64,
    pub velocity: f64,
    /// Degrees, positive is nose up.
    pub angle: f64,
    pub width: u32,
    pub height: u32,
    gravity: f64,
    jump_strength: f64,
    max_angle: f64,
    min_angle: f64,
    rotation_speed: f64,
}

impl Bird {
    pub fn new(config: &BirdConfig, y: f64) -> Self {
        Self {
            x: config.x,
            y,
            velocity: 0.0,
            angle: 0.0,
            width: config.width,
            height: config.height,
            gravity: config.gravity,
            jump_strength: config.jump_strength,
            max_angle: config.max_angle,
            min_angle: config.min_angle,
            rotation_speed: config.rotation_speed,
        }
    }

    /// Replace the velocity with the jump impulse and snap the nose up.
    pub fn jump(&mut self) {
        self.velocity = self.jump_strength;
        self.angle = self.max_angle;
    }

    /// One Euler step: velocity first, then position.
    pub fn update(&mut self) {
        self.velocity += self.gravity;
        self.y += self.velocity;

        if self.velocity < 0.0 {
            self.angle = (self.angle + self.rotation_speed).min(self.max_angle);
        } else {
            self.angle = (self.angle - self.rotation_speed).max(self.min_angle);
        }

        // Ceiling
        if self.y < 0.0 {
            self.y = 0.0;
            self.velocity = 0.0;
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + f64::from(self.height)
    }

    pub fn collision_bounds(&self, hitbox: Hitbox) -> Rect {
        let (w, h) = (self.width, self.height);
        match hitbox {
            Hitbox::Inset => Rect::new(
                self.x + f64::from(w / 4),
                self.y + f64::from(h / 4),
                f64::from(w / 2),
                f64::from(h / 2),
            ),
            Hitbox::Full => Rect::new(self.x, self.y, f64::from(w), f64::from(h)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bird_at(y: f64) -> Bird {
        Bird::new(&BirdConfig::default(), y)
    }

    #[test]
    fn velocity_integrates_before_position() {
        let mut bird = bird_at(300.0);
        bird.velocity = 2.0;
        bird.update();
        assert!((bird.velocity - 2.8).abs() < 1e-9);
        assert!((bird.y - 302.8).abs() < 1e-9);
    }

    #[test]
    fn jump_replaces_velocity() {
        let mut bird = bird_at(300.0);
        bird.velocity = 9.5;
        bird.jump();
        assert_eq!(bird.velocity, -12.0);
        bird.velocity = -20.0;
        bird.jump();
        assert_eq!(bird.velocity, -12.0);
        assert_eq!(bird.angle, 30.0);
    }

    #[test]
    fn angle_tilts_down_while_falling_and_stops_at_min() {
        let mut bird = bird_at(100.0);
        for _ in 0..40 {
            bird.update();
        }
        assert_eq!(bird.angle, -90.0);
    }

    #[test]
    fn angle_rises_while_ascending_up_to_max() {
        let mut bird = bird_at(300.0);
        bird.angle = 20.0;
        bird.velocity = -10.0;
        bird.update();
        assert_eq!(bird.angle, 25.0);
        bird.update();
        assert_eq!(bird.angle, 30.0);
        bird.update();
        assert_eq!(bird.angle, 30.0);
    }

    #[test]
    fn ceiling_clamps_and_zeroes_velocity() {
        let mut bird = bird_at(5.0);
        bird.jump();
        bird.update();
        assert_eq!(bird.y, 0.0);
        assert_eq!(bird.velocity, 0.0);

        // Next tick falls from rest instead of sticking.
        bird.update();
        assert!((bird.y - 0.8).abs() < 1e-9);
    }

    #[test]
    fn no_clamp_when_staying_on_screen() {
        let mut bird = bird_at(200.0);
        bird.jump();
        bird.update();
        assert!((bird.velocity + 11.2).abs() < 1e-9);
        assert!((bird.y - 188.8).abs() < 1e-9);
    }

    #[test]
    fn inset_hitbox_is_centered_half_size() {
        let bird = bird_at(300.0);
        assert_eq!(
            bird.collision_bounds(Hitbox::Inset),
            Rect::new(210.0, 307.0, 20.0, 15.0)
        );
        assert_eq!(
            bird.collision_bounds(Hitbox::Full),
            Rect::new(200.0, 300.0, 40.0, 30.0)
        );
    }
}
