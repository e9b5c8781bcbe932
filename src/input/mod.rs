//! Input sources. Whatever drives the bird, the session only ever sees a
//! list of [`Intent`]s per tick.

pub mod gesture;
pub mod keyboard;

pub use gesture::{GestureInput, HandSample, HandTracker, TrackerError, WaveDetector};
pub use keyboard::{KeyboardInput, map_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Jump,
    Quit,
    ToggleControlMode,
    SwitchInputDevice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlMode {
    #[default]
    Keyboard,
    Gesture,
}

impl ControlMode {
    pub fn toggled(self) -> Self {
        match self {
            ControlMode::Keyboard => ControlMode::Gesture,
            ControlMode::Gesture => ControlMode::Keyboard,
        }
    }
}

/// One tick's worth of input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputPoll {
    pub intents: Vec<Intent>,
    /// The source failed and asks to fall back to the keyboard.
    pub downgrade: bool,
}

impl InputPoll {
    pub fn failed() -> Self {
        Self {
            intents: Vec::new(),
            downgrade: true,
        }
    }

    pub fn merge(&mut self, other: InputPoll) {
        self.intents.extend(other.intents);
        self.downgrade |= other.downgrade;
    }
}

/// Produces intents once per tick. Implementations never fail outward: on
/// trouble they yield nothing, optionally with `downgrade` set.
pub trait InputSource {
    fn poll(&mut self) -> InputPoll;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_modes() {
        assert_eq!(ControlMode::Keyboard.toggled(), ControlMode::Gesture);
        assert_eq!(ControlMode::Gesture.toggled(), ControlMode::Keyboard);
    }

    #[test]
    fn merge_keeps_order_and_sticky_downgrade() {
        let mut poll = InputPoll {
            intents: vec![Intent::Jump],
            downgrade: false,
        };
        poll.merge(InputPoll::failed());
        poll.merge(InputPoll {
            intents: vec![Intent::Quit],
            downgrade: false,
        });
        assert_eq!(poll.intents, vec![Intent::Jump, Intent::Quit]);
        assert!(poll.downgrade);
    }
}
