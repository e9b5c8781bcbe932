//! Hand-wave control.
//!
//! Camera capture and landmark detection live behind [`HandTracker`]; this
//! module only turns a stream of wrist heights into jump intents. A wave is an
//! upward swing of the wrist: it fires once, then the hand has to drop back
//! down before the next wave can fire.

use thiserror::Error;
use tracing::{debug, warn};

use super::{InputPoll, InputSource, Intent};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("no camera at index {0}")]
    NoDevice(usize),

    #[error("frame capture failed: {0}")]
    Capture(String),

    #[error("hand detector failed: {0}")]
    Detector(String),
}

/// One detection result. Coordinates are normalized to the camera frame,
/// `0.0` at the top edge and `1.0` at the bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandSample {
    pub wrist_y: f32,
}

pub trait HandTracker {
    fn device_count(&self) -> usize;

    fn select_device(&mut self, index: usize) -> Result<(), TrackerError>;

    /// `Ok(None)` when the frame was read but no hand is in view.
    fn sample(&mut self) -> Result<Option<HandSample>, TrackerError>;
}

impl<T: HandTracker + ?Sized> HandTracker for Box<T> {
    fn device_count(&self) -> usize {
        (**self).device_count()
    }

    fn select_device(&mut self, index: usize) -> Result<(), TrackerError> {
        (**self).select_device(index)
    }

    fn sample(&mut self) -> Result<Option<HandSample>, TrackerError> {
        (**self).sample()
    }
}

/// Edge-triggered wave detection with hysteresis.
#[derive(Debug, Clone)]
pub struct WaveDetector {
    threshold: f32,
    rearm: f32,
    armed: bool,
    /// Lowest wrist position while armed, highest while disarmed.
    anchor: Option<f32>,
}

impl WaveDetector {
    pub fn new(threshold: f32, rearm: f32) -> Self {
        Self {
            threshold,
            rearm,
            armed: true,
            anchor: None,
        }
    }

    /// Returns true on the sample that completes an upward wave.
    pub fn feed(&mut self, sample: Option<HandSample>) -> bool {
        let Some(HandSample { wrist_y: y }) = sample else {
            self.reset();
            return false;
        };
        let Some(anchor) = self.anchor else {
            self.anchor = Some(y);
            return false;
        };

        if self.armed {
            if anchor - y > self.threshold {
                self.armed = false;
                self.anchor = Some(y);
                return true;
            }
            self.anchor = Some(anchor.max(y));
        } else if y - anchor > self.rearm {
            self.armed = true;
            self.anchor = Some(y);
        } else {
            self.anchor = Some(anchor.min(y));
        }
        false
    }

    pub fn reset(&mut self) {
        self.armed = true;
        self.anchor = None;
    }
}

impl Default for WaveDetector {
    fn default() -> Self {
        Self::new(0.12, 0.08)
    }
}

pub struct GestureInput<T> {
    tracker: T,
    detector: WaveDetector,
    device: usize,
}

impl<T: HandTracker> GestureInput<T> {
    pub fn new(tracker: T) -> Self {
        Self::with_detector(tracker, WaveDetector::default())
    }

    pub fn with_detector(tracker: T, detector: WaveDetector) -> Self {
        Self {
            tracker,
            detector,
            device: 0,
        }
    }

    pub fn device(&self) -> usize {
        self.device
    }

    /// Switch cameras. `index` wraps around the available devices.
    pub fn select_device(&mut self, index: usize) -> Result<(), TrackerError> {
        let count = self.tracker.device_count();
        if count == 0 {
            return Err(TrackerError::NoDevice(index));
        }
        let index = index % count;
        self.tracker.select_device(index)?;
        self.device = index;
        self.detector.reset();
        debug!(device = index, "gesture camera selected");
        Ok(())
    }
}

impl<T: HandTracker> InputSource for GestureInput<T> {
    fn poll(&mut self) -> InputPoll {
        match self.tracker.sample() {
            Ok(sample) => {
                let intents = if self.detector.feed(sample) {
                    vec![Intent::Jump]
                } else {
                    Vec::new()
                };
                InputPoll {
                    intents,
                    downgrade: false,
                }
            }
            Err(e) => {
                warn!("gesture input unavailable: {e}");
                self.detector.reset();
                InputPoll::failed()
            }
        }
    }
}
