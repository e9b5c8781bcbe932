//! Sound effects. The session emits [`SoundEvent`]s; an [`AudioSink`] turns
//! them into noise, or into nothing.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEvent {
    Jump,
    Score,
    Hit,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output: {0}")]
    NoOutput(String),
}

/// Fire-and-forget playback.
pub trait AudioSink {
    fn play(&mut self, event: SoundEvent);
}

#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _event: SoundEvent) {}
}

#[cfg(feature = "audio")]
pub use synth::SynthAudio;

#[cfg(feature = "audio")]
mod synth {
    use fundsp::prelude32::*;
    use rodio::{OutputStream, OutputStreamBuilder, Sink, buffer::SamplesBuffer};

    use super::{AudioError, AudioSink, SoundEvent};

    const SAMPLE_RATE: u32 = 44_100;

    /// Sounds rendered once with fundsp, replayed through rodio.
    pub struct SynthAudio {
        stream: OutputStream,
        jump: Vec<f32>,
        score: Vec<f32>,
        hit: Vec<f32>,
    }

    impl SynthAudio {
        pub fn new() -> Result<Self, AudioError> {
            let stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| AudioError::NoOutput(e.to_string()))?;
            Ok(Self {
                stream,
                jump: render_jump(),
                score: render_score(),
                hit: render_hit(),
            })
        }
    }

    impl AudioSink for SynthAudio {
        fn play(&mut self, event: SoundEvent) {
            let samples = match event {
                SoundEvent::Jump => &self.jump,
                SoundEvent::Score => &self.score,
                SoundEvent::Hit => &self.hit,
            };
            let sink = Sink::connect_new(self.stream.mixer());
            sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.clone()));
            sink.detach(); // Play in background
        }
    }

    fn render(mut node: impl AudioUnit, seconds: f64) -> Vec<f32> {
        node.set_sample_rate(f64::from(SAMPLE_RATE));
        let n = (f64::from(SAMPLE_RATE) * seconds) as usize;
        (0..n).map(|_| node.get_mono() as f32).collect()
    }

    // Square chirp, 300Hz up to 600Hz over 0.1s.
    fn render_jump() -> Vec<f32> {
        let freq = lfo(|t| lerp(300.0, 600.0, clamp01(t / 0.1)));
        let gain = lfo(|t| lerp(0.12, 0.0, clamp01(t / 0.12)));
        render((freq >> square()) * gain, 0.12)
    }

    // Two sine blips, the second a fifth higher.
    fn render_score() -> Vec<f32> {
        let freq = lfo(|t| if t < 0.07 { 880.0 } else { 1320.0 });
        let gain = lfo(|t| lerp(0.15, 0.0, clamp01(t / 0.2)));
        render((freq >> sine()) * gain, 0.2)
    }

    // Sawtooth sweep, 400Hz down to 80Hz over 0.4s.
    fn render_hit() -> Vec<f32> {
        let freq = lfo(|t| lerp(400.0, 80.0, clamp01(t / 0.4)));
        let gain = lfo(|t| lerp(0.15, 0.0, clamp01(t / 0.5)));
        render((freq >> saw()) * gain, 0.5)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<SoundEvent>);

    impl AudioSink for Recorder {
        fn play(&mut self, event: SoundEvent) {
            self.0.push(event);
        }
    }

    #[test]
    fn sinks_are_object_safe() {
        let mut sinks: Vec<Box<dyn AudioSink>> = vec![Box::new(SilentAudio), Box::new(Recorder::default())];
        for sink in &mut sinks {
            sink.play(SoundEvent::Score);
        }
    }
}
