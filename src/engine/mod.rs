//! Synthesis engine boundary
//!
//! The engine is started once per text unit and then polled for audio chunks
//! until it reports that the run is done. Only one run may be active at a time.

#[cfg(feature = "libpiper")]
pub mod ffi;
#[cfg(feature = "libpiper")]
pub mod piper;

use crate::voice::VoiceFiles;
use crate::Result;
use std::path::Path;

/// Sample rate of every chunk the engine produces
pub const SAMPLE_RATE: u32 = 22050;

/// One buffer of mono 32-bit float samples
///
/// Borrowed from the engine; valid until the next poll.
#[derive(Debug, Clone, Copy)]
pub struct AudioChunk<'a> {
    pub samples: &'a [f32],
    pub sample_rate: u32,
}

/// Per-run synthesis options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisOptions {
    /// Speaker index for multi-speaker voices
    pub speaker_id: i32,
    /// Phoneme length multiplier; larger is slower speech
    pub length_scale: f32,
    /// Generator noise
    pub noise_scale: f32,
    /// Phoneme width noise
    pub noise_w_scale: f32,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            speaker_id: 0,
            length_scale: 1.0,
            noise_scale: 0.667,
            noise_w_scale: 0.8,
        }
    }
}

/// User overrides applied on top of the voice's default options
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OptionOverrides {
    pub speaker_id: Option<i32>,
    pub length_scale: Option<f32>,
    pub noise_scale: Option<f32>,
    pub noise_w_scale: Option<f32>,
}

impl OptionOverrides {
    /// Replace every default that has an override
    pub fn apply(&self, defaults: SynthesisOptions) -> SynthesisOptions {
        SynthesisOptions {
            speaker_id: self.speaker_id.unwrap_or(defaults.speaker_id),
            length_scale: self.length_scale.unwrap_or(defaults.length_scale),
            noise_scale: self.noise_scale.unwrap_or(defaults.noise_scale),
            noise_w_scale: self.noise_w_scale.unwrap_or(defaults.noise_w_scale),
        }
    }
}

/// Speech synthesizer driven one run at a time
///
/// `start` begins a run for a piece of text; `next_chunk` then yields audio
/// until it returns `None`. Starting a new run before the previous one is
/// exhausted is not allowed.
pub trait Synthesizer {
    /// Options the loaded voice uses when nothing is overridden
    fn default_options(&self) -> SynthesisOptions;

    /// Begin synthesizing `text`
    fn start(&mut self, text: &str, options: &SynthesisOptions) -> Result<()>;

    /// Next chunk of the current run, or `None` when the run is done
    fn next_chunk(&mut self) -> Result<Option<AudioChunk<'_>>>;
}

/// Create the synthesizer for a voice
#[cfg(feature = "libpiper")]
pub fn create(voice: &VoiceFiles, espeak_data: &Path) -> Result<Box<dyn Synthesizer>> {
    let synth = piper::PiperSynthesizer::new(&voice.model, &voice.config, espeak_data)?;
    Ok(Box::new(synth))
}

/// Create the synthesizer for a voice
#[cfg(not(feature = "libpiper"))]
pub fn create(voice: &VoiceFiles, espeak_data: &Path) -> Result<Box<dyn Synthesizer>> {
    log::debug!(
        "Cannot load {} with {}: built without libpiper",
        voice.model.display(),
        espeak_data.display()
    );
    Err(crate::PiperError::EngineInit(
        "this binary was built without synthesis support; rebuild with --features libpiper"
            .to_string(),
    ))
}
