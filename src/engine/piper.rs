//! Synthesizer backed by libpiper

use super::ffi;
use super::{AudioChunk, SynthesisOptions, Synthesizer, SAMPLE_RATE};
use crate::{PiperError, Result};
use log::{debug, info};
use std::ffi::CString;
use std::path::Path;
use std::ptr::NonNull;

/// Owning handle to a libpiper synthesizer
///
/// The handle is freed when this value is dropped, on every exit path.
pub struct PiperSynthesizer {
    handle: NonNull<ffi::PiperSynthesizer>,
    chunk: ffi::PiperAudioChunk,
    /// True while the current run may still produce chunks
    running: bool,
}

fn path_to_cstring(path: &Path) -> Result<CString> {
    let s = path
        .to_str()
        .ok_or_else(|| PiperError::EngineInit(format!("Invalid UTF-8 in path: {}", path.display())))?;
    CString::new(s)
        .map_err(|_| PiperError::EngineInit(format!("Null byte in path: {}", path.display())))
}

impl PiperSynthesizer {
    /// Load a voice model and its config with the given eSpeak-ng data
    pub fn new(model: &Path, config: &Path, espeak_data: &Path) -> Result<Self> {
        for path in [model, config] {
            if !path.exists() {
                return Err(PiperError::EngineInit(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
        }

        let c_model = path_to_cstring(model)?;
        let c_config = path_to_cstring(config)?;
        let c_espeak = path_to_cstring(espeak_data)?;

        debug!("Creating piper synthesizer for {}", model.display());
        let raw = unsafe { ffi::piper_create(c_model.as_ptr(), c_config.as_ptr(), c_espeak.as_ptr()) };
        let handle = NonNull::new(raw).ok_or_else(|| {
            PiperError::EngineInit(format!(
                "piper_create failed for {} (eSpeak-ng data: {})",
                model.display(),
                espeak_data.display()
            ))
        })?;
        info!("Loaded voice {}", model.display());

        Ok(Self {
            handle,
            chunk: ffi::PiperAudioChunk::empty(),
            running: false,
        })
    }
}

impl Synthesizer for PiperSynthesizer {
    fn default_options(&self) -> SynthesisOptions {
        let raw = unsafe { ffi::piper_default_synthesize_options(self.handle.as_ptr()) };
        SynthesisOptions {
            speaker_id: raw.speaker_id,
            length_scale: raw.length_scale,
            noise_scale: raw.noise_scale,
            noise_w_scale: raw.noise_w_scale,
        }
    }

    fn start(&mut self, text: &str, options: &SynthesisOptions) -> Result<()> {
        if self.running {
            return Err(PiperError::Engine(
                "a synthesis run is still in progress".to_string(),
            ));
        }

        let c_text = CString::new(text)
            .map_err(|_| PiperError::Engine("Null byte in text".to_string()))?;
        let raw_options = ffi::PiperSynthesizeOptions {
            speaker_id: options.speaker_id,
            length_scale: options.length_scale,
            noise_scale: options.noise_scale,
            noise_w_scale: options.noise_w_scale,
        };

        let status = unsafe {
            ffi::piper_synthesize_start(self.handle.as_ptr(), c_text.as_ptr(), &raw_options)
        };
        if status != ffi::PIPER_OK {
            return Err(PiperError::Engine(format!(
                "piper_synthesize_start returned {}",
                status
            )));
        }

        self.running = true;
        Ok(())
    }

    fn next_chunk(&mut self) -> Result<Option<AudioChunk<'_>>> {
        if !self.running {
            return Ok(None);
        }

        let status = unsafe { ffi::piper_synthesize_next(self.handle.as_ptr(), &mut self.chunk) };
        match status {
            ffi::PIPER_DONE => {
                self.running = false;
                Ok(None)
            }
            ffi::PIPER_OK => {
                let samples: &[f32] = if self.chunk.samples.is_null() || self.chunk.num_samples == 0 {
                    &[]
                } else {
                    // Valid until the next call into the engine, which needs &mut self
                    unsafe { std::slice::from_raw_parts(self.chunk.samples, self.chunk.num_samples) }
                };
                let sample_rate = u32::try_from(self.chunk.sample_rate).unwrap_or(SAMPLE_RATE);
                Ok(Some(AudioChunk {
                    samples,
                    sample_rate,
                }))
            }
            other => {
                self.running = false;
                Err(PiperError::Engine(format!(
                    "piper_synthesize_next returned {}",
                    other
                )))
            }
        }
    }
}

impl Drop for PiperSynthesizer {
    fn drop(&mut self) {
        debug!("Freeing piper synthesizer");
        unsafe { ffi::piper_free(self.handle.as_ptr()) };
    }
}
