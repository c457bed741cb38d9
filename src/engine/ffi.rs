//! Raw bindings to the libpiper C API (`piper.h`)

use std::ffi::{c_char, c_int};

/// Returned by `piper_synthesize_next` while more audio follows
pub const PIPER_OK: c_int = 0;
/// Returned by `piper_synthesize_next` once the run is exhausted
pub const PIPER_DONE: c_int = 1;

#[repr(C)]
pub struct PiperSynthesizer {
    _private: [u8; 0],
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PiperSynthesizeOptions {
    pub speaker_id: c_int,
    pub length_scale: f32,
    pub noise_scale: f32,
    pub noise_w_scale: f32,
}

#[repr(C)]
#[derive(Debug)]
pub struct PiperAudioChunk {
    pub samples: *const f32,
    pub num_samples: usize,
    pub sample_rate: c_int,
    pub is_last: bool,
    pub phonemes: *const u32,
    pub num_phonemes: usize,
    pub phoneme_ids: *const c_int,
    pub num_phoneme_ids: usize,
    pub alignments: *const c_int,
    pub num_alignments: usize,
}

impl PiperAudioChunk {
    pub fn empty() -> Self {
        Self {
            samples: std::ptr::null(),
            num_samples: 0,
            sample_rate: 0,
            is_last: false,
            phonemes: std::ptr::null(),
            num_phonemes: 0,
            phoneme_ids: std::ptr::null(),
            num_phoneme_ids: 0,
            alignments: std::ptr::null(),
            num_alignments: 0,
        }
    }
}

extern "C" {
    pub fn piper_create(
        model_path: *const c_char,
        config_path: *const c_char,
        espeak_data_path: *const c_char,
    ) -> *mut PiperSynthesizer;

    pub fn piper_free(synth: *mut PiperSynthesizer);

    pub fn piper_default_synthesize_options(
        synth: *mut PiperSynthesizer,
    ) -> PiperSynthesizeOptions;

    pub fn piper_synthesize_start(
        synth: *mut PiperSynthesizer,
        text: *const c_char,
        options: *const PiperSynthesizeOptions,
    ) -> c_int;

    pub fn piper_synthesize_next(
        synth: *mut PiperSynthesizer,
        chunk: *mut PiperAudioChunk,
    ) -> c_int;
}
