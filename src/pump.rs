//! Chunk pump: moves one synthesis run's audio into a sink
//!
//! Strictly sequential: each poll of the engine completes before its chunk is
//! written, and each write completes before the next poll.

use crate::engine::{SynthesisOptions, Synthesizer};
use crate::sink::{AudioSink, SampleFormat, Samples};
use crate::Result;
use log::debug;

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub chunks: usize,
    pub samples: usize,
}

/// Convert a float sample to 16-bit PCM
///
/// Clamped to [-1.0, 1.0], scaled by `i16::MAX` and truncated; no dithering.
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Convert a float buffer into `out`, reusing its allocation
pub fn convert_into(samples: &[f32], out: &mut Vec<i16>) {
    out.clear();
    out.extend(samples.iter().map(|&s| f32_to_i16(s)));
}

/// Reusable conversion state for a sequence of runs
#[derive(Default)]
pub struct ChunkPump {
    scratch: Vec<i16>,
}

impl ChunkPump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthesize `text` and forward every chunk to `sink`, in order
    ///
    /// Empty text starts no run and writes nothing. A failed write ends the
    /// run and is returned; it is never retried.
    pub fn pump<S, K>(
        &mut self,
        synth: &mut S,
        text: &str,
        options: &SynthesisOptions,
        sink: &mut K,
    ) -> Result<PumpStats>
    where
        S: Synthesizer + ?Sized,
        K: AudioSink + ?Sized,
    {
        let mut stats = PumpStats::default();
        if text.is_empty() {
            debug!("Skipping empty text unit");
            return Ok(stats);
        }

        let format = sink.sample_format();
        synth.start(text, options)?;

        while let Some(chunk) = synth.next_chunk()? {
            match format {
                SampleFormat::F32Le => sink.write(Samples::F32(chunk.samples))?,
                SampleFormat::S16Le => {
                    convert_into(chunk.samples, &mut self.scratch);
                    sink.write(Samples::S16(&self.scratch))?;
                }
            }
            stats.chunks += 1;
            stats.samples += chunk.samples.len();
        }

        debug!(
            "Run finished: {} chunk(s), {} sample(s)",
            stats.chunks, stats.samples
        );
        Ok(stats)
    }
}

/// Pump a single run with a fresh conversion buffer
pub fn pump<S, K>(
    synth: &mut S,
    text: &str,
    options: &SynthesisOptions,
    sink: &mut K,
) -> Result<PumpStats>
where
    S: Synthesizer + ?Sized,
    K: AudioSink + ?Sized,
{
    ChunkPump::new().pump(synth, text, options, sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_bounds() {
        assert_eq!(f32_to_i16(1.0), i16::MAX);
        assert_eq!(f32_to_i16(-1.0), -i16::MAX);
        assert_eq!(f32_to_i16(0.0), 0);
    }

    #[test]
    fn test_conversion_clamps() {
        assert_eq!(f32_to_i16(1.5), i16::MAX);
        assert_eq!(f32_to_i16(-7.0), -i16::MAX);
        assert_eq!(f32_to_i16(f32::INFINITY), i16::MAX);
    }

    #[test]
    fn test_conversion_truncates() {
        // 0.5 * 32767 = 16383.5
        assert_eq!(f32_to_i16(0.5), 16383);
        assert_eq!(f32_to_i16(-0.5), -16383);
    }

    #[test]
    fn test_convert_into_reuses_buffer() {
        let mut out = vec![9; 10];
        convert_into(&[0.0, 1.0], &mut out);
        assert_eq!(out, vec![0, i16::MAX]);
    }
}
