//! The speaking pipeline
//!
//! acquire text -> create engine -> open sink -> one run per unit -> finish sink
//!
//! Each resource is owned by a local here and released when it goes out of
//! scope, so the engine is freed and the device closed on every exit path.

use crate::clean::clean_text;
use crate::config::Config;
use crate::engine::{self, SynthesisOptions, Synthesizer, SAMPLE_RATE};
use crate::input;
use crate::pump::ChunkPump;
use crate::sink::{AudioSink, Sink};
use crate::{PiperError, Result};
use log::{debug, info};

/// Totals over a whole process run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Text units read
    pub units: usize,
    /// Synthesis runs started (empty units start none)
    pub runs: usize,
    pub chunks: usize,
    pub samples: usize,
}

impl RunSummary {
    /// Seconds of audio produced
    pub fn duration_secs(&self) -> f64 {
        self.samples as f64 / SAMPLE_RATE as f64
    }
}

/// What a completed run hands back to the caller
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: RunSummary,
    /// Non-fatal error from finishing the sink, for the caller to report
    pub finish_error: Option<PiperError>,
}

/// Speak every unit in order through one synthesizer and one sink
///
/// Units are processed strictly one after another; the first error stops the
/// pipeline and is returned. The sink is not finished here.
pub fn speak_units<I, S, K>(
    units: I,
    synth: &mut S,
    options: &SynthesisOptions,
    sink: &mut K,
    clean: bool,
) -> Result<RunSummary>
where
    I: IntoIterator<Item = Result<String>>,
    S: Synthesizer + ?Sized,
    K: AudioSink + ?Sized,
{
    let mut summary = RunSummary::default();
    let mut pump = ChunkPump::new();

    for unit in units {
        let unit = unit?;
        summary.units += 1;

        let text = if clean { clean_text(&unit) } else { unit };
        if text.is_empty() {
            continue;
        }

        debug!("Speaking unit {} ({} bytes)", summary.units, text.len());
        let stats = pump.pump(synth, &text, options, sink)?;
        summary.runs += 1;
        summary.chunks += stats.chunks;
        summary.samples += stats.samples;
    }

    Ok(summary)
}

/// Run the whole pipeline for a configuration
pub fn run(config: &Config) -> Result<RunOutcome> {
    // Input first: a missing input file must fail before anything is created
    let units = input::acquire(&config.input, config.mode)?;

    let voice = config.voice.resolve()?;
    if let Some(metadata) = voice.metadata()? {
        metadata.check_speaker(config.overrides.speaker_id)?;
        metadata.check_sample_rate(SAMPLE_RATE);
    }

    let mut synth = engine::create(&voice, config.espeak_data())?;
    let options = config.overrides.apply(synth.default_options());
    debug!("Synthesis options: {:?}", options);

    let mut sink = Sink::open(&config.output)?;
    let summary = speak_units(units, synth.as_mut(), &options, &mut sink, config.clean)?;

    let finish_error = finish_sink(&mut sink)?;

    info!(
        "Spoke {} unit(s) in {} run(s): {} chunk(s), {:.2}s of audio",
        summary.units,
        summary.runs,
        summary.chunks,
        summary.duration_secs()
    );
    Ok(RunOutcome {
        summary,
        finish_error,
    })
}

/// Finish the sink, handing back an error only when it is non-fatal
///
/// Fatal errors are propagated as usual.
pub fn finish_sink<K: AudioSink + ?Sized>(sink: &mut K) -> Result<Option<PiperError>> {
    match sink.finish() {
        Ok(()) => Ok(None),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => Ok(Some(e)),
    }
}
