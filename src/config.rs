//! Configuration
//!
//! Built once from the parsed command line and a snapshot of the environment,
//! then shared read-only by every component. Construction does no I/O, so an
//! invalid configuration is rejected before any file is opened or any engine
//! is created.

use crate::cli::Cli;
use crate::engine::OptionOverrides;
use crate::input::{InputMode, InputSource};
use crate::sink::OutputTarget;
use crate::voice::VoiceFiles;
use crate::{PiperError, Result};
use std::path::{Path, PathBuf};

/// eSpeak-ng data used when `ESPEAK_DATA_PATH` is not set
pub const DEFAULT_ESPEAK_DATA_PATH: &str = "/data/data/com.termux/files/usr/share/espeak-ng-data";

/// Voice directory used when `PIPER_VOICE_PATH` is not set
pub const DEFAULT_VOICE_DIR: &str = ".";

/// Environment variables the configuration depends on
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `ESPEAK_DATA_PATH`
    pub espeak_data_path: Option<PathBuf>,
    /// `PIPER_VOICE_PATH`
    pub voice_path: Option<PathBuf>,
}

impl Environment {
    /// Snapshot the current process environment
    pub fn from_process() -> Self {
        Self {
            espeak_data_path: std::env::var_os("ESPEAK_DATA_PATH").map(PathBuf::from),
            voice_path: std::env::var_os("PIPER_VOICE_PATH").map(PathBuf::from),
        }
    }

    pub fn espeak_data(&self) -> PathBuf {
        self.espeak_data_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ESPEAK_DATA_PATH))
    }

    pub fn voice_dir(&self) -> PathBuf {
        self.voice_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VOICE_DIR))
    }
}

/// How the voice is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelection {
    /// `<dir>/<name>.onnx` and `<dir>/<name>.onnx.json`
    Named(VoiceFiles),
    /// First complete pair found in the directory, resolved at startup
    FirstIn(PathBuf),
}

impl VoiceSelection {
    /// Resolve to concrete files
    pub fn resolve(&self) -> Result<VoiceFiles> {
        match self {
            VoiceSelection::Named(files) => Ok(files.clone()),
            VoiceSelection::FirstIn(dir) => VoiceFiles::find_any(dir),
        }
    }
}

/// Immutable run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub voice: VoiceSelection,
    pub espeak_data: PathBuf,
    pub input: InputSource,
    pub mode: InputMode,
    pub output: OutputTarget,
    pub overrides: OptionOverrides,
    /// Run the text cleaner on every unit
    pub clean: bool,
}

impl Config {
    /// Build and validate the configuration
    pub fn from_cli(cli: &Cli, env: &Environment) -> Result<Self> {
        let voice_dir = env.voice_dir();
        let voice = match (&cli.model, cli.any_voice) {
            (Some(name), _) if !name.is_empty() => {
                VoiceSelection::Named(VoiceFiles::from_name(&voice_dir, name))
            }
            (_, true) => VoiceSelection::FirstIn(voice_dir),
            _ => {
                return Err(PiperError::Config(
                    "Model name is required. Use -m <MODEL_NAME>.".to_string(),
                ))
            }
        };

        let output = if cli.play {
            if !cfg!(feature = "pulseaudio") {
                return Err(PiperError::Config(
                    "Playback support is not enabled. Rebuild with --features pulseaudio."
                        .to_string(),
                ));
            }
            OutputTarget::Device
        } else if cli.output_raw.is_some() {
            OutputTarget::Stdout
        } else if let Some(path) = &cli.output_file {
            OutputTarget::File(path.clone())
        } else {
            OutputTarget::default()
        };

        let input = if let Some(path) = &cli.input {
            InputSource::File(path.clone())
        } else if let Some(text) = cli.inline_text() {
            InputSource::Inline(text)
        } else {
            InputSource::Stdin
        };

        let mode = if cli.lines {
            if input != InputSource::Stdin {
                return Err(PiperError::Config(
                    "--lines only applies to text read from stdin".to_string(),
                ));
            }
            InputMode::Lines
        } else {
            InputMode::Whole
        };

        let overrides = OptionOverrides {
            speaker_id: cli.speaker,
            length_scale: cli.length_scale,
            noise_scale: cli.noise_scale,
            noise_w_scale: cli.noise_w_scale,
        };
        validate_overrides(&overrides)?;

        Ok(Self {
            voice,
            espeak_data: env.espeak_data(),
            input,
            mode,
            output,
            overrides,
            clean: cli.clean,
        })
    }

    pub fn espeak_data(&self) -> &Path {
        &self.espeak_data
    }
}

fn validate_overrides(overrides: &OptionOverrides) -> Result<()> {
    if let Some(id) = overrides.speaker_id {
        if id < 0 {
            return Err(PiperError::Config(format!(
                "speaker id must not be negative (got {})",
                id
            )));
        }
    }

    let scales = [
        ("length scale", overrides.length_scale),
        ("noise scale", overrides.noise_scale),
        ("noise width scale", overrides.noise_w_scale),
    ];
    for (name, value) in scales {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(PiperError::Config(format!(
                    "{} must be a non-negative number (got {})",
                    name, v
                )));
            }
        }
    }
    if overrides.length_scale == Some(0.0) {
        return Err(PiperError::Config(
            "length scale must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
