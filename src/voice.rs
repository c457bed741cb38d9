//! Voice model resolution
//!
//! A voice is a pair of files in the voice directory:
//! `<name>.onnx` (the model) and `<name>.onnx.json` (its config).

use crate::{PiperError, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Model and config paths for one voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceFiles {
    pub model: PathBuf,
    pub config: PathBuf,
}

impl VoiceFiles {
    /// Paths for a named voice in `dir`
    pub fn from_name(dir: &Path, name: &str) -> Self {
        let model = dir.join(format!("{}.onnx", name));
        let config = config_path_for(&model);
        Self { model, config }
    }

    /// First `*.onnx` file in `dir` that has a matching `*.onnx.json`
    ///
    /// Entries are visited in file-name order so the choice is stable.
    pub fn find_any(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(PiperError::Config(format!(
                "the voice directory ({}) does not exist",
                dir.display()
            )));
        }

        let mut models: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map_or(false, |ext| ext == "onnx"))
            .collect();
        models.sort();

        for model in models {
            let config = config_path_for(&model);
            if config.exists() {
                debug!("Found voice {}", model.display());
                return Ok(Self { model, config });
            }
            debug!("Skipping {}: no config file", model.display());
        }

        Err(PiperError::Config(format!(
            "the voice directory ({}) contains no voices",
            dir.display()
        )))
    }

    /// Read the voice's JSON config, if it is present
    pub fn metadata(&self) -> Result<Option<VoiceMetadata>> {
        if !self.config.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.config)?;
        let metadata: VoiceMetadata = serde_json::from_str(&text)?;
        Ok(Some(metadata))
    }
}

fn config_path_for(model: &Path) -> PathBuf {
    let mut config = model.as_os_str().to_owned();
    config.push(".json");
    PathBuf::from(config)
}

/// The parts of `<name>.onnx.json` this tool looks at
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceMetadata {
    #[serde(default)]
    pub audio: AudioMetadata,
    #[serde(default)]
    pub num_speakers: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioMetadata {
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

impl VoiceMetadata {
    /// Reject a speaker id the voice does not have
    pub fn check_speaker(&self, speaker_id: Option<i32>) -> Result<()> {
        let (Some(id), Some(count)) = (speaker_id, self.num_speakers) else {
            return Ok(());
        };
        if id < 0 || id as u32 >= count {
            return Err(PiperError::Config(format!(
                "speaker id {} is out of range; this voice has {} speaker(s)",
                id, count
            )));
        }
        Ok(())
    }

    /// Warn when the voice does not produce the expected sample rate
    pub fn check_sample_rate(&self, expected: u32) {
        if let Some(rate) = self.audio.sample_rate {
            if rate != expected {
                warn!(
                    "Voice sample rate is {} Hz; output is labelled {} Hz",
                    rate, expected
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        let voice = VoiceFiles::from_name(Path::new("/voices"), "en_US-lessac-medium");
        assert_eq!(voice.model, PathBuf::from("/voices/en_US-lessac-medium.onnx"));
        assert_eq!(
            voice.config,
            PathBuf::from("/voices/en_US-lessac-medium.onnx.json")
        );
    }

    #[test]
    fn test_find_any_picks_first_complete_pair() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.onnx"), b"").unwrap();
        fs::write(dir.path().join("b.onnx"), b"").unwrap();
        fs::write(dir.path().join("b.onnx.json"), b"{}").unwrap();
        fs::write(dir.path().join("c.onnx"), b"").unwrap();
        fs::write(dir.path().join("c.onnx.json"), b"{}").unwrap();

        let voice = VoiceFiles::find_any(dir.path()).unwrap();
        assert_eq!(voice.model, dir.path().join("b.onnx"));
        assert_eq!(voice.config, dir.path().join("b.onnx.json"));
    }

    #[test]
    fn test_find_any_without_voices() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lonely.onnx"), b"").unwrap();
        let err = VoiceFiles::find_any(dir.path()).unwrap_err();
        assert!(err.to_string().contains("contains no voices"));

        let err = VoiceFiles::find_any(&dir.path().join("missing")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_metadata_speaker_check() {
        let metadata: VoiceMetadata = serde_json::from_str(
            r#"{"audio": {"sample_rate": 22050}, "num_speakers": 4, "language": {"code": "fa_IR"}}"#,
        )
        .unwrap();
        assert_eq!(metadata.audio.sample_rate, Some(22050));
        assert!(metadata.check_speaker(Some(3)).is_ok());
        assert!(metadata.check_speaker(Some(4)).is_err());
        assert!(metadata.check_speaker(None).is_ok());

        let single = VoiceMetadata::default();
        assert!(single.check_speaker(Some(9)).is_ok());
    }
}
