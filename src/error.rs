//! Error types for piper-cli

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for piper-cli
///
/// Components return these instead of terminating the process; `main` is the
/// only place that turns an error into an exit status.
#[derive(Error, Debug)]
pub enum PiperError {
    #[error("{0}")]
    Config(String),

    #[error("Cannot open input file: {}: {source}", .path.display())]
    InputFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open output file: {}: {source}", .path.display())]
    OutputFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to load model or eSpeak-ng data: {0}")]
    EngineInit(String),

    #[error("Synthesis error: {0}")]
    Engine(String),

    #[error("Invalid UTF-8 in input text: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Failed to wait for audio to play: {0}")]
    Drain(String),

    #[error("Voice metadata error: {0}")]
    VoiceMetadata(String),

    #[error("{0}")]
    Other(String),
}

impl PiperError {
    /// Whether the error must stop the pipeline.
    ///
    /// A drain failure happens after every chunk was accepted by the device,
    /// so it is reported but does not fail the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PiperError::Drain(_))
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Result type alias for piper-cli operations
pub type Result<T> = std::result::Result<T, PiperError>;

impl From<String> for PiperError {
    fn from(s: String) -> Self {
        PiperError::Other(s)
    }
}

impl From<&str> for PiperError {
    fn from(s: &str) -> Self {
        PiperError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for PiperError {
    fn from(e: serde_json::Error) -> Self {
        PiperError::VoiceMetadata(format!("JSON error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_file_error_names_path() {
        let err = PiperError::InputFile {
            path: PathBuf::from("missing.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert!(err.to_string().contains("missing.txt"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_drain_is_not_fatal() {
        assert!(!PiperError::Drain("timeout".into()).is_fatal());
        assert!(PiperError::Device("gone".into()).is_fatal());
        assert!(PiperError::Config("no model".into()).is_fatal());
    }
}
