//! piper-cli - command-line front end for Piper text-to-speech
//!
//! Reads text from an argument, a file, or stdin, synthesizes it with a Piper
//! voice, and writes the audio to a raw file, to stdout, or to a live device.

pub mod clean;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod pump;
pub mod sink;
pub mod voice;

pub use error::{PiperError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "piper";
