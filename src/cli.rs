//! Command line interface
//!
//! Parsing only; turning the parsed flags into a `Config` happens in
//! `config::Config::from_cli`.

use clap::Parser;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Environment Variables:
  ESPEAK_DATA_PATH
        Path to the eSpeak-ng data directory.
        Default: '/data/data/com.termux/files/usr/share/espeak-ng-data'

  PIPER_VOICE_PATH
        Path to the directory containing ONNX voice models.
        Default: Current working directory.

Examples:
  1. Synthesize text and play it directly:
     piper -m fa_IR-gyro-medium -p -- \"سلام دنیا\"

  2. Read text from a file and save as 'audio.raw':
     piper -m en_US-lessac-medium -i text.txt -f audio.raw

  3. Pipe raw audio to a player:
     echo \"Hello world\" | piper -m en_US-lessac-medium --output-raw - | \\
     play -q -r 22050 -c 1 -e float -b 32 -t raw -

  4. Speak each line as it arrives:
     tail -f messages.txt | piper -m en_US-lessac-medium -p -l

Notes:
  Raw output is 32-bit float, little-endian, 22050 Hz, mono, with no header.";

/// Text-to-speech with Piper voices
#[derive(Parser, Debug, Default)]
#[command(
    name = "piper",
    version,
    about = "Text-to-speech with Piper voices, written to a file, stdout, or played directly",
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Name of the ONNX voice model to use (without the .onnx extension)
    #[arg(short, long, value_name = "MODEL_NAME", conflicts_with = "any_voice")]
    pub model: Option<String>,

    /// Use the first voice found in the voice directory
    #[arg(long)]
    pub any_voice: bool,

    /// Write synthesized audio to a file (default: output.raw)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "OUTPUT_FILE",
        num_args = 0..=1,
        default_missing_value = "output.raw",
        conflicts_with_all = ["output_raw", "play"]
    )]
    pub output_file: Option<PathBuf>,

    /// Write raw audio to standard output for piping
    #[arg(
        long = "output-raw",
        value_name = "-",
        value_parser = ["-"],
        conflicts_with = "play"
    )]
    pub output_raw: Option<String>,

    /// Play the synthesized audio directly
    #[arg(short, long)]
    pub play: bool,

    /// Read text from the specified file instead of stdin or the command line
    #[arg(short, long, value_name = "INPUT_FILE", conflicts_with = "text")]
    pub input: Option<PathBuf>,

    /// Speak each line of stdin as soon as it is read
    #[arg(short, long)]
    pub lines: bool,

    /// Remove emoji and links before speaking
    #[arg(short, long)]
    pub clean: bool,

    /// Phoneme length multiplier (larger is slower)
    #[arg(long, value_name = "SCALE")]
    pub length_scale: Option<f32>,

    /// Speaker id for multi-speaker voices
    #[arg(long, value_name = "ID", allow_negative_numbers = true)]
    pub speaker: Option<i32>,

    /// Generator noise
    #[arg(long, value_name = "SCALE")]
    pub noise_scale: Option<f32>,

    /// Phoneme width noise
    #[arg(long, value_name = "SCALE")]
    pub noise_w_scale: Option<f32>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Input text to synthesize (use -- before text that starts with '-')
    #[arg(trailing_var_arg = true, value_name = "TEXT")]
    pub text: Vec<String>,
}

impl Cli {
    /// Trailing words joined with single spaces, if any were given
    pub fn inline_text(&self) -> Option<String> {
        if self.text.is_empty() {
            None
        } else {
            Some(self.text.join(" "))
        }
    }
}
