//! Audio sinks
//!
//! A sink receives the chunks of every synthesis run in order. It is opened
//! once at startup and finished once after the last run:
//! - `File`: raw samples written to a file created (truncated) at open
//! - `Stdout`: raw samples written to standard output for piping
//! - `Device`: 16-bit samples played through a live audio device

pub mod device;
#[cfg(feature = "pulseaudio")]
pub mod pulseaudio;

pub use device::{DeviceFormat, DeviceSession, PlaybackDevice, SessionState};

use crate::{PiperError, Result};
use log::{debug, info, warn};
use nix::libc;
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// Default output file when `-f` is given without a name
pub const DEFAULT_OUTPUT_FILE: &str = "output.raw";

/// Where audio goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
    Device,
}

impl Default for OutputTarget {
    fn default() -> Self {
        OutputTarget::File(PathBuf::from(DEFAULT_OUTPUT_FILE))
    }
}

/// Sample representation a sink accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// 32-bit IEEE float, little-endian
    F32Le,
    /// 16-bit signed integer, little-endian
    S16Le,
}

impl SampleFormat {
    /// Bytes per mono sample
    pub fn sample_size(self) -> usize {
        match self {
            SampleFormat::F32Le => 4,
            SampleFormat::S16Le => 2,
        }
    }
}

/// A buffer of samples in one of the supported formats
#[derive(Debug, Clone, Copy)]
pub enum Samples<'a> {
    F32(&'a [f32]),
    S16(&'a [i16]),
}

impl Samples<'_> {
    pub fn len(&self) -> usize {
        match self {
            Samples::F32(s) => s.len(),
            Samples::S16(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> SampleFormat {
        match self {
            Samples::F32(_) => SampleFormat::F32Le,
            Samples::S16(_) => SampleFormat::S16Le,
        }
    }

    /// Little-endian byte encoding of the samples
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            Samples::F32(s) => s.iter().flat_map(|v| v.to_le_bytes()).collect(),
            Samples::S16(s) => s.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }
}

/// Destination for a sequence of audio chunks
///
/// Writes of zero samples are no-ops. A write either delivers every sample or
/// returns an error; nothing is dropped silently.
pub trait AudioSink {
    /// Format `write` expects
    fn sample_format(&self) -> SampleFormat;

    /// Deliver one chunk
    fn write(&mut self, samples: Samples<'_>) -> Result<()>;

    /// Flush and release the destination after the last run
    fn finish(&mut self) -> Result<()>;
}

/// Raw sample bytes written to any `Write`: a file or a byte stream
pub struct ByteSink<W: Write> {
    writer: W,
    /// Flush after every chunk so a downstream player starts promptly
    flush_each: bool,
    bytes_written: u64,
}

impl<W: Write> ByteSink<W> {
    pub fn new(writer: W, flush_each: bool) -> Self {
        Self {
            writer,
            flush_each,
            bytes_written: 0,
        }
    }

    /// Total bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl ByteSink<BufWriter<File>> {
    /// Create (or truncate) `path` for raw output
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| PiperError::OutputFile {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Writing raw audio to {}", path.display());
        Ok(Self::new(BufWriter::new(file), false))
    }
}

impl ByteSink<Stdout> {
    /// Raw output on standard output; nothing is created or deleted
    pub fn stdout() -> Self {
        let stdout = io::stdout();
        if unsafe { libc::isatty(stdout.as_raw_fd()) } != 0 {
            warn!("Writing raw audio to a terminal; pipe the output to a player instead");
        }
        info!("Writing raw audio to stdout");
        Self::new(stdout, true)
    }
}

impl<W: Write> AudioSink for ByteSink<W> {
    fn sample_format(&self) -> SampleFormat {
        SampleFormat::F32Le
    }

    fn write(&mut self, samples: Samples<'_>) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let bytes = samples.to_le_bytes();
        self.writer.write_all(&bytes)?;
        if self.flush_each {
            self.writer.flush()?;
        }
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        debug!("Finishing byte sink after {} bytes", self.bytes_written);
        self.writer.flush()?;
        Ok(())
    }
}

/// The sink selected at startup
pub enum Sink {
    File(ByteSink<BufWriter<File>>),
    Stdout(ByteSink<Stdout>),
    Device(DeviceSession<Box<dyn PlaybackDevice>>),
}

impl Sink {
    /// Open the configured target
    ///
    /// The device is opened here, once, before the first run.
    pub fn open(target: &OutputTarget) -> Result<Self> {
        match target {
            OutputTarget::File(path) => Ok(Sink::File(ByteSink::create(path)?)),
            OutputTarget::Stdout => Ok(Sink::Stdout(ByteSink::stdout())),
            OutputTarget::Device => {
                let mut session = DeviceSession::new(open_playback_device()?);
                session.open(&DeviceFormat::default())?;
                Ok(Sink::Device(session))
            }
        }
    }

    fn inner(&mut self) -> &mut dyn AudioSink {
        match self {
            Sink::File(sink) => sink as &mut dyn AudioSink,
            Sink::Stdout(sink) => sink,
            Sink::Device(session) => session,
        }
    }
}

impl AudioSink for Sink {
    fn sample_format(&self) -> SampleFormat {
        match self {
            Sink::File(sink) => sink.sample_format(),
            Sink::Stdout(sink) => sink.sample_format(),
            Sink::Device(session) => session.sample_format(),
        }
    }

    fn write(&mut self, samples: Samples<'_>) -> Result<()> {
        self.inner().write(samples)
    }

    fn finish(&mut self) -> Result<()> {
        self.inner().finish()
    }
}

#[cfg(feature = "pulseaudio")]
fn open_playback_device() -> Result<Box<dyn PlaybackDevice>> {
    Ok(Box::new(pulseaudio::PulseDevice::new()))
}

#[cfg(not(feature = "pulseaudio"))]
fn open_playback_device() -> Result<Box<dyn PlaybackDevice>> {
    Err(PiperError::Device(
        "Playback support is not enabled; rebuild with --features pulseaudio".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_sink_writes_little_endian_floats() {
        let mut sink = ByteSink::new(Vec::new(), false);
        sink.write(Samples::F32(&[1.0, -0.5])).unwrap();
        sink.finish().unwrap();

        let mut expected = 1.0f32.to_le_bytes().to_vec();
        expected.extend_from_slice(&(-0.5f32).to_le_bytes());
        assert_eq!(sink.bytes_written(), 8);
        assert_eq!(sink.into_inner(), expected);
    }

    #[test]
    fn test_byte_sink_zero_length_write() {
        let mut sink = ByteSink::new(Vec::new(), true);
        sink.write(Samples::F32(&[])).unwrap();
        assert_eq!(sink.bytes_written(), 0);
        assert!(sink.into_inner().is_empty());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_short_write_is_an_error() {
        let mut sink = ByteSink::new(FailingWriter, false);
        assert!(sink.write(Samples::F32(&[0.25])).is_err());
    }

    #[test]
    fn test_file_sink_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.raw");
        std::fs::write(&path, vec![7u8; 64]).unwrap();

        let mut sink = ByteSink::create(&path).unwrap();
        sink.write(Samples::F32(&[0.0; 3])).unwrap();
        sink.finish().unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 12);
    }

    #[test]
    fn test_file_sink_unwritable_path() {
        let err = ByteSink::create(Path::new("/nonexistent-dir/out.raw"))
            .err()
            .unwrap();
        assert!(matches!(err, PiperError::OutputFile { .. }));
    }

    #[test]
    fn test_sample_sizes() {
        assert_eq!(SampleFormat::F32Le.sample_size(), 4);
        assert_eq!(SampleFormat::S16Le.sample_size(), 2);
        assert_eq!(Samples::S16(&[1, 2, 3]).to_le_bytes().len(), 6);
    }
}
