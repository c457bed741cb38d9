//! Live playback session
//!
//! One session exists per process. It is opened before the first text unit,
//! written to for every chunk of every run, then drained and closed once:
//!
//! `Unopened -> Opened -> Draining -> Closed`
//!
//! Opening per unit would leave audible gaps between units.

use super::{AudioSink, SampleFormat, Samples};
use crate::engine::SAMPLE_RATE;
use crate::{PiperError, Result};
use log::{debug, info};

/// Format the device is opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFormat {
    pub sample_rate: u32,
    pub channels: u8,
    pub sample_format: SampleFormat,
}

impl Default for DeviceFormat {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            channels: 1,
            sample_format: SampleFormat::S16Le,
        }
    }
}

/// Playback backend driven by a `DeviceSession`
///
/// `write` blocks until the device has accepted the buffer and `drain` until
/// everything written has played.
pub trait PlaybackDevice {
    fn open(&mut self, format: &DeviceFormat) -> Result<()>;
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
    fn drain(&mut self) -> Result<()>;
    /// Release the device; must be safe after a failed open or write
    fn close(&mut self);
}

impl<D: PlaybackDevice + ?Sized> PlaybackDevice for Box<D> {
    fn open(&mut self, format: &DeviceFormat) -> Result<()> {
        (**self).open(format)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn drain(&mut self) -> Result<()> {
        (**self).drain()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Lifecycle state of a `DeviceSession`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Opened,
    Draining,
    Closed,
}

/// Owns a playback device for the whole process run
pub struct DeviceSession<D: PlaybackDevice> {
    device: D,
    state: SessionState,
    format: DeviceFormat,
    samples_written: u64,
}

impl<D: PlaybackDevice> DeviceSession<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            state: SessionState::Unopened,
            format: DeviceFormat::default(),
            samples_written: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Open the device; there is no fallback device if this fails
    pub fn open(&mut self, format: &DeviceFormat) -> Result<()> {
        if self.state != SessionState::Unopened {
            return Err(PiperError::Device(format!(
                "cannot open a session in state {:?}",
                self.state
            )));
        }

        self.device.open(format)?;
        self.format = *format;
        self.state = SessionState::Opened;
        info!(
            "Audio device opened ({} Hz, {} channel(s), {:?})",
            format.sample_rate, format.channels, format.sample_format
        );
        Ok(())
    }

    /// Queue 16-bit samples, blocking until the device accepts them
    pub fn write_samples(&mut self, samples: &[i16]) -> Result<()> {
        if self.state != SessionState::Opened {
            return Err(PiperError::Device(format!(
                "cannot write in state {:?}",
                self.state
            )));
        }
        if samples.is_empty() {
            return Ok(());
        }

        let bytes = Samples::S16(samples).to_le_bytes();
        self.device.write(&bytes)?;
        self.samples_written += samples.len() as u64;
        Ok(())
    }

    /// Block until everything written has played
    pub fn drain(&mut self) -> Result<()> {
        if self.state != SessionState::Opened {
            return Err(PiperError::Device(format!(
                "cannot drain in state {:?}",
                self.state
            )));
        }

        self.state = SessionState::Draining;
        debug!("Draining audio device ({} samples written)", self.samples_written);
        self.device.drain()
    }

    /// Release the device; safe to call in any state, and more than once
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        debug!("Closing audio device");
        self.device.close();
        self.state = SessionState::Closed;
    }
}

impl<D: PlaybackDevice> AudioSink for DeviceSession<D> {
    fn sample_format(&self) -> SampleFormat {
        self.format.sample_format
    }

    fn write(&mut self, samples: Samples<'_>) -> Result<()> {
        match samples {
            Samples::S16(s) => self.write_samples(s),
            Samples::F32(_) => Err(PiperError::Device(
                "device expects 16-bit samples".to_string(),
            )),
        }
    }

    /// Drain, then close whatever the drain result
    ///
    /// A drain failure is returned as `PiperError::Drain` so the caller can
    /// report it without failing the run.
    fn finish(&mut self) -> Result<()> {
        let drained = match self.state {
            SessionState::Opened => self.drain(),
            _ => Ok(()),
        };
        self.close();
        drained.map_err(|e| PiperError::Drain(e.to_string()))
    }
}

impl<D: PlaybackDevice> Drop for DeviceSession<D> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        calls: Vec<String>,
        bytes: usize,
    }

    struct MockDevice {
        log: Rc<RefCell<Log>>,
        fail_open: bool,
        fail_drain: bool,
    }

    impl MockDevice {
        fn new(log: Rc<RefCell<Log>>) -> Self {
            Self {
                log,
                fail_open: false,
                fail_drain: false,
            }
        }
    }

    impl PlaybackDevice for MockDevice {
        fn open(&mut self, _format: &DeviceFormat) -> Result<()> {
            self.log.borrow_mut().calls.push("open".into());
            if self.fail_open {
                return Err(PiperError::Device("no device".into()));
            }
            Ok(())
        }

        fn write(&mut self, bytes: &[u8]) -> Result<()> {
            let mut log = self.log.borrow_mut();
            log.calls.push("write".into());
            log.bytes += bytes.len();
            Ok(())
        }

        fn drain(&mut self) -> Result<()> {
            self.log.borrow_mut().calls.push("drain".into());
            if self.fail_drain {
                return Err(PiperError::Device("drain timeout".into()));
            }
            Ok(())
        }

        fn close(&mut self) {
            self.log.borrow_mut().calls.push("close".into());
        }
    }

    #[test]
    fn test_lifecycle() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut session = DeviceSession::new(MockDevice::new(log.clone()));
        assert_eq!(session.state(), SessionState::Unopened);

        session.open(&DeviceFormat::default()).unwrap();
        assert_eq!(session.state(), SessionState::Opened);

        session.write(Samples::S16(&[1, 2, 3])).unwrap();
        session.write(Samples::S16(&[])).unwrap();
        session.write(Samples::S16(&[4])).unwrap();
        assert_eq!(session.samples_written(), 4);

        session.finish().unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        drop(session);

        let log = log.borrow();
        assert_eq!(log.calls, vec!["open", "write", "write", "drain", "close"]);
        assert_eq!(log.bytes, 8);
    }

    #[test]
    fn test_write_before_open_fails() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut session = DeviceSession::new(MockDevice::new(log));
        assert!(session.write_samples(&[1]).is_err());
    }

    #[test]
    fn test_float_samples_rejected() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut session = DeviceSession::new(MockDevice::new(log));
        session.open(&DeviceFormat::default()).unwrap();
        assert_eq!(session.sample_format(), SampleFormat::S16Le);
        assert!(session.write(Samples::F32(&[0.5])).is_err());
    }

    #[test]
    fn test_close_after_failed_open() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut device = MockDevice::new(log.clone());
        device.fail_open = true;
        let mut session = DeviceSession::new(device);

        assert!(session.open(&DeviceFormat::default()).is_err());
        assert_eq!(session.state(), SessionState::Unopened);
        session.close();
        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        drop(session);

        assert_eq!(log.borrow().calls, vec!["open", "close"]);
    }

    #[test]
    fn test_drain_failure_still_closes() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut device = MockDevice::new(log.clone());
        device.fail_drain = true;
        let mut session = DeviceSession::new(device);
        session.open(&DeviceFormat::default()).unwrap();

        let err = session.finish().unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(log.borrow().calls, vec!["open", "drain", "close"]);
    }

    #[test]
    fn test_drop_closes_once() {
        let log = Rc::new(RefCell::new(Log::default()));
        {
            let mut session = DeviceSession::new(MockDevice::new(log.clone()));
            session.open(&DeviceFormat::default()).unwrap();
        }
        assert_eq!(log.borrow().calls, vec!["open", "close"]);
    }
}
