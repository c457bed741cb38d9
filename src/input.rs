//! Text acquisition
//!
//! Text comes from exactly one source: an inline argument, a file, or stdin.
//! Stdin can be read whole (one unit) or line by line, where each line is
//! spoken as soon as it arrives at the cost of prosody across lines.

use crate::{PiperError, Result};
use log::debug;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;

/// Where text to synthesize comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Text given on the command line
    Inline(String),
    /// Text read from a file
    File(PathBuf),
    /// Text read from standard input
    Stdin,
}

/// How the source is split into units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// The whole input is one unit
    #[default]
    Whole,
    /// One unit per line, read as it arrives (stdin only)
    Lines,
}

/// Lazy sequence of text units, each spoken by one synthesis run
pub enum TextUnits {
    /// Zero or one buffered unit
    Once(Option<String>),
    /// Units read from a line source on demand
    Lines(LineUnits<Box<dyn BufRead>>),
}

impl Iterator for TextUnits {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            TextUnits::Once(unit) => unit.take().map(Ok),
            TextUnits::Lines(lines) => lines.next(),
        }
    }
}

/// Resolve the configured source into text units
///
/// File sources are read eagerly so a missing or unreadable file fails here,
/// before any engine or output file exists.
pub fn acquire(source: &InputSource, mode: InputMode) -> Result<TextUnits> {
    match (source, mode) {
        (InputSource::Inline(text), _) => {
            debug!("Using inline text ({} bytes)", text.len());
            Ok(TextUnits::Once(Some(text.clone())))
        }
        (InputSource::File(path), _) => {
            let file = File::open(path).map_err(|source| PiperError::InputFile {
                path: path.clone(),
                source,
            })?;
            let mut bytes = Vec::new();
            BufReader::new(file)
                .read_to_end(&mut bytes)
                .map_err(|source| PiperError::InputFile {
                    path: path.clone(),
                    source,
                })?;
            let text = String::from_utf8(bytes)?;
            debug!("Read {} bytes from {}", text.len(), path.display());
            Ok(TextUnits::Once(Some(text)))
        }
        (InputSource::Stdin, InputMode::Whole) => {
            let stdin = io::stdin();
            let text = read_whole(stdin.lock())?;
            debug!("Read {} bytes from stdin", text.len());
            Ok(TextUnits::Once(Some(text)))
        }
        (InputSource::Stdin, InputMode::Lines) => {
            debug!("Streaming stdin line by line");
            let reader: Box<dyn BufRead> = Box::new(io::stdin().lock());
            Ok(TextUnits::Lines(LineUnits::new(reader)))
        }
    }
}

/// Read a stream to its end, terminating every line with a newline
///
/// An empty stream gives an empty string.
pub fn read_whole<R: BufRead>(reader: R) -> Result<String> {
    let mut text = String::new();
    for line in LineUnits::new(reader) {
        text.push_str(&line?);
        text.push('\n');
    }
    Ok(text)
}

/// One unit per line, never reading more than one line ahead
pub struct LineUnits<R> {
    reader: R,
    done: bool,
}

impl<R: BufRead> LineUnits<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for LineUnits<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut bytes = Vec::new();
        match self.reader.read_until(b'\n', &mut bytes) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                if bytes.last() == Some(&b'\n') {
                    bytes.pop();
                }
                Some(String::from_utf8(bytes).map_err(PiperError::from))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_inline_is_passed_through() {
        let units: Vec<String> = acquire(&InputSource::Inline("  Hi there \n".into()), InputMode::Whole)
            .unwrap()
            .map(|u| u.unwrap())
            .collect();
        assert_eq!(units, vec!["  Hi there \n".to_string()]);
    }

    #[test]
    fn test_read_whole_terminates_lines() {
        assert_eq!(read_whole(Cursor::new("Hello\nWorld")).unwrap(), "Hello\nWorld\n");
        assert_eq!(read_whole(Cursor::new("Hello\nWorld\n")).unwrap(), "Hello\nWorld\n");
        assert_eq!(read_whole(Cursor::new("")).unwrap(), "");
    }

    #[test]
    fn test_line_units() {
        let units: Vec<String> = LineUnits::new(Cursor::new("Hello\nWorld\n"))
            .map(|u| u.unwrap())
            .collect();
        assert_eq!(units, vec!["Hello", "World"]);
    }

    #[test]
    fn test_boxed_line_source() {
        let reader: Box<dyn BufRead> = Box::new(Cursor::new("one\ntwo"));
        let units: Vec<String> = TextUnits::Lines(LineUnits::new(reader))
            .map(|u| u.unwrap())
            .collect();
        assert_eq!(units, vec!["one", "two"]);
    }

    #[test]
    fn test_line_units_keeps_blank_lines() {
        let units: Vec<String> = LineUnits::new(Cursor::new("a\n\nb"))
            .map(|u| u.unwrap())
            .collect();
        assert_eq!(units, vec!["a", "", "b"]);
    }

    #[test]
    fn test_line_units_rejects_invalid_utf8() {
        let mut units = LineUnits::new(Cursor::new(b"ok\n\xFF\xFE\n".to_vec()));
        assert_eq!(units.next().unwrap().unwrap(), "ok");
        assert!(matches!(units.next(), Some(Err(PiperError::Decode(_)))));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = acquire(
            &InputSource::File(PathBuf::from("/nonexistent/piper-input.txt")),
            InputMode::Whole,
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("/nonexistent/piper-input.txt"));
    }
}
