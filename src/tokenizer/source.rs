//! Line sources - where the tokenizer's input comes from
//!
//! A source appends one line (or, for in-memory text, everything) to the
//! tokenizer's buffer per call. Reads may block; an interrupted read is its
//! own outcome so an interactive driver can discard the line and carry on.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of one read
#[derive(Debug)]
pub enum ReadStatus {
    /// Bytes were appended
    Ok,
    /// Nothing left to read
    Eof,
    /// The read was cut short by an interrupt request
    Interrupted,
    Error(io::Error),
}

pub trait LineSource {
    /// Append the next line, including its `\n` if it has one, to `buf`
    fn read_line(&mut self, buf: &mut Vec<u8>) -> ReadStatus;
}

/// In-memory text, handed over in one piece
#[derive(Debug, Clone)]
pub struct StrSource {
    text: Option<Vec<u8>>,
}

impl StrSource {
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

impl LineSource for StrSource {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> ReadStatus {
        match self.text.take() {
            Some(text) if !text.is_empty() => {
                buf.extend_from_slice(&text);
                ReadStatus::Ok
            }
            _ => ReadStatus::Eof,
        }
    }
}

/// Line-at-a-time reader with an interrupt flag
///
/// Setting the flag (e.g. from a signal handler) makes the next read report
/// `Interrupted`; the flag is cleared when observed.
pub struct ReaderSource<R> {
    reader: R,
    interrupt: Arc<AtomicBool>,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an existing interrupt flag
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = flag;
        self
    }

    /// Handle for requesting an interrupt
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> ReadStatus {
        if self.interrupt.swap(false, Ordering::SeqCst) {
            return ReadStatus::Interrupted;
        }
        match self.reader.read_until(b'\n', buf) {
            Ok(0) => ReadStatus::Eof,
            Ok(_) => ReadStatus::Ok,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => ReadStatus::Interrupted,
            Err(err) => ReadStatus::Error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_source_reads_once() {
        let mut source = StrSource::new("a\nb\n");
        let mut buf = Vec::new();
        assert!(matches!(source.read_line(&mut buf), ReadStatus::Ok));
        assert_eq!(buf, b"a\nb\n");
        assert!(matches!(source.read_line(&mut buf), ReadStatus::Eof));
    }

    #[test]
    fn test_empty_str_source_is_eof() {
        let mut buf = Vec::new();
        assert!(matches!(StrSource::new("").read_line(&mut buf), ReadStatus::Eof));
    }

    #[test]
    fn test_reader_source_lines_and_interrupt() {
        let mut source = ReaderSource::new(&b"one\ntwo"[..]);
        let flag = source.interrupt_handle();
        let mut buf = Vec::new();

        assert!(matches!(source.read_line(&mut buf), ReadStatus::Ok));
        assert_eq!(buf, b"one\n");

        flag.store(true, Ordering::SeqCst);
        assert!(matches!(source.read_line(&mut buf), ReadStatus::Interrupted));
        assert!(!flag.load(Ordering::SeqCst));

        assert!(matches!(source.read_line(&mut buf), ReadStatus::Ok));
        assert_eq!(buf, b"one\ntwo");
        assert!(matches!(source.read_line(&mut buf), ReadStatus::Eof));
    }
}
