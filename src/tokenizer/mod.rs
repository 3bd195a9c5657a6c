//! Tokenizer - indentation-sensitive lexer over an incremental line source
//!
//! Design: a pull-based state machine, one token per `get` call:
//! - At the beginning of a line, measure the indentation column and compare
//!   it with the indent stack, queueing INDENT/DEDENT tokens
//! - Queued indentation tokens are handed out one per call
//! - Otherwise skip blanks and comments and scan one token
//!
//! Input is pulled a line at a time from a `LineSource` into a growable
//! buffer, so interactive sources are read only as far as needed. Any error
//! produces an ERRORTOKEN and latches: every later call yields ENDMARKER
//! until `recover` is used after an interrupt.

pub mod source;
pub mod token;


pub use source::{LineSource, ReadStatus, ReaderSource, StrSource};
pub use token::{token_char, Token, TokenKind, NONTERMINAL, N_TOKENS};

use smallvec::{smallvec, SmallVec};
use std::fmt;
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info};

pub const DEFAULT_TAB_SIZE: usize = 8;

/// Maximum depth of the indent stack
pub const MAX_INDENT: usize = 100;

/// Spare capacity ensured before each read
const READ_RESERVE: usize = 1024;

/// Malformed input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenErrorKind {
    ExcessiveIndent,
    InconsistentDedent,
    UnterminatedString,
    BadContinuation,
}

impl fmt::Display for TokenErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExcessiveIndent => write!(f, "excessive indent"),
            Self::InconsistentDedent => write!(f, "inconsistent dedent"),
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::BadContinuation => write!(f, "backslash not followed by end of line"),
        }
    }
}

/// Tokenizer condition after the most recent read or scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    Eof,
    /// The line read was interrupted; see `Tokenizer::recover`
    Interrupted,
    Token(TokenErrorKind),
    OutOfMemory,
    Io(String),
}

impl Status {
    /// Anything other than normal progress or a clean end of input
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Ok | Self::Eof)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Eof => write!(f, "end of input"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Token(kind) => write!(f, "{}", kind),
            Self::OutOfMemory => write!(f, "tokenizer out of memory"),
            Self::Io(msg) => write!(f, "read error: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    pub tab_size: usize,
    pub max_indent: usize,
    /// Primary prompt, shown before the first line
    pub ps1: Option<String>,
    /// Continuation prompt, shown before every later line
    pub ps2: Option<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            tab_size: DEFAULT_TAB_SIZE,
            max_indent: MAX_INDENT,
            ps1: None,
            ps2: None,
        }
    }
}

type Span = (TokenKind, usize, usize);

pub struct Tokenizer<'a> {
    source: Box<dyn LineSource + 'a>,
    buf: Vec<u8>,
    cur: usize,
    status: Status,
    /// An ERRORTOKEN has been returned
    latched: bool,
    /// The iterator has yielded ENDMARKER
    finished: bool,
    tab_size: usize,
    max_indent: usize,
    indents: SmallVec<[usize; 16]>,
    /// Positive: INDENTs owed; negative: DEDENTs owed
    pending: isize,
    at_bol: bool,
    line: usize,
    ps1: Option<String>,
    ps2: Option<String>,
    prompt: Option<String>,
    prompt_out: Box<dyn Write + 'a>,
}

impl<'a> Tokenizer<'a> {
    pub fn from_source(source: impl LineSource + 'a) -> Self {
        Self {
            source: Box::new(source),
            buf: Vec::new(),
            cur: 0,
            status: Status::Ok,
            latched: false,
            finished: false,
            tab_size: DEFAULT_TAB_SIZE,
            max_indent: MAX_INDENT,
            indents: smallvec![0],
            pending: 0,
            at_bol: true,
            line: 0,
            ps1: None,
            ps2: None,
            prompt: None,
            prompt_out: Box::new(io::stderr()),
        }
    }

    /// Tokenize in-memory text
    pub fn from_text(text: &str) -> Self {
        Self::from_source(StrSource::new(text))
    }

    /// Tokenize a reader line by line
    pub fn from_reader<R: BufRead + 'a>(reader: R) -> Self {
        Self::from_source(ReaderSource::new(reader))
    }

    pub fn with_config(mut self, config: &TokenizerConfig) -> Self {
        self.tab_size = config.tab_size.max(1);
        self.max_indent = config.max_indent.max(1);
        self.with_prompts(config.ps1.clone(), config.ps2.clone())
    }

    pub fn with_prompts(mut self, ps1: Option<String>, ps2: Option<String>) -> Self {
        self.prompt = ps1.clone();
        self.ps1 = ps1;
        self.ps2 = ps2;
        self
    }

    /// Where prompts are written (stderr by default)
    pub fn with_prompt_output(mut self, out: Box<dyn Write + 'a>) -> Self {
        self.prompt_out = out;
        self
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Current physical line number (1-based once reading has started)
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn tab_size(&self) -> usize {
        self.tab_size
    }

    /// Number of open indentation levels
    pub fn indent_depth(&self) -> usize {
        self.indents.len() - 1
    }

    /// Produce the next token
    pub fn get(&mut self) -> Token {
        if self.latched {
            return Token::new(TokenKind::EndMarker, "", self.line);
        }

        let (kind, start, end) = self.scan();
        if kind == TokenKind::ErrorToken {
            self.latched = true;
            debug!(status = %self.status, line = self.line, "Tokenizer error");
        }

        let text = self
            .buf
            .get(start..end)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default();
        Token::new(kind, text, self.line)
    }

    /// Resume after an interrupted read
    ///
    /// Discards the partial line and all indentation state, so the next token
    /// starts a fresh statement. Returns false (and does nothing) for any
    /// other status; those errors are final.
    pub fn recover(&mut self) -> bool {
        if self.status != Status::Interrupted {
            return false;
        }
        debug!(line = self.line, "Recovering from interrupted read");
        self.status = Status::Ok;
        self.latched = false;
        self.finished = false;
        self.buf.clear();
        self.cur = 0;
        self.indents.truncate(1);
        self.pending = 0;
        self.at_bol = true;
        self.prompt = self.ps1.clone();
        true
    }

    fn write_prompt(&mut self, text: &str) {
        let written = self
            .prompt_out
            .write_all(text.as_bytes())
            .and_then(|_| self.prompt_out.flush());
        if let Err(err) = written {
            debug!(error = %err, "Failed to write prompt");
        }
    }

    /// Next input byte, reading more when the buffer is exhausted
    fn next_char(&mut self) -> Option<u8> {
        if self.status != Status::Ok {
            return None;
        }
        loop {
            if let Some(&c) = self.buf.get(self.cur) {
                self.cur += 1;
                return Some(c);
            }

            if self.buf.last() == Some(&b'\n') {
                self.buf.clear();
                self.cur = 0;
            }
            if self.buf.try_reserve(READ_RESERVE).is_err() {
                error!(buffer_len = self.buf.len(), "Tokenizer out of memory");
                self.status = Status::OutOfMemory;
                return None;
            }
            if self.buf.is_empty() {
                if let Some(prompt) = self.prompt.take() {
                    self.write_prompt(&prompt);
                    self.prompt = self.ps2.clone();
                }
            }

            let before = self.buf.len();
            self.status = match self.source.read_line(&mut self.buf) {
                ReadStatus::Ok if self.buf.len() > before => continue,
                ReadStatus::Ok | ReadStatus::Eof => Status::Eof,
                ReadStatus::Interrupted => Status::Interrupted,
                ReadStatus::Error(err) => Status::Io(err.to_string()),
            };
            if self.prompt.is_some() {
                self.write_prompt("\n");
            }
            return None;
        }
    }

    /// Un-read `c`; no-op at end of input
    #[inline]
    fn backup(&mut self, c: Option<u8>) {
        if c.is_some() {
            self.cur = self.cur.saturating_sub(1);
        }
    }

    fn current_indent(&self) -> usize {
        self.indents.last().copied().unwrap_or(0)
    }

    fn fail(&mut self, kind: TokenErrorKind, start: usize) -> Span {
        if !self.status.is_error() {
            self.status = Status::Token(kind);
        }
        (TokenKind::ErrorToken, start, self.cur)
    }

    fn scan(&mut self) -> Span {
        if self.at_bol {
            self.at_bol = false;
            self.line += 1;
            if let Err(kind) = self.measure_indent() {
                let here = self.cur;
                return self.fail(kind, here);
            }
        }

        let here = self.cur;
        if self.status.is_error() {
            return (TokenKind::ErrorToken, here, here);
        }

        if self.pending < 0 {
            self.pending += 1;
            return (TokenKind::Dedent, here, here);
        }
        if self.pending > 0 {
            self.pending -= 1;
            return (TokenKind::Indent, here, here);
        }

        loop {
            let mut c = self.next_char();
            while matches!(c, Some(b' ' | b'\t' | b'\r')) {
                c = self.next_char();
            }
            let start = if c.is_some() { self.cur - 1 } else { self.cur };

            if c == Some(b'#') {
                self.check_tab_directive();
                while !matches!(c, None | Some(b'\n')) {
                    c = self.next_char();
                }
            }

            let Some(ch) = c else {
                return if self.status == Status::Eof {
                    (TokenKind::EndMarker, start, start)
                } else {
                    (TokenKind::ErrorToken, start, start)
                };
            };

            if ch.is_ascii_alphabetic() || ch == b'_' {
                let mut c = self.next_char();
                while matches!(c, Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
                    c = self.next_char();
                }
                self.backup(c);
                return (TokenKind::Name, start, self.cur);
            }

            if ch == b'\n' {
                self.at_bol = true;
                let newline = self.cur - 1;
                return (TokenKind::Newline, newline, newline);
            }

            if ch.is_ascii_digit() {
                return self.scan_number(ch, start);
            }

            if ch == b'\'' {
                return self.scan_string(start);
            }

            if ch == b'\\' {
                let mut c = self.next_char();
                if c == Some(b'\r') {
                    c = self.next_char();
                }
                if c != Some(b'\n') {
                    return self.fail(TokenErrorKind::BadContinuation, start);
                }
                self.line += 1;
                continue;
            }

            return (token_char(ch), start, self.cur);
        }
    }

    /// Indentation phase; queues INDENT/DEDENT tokens in `pending`
    fn measure_indent(&mut self) -> Result<(), TokenErrorKind> {
        let mut col = 0;
        let c = loop {
            match self.next_char() {
                Some(b' ') => col += 1,
                Some(b'\t') => col = (col / self.tab_size + 1) * self.tab_size,
                other => break other,
            }
        };
        self.backup(c);

        if self.status.is_error() {
            return Ok(());
        }

        let top = self.current_indent();
        if col > top {
            if self.indents.len() >= self.max_indent {
                return Err(TokenErrorKind::ExcessiveIndent);
            }
            self.pending += 1;
            self.indents.push(col);
        } else if col < top {
            while self.indents.len() > 1 && col < self.current_indent() {
                self.indents.pop();
                self.pending -= 1;
            }
            if col != self.current_indent() {
                return Err(TokenErrorKind::InconsistentDedent);
            }
        }
        Ok(())
    }

    /// Numeric literal; validation beyond the lexical shape is left to later stages
    fn scan_number(&mut self, first: u8, start: usize) -> Span {
        let mut c = self.next_char();

        if first == b'0' && c != Some(b'.') {
            if matches!(c, Some(b'x' | b'X')) {
                c = self.next_char();
                while matches!(c, Some(b) if b.is_ascii_hexdigit()) {
                    c = self.next_char();
                }
            } else {
                while matches!(c, Some(b'0'..=b'7')) {
                    c = self.next_char();
                }
            }
        } else {
            while matches!(c, Some(b) if b.is_ascii_digit()) {
                c = self.next_char();
            }
            if c == Some(b'.') {
                c = self.next_char();
                while matches!(c, Some(b) if b.is_ascii_digit()) {
                    c = self.next_char();
                }
            }
            if matches!(c, Some(b'e' | b'E')) {
                c = self.next_char();
                if matches!(c, Some(b'+' | b'-')) {
                    c = self.next_char();
                }
                while matches!(c, Some(b) if b.is_ascii_digit()) {
                    c = self.next_char();
                }
            }
        }

        self.backup(c);
        (TokenKind::Number, start, self.cur)
    }

    /// Single-quoted string; a backslash escapes the next character
    fn scan_string(&mut self, start: usize) -> Span {
        loop {
            match self.next_char() {
                None | Some(b'\n') => return self.fail(TokenErrorKind::UnterminatedString, start),
                Some(b'\\') => {
                    if matches!(self.next_char(), None | Some(b'\n')) {
                        return self.fail(TokenErrorKind::UnterminatedString, start);
                    }
                }
                Some(b'\'') => return (TokenKind::String, start, self.cur),
                Some(_) => {}
            }
        }
    }

    fn check_tab_directive(&mut self) {
        let rest = self.buf.get(self.cur..).unwrap_or_default();
        if let Some(size) = parse_tab_directive(rest) {
            info!(tab_size = size, line = self.line, "# vi:set tabsize={}:", size);
            self.tab_size = size;
        }
    }
}

/// Parse the text after `#` as ` vi:set tabsize=N:` with `1 <= N <= 40`
///
/// Blanks before `vi:` and before `tabsize` may be any run (or none); the
/// trailing colon is not required.
pub fn parse_tab_directive(comment: &[u8]) -> Option<usize> {
    fn skip_blanks(bytes: &[u8]) -> &[u8] {
        let n = bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
        &bytes[n..]
    }

    let rest = skip_blanks(comment).strip_prefix(b"vi:set")?;
    let rest = skip_blanks(rest).strip_prefix(b"tabsize=")?;
    let rest = skip_blanks(rest);
    let (negative, rest) = match rest.first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };

    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    let value: i64 = std::str::from_utf8(&rest[..digits]).ok()?.parse().ok()?;
    let value = if negative { -value } else { value };

    (1..=40).contains(&value).then_some(value as usize)
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    /// Tokens up to and including the first ENDMARKER
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.get();
        if token.kind == TokenKind::EndMarker {
            self.finished = true;
        }
        Some(token)
    }
}
