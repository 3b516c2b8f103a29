//! Splitting raw LP text into `;`-terminated statements.
//!
//! Comments are removed per physical line before splitting: `//` runs to the
//! end of the line, `/* ... */` must be closed on the line it was opened.

use std::collections::VecDeque;
use std::iter::{Enumerate, FusedIterator};
use std::str::Lines;

use crate::error::{ErrorKind, ParseError};

/// One terminated, comment-free statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    /// 1-based position among the non-blank statements.
    pub index: usize,
    /// Physical line (1-based) of the first non-blank character.
    pub line: usize,
    /// Trimmed text without the terminating `;`.
    pub text: String,
}

/// Remove comments from one physical line.
pub fn strip_comments(line: &str) -> Result<String, ErrorKind> {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    loop {
        let line_comment = rest.find("//");
        let block_open = rest.find("/*");
        let block_close = rest.find("*/");

        let first = [line_comment, block_open, block_close]
            .into_iter()
            .flatten()
            .min();
        let Some(at) = first else {
            out.push_str(rest);
            return Ok(out);
        };

        out.push_str(&rest[..at]);
        if Some(at) == line_comment {
            return Ok(out);
        }
        if Some(at) == block_close {
            return Err(ErrorKind::MalformedComment("*/".to_string()));
        }
        let after_open = &rest[at + 2..];
        match after_open.find("*/") {
            Some(close) => {
                out.push(' ');
                rest = &after_open[close + 2..];
            }
            None => return Err(ErrorKind::MalformedComment("/*".to_string())),
        }
    }
}

/// Lazy iterator over the statements of an LP source.
///
/// Single forward pass over the input; stops after the first error.
pub struct Statements<'a> {
    lines: Enumerate<Lines<'a>>,
    ready: VecDeque<RawStatement>,
    buffer: String,
    buffer_line: usize,
    last_line: usize,
    count: usize,
    done: bool,
}

impl<'a> Statements<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().enumerate(),
            ready: VecDeque::new(),
            buffer: String::new(),
            buffer_line: 1,
            last_line: 0,
            count: 0,
            done: false,
        }
    }

    fn fail(&mut self, line: usize, statement: &str, kind: ErrorKind) -> ParseError {
        self.done = true;
        ParseError::new(self.count + 1, line, statement.trim(), kind)
    }

    fn feed_line(&mut self, line_nr: usize, raw: &str) -> Result<(), ParseError> {
        let cleaned = strip_comments(raw).map_err(|kind| self.fail(line_nr, raw, kind))?;

        for c in cleaned.chars() {
            if c == ';' {
                let text = self.buffer.trim();
                if !text.is_empty() {
                    self.count += 1;
                    self.ready.push_back(RawStatement {
                        index: self.count,
                        line: self.buffer_line,
                        text: text.to_string(),
                    });
                }
                self.buffer.clear();
                continue;
            }
            if !c.is_whitespace() && self.buffer.trim().is_empty() {
                self.buffer_line = line_nr;
            }
            self.buffer.push(c);
        }
        self.buffer.push('\n');
        Ok(())
    }
}

impl Iterator for Statements<'_> {
    type Item = Result<RawStatement, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(statement) = self.ready.pop_front() {
                return Some(Ok(statement));
            }
            if self.done {
                return None;
            }
            match self.lines.next() {
                Some((i, raw)) => {
                    self.last_line = i + 1;
                    if let Err(err) = self.feed_line(i + 1, raw) {
                        return Some(Err(err));
                    }
                }
                None => {
                    self.done = true;
                    let rest = self.buffer.trim().to_string();
                    if rest.is_empty() {
                        return None;
                    }
                    let line = self.buffer_line;
                    return Some(Err(self.fail(line, &rest, ErrorKind::MissingTerminator)));
                }
            }
        }
    }
}

impl FusedIterator for Statements<'_> {}

impl Statements<'_> {
    /// Number of physical lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.last_line
    }
}
