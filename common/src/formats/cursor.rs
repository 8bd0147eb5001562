use crate::formats::FormatError;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

/// Forward-only line reader with one line of lookahead. Lines come out
/// trimmed; blank lines are skipped unconditionally. Line numbers refer to
/// the physical file so errors point at the real location. Sub-parsers
/// `peek` to decide whether the next line belongs to them and only then
/// `advance`, which is what lets a record loop hand a command line back to
/// its dispatcher untouched.
pub struct LineCursor {
    file: String,
    lines: Lines<BufReader<File>>,
    peeked: Option<(usize, String)>,
    read_no: usize,
    current_no: usize,
}

impl LineCursor {
    pub fn open(filename: &str) -> Result<Self, FormatError> {
        let file = File::open(filename).map_err(|e| FormatError::Io {
            file: filename.to_string(),
            source: e,
        })?;
        Ok(Self {
            file: filename.to_string(),
            lines: BufReader::new(file).lines(),
            peeked: None,
            read_no: 0,
            current_no: 0,
        })
    }

    /// Line number of the most recently advanced line.
    pub fn last_line(&self) -> usize {
        self.current_no
    }

    /// The next non-blank line, without consuming it.
    pub fn peek(&mut self) -> Result<Option<&str>, FormatError> {
        if self.peeked.is_none() {
            for line in self.lines.by_ref() {
                self.read_no += 1;
                let line = line.map_err(|e| FormatError::Io {
                    file: self.file.clone(),
                    source: e,
                })?;
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    self.peeked = Some((self.read_no, trimmed.to_string()));
                    break;
                }
            }
        }
        Ok(self.peeked.as_ref().map(|(_, line)| line.as_str()))
    }

    /// Consumes and returns the next non-blank line and its line number.
    pub fn advance(&mut self) -> Result<Option<(usize, String)>, FormatError> {
        self.peek()?;
        let next = self.peeked.take();
        if let Some((no, _)) = &next {
            self.current_no = *no;
        }
        Ok(next)
    }
}
