//! Cursor-based tokenizer over the arguments of a single command.

use super::error::UciError;

/// Reads the argument text of one command.
///
/// Scanning primitives return an empty slice once the input is exhausted
/// instead of failing, so handlers can loop on `read_word` until it yields
/// `""`. The numeric `try_*` readers roll the cursor back on failure.
#[derive(Debug, Clone)]
pub struct ArgReader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ArgReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// True once every character has been consumed.
    pub fn finished(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The unread tail of the arguments.
    pub fn peek_remainder(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Consumes characters while `pred` holds.
    pub fn read_while<P>(&mut self, mut pred: P) -> &'a str
    where
        P: FnMut(char) -> bool,
    {
        let rest = self.peek_remainder();
        let end = rest
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(rest.len(), |(i, _)| i);

        self.pos += end;
        &rest[..end]
    }

    /// Consumes characters until `pred` holds.
    pub fn read_until<P>(&mut self, mut pred: P) -> &'a str
    where
        P: FnMut(char) -> bool,
    {
        self.read_while(|c| !pred(c))
    }

    pub fn skip_whitespace(&mut self) {
        self.read_while(char::is_whitespace);
    }

    /// Skips whitespace and returns the next run of non-whitespace characters.
    pub fn read_word(&mut self) -> &'a str {
        self.skip_whitespace();
        self.read_until(char::is_whitespace)
    }

    pub fn try_read_integer(&mut self) -> Option<i64> {
        self.try_read(|word| word.parse().ok())
    }

    pub fn try_read_float(&mut self) -> Option<f64> {
        self.try_read(|word| word.parse().ok())
    }

    pub fn read_integer(&mut self) -> Result<i64, UciError> {
        self.try_read_integer()
            .ok_or_else(|| self.parse_error("an integer number"))
    }

    pub fn read_float(&mut self) -> Result<f64, UciError> {
        self.try_read_float()
            .ok_or_else(|| self.parse_error("a float number"))
    }

    fn try_read<T>(&mut self, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
        let start = self.pos;
        let value = parse(self.read_word());

        if value.is_none() {
            self.pos = start;
        }
        value
    }

    fn parse_error(&self, expected: &'static str) -> UciError {
        let found = self.peek_remainder().split_whitespace().next().unwrap_or("");
        UciError::Parse {
            expected,
            found: found.to_string(),
        }
    }
}
