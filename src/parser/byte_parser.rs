//! Basic low-level byte-by-byte parser.
//!
//! This module provides [ByteParser] for parsing text-based tree formats with
//! support for peeking, consuming, comment skipping and quote-aware label
//! parsing. Used as the foundation of the Newick parser.

use crate::parser::parsing_error::ParsingError;

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser over an in-memory input.
///
/// # Features
/// - Whitespace and `[...]` comment skipping
/// - Quote-aware label parsing (single quotes with `''` escaping)
/// - Labels are decoded as UTF-8, so non-ASCII names survive
/// - Context extraction for error reporting
///
/// # Example
/// ```
/// use cladecheck::parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("  [comment] 'Wilson''s_Storm-petrel':0.5");
/// parser.skip_comment_and_whitespace().unwrap();
/// assert_eq!(parser.parse_label(b":").unwrap(), "Wilson's_Storm-petrel");
/// assert!(parser.consume_if(b':'));
/// ```
pub struct ByteParser {
    bytes: Vec<u8>,
    position: usize,
}

impl ByteParser {
    /// Creates a new `ByteParser` from a string by copying it.
    pub fn for_str(input: &str) -> Self {
        Self::for_bytes(input.as_bytes())
    }

    /// Creates a new `ByteParser` from a byte slice by copying it.
    pub fn for_bytes(input: &[u8]) -> Self {
        ByteParser {
            bytes: input.to_vec(),
            position: 0,
        }
    }

    /// Peeks at the current byte without consuming it.
    ///
    /// # Returns
    /// * `Some(u8)` - The current byte if available
    /// * `None` - If at end of data (EOF)
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    /// Gets the current byte and advances the position (consumes it).
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.position += 1;
        Some(byte)
    }

    /// Returns `true` if the current byte equals `ch`.
    pub fn peek_is(&self, ch: u8) -> bool {
        self.peek() == Some(ch)
    }

    /// Consumes the current byte if it equals `ch`.
    ///
    /// # Returns
    /// `true` if the byte was matched and consumed, `false` otherwise
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek_is(ch) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Skips (consumes) all consecutive whitespace characters.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.position += 1;
            } else {
                break;
            }
        }
    }

    /// Skips (consumes) a `[...]` comment if present.
    ///
    /// # Returns
    /// * `Ok(true)` - A comment was found and consumed
    /// * `Ok(false)` - No comment at current position
    /// * `Err(ParsingError)` - Comment was opened but never closed
    pub fn skip_comment(&mut self) -> Result<bool, ParsingError> {
        if !self.consume_if(b'[') {
            return Ok(false);
        }

        while let Some(b) = self.next_byte() {
            if b == b']' {
                return Ok(true);
            }
        }

        Err(ParsingError::unclosed_comment(self))
    }

    /// Skips (consumes) all consecutive whitespace and comments.
    pub fn skip_comment_and_whitespace(&mut self) -> Result<(), ParsingError> {
        self.skip_whitespace();

        while self.skip_comment()? {
            self.skip_whitespace();
        }

        Ok(())
    }

    /// Parses a label (quoted or unquoted).
    ///
    /// # Arguments
    /// * `delimiters` - Bytes that end an unquoted label
    ///
    /// # Errors
    /// Returns an error if a quoted label is not closed or the label is not
    /// valid UTF-8.
    pub fn parse_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        if self.peek_is(b'\'') {
            self.parse_quoted_label()
        } else {
            self.parse_unquoted_label(delimiters)
        }
    }

    /// Parses a label enclosed in single quotes; doubled quotes inside stand
    /// for a single quote (e.g. `'Wilson''s'` becomes `Wilson's`).
    fn parse_quoted_label(&mut self) -> Result<String, ParsingError> {
        let start = self.position;
        self.position += 1; // opening '

        let mut label = Vec::new();
        loop {
            match self.next_byte() {
                Some(b'\'') if self.peek_is(b'\'') => {
                    label.push(b'\'');
                    self.position += 1;
                }
                Some(b'\'') => break,
                Some(b) => label.push(b),
                None => {
                    self.position = start;
                    return Err(ParsingError::invalid_label(
                        self,
                        "quoted label is never closed".to_string(),
                    ));
                }
            }
        }

        self.decode(label)
    }

    /// Parses an unquoted label until any of the given delimiters or EOF.
    fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        let start = self.position;
        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            self.position += 1;
        }

        self.decode(self.bytes[start..self.position].to_vec())
    }

    fn decode(&self, label: Vec<u8>) -> Result<String, ParsingError> {
        String::from_utf8(label)
            .map_err(|_| ParsingError::invalid_label(self, "label is not valid UTF-8".to_string()))
    }

    /// Consumes a run of bytes that may form a floating point number
    /// (digits, `.`, `-`, `+`, `e`, `E`) and returns it.
    pub fn consume_number_chars(&mut self) -> String {
        let start = self.position;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E') {
                self.position += 1;
            } else {
                break;
            }
        }

        String::from_utf8_lossy(&self.bytes[start..self.position]).into_owned()
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&self) -> bool {
        self.position >= self.bytes.len()
    }

    /// Returns the current byte offset in the input.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns a string from up to `k` bytes from the current position for error context.
    ///
    /// Invalid UTF-8 sequences are replaced with the Unicode replacement character.
    pub fn get_context_as_string(&self, k: usize) -> String {
        let start = self.position.min(self.bytes.len());
        let end = (start + k).min(self.bytes.len());
        String::from_utf8_lossy(&self.bytes[start..end]).into_owned()
    }
}
