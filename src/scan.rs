//! Cursor and delimited-field scanning shared by the decoder.
//!
//! A token is a sequence of fields separated by the *context delimiter*:
//! `/` outside any parenthesized group and `,` inside one. A [`Cursor`] is a
//! position into an immutable byte slice; the scanning methods consume one
//! field (or one parenthesized group) and advance past it.
//!
//! Two reserved tokens stand in for field state rather than content:
//! [`NULL_ELEMENT`] for an absent value and [`EMPTY_STRING_ELEMENT`] for a
//! present but empty one. Both are matched ignoring ASCII case and both
//! resolve to an empty field.
//!
//! ```rust
//! use keylocator::scan::Cursor;
//!
//! let mut cursor = Cursor::new("phrase/id%2d1/salt");
//! assert_eq!(cursor.scan_field(false, Some(b'/')).unwrap(), b"phrase");
//! assert_eq!(cursor.scan_field(false, Some(b'/')).unwrap(), b"id-1");
//! assert_eq!(cursor.scan_field(false, None).unwrap(), b"salt");
//! assert!(cursor.is_empty());
//! ```

use crate::escape::unescape;
use crate::{Error, Result};

/// Sentinel written for an absent field.
pub const NULL_ELEMENT: &str = "<VMWARE-NULL>";

/// Sentinel written for a present but empty field.
pub const EMPTY_STRING_ELEMENT: &str = "<VMWARE-EMPTYSTRING>";

/// Field separator outside any compound group.
pub const FIELD_DELIMITER: u8 = b'/';

/// Field separator inside a compound group.
pub const COMPOUND_DELIMITER: u8 = b',';

/// Opening mark of a compound group.
pub const COMPOUND_LEFT: u8 = b'(';

/// Closing mark of a compound group.
pub const COMPOUND_RIGHT: u8 = b')';

/// Whether a locator is being read at the top level or inside a compound group.
///
/// The nesting decides the delimiter that terminates the last field of a
/// locator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Nesting {
    #[default]
    TopLevel,
    Compound,
}

impl Nesting {
    /// Returns the context delimiter for this nesting.
    #[must_use]
    pub const fn delimiter(self) -> u8 {
        match self {
            Nesting::TopLevel => FIELD_DELIMITER,
            Nesting::Compound => COMPOUND_DELIMITER,
        }
    }
}

/// What a scanned field resolved to after sentinel substitution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Element {
    Null,
    EmptyString,
    Content,
}

fn classify(field: &[u8]) -> Element {
    if field.eq_ignore_ascii_case(NULL_ELEMENT.as_bytes()) {
        Element::Null
    } else if field.eq_ignore_ascii_case(EMPTY_STRING_ELEMENT.as_bytes()) {
        Element::EmptyString
    } else {
        Element::Content
    }
}

/// A read position into an immutable token.
///
/// `offset` is the absolute position of `input[0]` in the whole token so
/// that errors raised while reading a nested group still report positions in
/// terms of the whole token.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    position: usize,
    offset: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `input`.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self::from_bytes(input.as_bytes())
    }

    /// Creates a cursor at the start of a byte slice.
    #[must_use]
    pub fn from_bytes(input: &'a [u8]) -> Self {
        Cursor {
            input,
            position: 0,
            offset: 0,
        }
    }

    fn nested(input: &'a [u8], offset: usize) -> Self {
        Cursor {
            input,
            position: 0,
            offset,
        }
    }

    /// Absolute position of the cursor within the whole token.
    #[must_use]
    pub fn position(&self) -> usize {
        self.offset + self.position
    }

    /// The unconsumed part of the input.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.position..]
    }

    /// Returns `true` once every byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.position >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    /// Consumes one field up to `delimiter`, or to the end of input when the
    /// delimiter is `None` or does not occur, then skips one trailing
    /// delimiter.
    ///
    /// The field is unescaped. The null sentinel yields an empty field when
    /// `allow_null` is set and fails otherwise; the empty-string sentinel
    /// always yields an empty field.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyInput`] if the cursor is already exhausted
    /// - [`Error::NoCharactersConsumed`] if the delimiter sits at the cursor
    /// - escape errors from [`unescape`], with absolute offsets
    /// - [`Error::NullNotAllowed`] for the null sentinel without `allow_null`
    pub fn scan_field(&mut self, allow_null: bool, delimiter: Option<u8>) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(Error::EmptyInput);
        }

        let start = self.position;
        let rest = self.remaining();
        let len = delimiter
            .and_then(|delim| rest.iter().position(|&byte| byte == delim))
            .unwrap_or(rest.len());

        if len == 0 {
            return Err(Error::NoCharactersConsumed {
                position: self.position(),
            });
        }

        let raw = &rest[..len];
        self.position += len;
        if let Some(delim) = delimiter {
            if self.peek() == Some(delim) {
                self.position += 1;
            }
        }

        let field_offset = self.offset + start;
        let field = unescape(raw).map_err(|err| shift_escape_error(err, field_offset))?;

        match classify(&field) {
            Element::Null if !allow_null => Err(Error::NullNotAllowed),
            Element::Null | Element::EmptyString => Ok(Vec::new()),
            Element::Content => Ok(field),
        }
    }

    /// Like [`Cursor::scan_field`] but requires the result to be UTF-8 text.
    ///
    /// # Errors
    ///
    /// Everything [`Cursor::scan_field`] returns, plus [`Error::InvalidUtf8`].
    pub fn scan_text(&mut self, allow_null: bool, delimiter: Option<u8>) -> Result<String> {
        let field = self.scan_field(allow_null, delimiter)?;
        Ok(String::from_utf8(field)?)
    }

    /// Consumes a group opened by `left` and closed by the matching `right`,
    /// then skips one optional `trailing` delimiter.
    ///
    /// Returns a cursor over the bytes strictly between the outer marks. The
    /// content is not unescaped. A group whose whole content is a sentinel
    /// yields an empty cursor, subject to `allow_null` as in
    /// [`Cursor::scan_field`].
    ///
    /// # Errors
    ///
    /// - [`Error::ExpectedLeftDelimiter`] if the next byte is not `left`
    /// - [`Error::UnmatchedLeftDelimiter`] if input ends before the group closes
    /// - [`Error::NullNotAllowed`] for a null-sentinel group without `allow_null`
    pub fn scan_nested(
        &mut self,
        allow_null: bool,
        left: u8,
        right: u8,
        trailing: Option<u8>,
    ) -> Result<Cursor<'a>> {
        if self.peek() != Some(left) {
            return Err(Error::ExpectedLeftDelimiter {
                expected: left as char,
                position: self.position(),
            });
        }

        let open = self.position;
        let mut depth = 0usize;
        let mut close = None;
        for (i, &byte) in self.input[open..].iter().enumerate() {
            if byte == left {
                depth += 1;
            } else if byte == right {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + i);
                    break;
                }
            }
        }

        let Some(close) = close else {
            return Err(Error::UnmatchedLeftDelimiter {
                left: left as char,
                position: self.offset + open,
            });
        };

        let content = &self.input[open + 1..close];
        let content_offset = self.offset + open + 1;

        self.position = close + 1;
        if let Some(delim) = trailing {
            if self.peek() == Some(delim) {
                self.position += 1;
            }
        }

        match classify(content) {
            Element::Null if !allow_null => Err(Error::NullNotAllowed),
            Element::Null | Element::EmptyString => Ok(Cursor::nested(&[], content_offset)),
            Element::Content => Ok(Cursor::nested(content, content_offset)),
        }
    }
}

fn shift_escape_error(err: Error, offset: usize) -> Error {
    match err {
        Error::TruncatedEscape { position } => Error::TruncatedEscape {
            position: position + offset,
        },
        Error::InvalidHexDigit { digits, position } => Error::InvalidHexDigit {
            digits,
            position: position + offset,
        },
        other => other,
    }
}
