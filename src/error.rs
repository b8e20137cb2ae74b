//! Error types for key-locator encoding and decoding.
//!
//! Every failure the codec can produce is a variant of [`Error`]. Failures
//! inside a nested field or locator are wrapped in [`Error::Context`] so the
//! rendered message names the path to the problem, while [`Error::root`] and
//! [`Error::kind`] give access to the innermost cause.
//!
//! ## Error Categories
//!
//! - **Framing**: empty input, wrong `vmware:key` prefix, unknown type names
//! - **Scanning**: missing or unbalanced parentheses, empty fields
//! - **Escaping**: truncated or non-hex percent escapes
//! - **Field values**: bad port, boolean, role, base64 payload
//! - **Limits**: compound nesting deeper than the configured bound
//!
//! ## Examples
//!
//! ```rust
//! use keylocator::{from_str, ErrorKind};
//!
//! let err = from_str("vmware:key/ldap/id/host/dom/99999/true/path").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::InvalidPort);
//! assert!(err.to_string().contains("LDAP port"));
//! ```

use thiserror::Error;

/// All errors that can occur while encoding or decoding a key locator.
#[derive(Debug, Error)]
pub enum Error {
    /// A nested failure annotated with the field or locator that was being processed.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// Decode was called on empty text, or a field was expected past the end of input.
    #[error("unexpected end of input")]
    EmptyInput,

    /// The token does not start with `vmware:key`.
    #[error("invalid prefix, expected `vmware:key`, found `{0}`")]
    InvalidPrefix(String),

    /// A type name that is not in the locator type table.
    #[error("unknown key locator type `{0}`")]
    UnknownType(String),

    /// A `null` locator whose body is not empty.
    #[error("null key locator must have empty content, found `{0}`")]
    NonEmptyNull(String),

    /// The null sentinel appeared in a field that must carry a value.
    #[error("null element not allowed here")]
    NullNotAllowed,

    /// A port that is not a decimal integer in `0..=65535`.
    #[error("invalid port `{0}`")]
    InvalidPort(String),

    /// A boolean that is neither `TRUE` nor `FALSE` (in any case).
    #[error("invalid boolean `{0}`")]
    InvalidBoolean(String),

    /// A role name that does not match the role table.
    #[error("invalid role name `{0}`")]
    InvalidRole(String),

    /// A numeric role code with no name.
    #[error("unknown role code {0}")]
    UnknownRole(u32),

    /// A numeric type code with no name.
    #[error("unknown key locator type code {0}")]
    UnknownTypeCode(u32),

    /// A `%` with fewer than two characters after it.
    #[error("truncated escape sequence at offset {position}")]
    TruncatedEscape { position: usize },

    /// A `%` followed by something other than two hex digits.
    #[error("invalid hex digits `{digits}` in escape sequence at offset {position}")]
    InvalidHexDigit { digits: String, position: usize },

    /// A text field whose unescaped bytes are not valid UTF-8.
    #[error("field is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A compound body that does not open with the expected mark.
    #[error("expected `{expected}` at offset {position}")]
    ExpectedLeftDelimiter { expected: char, position: usize },

    /// Input ran out before the compound body was closed.
    #[error("unmatched `{left}` opened at offset {position}")]
    UnmatchedLeftDelimiter { left: char, position: usize },

    /// A delimiter directly at the cursor, i.e. an empty field without a sentinel.
    #[error("empty field at offset {position}")]
    NoCharactersConsumed { position: usize },

    /// The locked data of a pair is not valid standard base64.
    #[error("invalid base64 locked data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// A pair without locked data.
    #[error("pair locked data is empty")]
    EmptyLockedData,

    /// Compound nesting exceeded the configured bound.
    #[error("key locator nesting exceeds the limit of {limit}")]
    NestingTooDeep { limit: usize },

    /// Reading or writing the token failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A field-free classification of [`Error`], useful for matching.
///
/// # Examples
///
/// ```rust
/// use keylocator::{from_str, ErrorKind};
///
/// let err = from_str("vmware:key/rawkey/test%ZZ").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::InvalidHexDigit);
/// assert!(err.kind().is_malformed_escape());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyInput,
    InvalidPrefix,
    UnknownType,
    NonEmptyNull,
    NullNotAllowed,
    InvalidPort,
    InvalidBoolean,
    InvalidRole,
    UnknownRole,
    TruncatedEscape,
    InvalidHexDigit,
    InvalidUtf8,
    ExpectedLeftDelimiter,
    UnmatchedLeftDelimiter,
    NoCharactersConsumed,
    InvalidBase64,
    EmptyLockedData,
    NestingTooDeep,
    Io,
}

impl ErrorKind {
    /// Returns `true` for the two percent-escape failures.
    #[must_use]
    pub const fn is_malformed_escape(self) -> bool {
        matches!(self, ErrorKind::TruncatedEscape | ErrorKind::InvalidHexDigit)
    }
}

impl Error {
    /// Wraps this error with the name of the field or locator being processed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keylocator::{Error, ErrorKind};
    ///
    /// let err = Error::EmptyInput.context("script signature");
    /// assert_eq!(err.to_string(), "script signature: unexpected end of input");
    /// assert_eq!(err.kind(), ErrorKind::EmptyInput);
    /// ```
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping any [`Error::Context`] layers.
    #[must_use]
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Error::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Returns the kind of the innermost error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Context { source, .. } => source.kind(),
            Error::EmptyInput => ErrorKind::EmptyInput,
            Error::InvalidPrefix(_) => ErrorKind::InvalidPrefix,
            Error::UnknownType(_) | Error::UnknownTypeCode(_) => ErrorKind::UnknownType,
            Error::NonEmptyNull(_) => ErrorKind::NonEmptyNull,
            Error::NullNotAllowed => ErrorKind::NullNotAllowed,
            Error::InvalidPort(_) => ErrorKind::InvalidPort,
            Error::InvalidBoolean(_) => ErrorKind::InvalidBoolean,
            Error::InvalidRole(_) => ErrorKind::InvalidRole,
            Error::UnknownRole(_) => ErrorKind::UnknownRole,
            Error::TruncatedEscape { .. } => ErrorKind::TruncatedEscape,
            Error::InvalidHexDigit { .. } => ErrorKind::InvalidHexDigit,
            Error::InvalidUtf8(_) => ErrorKind::InvalidUtf8,
            Error::ExpectedLeftDelimiter { .. } => ErrorKind::ExpectedLeftDelimiter,
            Error::UnmatchedLeftDelimiter { .. } => ErrorKind::UnmatchedLeftDelimiter,
            Error::NoCharactersConsumed { .. } => ErrorKind::NoCharactersConsumed,
            Error::InvalidBase64(_) => ErrorKind::InvalidBase64,
            Error::EmptyLockedData => ErrorKind::EmptyLockedData,
            Error::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns the context labels from outermost to innermost.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keylocator::Error;
    ///
    /// let err = Error::NullNotAllowed.context("unique ID").context("phrase");
    /// assert_eq!(err.path(), vec!["phrase", "unique ID"]);
    /// ```
    #[must_use]
    pub fn path(&self) -> Vec<&str> {
        let mut labels = Vec::new();
        let mut current = self;
        while let Error::Context { context, source } = current {
            labels.push(context.as_str());
            current = source;
        }
        labels
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_chain_display() {
        let err = Error::InvalidPort("notaport".to_string())
            .context("LDAP port")
            .context("ldap");
        assert_eq!(err.to_string(), "ldap: LDAP port: invalid port `notaport`");
        assert_eq!(err.kind(), ErrorKind::InvalidPort);
        assert_eq!(err.path(), vec!["ldap", "LDAP port"]);
    }

    #[test]
    fn test_root_of_plain_error_is_itself() {
        let err = Error::EmptyLockedData;
        assert!(matches!(err.root(), Error::EmptyLockedData));
        assert!(err.path().is_empty());
    }

    #[test]
    fn test_type_code_maps_to_unknown_type() {
        assert_eq!(Error::UnknownTypeCode(999).kind(), ErrorKind::UnknownType);
    }

    #[test]
    fn test_malformed_escape_grouping() {
        assert!(ErrorKind::TruncatedEscape.is_malformed_escape());
        assert!(ErrorKind::InvalidHexDigit.is_malformed_escape());
        assert!(!ErrorKind::InvalidBase64.is_malformed_escape());
    }
}
