//! Percent-escaping used by every field of a key-locator token.
//!
//! Only ASCII letters and digits are written verbatim; every other byte is
//! written as `%` plus two lowercase hex digits. That keeps the structural
//! characters `/`, `,`, `(` and `)` out of field content entirely.
//!
//! ```rust
//! use keylocator::escape::{escape, unescape};
//!
//! assert_eq!(escape(b"a/b+c=d"), "a%2fb%2bc%3dd");
//! assert_eq!(unescape("a%2Fb").unwrap(), b"a/b");
//! ```

use crate::{Error, Result};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Escapes `input` so that only ASCII alphanumerics remain unescaped.
///
/// An empty input yields an empty string; sentinel substitution for empty
/// fields happens in the encoder, not here.
#[must_use]
pub fn escape(input: &[u8]) -> String {
    let mut output = String::with_capacity(input.len() * 3);
    escape_into(&mut output, input);
    output
}

/// Appends the escaped form of `input` to `output`.
pub fn escape_into(output: &mut String, input: &[u8]) {
    for &byte in input {
        if byte.is_ascii_alphanumeric() {
            output.push(byte as char);
        } else {
            output.push('%');
            output.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            output.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
        }
    }
}

/// Reverses [`escape`].
///
/// Any byte other than `%` is copied as-is. Hex digits are accepted in
/// either case.
///
/// # Errors
///
/// [`Error::TruncatedEscape`] when a `%` has fewer than two characters after
/// it, [`Error::InvalidHexDigit`] when either of them is not a hex digit.
/// Offsets are relative to the start of `input`.
pub fn unescape(input: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    let input = input.as_ref();
    let mut output = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if input[i] != b'%' {
            output.push(input[i]);
            i += 1;
            continue;
        }

        if i + 2 >= input.len() {
            return Err(Error::TruncatedEscape { position: i });
        }

        match (hex_value(input[i + 1]), hex_value(input[i + 2])) {
            (Some(high), Some(low)) => output.push((high << 4) | low),
            _ => {
                return Err(Error::InvalidHexDigit {
                    digits: String::from_utf8_lossy(&input[i + 1..i + 3]).into_owned(),
                    position: i,
                })
            }
        }
        i += 3;
    }

    Ok(output)
}

/// Returns `true` if `byte` is an ASCII hex digit in either case.
#[inline]
#[must_use]
pub const fn is_hex_digit(byte: u8) -> bool {
    hex_value(byte).is_some()
}

#[inline]
const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Renders a boolean field as `TRUE` or `FALSE`.
#[inline]
#[must_use]
pub const fn format_bool(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Parses a boolean field, ignoring ASCII case.
///
/// # Errors
///
/// [`Error::InvalidBoolean`] for anything other than `true`/`false`.
pub fn parse_bool(text: &str) -> Result<bool> {
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(Error::InvalidBoolean(text.to_string()))
    }
}
