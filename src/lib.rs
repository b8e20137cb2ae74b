//! # keylocator
//!
//! Encoding and decoding of `vmware:key/...` key-locator tokens.
//!
//! ## What is a key locator?
//!
//! A key locator is a small tree describing where a cryptographic key comes
//! from: a raw key, a passphrase, an LDAP entry, a script, a well-known role,
//! a key held by a key server, a list of alternatives, or data locked under
//! another locator. Tokens are stored next to encrypted data and must be read
//! and written byte-for-byte the same way by every component that handles
//! them.
//!
//! ## Key Features
//!
//! - **Typed model**: each locator type is an enum variant carrying only its
//!   own fields, see [`KeyLocator`]
//! - **Exact wire format**: encoding is deterministic and matches existing
//!   producers byte-for-byte
//! - **Precise errors**: every failure has an [`ErrorKind`] and names the
//!   field and locator it occurred in
//! - **Bounded recursion**: list/pair nesting is limited by
//!   [`CodecOptions::max_depth`]
//! - **Serde Compatible**: a [`KeyLocator`] serializes as its token string
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! keylocator = "0.1"
//! ```
//!
//! ### Decoding and Encoding
//!
//! ```rust
//! use keylocator::{from_str, to_string, KeyLocator};
//!
//! let locator = from_str("vmware:key/fqid/<VMWARE-NULL>/local/key%2d1").unwrap();
//! assert_eq!(locator, KeyLocator::fqid("", "local", "key-1"));
//!
//! let token = to_string(&locator).unwrap();
//! assert_eq!(token, "vmware:key/fqid/<VMWARE-NULL>/local/key%2d1");
//! ```
//!
//! ### Building Compound Locators
//!
//! ```rust
//! use keylocator::{KeyLocator, Role};
//!
//! let locker = KeyLocator::list([
//!     KeyLocator::role("", Role::Server),
//!     KeyLocator::fqid("", "kms", "wrapping-key"),
//! ]);
//! let locator = KeyLocator::pair(locker, "HMAC-SHA-256", b"wrapped".to_vec());
//!
//! let token = locator.to_token().unwrap();
//! assert!(token.starts_with("vmware:key/pair/(list/(role/"));
//! assert_eq!(token.parse::<KeyLocator>().unwrap(), locator);
//! ```
//!
//! ### Handling Errors
//!
//! ```rust
//! use keylocator::{from_str, ErrorKind};
//!
//! let err = from_str("vmware:key/ldap/id/host/dom/notaport/true/path").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::InvalidPort);
//! assert_eq!(err.path(), vec!["ldap", "LDAP port"]);
//! ```
//!
//! ## Null and Empty Fields
//!
//! Empty fields are written as one of two sentinels, `<VMWARE-NULL>` for
//! fields that may be absent and `<VMWARE-EMPTYSTRING>` for the rest. On
//! decode both sentinels yield an empty value, so absent and empty cannot be
//! told apart once a token has been read.
//!
//! ## Format Grammar
//!
//! See the [`grammar`] module for the full token grammar.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`inspect.rs`** - Decode tokens and print their structure
//! - **`build_locator.rs`** - Build a compound locator and encode it
//!
//! Run one with: `cargo run --example <name>`

pub mod de;
pub mod error;
pub mod escape;
pub mod grammar;
pub mod locator;
pub mod options;
pub mod scan;
pub mod ser;

pub use de::Decoder;
pub use error::{Error, ErrorKind, Result};
pub use locator::{
    FqidLocator, KeyLocator, LdapLocator, LocatorClass, LocatorType, PairLocator,
    PassphraseLocator, Role, RoleLocator, ScriptLocator,
};
pub use options::{CodecOptions, RoleNameMatching, DEFAULT_MAX_DEPTH};
pub use ser::Encoder;

use std::io;

/// Encode a locator as a token.
///
/// # Examples
///
/// ```rust
/// use keylocator::{to_string, KeyLocator};
///
/// let token = to_string(&KeyLocator::Null).unwrap();
/// assert_eq!(token, "vmware:key/null/%3cVMWARE%2dEMPTYSTRING%3e");
/// ```
///
/// # Errors
///
/// Returns an error for a pair without locked data or a tree nested deeper
/// than [`DEFAULT_MAX_DEPTH`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(locator: &KeyLocator) -> Result<String> {
    to_string_with_options(locator, &CodecOptions::default())
}

/// Encode a locator as a token with custom options.
///
/// # Examples
///
/// ```rust
/// use keylocator::{to_string_with_options, CodecOptions, ErrorKind, KeyLocator};
///
/// let nested = KeyLocator::list([KeyLocator::list([])]);
/// let options = CodecOptions::new().with_max_depth(1);
/// let err = to_string_with_options(&nested, &options).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::NestingTooDeep);
/// ```
///
/// # Errors
///
/// Returns an error for a pair without locked data or a tree nested deeper
/// than `options.max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(locator: &KeyLocator, options: &CodecOptions) -> Result<String> {
    let mut encoder = Encoder::new(options.clone());
    if let Err(err) = encoder.encode(locator) {
        tracing::debug!(kind = ?err.kind(), error = %err, "failed to encode key locator");
        return Err(err);
    }
    Ok(encoder.into_inner())
}

/// Encode a locator as token bytes.
///
/// # Errors
///
/// See [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec(locator: &KeyLocator) -> Result<Vec<u8>> {
    to_string(locator).map(String::into_bytes)
}

/// Encode a locator to a writer.
///
/// # Examples
///
/// ```rust
/// use keylocator::{to_writer, KeyLocator};
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &KeyLocator::raw_key(b"k".to_vec())).unwrap();
/// assert_eq!(buffer, b"vmware:key/rawkey/k");
/// ```
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(mut writer: W, locator: &KeyLocator) -> Result<()>
where
    W: io::Write,
{
    let token = to_string(locator)?;
    writer.write_all(token.as_bytes())?;
    Ok(())
}

/// Decode a locator from a token.
///
/// # Examples
///
/// ```rust
/// use keylocator::{from_str, KeyLocator, Role};
///
/// let locator = from_str("vmware:key/role/<VMWARE-NULL>/server").unwrap();
/// assert_eq!(locator, KeyLocator::role("", Role::Server));
/// ```
///
/// # Errors
///
/// Returns an error if the token is malformed. The error's
/// [`Error::path`] names the locators and field that failed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(token: &str) -> Result<KeyLocator> {
    from_slice_with_options(token.as_bytes(), &CodecOptions::default())
}

/// Decode a locator from a token with custom options.
///
/// # Errors
///
/// Returns an error if the token is malformed or nested deeper than
/// `options.max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options(token: &str, options: &CodecOptions) -> Result<KeyLocator> {
    from_slice_with_options(token.as_bytes(), options)
}

/// Decode a locator from token bytes.
///
/// The bytes need not be UTF-8 as a whole; only text fields are checked
/// after unescaping.
///
/// # Examples
///
/// ```rust
/// use keylocator::from_slice;
///
/// let locator = from_slice(b"vmware:key/rawkey/%00%ff").unwrap();
/// assert_eq!(locator.as_key(), Some(&[0x00, 0xff][..]));
/// ```
///
/// # Errors
///
/// Returns an error if the token is malformed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(token: &[u8]) -> Result<KeyLocator> {
    from_slice_with_options(token, &CodecOptions::default())
}

fn from_slice_with_options(token: &[u8], options: &CodecOptions) -> Result<KeyLocator> {
    Decoder::from_slice(token)
        .with_options(options.clone())
        .decode()
        .map_err(|err| {
            tracing::debug!(kind = ?err.kind(), error = %err, "failed to decode key locator");
            err
        })
}

/// Decode a locator from an I/O stream holding one token.
///
/// # Examples
///
/// ```rust
/// use keylocator::{from_reader, KeyLocator};
/// use std::io::Cursor;
///
/// let reader = Cursor::new(b"vmware:key/list/()");
/// assert_eq!(from_reader(reader).unwrap(), KeyLocator::list([]));
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or the token is malformed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(mut reader: R) -> Result<KeyLocator>
where
    R: io::Read,
{
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    from_slice(&buffer)
}
