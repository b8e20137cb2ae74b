//! Key-locator decoding.
//!
//! This module provides the [`Decoder`], a recursive-descent reader that
//! turns a `vmware:key/...` token into a [`KeyLocator`].
//!
//! ## Overview
//!
//! - **Single pass**: fields are consumed left to right with a [`Cursor`]
//! - **Context delimiters**: the last field of a locator ends at `/` at the
//!   top level and at `,` inside a `(...)` group
//! - **Bounded nesting**: list/pair groups deeper than
//!   [`CodecOptions::max_depth`] fail with [`Error::NestingTooDeep`]
//! - **Precise errors**: every failure names the field and locator it came from
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use keylocator::{from_str, KeyLocator};
//!
//! let locator = from_str("vmware:key/rawkey/test%2dkey%2ddata").unwrap();
//! assert_eq!(locator, KeyLocator::raw_key(b"test-key-data".to_vec()));
//! ```

use crate::options::CodecOptions;
use crate::scan::{Cursor, Nesting, COMPOUND_DELIMITER, COMPOUND_LEFT, COMPOUND_RIGHT, FIELD_DELIMITER};
use crate::{
    Error, FqidLocator, KeyLocator, LdapLocator, LocatorClass, LocatorType, PairLocator,
    PassphraseLocator, Result, Role, RoleLocator, ScriptLocator,
};
use base64::prelude::*;

/// The fixed prefix of every token, compared ignoring ASCII case.
pub const PREFIX: &str = "vmware:key";

const SLASH: Option<u8> = Some(FIELD_DELIMITER);

/// The key-locator decoder.
///
/// Created via [`Decoder::from_str`] or [`Decoder::from_slice`].
pub struct Decoder<'de> {
    input: &'de [u8],
    options: CodecOptions,
    depth: usize,
}

impl<'de> Decoder<'de> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'de str) -> Self {
        Self::from_slice(input.as_bytes())
    }

    pub fn from_slice(input: &'de [u8]) -> Self {
        Decoder {
            input,
            options: CodecOptions::default(),
            depth: 0,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    /// Decodes the whole token.
    ///
    /// Anything after a complete top-level locator is ignored.
    ///
    /// # Errors
    ///
    /// Any [`Error`] produced while reading; nested failures are wrapped in
    /// [`Error::Context`] naming the field or locator.
    pub fn decode(mut self) -> Result<KeyLocator> {
        if self.input.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut cursor = Cursor::from_bytes(self.input);

        let prefix = cursor
            .scan_field(false, SLASH)
            .map_err(|err| err.context("prefix"))?;
        if !prefix.eq_ignore_ascii_case(PREFIX.as_bytes()) {
            return Err(Error::InvalidPrefix(
                String::from_utf8_lossy(&prefix).into_owned(),
            ));
        }

        self.decode_locator(&mut cursor, Nesting::TopLevel)
    }

    fn decode_locator(&mut self, cursor: &mut Cursor<'de>, nesting: Nesting) -> Result<KeyLocator> {
        let type_name = cursor
            .scan_text(false, SLASH)
            .map_err(|err| err.context("type"))?;
        let locator_type =
            LocatorType::from_name(&type_name).ok_or(Error::UnknownType(type_name))?;

        tracing::trace!(
            locator_type = locator_type.name(),
            depth = self.depth,
            position = cursor.position(),
            "decoding key locator"
        );

        let result = match locator_type.class() {
            LocatorClass::Atomic => Self::decode_atomic(locator_type, cursor, nesting),
            LocatorClass::Indirect => self.decode_indirect(locator_type, cursor, nesting),
            LocatorClass::Compound => self.decode_compound(locator_type, cursor, nesting),
        };
        result.map_err(|err| err.context(locator_type.name()))
    }

    fn decode_atomic(
        locator_type: LocatorType,
        cursor: &mut Cursor<'de>,
        nesting: Nesting,
    ) -> Result<KeyLocator> {
        let delimiter = Some(nesting.delimiter());

        match locator_type {
            LocatorType::Key => {
                // The key's own format belongs to the crypto layer; here it is opaque bytes.
                let key = cursor
                    .scan_field(false, delimiter)
                    .map_err(|err| err.context("key data"))?;
                Ok(KeyLocator::Key(key))
            }
            _ => {
                let body = cursor
                    .scan_field(false, delimiter)
                    .map_err(|err| err.context("null element"))?;
                if body.is_empty() {
                    Ok(KeyLocator::Null)
                } else {
                    Err(Error::NonEmptyNull(
                        String::from_utf8_lossy(&body).into_owned(),
                    ))
                }
            }
        }
    }

    fn decode_indirect(
        &mut self,
        locator_type: LocatorType,
        cursor: &mut Cursor<'de>,
        nesting: Nesting,
    ) -> Result<KeyLocator> {
        let last = Some(nesting.delimiter());

        // Every indirect type except passphrase may be cached without an ID.
        let allow_null_id = locator_type != LocatorType::Passphrase;
        let unique_id = cursor
            .scan_text(allow_null_id, SLASH)
            .map_err(|err| err.context("unique ID"))?;

        let locator = match locator_type {
            LocatorType::Passphrase => KeyLocator::Passphrase(PassphraseLocator {
                unique_id,
                key_gen_data: cursor
                    .scan_field(false, last)
                    .map_err(|err| err.context("key generation data"))?,
            }),
            LocatorType::Ldap => {
                let server = cursor
                    .scan_text(true, SLASH)
                    .map_err(|err| err.context("LDAP server"))?;
                let domain = cursor
                    .scan_text(true, SLASH)
                    .map_err(|err| err.context("LDAP domain"))?;
                let port = cursor
                    .scan_text(false, SLASH)
                    .and_then(|text| parse_port(&text))
                    .map_err(|err| err.context("LDAP port"))?;
                let use_ssl = cursor
                    .scan_text(false, SLASH)
                    .and_then(|text| crate::escape::parse_bool(&text))
                    .map_err(|err| err.context("LDAP useSSL"))?;
                let path = cursor
                    .scan_text(false, last)
                    .map_err(|err| err.context("LDAP path"))?;

                KeyLocator::Ldap(LdapLocator {
                    unique_id,
                    server,
                    domain,
                    port,
                    use_ssl,
                    path,
                })
            }
            LocatorType::Script => {
                let rel_path = cursor
                    .scan_text(false, SLASH)
                    .map_err(|err| err.context("script relative path"))?;
                let signature = cursor
                    .scan_field(false, last)
                    .map_err(|err| err.context("script signature"))?;

                KeyLocator::Script(ScriptLocator {
                    unique_id,
                    rel_path,
                    signature,
                })
            }
            LocatorType::Role => {
                let matching = self.options.role_names;
                let role = cursor
                    .scan_text(false, last)
                    .and_then(|name| {
                        Role::from_name_with(&name, matching).ok_or(Error::InvalidRole(name))
                    })
                    .map_err(|err| err.context("role name"))?;

                KeyLocator::Role(RoleLocator { unique_id, role })
            }
            _ => {
                let key_server_id = cursor
                    .scan_text(true, SLASH)
                    .map_err(|err| err.context("key server ID"))?;
                let key_id = cursor
                    .scan_text(false, last)
                    .map_err(|err| err.context("key ID"))?;

                KeyLocator::Fqid(FqidLocator {
                    unique_id,
                    key_server_id,
                    key_id,
                })
            }
        };

        Ok(locator)
    }

    fn decode_compound(
        &mut self,
        locator_type: LocatorType,
        cursor: &mut Cursor<'de>,
        nesting: Nesting,
    ) -> Result<KeyLocator> {
        if self.depth >= self.options.max_depth {
            return Err(Error::NestingTooDeep {
                limit: self.options.max_depth,
            });
        }

        let mut content = cursor.scan_nested(
            false,
            COMPOUND_LEFT,
            COMPOUND_RIGHT,
            Some(nesting.delimiter()),
        )?;

        self.depth += 1;
        let result = match locator_type {
            LocatorType::List => self.decode_list(&mut content),
            _ => self.decode_pair(&mut content),
        };
        self.depth -= 1;
        result
    }

    fn decode_list(&mut self, content: &mut Cursor<'de>) -> Result<KeyLocator> {
        let mut elements = Vec::new();
        while !content.is_empty() {
            let element = self
                .decode_locator(content, Nesting::Compound)
                .map_err(|err| err.context(format!("list element {}", elements.len())))?;
            elements.push(element);
        }
        Ok(KeyLocator::List(elements))
    }

    fn decode_pair(&mut self, content: &mut Cursor<'de>) -> Result<KeyLocator> {
        let locker = self
            .decode_locator(content, Nesting::Compound)
            .map_err(|err| err.context("pair locker"))?;

        let crypto_mac = content
            .scan_text(false, Some(COMPOUND_DELIMITER))
            .map_err(|err| err.context("crypto MAC"))?;

        let locked_data = decode_locked_data(content).map_err(|err| err.context("locked data"))?;

        Ok(KeyLocator::Pair(PairLocator {
            locker: Box::new(locker),
            crypto_mac,
            locked_data,
        }))
    }
}

fn decode_locked_data(content: &mut Cursor<'_>) -> Result<Vec<u8>> {
    if content.is_empty() {
        return Err(Error::EmptyLockedData);
    }

    let encoded = content.scan_field(false, None)?;
    if encoded.is_empty() {
        return Err(Error::EmptyLockedData);
    }

    Ok(BASE64_STANDARD.decode(encoded)?)
}

fn parse_port(text: &str) -> Result<u16> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(Error::InvalidPort(text.to_string()));
    }
    text.parse::<u16>()
        .map_err(|_| Error::InvalidPort(text.to_string()))
}
