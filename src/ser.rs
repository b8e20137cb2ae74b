//! Key-locator encoding.
//!
//! This module provides the [`Encoder`], which writes a [`KeyLocator`] as a
//! `vmware:key/...` token.
//!
//! ## Overview
//!
//! - **Escaped fields**: every byte other than an ASCII letter or digit is
//!   written as `%xx`
//! - **Sentinels for empty fields**: an empty field that may be null is
//!   written as `<VMWARE-NULL>`, any other empty field as
//!   `<VMWARE-EMPTYSTRING>`
//! - **Base64 locked data**: pair payloads use the standard padded alphabet
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use keylocator::{to_string, KeyLocator};
//!
//! let token = to_string(&KeyLocator::fqid("unique-123", "server1", "key-abc")).unwrap();
//! assert_eq!(token, "vmware:key/fqid/unique%2d123/server1/key%2dabc");
//! ```
//!
//! ## Direct Encoder Usage
//!
//! ```rust
//! use keylocator::{CodecOptions, Encoder, KeyLocator};
//!
//! let mut encoder = Encoder::new(CodecOptions::new());
//! encoder.encode(&KeyLocator::Null).unwrap();
//! assert_eq!(encoder.into_inner(), "vmware:key/null/%3cVMWARE%2dEMPTYSTRING%3e");
//! ```

use crate::escape::{escape_into, format_bool};
use crate::options::CodecOptions;
use crate::scan::{
    COMPOUND_DELIMITER, COMPOUND_LEFT, COMPOUND_RIGHT, EMPTY_STRING_ELEMENT, FIELD_DELIMITER,
    NULL_ELEMENT,
};
use crate::{
    Error, FqidLocator, KeyLocator, LdapLocator, PairLocator, PassphraseLocator, Result,
    RoleLocator, ScriptLocator,
};
use base64::prelude::*;
use std::fmt::Write as _;

const TOKEN_PREFIX: &str = "vmware:key/";

/// The key-locator encoder.
///
/// Created via [`Encoder::new`]; the token accumulates in an internal buffer
/// returned by [`Encoder::into_inner`].
pub struct Encoder {
    output: String,
    options: CodecOptions,
    depth: usize,
}

impl Encoder {
    pub fn new(options: CodecOptions) -> Self {
        Encoder {
            output: String::with_capacity(128),
            options,
            depth: 0,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Appends the token for `locator`, prefix included.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyLockedData`] for a pair without locked data and
    /// [`Error::NestingTooDeep`] for a tree nested deeper than
    /// [`CodecOptions::max_depth`].
    pub fn encode(&mut self, locator: &KeyLocator) -> Result<()> {
        self.output.push_str(TOKEN_PREFIX);
        self.write_locator(locator)
    }

    fn write_locator(&mut self, locator: &KeyLocator) -> Result<()> {
        let locator_type = locator.locator_type();

        tracing::trace!(
            locator_type = locator_type.name(),
            depth = self.depth,
            "encoding key locator"
        );

        self.write_field(locator_type.name().as_bytes(), false);
        self.output.push(FIELD_DELIMITER as char);

        match locator {
            KeyLocator::Null => {
                // The null body is the escaped form, unlike empty fields elsewhere.
                escape_into(&mut self.output, EMPTY_STRING_ELEMENT.as_bytes());
            }
            KeyLocator::Key(key) => self.write_field(key, false),
            KeyLocator::Passphrase(passphrase) => self.write_passphrase(passphrase),
            KeyLocator::Ldap(ldap) => self.write_ldap(ldap),
            KeyLocator::Script(script) => self.write_script(script),
            KeyLocator::Role(role) => self.write_role(role),
            KeyLocator::Fqid(fqid) => self.write_fqid(fqid),
            KeyLocator::List(elements) => self
                .write_compound(|encoder| encoder.write_list(elements))
                .map_err(|err| err.context(locator_type.name()))?,
            KeyLocator::Pair(pair) => self
                .write_compound(|encoder| encoder.write_pair(pair))
                .map_err(|err| err.context(locator_type.name()))?,
        }

        Ok(())
    }

    fn write_passphrase(&mut self, passphrase: &PassphraseLocator) {
        self.write_text(&passphrase.unique_id, false);
        self.push_delimiter();
        self.write_field(&passphrase.key_gen_data, false);
    }

    fn write_ldap(&mut self, ldap: &LdapLocator) {
        self.write_text(&ldap.unique_id, true);
        self.push_delimiter();
        self.write_text(&ldap.server, true);
        self.push_delimiter();
        self.write_text(&ldap.domain, true);
        self.push_delimiter();
        // Writing to a String cannot fail.
        let _ = write!(self.output, "{}", ldap.port);
        self.push_delimiter();
        self.output.push_str(format_bool(ldap.use_ssl));
        self.push_delimiter();
        self.write_text(&ldap.path, false);
    }

    fn write_script(&mut self, script: &ScriptLocator) {
        self.write_text(&script.unique_id, true);
        self.push_delimiter();
        self.write_text(&script.rel_path, false);
        self.push_delimiter();
        self.write_field(&script.signature, false);
    }

    fn write_role(&mut self, role: &RoleLocator) {
        self.write_text(&role.unique_id, true);
        self.push_delimiter();
        self.write_text(role.role.name(), false);
    }

    fn write_fqid(&mut self, fqid: &FqidLocator) {
        self.write_text(&fqid.unique_id, true);
        self.push_delimiter();
        self.write_text(&fqid.key_server_id, true);
        self.push_delimiter();
        self.write_text(&fqid.key_id, false);
    }

    fn write_compound<F>(&mut self, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.depth >= self.options.max_depth {
            return Err(Error::NestingTooDeep {
                limit: self.options.max_depth,
            });
        }

        self.depth += 1;
        self.output.push(COMPOUND_LEFT as char);
        let result = body(self);
        self.output.push(COMPOUND_RIGHT as char);
        self.depth -= 1;
        result
    }

    fn write_list(&mut self, elements: &[KeyLocator]) -> Result<()> {
        for (index, element) in elements.iter().enumerate() {
            if index > 0 {
                self.output.push(COMPOUND_DELIMITER as char);
            }
            self.write_locator(element)
                .map_err(|err| err.context(format!("list element {index}")))?;
        }
        Ok(())
    }

    fn write_pair(&mut self, pair: &PairLocator) -> Result<()> {
        if pair.locked_data.is_empty() {
            return Err(Error::EmptyLockedData.context("locked data"));
        }

        self.write_locator(&pair.locker)
            .map_err(|err| err.context("pair locker"))?;
        self.output.push(COMPOUND_DELIMITER as char);
        self.write_text(&pair.crypto_mac, false);
        self.output.push(COMPOUND_DELIMITER as char);
        let encoded = BASE64_STANDARD.encode(&pair.locked_data);
        escape_into(&mut self.output, encoded.as_bytes());
        Ok(())
    }

    #[inline]
    fn push_delimiter(&mut self) {
        self.output.push(FIELD_DELIMITER as char);
    }

    #[inline]
    fn write_text(&mut self, text: &str, nullable: bool) {
        self.write_field(text.as_bytes(), nullable);
    }

    fn write_field(&mut self, field: &[u8], nullable: bool) {
        if field.is_empty() {
            self.output.push_str(if nullable {
                NULL_ELEMENT
            } else {
                EMPTY_STRING_ELEMENT
            });
        } else {
            escape_into(&mut self.output, field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Role};

    fn encode(locator: &KeyLocator) -> Result<String> {
        let mut encoder = Encoder::new(CodecOptions::default());
        encoder.encode(locator)?;
        Ok(encoder.into_inner())
    }

    #[test]
    fn test_encode_null() {
        assert_eq!(
            encode(&KeyLocator::Null).unwrap(),
            "vmware:key/null/%3cVMWARE%2dEMPTYSTRING%3e"
        );
    }

    #[test]
    fn test_encode_raw_key() {
        assert_eq!(
            encode(&KeyLocator::raw_key(b"test-key-data".to_vec())).unwrap(),
            "vmware:key/rawkey/test%2dkey%2ddata"
        );
        assert_eq!(
            encode(&KeyLocator::raw_key(Vec::new())).unwrap(),
            "vmware:key/rawkey/<VMWARE-EMPTYSTRING>"
        );
    }

    #[test]
    fn test_encode_passphrase() {
        let locator = KeyLocator::Passphrase(PassphraseLocator {
            unique_id: "passphrase-id".to_string(),
            key_gen_data: b"salt-data".to_vec(),
        });
        assert_eq!(
            encode(&locator).unwrap(),
            "vmware:key/phrase/passphrase%2did/salt%2ddata"
        );
    }

    #[test]
    fn test_encode_passphrase_empty_id_is_not_null() {
        let locator = KeyLocator::Passphrase(PassphraseLocator::default());
        assert_eq!(
            encode(&locator).unwrap(),
            "vmware:key/phrase/<VMWARE-EMPTYSTRING>/<VMWARE-EMPTYSTRING>"
        );
    }

    #[test]
    fn test_encode_ldap() {
        let locator = KeyLocator::Ldap(LdapLocator {
            unique_id: "ldap-id".to_string(),
            server: "ldap.example.com".to_string(),
            domain: "example.com".to_string(),
            port: 389,
            use_ssl: true,
            path: "cn=keys".to_string(),
        });
        assert_eq!(
            encode(&locator).unwrap(),
            "vmware:key/ldap/ldap%2did/ldap%2eexample%2ecom/example%2ecom/389/TRUE/cn%3dkeys"
        );
    }

    #[test]
    fn test_encode_ldap_empty_server_and_domain_are_null() {
        let locator = KeyLocator::Ldap(LdapLocator {
            unique_id: "id".to_string(),
            port: 636,
            path: "path".to_string(),
            ..LdapLocator::default()
        });
        assert_eq!(
            encode(&locator).unwrap(),
            "vmware:key/ldap/id/<VMWARE-NULL>/<VMWARE-NULL>/636/FALSE/path"
        );
    }

    #[test]
    fn test_encode_script() {
        let locator = KeyLocator::Script(ScriptLocator {
            unique_id: String::new(),
            rel_path: "/path/to/script".to_string(),
            signature: b"sig".to_vec(),
        });
        assert_eq!(
            encode(&locator).unwrap(),
            "vmware:key/script/<VMWARE-NULL>/%2fpath%2fto%2fscript/sig"
        );
    }

    #[test]
    fn test_encode_role() {
        assert_eq!(
            encode(&KeyLocator::role("role-id", Role::AdminIdent)).unwrap(),
            "vmware:key/role/role%2did/adminIdent"
        );
    }

    #[test]
    fn test_encode_fqid() {
        assert_eq!(
            encode(&KeyLocator::fqid("unique-123", "server1", "key-abc")).unwrap(),
            "vmware:key/fqid/unique%2d123/server1/key%2dabc"
        );
        assert_eq!(
            encode(&KeyLocator::fqid("", "", "k")).unwrap(),
            "vmware:key/fqid/<VMWARE-NULL>/<VMWARE-NULL>/k"
        );
    }

    #[test]
    fn test_encode_lists() {
        assert_eq!(encode(&KeyLocator::list([])).unwrap(), "vmware:key/list/()");

        let locator = KeyLocator::list([
            KeyLocator::Null,
            KeyLocator::list([KeyLocator::raw_key(b"k".to_vec())]),
        ]);
        assert_eq!(
            encode(&locator).unwrap(),
            "vmware:key/list/(null/%3cVMWARE%2dEMPTYSTRING%3e,list/(rawkey/k))"
        );
    }

    #[test]
    fn test_encode_pair() {
        let locator = KeyLocator::pair(KeyLocator::list([]), "HMAC", b"base64".to_vec());
        assert_eq!(
            encode(&locator).unwrap(),
            "vmware:key/pair/(list/(),HMAC,YmFzZTY0)"
        );
    }

    #[test]
    fn test_encode_pair_escapes_base64() {
        let locator = KeyLocator::pair(KeyLocator::Null, "HMAC-SHA-256", vec![0xfb, 0xff]);
        assert_eq!(
            encode(&locator).unwrap(),
            "vmware:key/pair/(null/%3cVMWARE%2dEMPTYSTRING%3e,HMAC%2dSHA%2d256,%2b%2f8%3d)"
        );
    }

    #[test]
    fn test_encode_pair_requires_locked_data() {
        let locator = KeyLocator::list([KeyLocator::pair(KeyLocator::Null, "HMAC", Vec::new())]);
        let err = encode(&locator).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyLockedData);
        assert_eq!(err.path(), vec!["list", "list element 0", "pair", "locked data"]);
    }

    #[test]
    fn test_encode_depth_guard() {
        let mut locator = KeyLocator::Null;
        for _ in 0..3 {
            locator = KeyLocator::list([locator]);
        }

        let mut encoder = Encoder::new(CodecOptions::new().with_max_depth(3));
        assert!(encoder.encode(&locator).is_ok());

        let mut encoder = Encoder::new(CodecOptions::new().with_max_depth(2));
        let err = encoder.encode(&locator).unwrap_err();
        assert!(matches!(err.root(), Error::NestingTooDeep { limit: 2 }));
    }
}
