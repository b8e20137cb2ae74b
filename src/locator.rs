//! The key-locator data model.
//!
//! A [`KeyLocator`] is a tree describing how to obtain a cryptographic key.
//! Each variant carries exactly the fields its type needs:
//!
//! | Class | Variants |
//! |-------|----------|
//! | Atomic | [`KeyLocator::Null`], [`KeyLocator::Key`] |
//! | Indirect | [`KeyLocator::Passphrase`], [`KeyLocator::Ldap`], [`KeyLocator::Script`], [`KeyLocator::Role`], [`KeyLocator::Fqid`] |
//! | Compound | [`KeyLocator::List`], [`KeyLocator::Pair`] |
//!
//! Indirect locators carry a unique ID used by key caches. An empty unique ID
//! means "none" and is written as the null sentinel (except for passphrase
//! locators, whose unique ID may not be null).
//!
//! ## Usage Patterns
//!
//! ```rust
//! use keylocator::{KeyLocator, LocatorClass, LocatorType, Role};
//!
//! let locator = KeyLocator::list([
//!     KeyLocator::role("role-id", Role::Server),
//!     KeyLocator::raw_key(b"secret".to_vec()),
//! ]);
//!
//! assert_eq!(locator.locator_type(), LocatorType::List);
//! assert_eq!(locator.class(), LocatorClass::Compound);
//! assert_eq!(locator.as_list().unwrap()[0].unique_id(), Some("role-id"));
//! ```

use crate::{Error, Result, RoleNameMatching};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The class of a locator type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocatorClass {
    /// No nested structure.
    Atomic,
    /// Describes an external or derived key source.
    Indirect,
    /// Composed of nested locators.
    Compound,
}

/// The type tag of a [`KeyLocator`].
///
/// The discriminants are the numeric codes used by the surrounding system;
/// `0` is reserved as invalid.
///
/// # Examples
///
/// ```rust
/// use keylocator::{LocatorClass, LocatorType};
///
/// assert_eq!(LocatorType::from_name("LDAP"), Some(LocatorType::Ldap));
/// assert_eq!(LocatorType::Key.name(), "rawkey");
/// assert_eq!(LocatorType::Pair.class(), LocatorClass::Compound);
/// assert_eq!(LocatorType::try_from(8).unwrap(), LocatorType::List);
/// assert!(LocatorType::try_from(999).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum LocatorType {
    Null = 1,
    Key = 2,
    Passphrase = 3,
    Ldap = 4,
    Script = 5,
    Role = 6,
    Fqid = 7,
    List = 8,
    Pair = 9,
}

const TYPE_NAMES: [(LocatorType, &str); 9] = [
    (LocatorType::Null, "null"),
    (LocatorType::Key, "rawkey"),
    (LocatorType::Passphrase, "phrase"),
    (LocatorType::Ldap, "ldap"),
    (LocatorType::Script, "script"),
    (LocatorType::Role, "role"),
    (LocatorType::Fqid, "fqid"),
    (LocatorType::List, "list"),
    (LocatorType::Pair, "pair"),
];

impl LocatorType {
    /// Every locator type, in code order.
    pub const ALL: [LocatorType; 9] = [
        LocatorType::Null,
        LocatorType::Key,
        LocatorType::Passphrase,
        LocatorType::Ldap,
        LocatorType::Script,
        LocatorType::Role,
        LocatorType::Fqid,
        LocatorType::List,
        LocatorType::Pair,
    ];

    /// The name used for this type in a token.
    #[must_use]
    pub const fn name(self) -> &'static str {
        TYPE_NAMES[self as usize - 1].1
    }

    /// Looks a type up by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        TYPE_NAMES
            .iter()
            .find(|(_, candidate)| candidate.eq_ignore_ascii_case(name))
            .map(|(locator_type, _)| *locator_type)
    }

    /// The class this type belongs to.
    #[must_use]
    pub const fn class(self) -> LocatorClass {
        match self {
            LocatorType::Null | LocatorType::Key => LocatorClass::Atomic,
            LocatorType::Passphrase
            | LocatorType::Ldap
            | LocatorType::Script
            | LocatorType::Role
            | LocatorType::Fqid => LocatorClass::Indirect,
            LocatorType::List | LocatorType::Pair => LocatorClass::Compound,
        }
    }
}

impl TryFrom<u32> for LocatorType {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self> {
        LocatorType::ALL
            .into_iter()
            .find(|locator_type| *locator_type as u32 == code)
            .ok_or(Error::UnknownTypeCode(code))
    }
}

impl fmt::Display for LocatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A well-known key managed by the key provider.
///
/// # Examples
///
/// ```rust
/// use keylocator::Role;
///
/// assert_eq!(Role::AdminRecovery.name(), "adminRecovery");
/// assert_eq!(Role::from_name("obfuscation"), Some(Role::Obfuscation));
/// assert_eq!(Role::try_from(3).unwrap(), Role::Server);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Role {
    #[default]
    Obfuscation = 0,
    AdminIdent = 1,
    AdminRecovery = 2,
    Server = 3,
}

const ROLE_NAMES: [(Role, &str); 4] = [
    (Role::Obfuscation, "obfuscation"),
    (Role::AdminIdent, "adminIdent"),
    (Role::AdminRecovery, "adminRecovery"),
    (Role::Server, "server"),
];

impl Role {
    /// The canonical name written for this role.
    #[must_use]
    pub const fn name(self) -> &'static str {
        ROLE_NAMES[self as usize].1
    }

    /// Looks a role up by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::from_name_with(name, RoleNameMatching::CaseInsensitive)
    }

    /// Looks a role up by name using the given matching rule.
    #[must_use]
    pub fn from_name_with(name: &str, matching: RoleNameMatching) -> Option<Self> {
        let lowered = name.to_ascii_lowercase();
        ROLE_NAMES
            .iter()
            .find(|(_, candidate)| match matching {
                RoleNameMatching::CaseInsensitive => candidate.eq_ignore_ascii_case(name),
                RoleNameMatching::Legacy => *candidate == lowered,
            })
            .map(|(role, _)| *role)
    }
}

impl TryFrom<u32> for Role {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self> {
        ROLE_NAMES
            .iter()
            .map(|(role, _)| *role)
            .find(|role| *role as u32 == code)
            .ok_or(Error::UnknownRole(code))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A key derived from a passphrase.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PassphraseLocator {
    /// May be empty but is never written as null.
    pub unique_id: String,
    pub key_gen_data: Vec<u8>,
}

/// A key stored in an LDAP directory.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LdapLocator {
    pub unique_id: String,
    /// Empty means no server.
    pub server: String,
    /// Empty means no domain.
    pub domain: String,
    pub port: u16,
    pub use_ssl: bool,
    pub path: String,
}

/// A key produced by running an external script.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ScriptLocator {
    pub unique_id: String,
    pub rel_path: String,
    pub signature: Vec<u8>,
}

/// One of the well-known [`Role`] keys.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RoleLocator {
    pub unique_id: String,
    pub role: Role,
}

/// A fully-qualified key ID on a key server.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FqidLocator {
    pub unique_id: String,
    /// Empty means the default key server.
    pub key_server_id: String,
    pub key_id: String,
}

/// Data locked under the key described by `locker`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairLocator {
    pub locker: Box<KeyLocator>,
    /// Name of the MAC algorithm, e.g. `HMAC-SHA-256`.
    pub crypto_mac: String,
    /// Opaque locked payload; base64 encoded in the token. Must not be empty.
    pub locked_data: Vec<u8>,
}

/// A key locator.
///
/// Built either by decoding a token with [`crate::from_str`] or
/// programmatically. Converting back to a token is done with
/// [`crate::to_string`], [`KeyLocator::to_token`] or `Display`.
///
/// # Examples
///
/// ```rust
/// use keylocator::KeyLocator;
///
/// let locator: KeyLocator = "vmware:key/fqid/unique-123/server1/key-abc".parse().unwrap();
/// assert_eq!(
///     locator.to_string(),
///     "vmware:key/fqid/unique%2d123/server1/key%2dabc"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum KeyLocator {
    #[default]
    Null,
    Key(Vec<u8>),
    Passphrase(PassphraseLocator),
    Ldap(LdapLocator),
    Script(ScriptLocator),
    Role(RoleLocator),
    Fqid(FqidLocator),
    List(Vec<KeyLocator>),
    Pair(PairLocator),
}

impl KeyLocator {
    /// A raw key locator.
    pub fn raw_key(key: impl Into<Vec<u8>>) -> Self {
        KeyLocator::Key(key.into())
    }

    /// A fully-qualified key ID locator.
    pub fn fqid(
        unique_id: impl Into<String>,
        key_server_id: impl Into<String>,
        key_id: impl Into<String>,
    ) -> Self {
        KeyLocator::Fqid(FqidLocator {
            unique_id: unique_id.into(),
            key_server_id: key_server_id.into(),
            key_id: key_id.into(),
        })
    }

    /// A well-known role locator.
    pub fn role(unique_id: impl Into<String>, role: Role) -> Self {
        KeyLocator::Role(RoleLocator {
            unique_id: unique_id.into(),
            role,
        })
    }

    /// A list of locators, kept in the given order.
    pub fn list(elements: impl IntoIterator<Item = KeyLocator>) -> Self {
        KeyLocator::List(elements.into_iter().collect())
    }

    /// Data locked under `locker`.
    pub fn pair(
        locker: KeyLocator,
        crypto_mac: impl Into<String>,
        locked_data: impl Into<Vec<u8>>,
    ) -> Self {
        KeyLocator::Pair(PairLocator {
            locker: Box::new(locker),
            crypto_mac: crypto_mac.into(),
            locked_data: locked_data.into(),
        })
    }

    /// The type tag of this locator.
    #[must_use]
    pub const fn locator_type(&self) -> LocatorType {
        match self {
            KeyLocator::Null => LocatorType::Null,
            KeyLocator::Key(_) => LocatorType::Key,
            KeyLocator::Passphrase(_) => LocatorType::Passphrase,
            KeyLocator::Ldap(_) => LocatorType::Ldap,
            KeyLocator::Script(_) => LocatorType::Script,
            KeyLocator::Role(_) => LocatorType::Role,
            KeyLocator::Fqid(_) => LocatorType::Fqid,
            KeyLocator::List(_) => LocatorType::List,
            KeyLocator::Pair(_) => LocatorType::Pair,
        }
    }

    /// The class of this locator's type.
    #[must_use]
    pub const fn class(&self) -> LocatorClass {
        self.locator_type().class()
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, KeyLocator::Null)
    }

    /// The unique ID of an indirect locator, `None` for other classes.
    #[must_use]
    pub fn unique_id(&self) -> Option<&str> {
        match self {
            KeyLocator::Passphrase(p) => Some(&p.unique_id),
            KeyLocator::Ldap(l) => Some(&l.unique_id),
            KeyLocator::Script(s) => Some(&s.unique_id),
            KeyLocator::Role(r) => Some(&r.unique_id),
            KeyLocator::Fqid(f) => Some(&f.unique_id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_key(&self) -> Option<&[u8]> {
        match self {
            KeyLocator::Key(key) => Some(key),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[KeyLocator]> {
        match self {
            KeyLocator::List(elements) => Some(elements),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_pair(&self) -> Option<&PairLocator> {
        match self {
            KeyLocator::Pair(pair) => Some(pair),
            _ => None,
        }
    }

    /// Encodes this locator with default options.
    ///
    /// # Errors
    ///
    /// See [`crate::to_string`].
    pub fn to_token(&self) -> Result<String> {
        crate::to_string(self)
    }
}

impl FromStr for KeyLocator {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self> {
        crate::from_str(token)
    }
}

/// Writes the token. A locator that cannot be encoded is rendered as its
/// error message instead.
impl fmt::Display for KeyLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_token() {
            Ok(token) => f.write_str(&token),
            Err(err) => write!(f, "{err}"),
        }
    }
}

impl Serialize for KeyLocator {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let token = self.to_token().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&token)
    }
}

impl<'de> Deserialize<'de> for KeyLocator {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct TokenVisitor;

        impl<'de> Visitor<'de> for TokenVisitor {
            type Value = KeyLocator;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a vmware:key locator token")
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<KeyLocator, E>
            where
                E: de::Error,
            {
                crate::from_str(value).map_err(E::custom)
            }

            fn visit_bytes<E>(self, value: &[u8]) -> std::result::Result<KeyLocator, E>
            where
                E: de::Error,
            {
                crate::from_slice(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TokenVisitor)
    }
}

macro_rules! name_serde {
    ($ty:ty, $lookup:path, $expecting:literal) => {
        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let name = String::deserialize(deserializer)?;
                $lookup(&name).ok_or_else(|| {
                    serde::de::Error::invalid_value(serde::de::Unexpected::Str(&name), &$expecting)
                })
            }
        }
    };
}

name_serde!(LocatorType, LocatorType::from_name, "a key locator type name");
name_serde!(Role, Role::from_name, "a key locator role name");
