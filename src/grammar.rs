//! Key-Locator Token Grammar
//!
//! This module documents the token format as implemented by this library.
//!
//! # Overview
//!
//! A token is a fixed prefix followed by one locator:
//!
//! ```text
//! token      = prefix "/" locator
//! prefix     = "vmware:key"                      ; ASCII case-insensitive
//! locator    = type "/" body
//! type       = "null" | "rawkey" | "phrase" | "ldap" | "script"
//!            | "role" | "fqid" | "list" | "pair"  ; ASCII case-insensitive
//! ```
//!
//! The prefix and type name are fields like any other: they are unescaped
//! before being compared, so `vmware%3akey` is an accepted prefix.
//!
//! # Fields
//!
//! Every field is percent-escaped. ASCII letters and digits stand for
//! themselves; every other byte is written as `%` and two hex digits.
//! Writers emit lowercase hex, readers accept either case.
//!
//! | Field | Escaped |
//! |-------|---------|
//! | `test-key` | `test%2dkey` |
//! | `a/b` | `a%2fb` |
//! | `+/=` | `%2b%2f%3d` |
//!
//! Because `/`, `,`, `(` and `)` never appear unescaped inside a field, they
//! are free to act as structure.
//!
//! ## Delimiters
//!
//! Fields are separated by the **context delimiter**:
//!
//! - `/` for a locator at the top level
//! - `,` for a locator inside a `(...)` group
//!
//! Only the **last** field of a locator ends at the context delimiter. The
//! type name and every other field always end at `/`:
//!
//! ```text
//! vmware:key/fqid/id/server/key                 ; top level
//! vmware:key/list/(fqid/id/server/key,rawkey/k) ; fqid inside a list
//! ```
//!
//! A field also ends at the end of its group or of the token.
//!
//! ## Sentinels
//!
//! | Sentinel | Meaning |
//! |----------|---------|
//! | `<VMWARE-NULL>` | absent value, accepted only where a field may be null |
//! | `<VMWARE-EMPTYSTRING>` | present but empty value |
//!
//! Sentinels are recognised after unescaping and ignoring ASCII case. Both
//! decode to an empty value. A null sentinel in a field that may not be null
//! is an error.
//!
//! # Locator Bodies
//!
//! | Type | Body | Nullable fields |
//! |------|------|-----------------|
//! | `null` | `<VMWARE-EMPTYSTRING>` | none |
//! | `rawkey` | key bytes | none |
//! | `phrase` | unique ID `/` key generation data | none |
//! | `ldap` | unique ID `/` server `/` domain `/` port `/` useSSL `/` path | unique ID, server, domain |
//! | `script` | unique ID `/` relative path `/` signature | unique ID |
//! | `role` | unique ID `/` role name | unique ID |
//! | `fqid` | unique ID `/` key server ID `/` key ID | unique ID, key server ID |
//! | `list` | `(` locator `,` locator ... `)` | none |
//! | `pair` | `(` locker `,` MAC name `,` locked data `)` | none |
//!
//! The `null` body must be empty after sentinel substitution; writers emit
//! the escaped form `%3cVMWARE%2dEMPTYSTRING%3e`.
//!
//! ## Scalars
//!
//! - **Port**: decimal digits only, `0` to `65535`
//! - **useSSL**: `TRUE` or `FALSE` when written, any case when read
//! - **Role name**: `obfuscation`, `adminIdent`, `adminRecovery`, `server`
//!
//! ## Compound Groups
//!
//! Parentheses nest. A group runs from its `(` to the matching `)`, counted
//! by depth, and is followed by an optional context delimiter:
//!
//! ```text
//! vmware:key/list/()
//! vmware:key/list/(list/(list/(null/%3cVMWARE%2dEMPTYSTRING%3e)))
//! vmware:key/pair/(list/(),HMAC,YmFzZTY0)
//! ```
//!
//! Pair locked data is standard padded base64, then escaped, and may not be
//! empty. The locked data runs to the end of the group, so it is always the
//! last pair field.
//!
//! # Trailing Input
//!
//! Decoding stops after the top-level locator; anything after it is ignored.
//!
//! # Examples
//!
//! ```rust
//! use keylocator::{from_str, KeyLocator};
//!
//! let token = "vmware:key/list/(fqid/a/b/c,rawkey/k)";
//! let locator = from_str(token).unwrap();
//! assert_eq!(
//!     locator,
//!     KeyLocator::list([
//!         KeyLocator::fqid("a", "b", "c"),
//!         KeyLocator::raw_key(b"k".to_vec()),
//!     ])
//! );
//! ```
