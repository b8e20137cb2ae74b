//! Configuration options for key-locator encoding and decoding.
//!
//! - [`CodecOptions`]: main configuration struct
//! - [`RoleNameMatching`]: how role names in a token are matched against the role table
//!
//! ## Examples
//!
//! ```rust
//! use keylocator::{from_str_with_options, CodecOptions, RoleNameMatching};
//!
//! // Accept at most 8 levels of list/pair nesting
//! let options = CodecOptions::new().with_max_depth(8);
//! let locator = from_str_with_options("vmware:key/list/()", &options).unwrap();
//! assert!(locator.as_list().unwrap().is_empty());
//!
//! // Reproduce the historic role lookup
//! let options = CodecOptions::new().with_role_names(RoleNameMatching::Legacy);
//! assert!(from_str_with_options("vmware:key/role/id/adminIdent", &options).is_err());
//! ```

/// Default bound on list/pair nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How role names read from a token are matched against the role table.
///
/// Older producers looked role names up by lowercasing the input and
/// comparing it against the canonical names, two of which (`adminIdent`,
/// `adminRecovery`) contain uppercase letters. Those two roles could never be
/// decoded. [`RoleNameMatching::CaseInsensitive`] fixes that;
/// [`RoleNameMatching::Legacy`] keeps the old behaviour for integrators that
/// must reject exactly what older readers rejected.
///
/// # Examples
///
/// ```rust
/// use keylocator::{Role, RoleNameMatching};
///
/// assert_eq!(
///     Role::from_name_with("ADMINIDENT", RoleNameMatching::CaseInsensitive),
///     Some(Role::AdminIdent)
/// );
/// assert_eq!(Role::from_name_with("adminIdent", RoleNameMatching::Legacy), None);
/// assert_eq!(Role::from_name_with("SERVER", RoleNameMatching::Legacy), Some(Role::Server));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RoleNameMatching {
    #[default]
    CaseInsensitive,
    Legacy,
}

/// Configuration options for the codec.
///
/// # Examples
///
/// ```rust
/// use keylocator::{CodecOptions, RoleNameMatching};
///
/// let options = CodecOptions::new();
/// assert_eq!(options.max_depth, 64);
/// assert_eq!(options.role_names, RoleNameMatching::CaseInsensitive);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecOptions {
    /// Maximum number of nested list/pair groups. Deeper input fails with
    /// [`Error::NestingTooDeep`](crate::Error::NestingTooDeep).
    pub max_depth: usize,
    pub role_names: RoleNameMatching,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            role_names: RoleNameMatching::default(),
        }
    }
}

impl CodecOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum compound nesting depth.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keylocator::CodecOptions;
    ///
    /// let options = CodecOptions::new().with_max_depth(4);
    /// assert_eq!(options.max_depth, 4);
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets how role names are matched when decoding.
    #[must_use]
    pub fn with_role_names(mut self, role_names: RoleNameMatching) -> Self {
        self.role_names = role_names;
        self
    }
}
