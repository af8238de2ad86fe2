//! Logical path to physical key expansion.
//!
//! Every provider operation funnels its caller-supplied path through
//! [`PathExpander::expand`]. The expander owns the three namespace roots
//! (public, private, trash) and is pure: no I/O, no shared state.
//!
//! # Normalization
//!
//! Applied to the logical path, in order:
//!
//! 1. `\` is replaced with `/`.
//! 2. Exactly one leading `/` is stripped.
//! 3. Surrounding whitespace is trimmed.
//! 4. The path is lower-cased, unless it targets the trash namespace. Trashed
//!    keys keep their case so that a restore can recover the original name.
//!
//! The namespace root is then prepended and any leading `/` of the result is
//! removed, since object stores reject keys starting with a separator.
//!
//! ```
//! use assetstore_core::path::{NamespaceRoots, PathExpander};
//! use assetstore_core::types::Visibility;
//!
//! let roots = NamespaceRoots::new("", "/public", "/private", "/.trash").unwrap();
//! let expander = PathExpander::new(roots);
//! assert_eq!(
//!     expander.expand("\\Docs\\Readme.MD", Visibility::Public, false),
//!     "public/docs/readme.md"
//! );
//! assert_eq!(
//!     expander.expand("/Docs/Readme.MD", Visibility::Private, true),
//!     ".trash/Docs/Readme.MD"
//! );
//! ```

use tracing::trace;

use crate::error::{StorageError, StorageResult};
use crate::types::Visibility;

/// Canonical key separator.
pub const SEPARATOR: char = '/';

/// The three namespaces a physical key can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Live, publicly readable objects.
    Public,
    /// Live, access-controlled objects.
    Private,
    /// Soft-deleted objects awaiting restore or purge.
    Trash,
}

impl Namespace {
    /// Select the namespace for a (visibility, trashed) pair.
    #[must_use]
    pub fn select(visibility: Visibility, trashed: bool) -> Self {
        match (trashed, visibility) {
            (true, _) => Self::Trash,
            (false, Visibility::Public) => Self::Public,
            (false, Visibility::Private) => Self::Private,
        }
    }

    /// Configuration field name of the suffix defining this namespace.
    #[must_use]
    pub fn suffix_field(&self) -> &'static str {
        match self {
            Self::Public => "publicSuffix",
            Self::Private => "privateSuffix",
            Self::Trash => "trashSuffix",
        }
    }
}

/// Normalized roots of the public, private and trash namespaces.
///
/// Each root is either empty or ends with [`SEPARATOR`], and never starts
/// with one. The roots are pairwise disjoint: none is a prefix of another.
/// An empty root is a prefix of every key, so it is only accepted when it
/// cannot contain another namespace, which never holds with three roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRoots {
    public: String,
    private: String,
    trash: String,
}

impl NamespaceRoots {
    /// Build the roots from a common subpath and the three namespace suffixes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConfigurationInvalid`] when two roots overlap,
    /// including when one of them is empty.
    pub fn new(
        subpath: &str,
        public_suffix: &str,
        private_suffix: &str,
        trash_suffix: &str,
    ) -> StorageResult<Self> {
        let roots = Self {
            public: normalize_root(subpath, public_suffix),
            private: normalize_root(subpath, private_suffix),
            trash: normalize_root(subpath, trash_suffix),
        };
        roots.check_disjoint()?;
        trace!(?roots, "resolved namespace roots");
        Ok(roots)
    }

    /// Root of the given namespace.
    #[must_use]
    pub fn root(&self, namespace: Namespace) -> &str {
        match namespace {
            Namespace::Public => &self.public,
            Namespace::Private => &self.private,
            Namespace::Trash => &self.trash,
        }
    }

    fn check_disjoint(&self) -> StorageResult<()> {
        let all = [Namespace::Public, Namespace::Private, Namespace::Trash];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                let (ra, rb) = (self.root(*a), self.root(*b));
                if !(ra.starts_with(rb) || rb.starts_with(ra)) {
                    continue;
                }
                // Blame the empty root, as it is the one swallowing the other.
                let (field, message) = if ra.is_empty() {
                    (a.suffix_field(), format!("empty namespace root contains {rb:?}"))
                } else if rb.is_empty() {
                    (b.suffix_field(), format!("empty namespace root contains {ra:?}"))
                } else {
                    (b.suffix_field(), format!("namespace root {rb:?} overlaps {ra:?}"))
                };
                return Err(StorageError::invalid_config(field, message));
            }
        }
        Ok(())
    }
}

impl Default for NamespaceRoots {
    fn default() -> Self {
        Self {
            public: "public/".to_owned(),
            private: "private/".to_owned(),
            trash: ".trash/".to_owned(),
        }
    }
}

/// Maps logical paths to physical keys.
#[derive(Debug, Clone, Default)]
pub struct PathExpander {
    roots: NamespaceRoots,
}

impl PathExpander {
    /// Create an expander over the given namespace roots.
    #[must_use]
    pub fn new(roots: NamespaceRoots) -> Self {
        Self { roots }
    }

    /// The namespace roots this expander prepends.
    #[must_use]
    pub fn roots(&self) -> &NamespaceRoots {
        &self.roots
    }

    /// Expand a logical path into the physical key for (visibility, trashed).
    ///
    /// An empty logical path yields the bare namespace root.
    #[must_use]
    pub fn expand(&self, logical_path: &str, visibility: Visibility, trashed: bool) -> String {
        let normalized = normalize_path(logical_path, trashed);
        let root = self.roots.root(Namespace::select(visibility, trashed));
        let mut key = String::with_capacity(root.len() + normalized.len());
        key.push_str(root);
        key.push_str(&normalized);
        strip_leading_separator(&key).to_owned()
    }
}

/// Normalize a caller-supplied logical path.
///
/// Case is preserved when `preserve_case` is set (trashed paths).
#[must_use]
pub fn normalize_path(logical_path: &str, preserve_case: bool) -> String {
    let forward = logical_path.replace('\\', "/");
    let stripped = strip_leading_separator(&forward).trim();
    if preserve_case {
        stripped.to_owned()
    } else {
        stripped.to_lowercase()
    }
}

/// Remove exactly one leading separator.
#[must_use]
pub fn strip_leading_separator(path: &str) -> &str {
    path.strip_prefix(SEPARATOR).unwrap_or(path)
}

/// The directory prefix containing `key`: everything up to and including the
/// last separator, or empty when the key has none.
#[must_use]
pub fn parent_prefix(key: &str) -> &str {
    match key.rfind(SEPARATOR) {
        Some(pos) => &key[..=pos],
        None => "",
    }
}

/// Treat `key` as a directory: append a separator unless it is empty or
/// already ends with one.
#[must_use]
pub fn directory_prefix(key: &str) -> String {
    if key.is_empty() || key.ends_with(SEPARATOR) {
        key.to_owned()
    } else {
        format!("{key}{SEPARATOR}")
    }
}

/// Combine the subpath and a namespace suffix into a normalized root.
fn normalize_root(subpath: &str, suffix: &str) -> String {
    let joined = format!("{subpath}{suffix}").replace('\\', "/");
    let segments: Vec<&str> = joined
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        String::new()
    } else {
        let mut root = segments.join("/");
        root.push(SEPARATOR);
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expander() -> PathExpander {
        PathExpander::new(NamespaceRoots::default())
    }

    #[test]
    fn test_should_build_default_roots_from_suffixes() {
        let roots = NamespaceRoots::new("", "/public", "/private", "/.trash")
            .unwrap_or_else(|e| panic!("roots: {e}"));
        assert_eq!(roots, NamespaceRoots::default());
        assert_eq!(roots.root(Namespace::Trash), ".trash/");
    }

    #[test]
    fn test_should_prefix_roots_with_subpath() {
        let roots = NamespaceRoots::new("/tenants\\acme/", "/public", "/private", "/.trash")
            .unwrap_or_else(|e| panic!("roots: {e}"));
        assert_eq!(roots.root(Namespace::Public), "tenants/acme/public/");
        assert_eq!(roots.root(Namespace::Private), "tenants/acme/private/");
        assert_eq!(roots.root(Namespace::Trash), "tenants/acme/.trash/");
    }

    #[test]
    fn test_should_reject_empty_root_containing_other_namespaces() {
        let err = NamespaceRoots::new("", "", "/private", "/.trash")
            .expect_err("empty public root contains the private namespace");
        match err {
            StorageError::ConfigurationInvalid { field, .. } => {
                assert_eq!(field, "publicSuffix");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = NamespaceRoots::new("", "/public", "/private", "/")
            .expect_err("empty trash root contains the live namespaces");
        assert!(matches!(
            err,
            StorageError::ConfigurationInvalid { ref field, .. } if field == "trashSuffix"
        ));
    }

    #[test]
    fn test_should_reject_identical_empty_roots() {
        let err = NamespaceRoots::new("", "", "/private", "")
            .expect_err("public and trash would share one key space");
        assert!(matches!(err, StorageError::ConfigurationInvalid { .. }));
        assert!(NamespaceRoots::new("", "", "", "").is_err());
        assert!(NamespaceRoots::new("/site", "", "/private", "/.trash").is_err());
    }

    #[test]
    fn test_should_reject_overlapping_roots() {
        let err = NamespaceRoots::new("", "/files", "/files/private", "/.trash")
            .expect_err("overlapping roots must be rejected");
        match err {
            StorageError::ConfigurationInvalid { field, .. } => {
                assert_eq!(field, "privateSuffix");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(NamespaceRoots::new("", "/same", "/same", "/.trash").is_err());
    }

    #[test]
    fn test_should_be_case_insensitive_for_live_paths() {
        let e = expander();
        for visibility in [Visibility::Public, Visibility::Private] {
            assert_eq!(
                e.expand("Photos/Cat.JPG", visibility, false),
                e.expand("photos/cat.jpg", visibility, false)
            );
        }
    }

    #[test]
    fn test_should_preserve_case_for_trashed_paths() {
        let e = expander();
        assert_eq!(
            e.expand("Photos/Cat.JPG", Visibility::Public, true),
            ".trash/Photos/Cat.JPG"
        );
        assert_ne!(
            e.expand("Photos/Cat.JPG", Visibility::Public, true),
            e.expand("photos/cat.jpg", Visibility::Public, true)
        );
    }

    #[test]
    fn test_should_ignore_visibility_for_trashed_paths() {
        let e = expander();
        assert_eq!(
            e.expand("a.txt", Visibility::Public, true),
            e.expand("a.txt", Visibility::Private, true)
        );
    }

    #[test]
    fn test_should_normalize_backslashes() {
        let e = expander();
        assert_eq!(
            e.expand("a\\b\\c.txt", Visibility::Public, false),
            "public/a/b/c.txt"
        );
        assert_eq!(
            e.expand("a\\B.txt", Visibility::Private, true),
            ".trash/a/B.txt"
        );
    }

    #[test]
    fn test_should_strip_exactly_one_leading_separator() {
        assert_eq!(normalize_path("/a.txt", false), "a.txt");
        assert_eq!(normalize_path("//a.txt", false), "/a.txt");
        assert_eq!(normalize_path("\\a.txt", true), "a.txt");
    }

    #[test]
    fn test_should_trim_whitespace() {
        assert_eq!(normalize_path("  a/b.txt \n", false), "a/b.txt");
    }

    #[test]
    fn test_should_expand_empty_path_to_namespace_root() {
        let e = expander();
        assert_eq!(e.expand("", Visibility::Public, false), "public/");
        assert_eq!(e.expand("/", Visibility::Private, false), "private/");
        assert_eq!(e.expand("", Visibility::Public, true), ".trash/");
    }

    #[test]
    fn test_should_strip_only_one_leading_separator() {
        assert_eq!(strip_leading_separator("/x"), "x");
        assert_eq!(strip_leading_separator("//x"), "/x");
        assert_eq!(strip_leading_separator("x"), "x");
    }

    #[test]
    fn test_should_compute_parent_prefix() {
        assert_eq!(parent_prefix("public/a/b.txt"), "public/a/");
        assert_eq!(parent_prefix("b.txt"), "");
        assert_eq!(parent_prefix("public/"), "public/");
    }

    #[test]
    fn test_should_compute_directory_prefix() {
        assert_eq!(directory_prefix("public/a"), "public/a/");
        assert_eq!(directory_prefix("public/"), "public/");
        assert_eq!(directory_prefix(""), "");
    }
}
