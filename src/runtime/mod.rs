//! Runtime abstraction for filesystem operations.
//!
//! Every filesystem touch made while resolving, linking or cleaning goes through the
//! [`Runtime`] trait so the engines can be driven by a mock in tests.
//!
//! # Structure
//!
//! - `path` - Path utility functions (normalize, relative_symlink_path, node_modules depth)
//! - `fs` - File system operations (read, directory)
//! - `symlink` - Symlink operations (create, inspect, remove)
//! - `glob` - Glob expansion for workspace member patterns

mod fs;
mod glob;
pub mod path;
mod symlink;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use path::{node_modules_depth, relative_symlink_path};
pub use symlink::{LinkType, is_already_present};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_dir(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
    fn current_dir(&self) -> Result<PathBuf>;

    /// Canonicalize a path by resolving all symlinks and returning the canonical absolute path.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    // Symlinks
    /// Create a directory-like link at `link` pointing at `original`.
    /// A relative `original` is interpreted relative to the link's parent directory.
    fn symlink(&self, original: &Path, link: &Path, link_type: LinkType) -> Result<()>;
    fn is_symlink(&self, path: &Path) -> bool;
    fn remove_symlink(&self, path: &Path) -> Result<()>;

    // Globbing
    /// Expand `pattern` relative to `base`, returning absolute matches in sorted order.
    fn glob(&self, base: &Path, pattern: &str) -> Result<Vec<PathBuf>>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        self.remove_dir_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.read_dir_impl(path)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.canonicalize_impl(path)
    }

    fn symlink(&self, original: &Path, link: &Path, link_type: LinkType) -> Result<()> {
        self.symlink_impl(original, link, link_type)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.is_symlink_impl(path)
    }

    fn remove_symlink(&self, path: &Path) -> Result<()> {
        self.remove_symlink_impl(path)
    }

    fn glob(&self, base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        self.glob_impl(base, pattern)
    }
}
