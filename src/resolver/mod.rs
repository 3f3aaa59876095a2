//! Package resolution.
//!
//! A dependency name resolves to the manifest of the package that would be loaded for it:
//! a workspace member of that name wins, otherwise the first `<name>/package.json` found in
//! the ancestor `node_modules` directories of the requesting package.

mod search_paths;

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use search_paths::node_module_paths;

use crate::package::{MANIFEST_FILE, WorkspaceIndex};
use crate::runtime::Runtime;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error(
        "Cannot find package '{name}' from {from_dir:?} (searched {count} node_modules directories)",
        count = .searched.len()
    )]
    NotFound {
        name: String,
        from_dir: PathBuf,
        searched: Vec<PathBuf>,
    },
    #[error("Invalid dependency name '{name}'")]
    InvalidName { name: String },
}

/// Where a dependency name resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPackage {
    pub name: String,
    pub manifest_path: PathBuf,
    pub dir: PathBuf,
}

impl ResolvedPackage {
    fn new(name: &str, manifest_path: PathBuf) -> Self {
        let dir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            name: name.to_string(),
            manifest_path,
            dir,
        }
    }
}

/// Reject names that would place a link outside the target `node_modules`.
/// Accepts `name` and `@scope/name`.
pub fn validate_name(name: &str) -> Result<(), ResolutionError> {
    let invalid = || ResolutionError::InvalidName {
        name: name.to_string(),
    };

    let parts: Vec<&str> = name.split('/').collect();
    let expected = if name.starts_with('@') { 2 } else { 1 };
    if parts.len() != expected {
        return Err(invalid());
    }
    for part in parts {
        if part.is_empty() || part == "." || part == ".." || part.contains(['\\', ':']) {
            return Err(invalid());
        }
    }
    Ok(())
}

pub struct PackageResolver<'a, R: ?Sized> {
    runtime: &'a R,
    workspace: &'a WorkspaceIndex,
}

impl<'a, R: Runtime + ?Sized> PackageResolver<'a, R> {
    pub fn new(runtime: &'a R, workspace: &'a WorkspaceIndex) -> Self {
        Self { runtime, workspace }
    }

    /// Resolve `name` as requested by the package in `from_dir`.
    ///
    /// Failures to find the package are reported as [`ResolutionError`].
    #[tracing::instrument(skip(self))]
    pub fn resolve(&self, name: &str, from_dir: &Path) -> Result<ResolvedPackage> {
        validate_name(name)?;

        if let Some(manifest_path) = self.workspace.find(name) {
            debug!("Resolved {} to workspace member {:?}", name, manifest_path);
            return Ok(ResolvedPackage::new(name, manifest_path.to_path_buf()));
        }

        let searched = node_module_paths(from_dir);
        for dir in &searched {
            let candidate = dir.join(name).join(MANIFEST_FILE);
            if self.runtime.exists(&candidate) {
                let manifest_path = self.runtime.canonicalize(&candidate)?;
                debug!("Resolved {} to {:?}", name, manifest_path);
                return Ok(ResolvedPackage::new(name, manifest_path));
            }
        }

        Err(ResolutionError::NotFound {
            name: name.to_string(),
            from_dir: from_dir.to_path_buf(),
            searched,
        }
        .into())
    }
}
