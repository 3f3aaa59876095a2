//! Dependency link engine.
//!
//! A link pass walks the dependency graph of a root manifest and materializes every
//! hoistable package as a relative directory link under one target `node_modules`.
//! Each level of siblings is claimed before any of them is descended into; the subtrees
//! are then driven together within the caller's task and share only the set of names
//! already claimed in the target directory.

use anyhow::{Context, Result};
use futures_util::future::{BoxFuture, FutureExt, try_join_all};
use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::package::{PackageManifest, WorkspaceIndex};
use crate::resolver::PackageResolver;
use crate::runtime::{LinkType, Runtime, is_already_present, node_modules_depth, relative_symlink_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new link was written.
    Created,
    /// Something already occupied the link location and was left alone.
    AlreadyPresent,
}

/// Names claimed in the target directory during one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkSummary {
    pub links: BTreeMap<String, LinkOutcome>,
}

impl LinkSummary {
    pub fn created(&self) -> Vec<&str> {
        self.with_outcome(LinkOutcome::Created)
    }

    pub fn already_present(&self) -> Vec<&str> {
        self.with_outcome(LinkOutcome::AlreadyPresent)
    }

    fn with_outcome(&self, outcome: LinkOutcome) -> Vec<&str> {
        self.links
            .iter()
            .filter(|(_, o)| **o == outcome)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// State of a single link pass. Build one per pass and drop it afterwards.
pub struct LinkPass<'a, R: ?Sized> {
    runtime: &'a R,
    resolver: PackageResolver<'a, R>,
    target_dir: PathBuf,
    link_type: LinkType,
    claimed: Mutex<BTreeMap<String, LinkOutcome>>,
}

impl<'a, R: Runtime + ?Sized> LinkPass<'a, R> {
    pub fn new(
        runtime: &'a R,
        workspace: &'a WorkspaceIndex,
        target_dir: PathBuf,
        link_type: LinkType,
    ) -> Self {
        Self {
            runtime,
            resolver: PackageResolver::new(runtime, workspace),
            target_dir,
            link_type,
            claimed: Mutex::new(BTreeMap::new()),
        }
    }

    /// Link every name in `dependencies`, resolved from `root_dir`, and everything they
    /// depend on. The first error aborts the pass; subtrees not yet walked are dropped.
    #[tracing::instrument(skip(self, dependencies))]
    pub async fn run(self, root_dir: &Path, dependencies: Vec<String>) -> Result<LinkSummary> {
        self.link_dependencies(dependencies, root_dir.to_path_buf(), Vec::new())
            .await?;

        let links = self
            .claimed
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(LinkSummary { links })
    }

    /// Link one level of siblings required by the package in `from_dir`, then descend.
    ///
    /// Every sibling is resolved and claimed before any of their dependencies is visited,
    /// so a package's direct dependencies always get the copy that package resolves.
    /// `chain` holds the names on the path from the root to `from_dir`.
    pub fn link_dependencies(
        &self,
        names: Vec<String>,
        from_dir: PathBuf,
        chain: Vec<String>,
    ) -> BoxFuture<'_, Result<()>> {
        async move {
            let mut children = Vec::new();
            for name in names {
                if let Some(child) = self.link_package(&name, &from_dir, &chain)? {
                    children.push((name, child));
                }
            }

            try_join_all(children.into_iter().map(|(name, (dir, deps))| {
                let mut chain = chain.clone();
                chain.push(name);
                self.link_dependencies(deps, dir, chain)
            }))
            .await?;
            Ok(())
        }
        .boxed()
    }

    /// Resolve `name` from `from_dir` and link it if it is hoistable and unclaimed.
    ///
    /// Returns the package directory and its dependency names to descend into, or `None`
    /// when `name` is already on `chain`.
    pub fn link_package(
        &self,
        name: &str,
        from_dir: &Path,
        chain: &[String],
    ) -> Result<Option<(PathBuf, Vec<String>)>> {
        if chain.iter().any(|n| n == name) {
            debug!("Dependency cycle through {}, not descending", name);
            return Ok(None);
        }

        let resolved = self.resolver.resolve(name, from_dir)?;

        if node_modules_depth(&resolved.manifest_path) > 1 {
            debug!(
                "{} resolves inside another package's node_modules ({:?}), not linking",
                name, resolved.dir
            );
        } else if self.claim(name) {
            self.create_link(name, &resolved.dir)?;
        }

        let manifest = PackageManifest::load(self.runtime, &resolved.manifest_path)?;
        Ok(Some((resolved.dir, manifest.dependency_names())))
    }

    /// Claim `name` in the target directory. Returns false if it was already claimed.
    fn claim(&self, name: &str) -> bool {
        let mut claimed = self
            .claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if claimed.contains_key(name) {
            return false;
        }
        claimed.insert(name.to_string(), LinkOutcome::Created);
        true
    }

    fn record(&self, name: &str, outcome: LinkOutcome) {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.to_string(), outcome);
    }

    fn create_link(&self, name: &str, package_dir: &Path) -> Result<()> {
        let link = self.target_dir.join(name);
        let parent = link
            .parent()
            .with_context(|| format!("Link path {:?} has no parent", link))?;
        let leaf = link
            .file_name()
            .with_context(|| format!("Link path {:?} has no file name", link))?;

        self.runtime.create_dir_all(parent)?;

        // Relative targets are computed against the real parent so `..` segments walk the
        // same directories the filesystem will.
        let real_link = self.runtime.canonicalize(parent)?.join(leaf);
        let target = relative_symlink_path(&real_link, package_dir)
            .unwrap_or_else(|| package_dir.to_path_buf());

        match self.runtime.symlink(&target, &link, self.link_type) {
            Ok(()) => {
                debug!("Linked {:?} -> {:?}", link, target);
                Ok(())
            }
            Err(e) if is_already_present(&e) => {
                debug!("{:?} already present, leaving it in place", link);
                self.record(name, LinkOutcome::AlreadyPresent);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
