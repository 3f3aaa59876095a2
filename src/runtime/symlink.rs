//! Symlink operations (create, inspect, remove).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

use super::RealRuntime;

/// Concrete kind of directory link to create.
///
/// Both variants produce an ordinary symbolic link on Unix. On Windows `Dir` creates a
/// directory symlink and `Junction` a directory junction, which needs no privileges but
/// always stores an absolute target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    #[default]
    Junction,
    Dir,
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkType::Junction => write!(f, "junction"),
            LinkType::Dir => write!(f, "dir"),
        }
    }
}

/// Returns true if `err` means the link location is already taken
/// (entry already exists, or it is already a directory).
pub fn is_already_present(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.downcast_ref::<io::Error>().is_some_and(|e| {
            matches!(
                e.kind(),
                io::ErrorKind::AlreadyExists | io::ErrorKind::IsADirectory
            )
        })
    })
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn symlink_impl(
        &self,
        original: &Path,
        link: &Path,
        link_type: LinkType,
    ) -> Result<()> {
        #[cfg(unix)]
        {
            let _ = link_type;
            std::os::unix::fs::symlink(original, link)
                .with_context(|| format!("Failed to create symlink {:?} -> {:?}", link, original))?;
        }
        #[cfg(windows)]
        {
            match link_type {
                LinkType::Dir => {
                    std::os::windows::fs::symlink_dir(original, link).with_context(|| {
                        format!("Failed to create directory symlink {:?} -> {:?}", link, original)
                    })?;
                }
                LinkType::Junction => create_junction(original, link)?,
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_symlink_impl(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_symlink_impl(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            fs::remove_file(path).with_context(|| format!("Failed to remove symlink {:?}", path))?;
        }
        #[cfg(windows)]
        {
            // Directory symlinks and junctions are removed with remove_dir, file symlinks
            // with remove_file.
            fs::remove_dir(path)
                .or_else(|_| fs::remove_file(path))
                .with_context(|| format!("Failed to remove symlink {:?}", path))?;
        }
        Ok(())
    }
}

/// Junctions only store absolute targets, so a relative `original` is resolved against the
/// link's parent first.
#[cfg(windows)]
fn create_junction(original: &Path, link: &Path) -> Result<()> {
    let target = if original.is_absolute() {
        original.to_path_buf()
    } else {
        let parent = link
            .parent()
            .context("Failed to get parent directory for junction")?;
        super::path::normalize_path(&parent.join(original))
    };

    junction::create(&target, link)
        .with_context(|| format!("Failed to create junction {:?} -> {:?}", link, target))
}
