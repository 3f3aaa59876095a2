//! Path utility functions for normalization and relative link targets.

use std::path::{Component, Path, PathBuf};

pub const NODE_MODULES: &str = "node_modules";

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // At the root (or an empty relative path) keep the `..`
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => {
                result.push(component);
            }
        }
    }
    result
}

/// Calculate the relative path from a symlink location to a target.
///
/// For example, a link at `/app/node_modules/@scope/pkg` pointing to
/// `/repo/packages/pkg` gives `../../../repo/packages/pkg`.
///
/// Returns `None` if a relative path cannot be computed (e.g., different drive letters on Windows).
pub fn relative_symlink_path(from_link: &Path, to_target: &Path) -> Option<PathBuf> {
    let from_dir = from_link.parent()?;
    let result = pathdiff::diff_paths(to_target, from_dir)?;

    // An absolute result means no relative path exists
    if result.is_absolute() {
        return None;
    }

    Some(result)
}

/// Count the path components that are exactly `node_modules`.
///
/// A package reached through a single `node_modules` is hoisted (or a workspace member when
/// the count is zero); two or more means it is private to another package.
pub fn node_modules_depth(path: &Path) -> usize {
    path.components()
        .filter(|c| matches!(c, Component::Normal(name) if *name == NODE_MODULES))
        .count()
}
