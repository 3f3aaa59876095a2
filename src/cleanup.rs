use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::runtime::Runtime;

/// Prefix of scope directories (`@scope/name`), the only place links sit below the top level.
pub const SCOPE_MARKER: char = '@';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub removed_links: usize,
    pub removed_dirs: usize,
}

/// Remove every link in a `node_modules` tree and the directories left empty by that.
///
/// Only symlinks are deleted; real files and directories are kept, and a directory is
/// removed only once it is found empty. A missing directory is a no-op.
#[tracing::instrument(skip(runtime))]
pub fn clean<R: Runtime + ?Sized>(runtime: &R, node_modules: &Path) -> Result<CleanSummary> {
    let mut summary = CleanSummary::default();
    clean_dir(runtime, node_modules, &mut summary)?;
    Ok(summary)
}

fn clean_dir<R: Runtime + ?Sized>(
    runtime: &R,
    dir: &Path,
    summary: &mut CleanSummary,
) -> Result<()> {
    if !runtime.exists(dir) {
        return Ok(());
    }

    for entry in runtime.read_dir(dir)? {
        if runtime.is_symlink(&entry) {
            debug!("Removing link {:?}", entry);
            runtime.remove_symlink(&entry)?;
            summary.removed_links += 1;
        } else if is_scope_dir(runtime, &entry) {
            clean_dir(runtime, &entry, summary)?;
        }
    }

    if runtime.read_dir(dir)?.is_empty() {
        debug!("Removing empty directory {:?}", dir);
        runtime.remove_dir(dir)?;
        summary.removed_dirs += 1;
    }
    Ok(())
}

fn is_scope_dir<R: Runtime + ?Sized>(runtime: &R, path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(SCOPE_MARKER))
        && runtime.is_dir(path)
}
