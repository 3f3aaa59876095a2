use std::path::{Path, PathBuf};

use crate::runtime::path::NODE_MODULES;

/// The `node_modules` directories searched when resolving from `from_dir`,
/// closest ancestor first, ending at the filesystem root.
pub fn node_module_paths(from_dir: &Path) -> Vec<PathBuf> {
    from_dir
        .ancestors()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(NODE_MODULES))
        .collect()
}
