mod manifest;
pub mod workspace;

pub use manifest::{MANIFEST_FILE, PackageManifest};
pub use workspace::{WORKSPACE_FILE, WorkspaceEntry, WorkspaceIndex};
