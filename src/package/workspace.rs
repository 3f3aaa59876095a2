//! Workspace package index.
//!
//! Members of a pnpm-style monorepo are found by searching upward for
//! `pnpm-workspace.yaml`, expanding its member globs and loading each member's manifest.
//! Discovery is best-effort: anything unreadable or malformed skips that single entry.

use log::{debug, warn};
use std::path::{Path, PathBuf};

use super::manifest::{MANIFEST_FILE, PackageManifest};
use crate::runtime::Runtime;

pub const WORKSPACE_FILE: &str = "pnpm-workspace.yaml";

/// A workspace member: its manifest path and parsed manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceEntry {
    pub path: PathBuf,
    pub manifest: PackageManifest,
}

impl WorkspaceEntry {
    pub fn name(&self) -> Option<&str> {
        self.manifest.name.as_deref()
    }
}

/// Snapshot of the workspace members, built once per pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceIndex {
    entries: Vec<WorkspaceEntry>,
}

impl WorkspaceIndex {
    pub fn new(entries: Vec<WorkspaceEntry>) -> Self {
        Self { entries }
    }

    /// Locate the workspace config above `start_dir` and load every member.
    /// Returns an empty index when there is no workspace.
    #[tracing::instrument(skip(runtime))]
    pub fn discover<R: Runtime + ?Sized>(runtime: &R, start_dir: &Path) -> Self {
        match locate(runtime, start_dir) {
            Some(config) => {
                debug!("Using workspace config {:?}", config);
                Self::new(load_all(runtime, &config))
            }
            None => {
                debug!("No {} found above {:?}", WORKSPACE_FILE, start_dir);
                Self::default()
            }
        }
    }

    /// Manifest path of the first member named `name`.
    pub fn find(&self, name: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|e| e.name() == Some(name))
            .map(|e| e.path.as_path())
    }

    pub fn entries(&self) -> &[WorkspaceEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Walk upward from `start_dir` until a workspace config is found or the root is reached.
pub fn locate<R: Runtime + ?Sized>(runtime: &R, start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;
    loop {
        let candidate = current.join(WORKSPACE_FILE);
        if runtime.exists(&candidate) {
            return Some(candidate);
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => return None,
        }
    }
}

/// Extract member globs from workspace config text.
///
/// Only list items of the form `- 'glob'` are recognised; every other line is ignored.
pub fn parse_members(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let rest = line.trim_start().strip_prefix('-')?;
            let rest = rest.trim_start().strip_prefix('\'')?;
            let end = rest.find('\'')?;
            (end > 0).then(|| rest[..end].to_string())
        })
        .collect()
}

/// Load every member matched by the config's globs, in config order.
#[tracing::instrument(skip(runtime))]
pub fn load_all<R: Runtime + ?Sized>(runtime: &R, config_path: &Path) -> Vec<WorkspaceEntry> {
    let content = match runtime.read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Ignoring unreadable workspace config {:?}: {:#}", config_path, e);
            return Vec::new();
        }
    };
    let Some(root) = config_path.parent() else {
        return Vec::new();
    };

    let (excludes, includes): (Vec<String>, Vec<String>) = parse_members(&content)
        .into_iter()
        .partition(|p| p.starts_with('!'));
    let excludes: Vec<glob::Pattern> = excludes
        .iter()
        .filter_map(|p| {
            let pattern = root.join(&p[1..]);
            match glob::Pattern::new(&pattern.to_string_lossy()) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    debug!("Skipping invalid exclusion {:?}: {}", p, e);
                    None
                }
            }
        })
        .collect();

    let mut entries = Vec::new();
    for pattern in includes {
        let dirs = match runtime.glob(root, &pattern) {
            Ok(dirs) => dirs,
            Err(e) => {
                debug!("Skipping workspace pattern {:?}: {:#}", pattern, e);
                continue;
            }
        };

        for dir in dirs {
            if excludes.iter().any(|ex| ex.matches_path(&dir)) {
                debug!("Excluded workspace member {:?}", dir);
                continue;
            }
            let manifest_path = dir.join(MANIFEST_FILE);
            if !runtime.exists(&manifest_path) {
                continue;
            }
            let manifest = match PackageManifest::load(runtime, &manifest_path) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!("Skipping workspace member {:?}: {:#}", dir, e);
                    continue;
                }
            };
            let Some(name) = manifest.name.as_deref() else {
                debug!("Skipping unnamed workspace member {:?}", dir);
                continue;
            };
            if entries.iter().any(|e: &WorkspaceEntry| e.name() == Some(name)) {
                debug!("Duplicate workspace member {:?} at {:?}, keeping first", name, dir);
                continue;
            }
            entries.push(WorkspaceEntry {
                path: manifest_path,
                manifest,
            });
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use std::fs;
    use tempfile::tempdir;

    fn write_manifest(dir: &Path, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), content).unwrap();
    }

    #[test]
    fn test_parse_members() {
        let content = "packages:\n  - 'packages/*'\n  - 'apps/**'\n-'tools/x'\n";
        assert_eq!(
            parse_members(content),
            vec!["packages/*", "apps/**", "tools/x"]
        );
    }

    #[test]
    fn test_parse_members_ignores_other_shapes() {
        let content = r#"packages:
  - "double/*"
  - bare/*
  # - 'commented'
  - ''
  - 'ok/*' # trailing comment
catalog:
  react: ^18
"#;
        assert_eq!(parse_members(content), vec!["ok/*"]);
    }

    #[test]
    fn test_locate_walks_upward() {
        let mut runtime = MockRuntime::new();

        // Only /repo/pnpm-workspace.yaml exists
        runtime
            .expect_exists()
            .returning(|p| p == Path::new("/repo").join(WORKSPACE_FILE));

        let found = locate(&runtime, Path::new("/repo/services/api"));
        assert_eq!(found, Some(PathBuf::from("/repo").join(WORKSPACE_FILE)));
    }

    #[test]
    fn test_locate_stops_at_root() {
        let mut runtime = MockRuntime::new();

        // Nothing exists anywhere; every ancestor is checked exactly once
        runtime.expect_exists().times(4).returning(|_| false);

        assert_eq!(locate(&runtime, Path::new("/repo/services/api")), None);
    }

    #[test]
    fn test_load_all_unreadable_config() {
        let mut runtime = MockRuntime::new();
        let config = PathBuf::from("/repo").join(WORKSPACE_FILE);

        runtime
            .expect_read_to_string()
            .with(eq(config.clone()))
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        assert!(load_all(&runtime, &config).is_empty());
    }

    #[test]
    fn test_load_all_skips_bad_entries() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join(WORKSPACE_FILE),
            "packages:\n  - 'packages/*'\n  - 'broken/['\n",
        )
        .unwrap();

        write_manifest(&root.join("packages/a"), r#"{"name":"a"}"#);
        write_manifest(&root.join("packages/b"), "{ not json");
        write_manifest(&root.join("packages/c"), r#"{"private":true}"#);
        fs::create_dir_all(root.join("packages/no-manifest")).unwrap();

        let entries = load_all(&RealRuntime, &root.join(WORKSPACE_FILE));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name(), Some("a"));
        assert_eq!(entries[0].path, root.join("packages/a").join(MANIFEST_FILE));
    }

    #[test]
    fn test_load_all_exclusions_and_duplicates() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join(WORKSPACE_FILE),
            "packages:\n  - 'packages/*'\n  - 'legacy/*'\n  - '!packages/skip'\n",
        )
        .unwrap();

        write_manifest(&root.join("packages/shared"), r#"{"name":"shared"}"#);
        write_manifest(&root.join("packages/skip"), r#"{"name":"skip"}"#);
        write_manifest(&root.join("legacy/shared"), r#"{"name":"shared"}"#);

        let index = WorkspaceIndex::new(load_all(&RealRuntime, &root.join(WORKSPACE_FILE)));
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.find("shared"),
            Some(root.join("packages/shared").join(MANIFEST_FILE).as_path())
        );
        assert_eq!(index.find("skip"), None);
    }

    #[test]
    fn test_discover_from_nested_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(WORKSPACE_FILE), "packages:\n  - 'packages/*'\n").unwrap();
        write_manifest(&root.join("packages/lib"), r#"{"name":"@acme/lib"}"#);
        let service = root.join("services/api");
        fs::create_dir_all(&service).unwrap();

        let index = WorkspaceIndex::discover(&RealRuntime, &service);
        assert!(!index.is_empty());
        assert!(index.find("@acme/lib").is_some());
        assert_eq!(index.find("lib"), None);
    }

    #[test]
    fn test_discover_without_workspace() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);

        let index = WorkspaceIndex::discover(&runtime, Path::new("/app"));
        assert!(index.is_empty());
        assert!(index.entries().is_empty());
    }
}
