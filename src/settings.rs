use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::package::MANIFEST_FILE;
use crate::runtime::path::NODE_MODULES;
use crate::runtime::{LinkType, Runtime};

/// Host-supplied configuration for a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Root directory of the package being deployed.
    pub path: PathBuf,
    pub link_type: LinkType,
}

impl Settings {
    /// Build settings, defaulting `path` to the current directory and resolving it to a
    /// real absolute path so relative link targets line up with the filesystem.
    pub fn new<R: Runtime + ?Sized>(
        runtime: &R,
        path: Option<PathBuf>,
        link_type: Option<LinkType>,
    ) -> Result<Self> {
        let cwd = runtime.current_dir()?;
        let path = match path {
            Some(p) if p.is_absolute() => p,
            Some(p) => cwd.join(p),
            None => cwd,
        };
        let path = runtime
            .canonicalize(&path)
            .with_context(|| format!("Package directory {:?} is not accessible", path))?;
        let link_type = link_type.unwrap_or_default();
        debug!("Using path {:?} with {} links", path, link_type);

        Ok(Self { path, link_type })
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(MANIFEST_FILE)
    }

    pub fn node_modules(&self) -> PathBuf {
        self.path.join(NODE_MODULES)
    }

    pub fn root(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;

    fn runtime_in(cwd: &'static str) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(move || Ok(PathBuf::from(cwd)));
        runtime
            .expect_canonicalize()
            .returning(|p| Ok(p.to_path_buf()));
        runtime
    }

    #[test]
    fn test_settings_defaults() {
        let runtime = runtime_in("/work/service");

        let settings = Settings::new(&runtime, None, None).unwrap();
        assert_eq!(settings.path, PathBuf::from("/work/service"));
        assert_eq!(settings.link_type, LinkType::Junction);
        assert_eq!(
            settings.manifest_path(),
            PathBuf::from("/work/service/package.json")
        );
        assert_eq!(
            settings.node_modules(),
            PathBuf::from("/work/service/node_modules")
        );
    }

    #[test]
    fn test_settings_relative_path() {
        let runtime = runtime_in("/work");

        let settings =
            Settings::new(&runtime, Some(PathBuf::from("service")), Some(LinkType::Dir)).unwrap();
        assert_eq!(settings.root(), Path::new("/work/service"));
        assert_eq!(settings.link_type, LinkType::Dir);
    }

    #[cfg(unix)]
    #[test]
    fn test_settings_absolute_path() {
        let runtime = runtime_in("/work");

        let settings = Settings::new(&runtime, Some(PathBuf::from("/other")), None).unwrap();
        assert_eq!(settings.path, PathBuf::from("/other"));
    }

    #[test]
    fn test_settings_missing_path() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Ok(PathBuf::from("/work")));
        runtime
            .expect_canonicalize()
            .returning(|_| Err(anyhow::anyhow!("No such file or directory")));

        let err = Settings::new(&runtime, Some(PathBuf::from("gone")), None).unwrap_err();
        assert!(err.to_string().contains("is not accessible"));
    }
}
