use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::runtime::Runtime;

pub const MANIFEST_FILE: &str = "package.json";

/// The parts of a `package.json` the linker cares about.
///
/// Version ranges are kept for completeness but never interpreted; only the dependency
/// names drive linking.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dependencies: Option<BTreeMap<String, String>>,
}

impl PackageManifest {
    /// Parse and validate manifest JSON. A leading UTF-8 byte order mark is ignored.
    pub fn parse(content: &str) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let manifest: PackageManifest =
            serde_json::from_str(content).context("Invalid package manifest")?;
        if manifest.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            bail!("Invalid package manifest: \"name\" is empty");
        }
        Ok(manifest)
    }

    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime + ?Sized>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        Self::parse(&content).with_context(|| format!("Failed to load manifest {:?}", path))
    }

    /// Direct dependency names in a stable order.
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies
            .as_ref()
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    #[test]
    fn test_parse_full_manifest() {
        let manifest = PackageManifest::parse(
            r#"{
                "name": "service",
                "version": "1.0.0",
                "dependencies": { "b": "^2.0.0", "a": "*", "@scope/c": "workspace:*" },
                "devDependencies": { "jest": "*" }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.name.as_deref(), Some("service"));
        assert_eq!(manifest.dependency_names(), vec!["@scope/c", "a", "b"]);
    }

    #[test]
    fn test_parse_without_dependencies() {
        let manifest = PackageManifest::parse(r#"{ "name": "leaf" }"#).unwrap();
        assert!(manifest.dependency_names().is_empty());

        let manifest = PackageManifest::parse(r#"{ "dependencies": null }"#).unwrap();
        assert_eq!(manifest.name, None);
        assert!(manifest.dependency_names().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(PackageManifest::parse("not json").is_err());
        assert!(PackageManifest::parse(r#"["a"]"#).is_err());
        assert!(PackageManifest::parse(r#"{ "name": 42 }"#).is_err());
        assert!(PackageManifest::parse(r#"{ "name": "" }"#).is_err());
        assert!(PackageManifest::parse(r#"{ "dependencies": ["a"] }"#).is_err());
        assert!(PackageManifest::parse(r#"{ "dependencies": { "a": 1 } }"#).is_err());
    }

    #[test]
    fn test_parse_strips_byte_order_mark() {
        let manifest =
            PackageManifest::parse("\u{feff}{ \"name\": \"a\", \"dependencies\": { \"b\": \"1\" } }")
                .unwrap();
        assert_eq!(manifest.name.as_deref(), Some("a"));
        assert_eq!(manifest.dependency_names(), vec!["b"]);

        // Only a leading mark is skipped
        assert!(PackageManifest::parse("{ \"name\": \"a\" }\u{feff}").is_err());
    }

    #[test]
    fn test_load_reports_path() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/repo/package.json");

        // Read /repo/package.json -> invalid JSON
        runtime
            .expect_read_to_string()
            .with(eq(path.clone()))
            .returning(|_| Ok("{".to_string()));

        let err = PackageManifest::load(&runtime, &path).unwrap_err();
        assert!(format!("{:#}", err).contains("/repo/package.json"));
    }
}
