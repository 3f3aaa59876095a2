//! Glob expansion for workspace member patterns.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn glob_impl(&self, base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let full = base.join(pattern);
        let full = full
            .to_str()
            .with_context(|| format!("Glob pattern is not valid UTF-8: {:?}", full))?;

        let mut matches = Vec::new();
        for entry in ::glob::glob(full).with_context(|| format!("Invalid glob pattern {:?}", pattern))? {
            match entry {
                Ok(path) => matches.push(path),
                // Unreadable entries only drop that match
                Err(e) => debug!("Skipping unreadable glob match: {}", e),
            }
        }
        matches.sort();
        Ok(matches)
    }
}
