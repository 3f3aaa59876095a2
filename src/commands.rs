//! Lifecycle operations invoked by the host: link, clean and relink.

use anyhow::Result;
use log::info;

use crate::cleanup::{self, CleanSummary};
use crate::link::{LinkPass, LinkSummary};
use crate::package::{PackageManifest, WorkspaceIndex};
use crate::runtime::Runtime;
use crate::settings::Settings;

/// Link the dependencies of `<path>/package.json` into `<path>/node_modules`.
#[tracing::instrument(skip(runtime))]
pub async fn link<R: Runtime + ?Sized>(runtime: &R, settings: &Settings) -> Result<LinkSummary> {
    let manifest = PackageManifest::load(runtime, &settings.manifest_path())?;
    let workspace = WorkspaceIndex::discover(runtime, settings.root());
    if !workspace.is_empty() {
        info!("Found {} workspace packages", workspace.len());
    }

    info!("Creating dependency symlinks");
    let pass = LinkPass::new(
        runtime,
        &workspace,
        settings.node_modules(),
        settings.link_type,
    );
    let summary = pass
        .run(settings.root(), manifest.dependency_names())
        .await?;
    info!(
        "Linked {} packages ({} already present)",
        summary.created().len(),
        summary.already_present().len()
    );
    Ok(summary)
}

/// Remove the links created by [`link`].
#[tracing::instrument(skip(runtime))]
pub fn clean<R: Runtime + ?Sized>(runtime: &R, settings: &Settings) -> Result<CleanSummary> {
    info!("Cleaning dependency symlinks");
    let summary = cleanup::clean(runtime, &settings.node_modules())?;
    info!(
        "Removed {} links and {} directories",
        summary.removed_links, summary.removed_dirs
    );
    Ok(summary)
}

/// Clean, then link from scratch.
#[tracing::instrument(skip(runtime))]
pub async fn relink<R: Runtime + ?Sized>(
    runtime: &R,
    settings: &Settings,
) -> Result<(CleanSummary, LinkSummary)> {
    let cleaned = clean(runtime, settings)?;
    let linked = link(runtime, settings).await?;
    Ok((cleaned, linked))
}
