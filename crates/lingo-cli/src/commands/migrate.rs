use anyhow::{Context, Result};
use lingo_core::config::ConfigStore;
use std::path::PathBuf;

use super::utils;
use crate::OutputFormat;

pub async fn run(file: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let path = utils::resolve_path(file)?;
    let (store, stored) = utils::load(&path).await?;
    let runner = utils::runner()?;
    tracing::debug!("Loaded {} (stored version {:?})", path.display(), stored.version);

    let from = stored.version.unwrap_or_else(|| runner.registry().base_version());
    let report = runner
        .run(&stored.document, stored.version)
        .with_context(|| format!("Failed to migrate {}", path.display()))?;

    if !report.migrated() {
        println!("✅ {} is already at v{}", path.display(), report.version);
        return Ok(());
    }

    println!("📝 Migrating {} from v{} to v{}", path.display(), from, report.version);
    for step in &report.applied {
        println!("  ✓ v{} -> v{}: {}", step.from_version, step.to_version, step.description);
    }

    if dry_run {
        println!("\n{}", utils::render(&report.document, OutputFormat::Json)?);
        println!("\n💡 Dry run: nothing was written");
        return Ok(());
    }

    store
        .set(&report.document)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("✅ Saved {}", path.display());

    Ok(())
}
