use anyhow::{Result, bail};
use lingo_infrastructure::SchemaValidator;
use std::path::Path;

use super::utils;

pub async fn run(file: &Path, version: Option<u32>) -> Result<()> {
    let (_, stored) = utils::load(file).await?;
    let version = version.or(stored.version).unwrap_or(0);

    match SchemaValidator::new()?.validate(&stored.document, version) {
        Ok(_) => {
            println!("✅ {} is valid at v{}", file.display(), version);
            Ok(())
        }
        Err(violations) => {
            println!("❌ {} is not valid at v{}:", file.display(), version);
            for violation in &violations {
                println!("  - {}", violation);
            }
            bail!("{} violation(s) found", violations.len())
        }
    }
}
