use anyhow::Result;

use super::utils;

pub fn list() -> Result<()> {
    let runner = utils::runner()?;
    let registry = runner.registry();

    println!("📋 Settings versions v{}..=v{}", registry.base_version(), registry.latest_version());
    for step in registry.steps() {
        println!("  v{:<2} -> v{:<2} {}", step.from_version(), step.to_version(), step.description());
    }
    Ok(())
}
