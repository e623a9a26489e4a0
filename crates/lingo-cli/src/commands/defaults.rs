use anyhow::Result;
use lingo_core::config::Config;
use lingo_infrastructure::migration::to_document;

use super::utils;
use crate::OutputFormat;

pub fn print(format: OutputFormat) -> Result<()> {
    let document = to_document(&Config::default())?;
    println!("{}", utils::render(&document, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_render_in_both_formats() {
        let document = to_document(&Config::default()).unwrap();
        let json = utils::render(&document, OutputFormat::Json).unwrap();
        assert!(json.contains("\"version\": 12"));

        let toml = utils::render(&document, OutputFormat::Toml).unwrap();
        assert!(toml.contains("version = 12"));
        assert!(toml.contains("[translate.requestQueueConfig]"));
    }
}
