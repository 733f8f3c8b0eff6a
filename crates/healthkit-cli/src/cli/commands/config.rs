//! Config file commands

use std::path::Path;

use crate::cli::output::print_json;
use crate::cli::OutputFormat;
use crate::config::{default_config_path, AnalysisConfig};
use crate::error::{HealthError, Result};

/// Print the effective configuration
pub fn show(config: &AnalysisConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config),
        _ => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Write the default configuration, to `target` or the default location
pub fn init(target: Option<&Path>, force: bool) -> Result<()> {
    let path = match target {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if path.exists() && !force {
        return Err(HealthError::config(format!(
            "{} already exists. Use --force to overwrite",
            path.display()
        )));
    }

    AnalysisConfig::default().save(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Print the default config file location
pub fn path() -> Result<()> {
    println!("{}", default_config_path()?.display());
    Ok(())
}
