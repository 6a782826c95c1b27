//! `wearprobe config` command: show the values the harness would read.

use anyhow::{Context, Result};

use wearprobe_core::config_values::{ConfigValues, SECTION};

use crate::config::WearprobeConfig;

/// Run the config command.
pub fn run_config(config: &WearprobeConfig, json: bool) -> Result<()> {
    let read = ConfigValues::read_from(&config.source);

    if json {
        let out = serde_json::to_string_pretty(&read.values).context("failed to serialize config values")?;
        println!("{out}");
        return Ok(());
    }

    println!("Config file: {}", config.path.display());
    if !read.section_found {
        println!("  warning: no [{SECTION}] table; every value is absent");
    }
    for (key, value) in read.values.iter() {
        println!("  {key}: \"{value}\"");
    }
    Ok(())
}
