//! `validate` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ValidateArgs;
use crate::config::StreamSettings;

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating settings");

    let settings = StreamSettings::load_from_path(&args.config)
        .with_context(|| format!("Failed to load settings from {}", args.config.display()))?;

    println!("Settings OK: {}", args.config.display());
    println!("  host:                  {}", settings.host);
    println!("  segment data:          {}", settings.stream.segment_data);
    println!("  marker data:           {}", settings.stream.marker_data);
    println!(
        "  unlabeled marker data: {}",
        settings.stream.unlabeled_marker_data
    );
    println!("  device data:           {}", settings.stream.device_data);
    println!("  stream mode:           {}", settings.stream.stream_mode);

    Ok(())
}
