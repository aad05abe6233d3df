//! Command implementations.

use anyhow::{Context, Result, bail};
use tracing::info;

use rcat_cli::config::load_config;
use rcat_cli::pipeline::{RunSummary, run_pipeline};

use crate::cli::{CheckArgs, RunArgs};

pub fn run_run(args: &RunArgs) -> Result<RunSummary> {
    let config = load_config(&args.config)?;
    config.validate().context("invalid run configuration")?;
    run_pipeline(&config, args.dry_run)
}

pub fn run_check(args: &CheckArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    config.validate().context("invalid run configuration")?;

    if !config.import.file.exists() {
        bail!(
            "import file does not exist: {}",
            config.import.file.display()
        );
    }
    for external in &config.external_vocabularies {
        if !external.file.exists() {
            bail!(
                "external vocabulary file does not exist: {}",
                external.file.display()
            );
        }
    }

    info!(
        fields = config.import.structure.fields.len(),
        external_vocabularies = config.external_vocabularies.len(),
        vocabulary_exports = config.vocabulary_exports.len(),
        "run configuration is valid"
    );
    println!("Configuration OK: {}", args.config.display());
    Ok(())
}
