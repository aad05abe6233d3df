//! Run configuration: TOML description of one pipeline run.
//!
//! A run configuration names the main import file, its structure descriptor,
//! the external reference vocabularies to register before binding and the
//! auxiliary vocabulary exports derived from the same import.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use rcat_model::StructureDescriptor;
use rcat_transform::DEFAULT_MULTIVAL_SEPARATOR;

fn default_separator() -> String {
    DEFAULT_MULTIVAL_SEPARATOR.to_string()
}

/// Top-level run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub import: ImportConfig,

    /// External reference vocabularies, registered before binding.
    #[serde(default)]
    pub external_vocabularies: Vec<ExternalVocabularyConfig>,

    /// Accumulated vocabularies to re-shape and export after binding.
    #[serde(default)]
    pub vocabulary_exports: Vec<VocabularyExportConfig>,
}

/// The main dataset: where it comes from, how to read it, where it goes.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub file: PathBuf,

    #[serde(default)]
    pub has_header: bool,

    /// First row index to process; earlier rows are dropped.
    #[serde(default)]
    pub process_from_row: u64,

    #[serde(default = "default_separator")]
    pub multival_separator: String,

    pub structure: StructureDescriptor,

    pub export_file: PathBuf,

    /// Optional JSON snapshot of the bound records.
    #[serde(default)]
    pub json_export: Option<PathBuf>,
}

/// One external reference vocabulary: loaded and transformed like the main
/// dataset, optionally exported, then registered read-only with the store.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalVocabularyConfig {
    pub name: String,

    pub file: PathBuf,

    #[serde(default)]
    pub has_header: bool,

    #[serde(default)]
    pub process_from_row: u64,

    #[serde(default = "default_separator")]
    pub multival_separator: String,

    pub structure: StructureDescriptor,

    #[serde(default)]
    pub export_file: Option<PathBuf>,
}

/// One auxiliary vocabulary export: the accumulated vocabulary's rows are
/// re-transformed through its own structure to shape them for export.
#[derive(Debug, Clone, Deserialize)]
pub struct VocabularyExportConfig {
    pub vocabulary: String,

    #[serde(default = "default_separator")]
    pub multival_separator: String,

    pub structure: StructureDescriptor,

    pub export_file: PathBuf,
}

/// Load and parse a run configuration file.
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read run configuration: {}", path.display()))?;
    let config: RunConfig = toml::from_str(&content)
        .with_context(|| format!("parse run configuration: {}", path.display()))?;
    Ok(config)
}

impl RunConfig {
    /// Validate everything that can be checked without touching data files:
    /// structure invariants, external vocabulary references and vocabulary
    /// export references.
    pub fn validate(&self) -> Result<()> {
        self.import.structure.validate()?;

        let mut external_names = BTreeSet::new();
        for external in &self.external_vocabularies {
            external.structure.validate()?;
            if !external_names.insert(external.name.as_str()) {
                bail!("external vocabulary {:?} declared twice", external.name);
            }
        }

        let mut bound_vocabularies = BTreeSet::new();
        for field in &self.import.structure.fields {
            if let Some(vocabulary) = &field.vocabulary {
                bound_vocabularies.insert(vocabulary.as_str());
            }
            if let Some(external) = &field.external_vocabulary
                && !external_names.contains(external.as_str())
            {
                bail!(
                    "field {:?} references external vocabulary {:?} which is not declared",
                    field.name,
                    external
                );
            }
        }

        for export in &self.vocabulary_exports {
            export.structure.validate()?;
            if !bound_vocabularies.contains(export.vocabulary.as_str()) {
                bail!(
                    "vocabulary export {:?} does not match any vocabulary field",
                    export.vocabulary
                );
            }
        }

        Ok(())
    }
}
