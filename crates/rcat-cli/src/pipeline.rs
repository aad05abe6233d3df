//! Pipeline orchestration: load, transform, bind, export.
//!
//! Stage order matters: external reference vocabularies are registered with
//! the store before binding runs, because collection resolves terms against
//! them inline. All file writes happen after every fatal stage has
//! succeeded, so a failed run leaves no partial output.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use rcat_ingest::read_raw_table;
use rcat_model::Records;
use rcat_output::{write_csv, write_json};
use rcat_transform::transform;
use rcat_vocab::{VocabularyStore, bind};

use crate::config::RunConfig;

/// One written (or planned, under dry-run) output table.
#[derive(Debug, Clone)]
pub struct OutputSummary {
    pub label: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Bound vocabulary sizes for the summary.
#[derive(Debug, Clone)]
pub struct VocabularySummary {
    pub name: String,
    pub terms: usize,
    pub fields: Vec<String>,
}

/// What one pipeline run did.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub rows_processed: usize,
    pub rows_skipped: usize,
    pub fields_dropped: usize,
    pub outputs: Vec<OutputSummary>,
    pub vocabularies: Vec<VocabularySummary>,
    pub dry_run: bool,
}

/// A table waiting to be written once all fatal stages have passed.
struct PendingExport {
    label: String,
    path: PathBuf,
    columns: Vec<String>,
    records: Records,
}

/// Run one full pipeline for the given configuration.
pub fn run_pipeline(config: &RunConfig, dry_run: bool) -> Result<RunSummary> {
    let mut summary = RunSummary {
        dry_run,
        ..RunSummary::default()
    };
    let mut pending: Vec<PendingExport> = Vec::new();

    info!(file = %config.import.file.display(), "loading main import file");
    let table = read_raw_table(&config.import.file, config.import.has_header)
        .context("load main import file")?;

    info!("transforming main import data");
    let outcome = transform(
        &table,
        config.import.process_from_row,
        &config.import.structure,
        &config.import.multival_separator,
    )
    .context("transform main import data")?;
    summary.rows_processed = outcome.rows_processed;
    summary.rows_skipped = outcome.rows_skipped;
    summary.fields_dropped = outcome.fields_dropped;
    let mut records = outcome.records;

    let mut store = VocabularyStore::new();
    for external in &config.external_vocabularies {
        info!(
            name = %external.name,
            file = %external.file.display(),
            "loading external vocabulary"
        );
        let external_table = read_raw_table(&external.file, external.has_header)
            .with_context(|| format!("load external vocabulary {:?}", external.name))?;
        let external_outcome = transform(
            &external_table,
            external.process_from_row,
            &external.structure,
            &external.multival_separator,
        )
        .with_context(|| format!("transform external vocabulary {:?}", external.name))?;

        if let Some(path) = &external.export_file {
            pending.push(PendingExport {
                label: format!("external vocabulary {}", external.name),
                path: path.clone(),
                columns: external.structure.field_names(),
                records: external_outcome.records.clone(),
            });
        }
        store.set_external_vocabulary(&external.name, external_outcome.records);
    }

    info!("binding vocabularies");
    let report = bind(&mut records, &config.import.structure, &mut store)
        .context("bind vocabularies")?;
    for (name, fields) in &report.bound_fields {
        summary.vocabularies.push(VocabularySummary {
            name: name.clone(),
            terms: report.term_counts.get(name).copied().unwrap_or(0),
            fields: fields.iter().cloned().collect(),
        });
    }

    for export in &config.vocabulary_exports {
        info!(vocabulary = %export.vocabulary, "shaping vocabulary for export");
        let rows = store
            .vocabulary_rows(&export.vocabulary)
            .with_context(|| format!("export vocabulary {:?}", export.vocabulary))?;
        let vocabulary_outcome = transform(&rows, 0, &export.structure, &export.multival_separator)
            .with_context(|| format!("shape vocabulary {:?}", export.vocabulary))?;
        pending.push(PendingExport {
            label: format!("vocabulary {}", export.vocabulary),
            path: export.export_file.clone(),
            columns: export.structure.field_names(),
            records: vocabulary_outcome.records,
        });
    }

    pending.push(PendingExport {
        label: "main dataset".to_string(),
        path: config.import.export_file.clone(),
        columns: config.import.structure.field_names(),
        records,
    });

    for export in pending {
        summary.outputs.push(OutputSummary {
            label: export.label.clone(),
            path: export.path.clone(),
            rows: export.records.len(),
        });
        if dry_run {
            info!(output = %export.path.display(), "dry run, skipping write");
            continue;
        }
        info!(output = %export.path.display(), rows = export.records.len(), "writing export");
        write_csv(&export.path, &export.columns, &export.records)
            .with_context(|| format!("write {}", export.label))?;
        if export.label == "main dataset"
            && let Some(json_path) = &config.import.json_export
        {
            info!(output = %json_path.display(), "writing json snapshot");
            write_json(json_path, &export.records).context("write json snapshot")?;
        }
    }

    Ok(summary)
}
