//! Run summary rendering.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::pipeline::RunSummary;

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn apply_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

pub fn print_summary(summary: &RunSummary) {
    if summary.dry_run {
        println!("Dry run: no files were written.");
    }
    println!(
        "Rows processed: {} (skipped: {}, fields dropped: {})",
        summary.rows_processed, summary.rows_skipped, summary.fields_dropped
    );

    let mut outputs = Table::new();
    apply_style(&mut outputs);
    outputs.set_header(vec![
        header_cell("Output"),
        header_cell("Path"),
        header_cell("Rows"),
    ]);
    for output in &summary.outputs {
        outputs.add_row(vec![
            Cell::new(&output.label),
            Cell::new(output.path.display()),
            Cell::new(output.rows).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{outputs}");

    if summary.vocabularies.is_empty() {
        println!("No vocabularies bound.");
        return;
    }
    let mut vocabularies = Table::new();
    apply_style(&mut vocabularies);
    vocabularies.set_header(vec![
        header_cell("Vocabulary"),
        header_cell("Terms"),
        header_cell("Bound fields"),
    ]);
    for vocabulary in &summary.vocabularies {
        vocabularies.add_row(vec![
            Cell::new(&vocabulary.name),
            Cell::new(vocabulary.terms).set_alignment(CellAlignment::Right),
            Cell::new(vocabulary.fields.join(", ")),
        ]);
    }
    println!("{vocabularies}");
}
