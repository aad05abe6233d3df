use std::collections::BTreeMap;

use rcat_model::{
    ColumnRef, FieldSpec, FieldType, FieldValue, ImportError, RawTable, StructureDescriptor,
};
use rcat_transform::{DEFAULT_MULTIVAL_SEPARATOR, transform};

fn table(rows: Vec<Vec<&str>>) -> RawTable {
    let rows: BTreeMap<u64, Vec<String>> = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            (
                index as u64,
                row.into_iter().map(str::to_string).collect(),
            )
        })
        .collect();
    RawTable::new(Vec::new(), rows)
}

fn field(name: &str, field_type: FieldType, column: usize) -> FieldSpec {
    FieldSpec::new(name, field_type).with_column(ColumnRef::Index(column))
}

fn basic_structure() -> StructureDescriptor {
    StructureDescriptor::new(vec![
        FieldSpec::new("id", FieldType::Identifier),
        field("title", FieldType::Text, 0),
        field("url", FieldType::Url, 1),
    ])
}

#[test]
fn multivalue_url_cell_is_split_and_trimmed() {
    let table = table(vec![vec!["X", "http://a.org ; http://b.org"]]);
    let outcome = transform(&table, 0, &basic_structure(), DEFAULT_MULTIVAL_SEPARATOR)
        .expect("transform");

    let record = &outcome.records[&0];
    assert_eq!(
        record.get("url"),
        Some(&FieldValue::Text(vec![
            "http://a.org".to_string(),
            "http://b.org".to_string()
        ]))
    );
    assert_eq!(record.get("title"), Some(&FieldValue::text("X")));
    assert_eq!(record.get("id"), Some(&FieldValue::id(0)));
}

#[test]
fn invalid_url_drops_the_field_but_keeps_the_row() {
    let table = table(vec![vec!["X", "not a url"]]);
    let outcome = transform(&table, 0, &basic_structure(), DEFAULT_MULTIVAL_SEPARATOR)
        .expect("transform");

    let record = &outcome.records[&0];
    assert!(record.get("url").is_none());
    assert_eq!(record.get("title"), Some(&FieldValue::text("X")));
    assert_eq!(outcome.fields_dropped, 1);
    assert_eq!(outcome.rows_processed, 1);
}

#[test]
fn one_invalid_element_invalidates_the_whole_sequence() {
    let table = table(vec![vec!["X", "http://a.org ; nope"]]);
    let outcome = transform(&table, 0, &basic_structure(), DEFAULT_MULTIVAL_SEPARATOR)
        .expect("transform");
    assert!(outcome.records[&0].get("url").is_none());
}

#[test]
fn empty_necessary_field_fails_the_transform() {
    let mut title = field("title", FieldType::Text, 0);
    title.necessary = true;
    let structure = StructureDescriptor::new(vec![title]);

    let table = table(vec![vec!["present"], vec![""]]);
    let error =
        transform(&table, 0, &structure, DEFAULT_MULTIVAL_SEPARATOR).unwrap_err();
    match error {
        ImportError::Validation { row, fields } => {
            assert_eq!(row, 1);
            assert_eq!(fields, "title");
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn skip_empty_silently_drops_the_row() {
    let mut title = field("title", FieldType::Text, 0);
    title.skip_empty = true;
    let structure = StructureDescriptor::new(vec![title, field("notes", FieldType::Text, 1)]);

    let table = table(vec![vec!["a", "x"], vec!["", "y"], vec!["b", "z"]]);
    let outcome =
        transform(&table, 0, &structure, DEFAULT_MULTIVAL_SEPARATOR).expect("transform");

    assert_eq!(outcome.rows_processed, 2);
    assert_eq!(outcome.rows_skipped, 1);
    assert!(!outcome.records.contains_key(&1));
}

#[test]
fn skip_empty_wins_over_an_earlier_necessary_violation() {
    // Row 0: the necessary field is empty, but a later skip_empty field is
    // empty too, so the row is dropped instead of failing the run.
    let mut title = field("title", FieldType::Text, 0);
    title.necessary = true;
    let mut category = field("category", FieldType::Text, 1);
    category.skip_empty = true;
    let structure = StructureDescriptor::new(vec![title, category]);

    let table = table(vec![vec!["", ""], vec!["ok", "set"]]);
    let outcome =
        transform(&table, 0, &structure, DEFAULT_MULTIVAL_SEPARATOR).expect("transform");
    assert_eq!(outcome.rows_skipped, 1);
    assert_eq!(outcome.rows_processed, 1);
}

#[test]
fn rows_before_process_from_row_are_ignored() {
    let structure = StructureDescriptor::new(vec![field("title", FieldType::Text, 0)]);
    let table = table(vec![vec!["header junk"], vec!["real data"]]);
    let outcome =
        transform(&table, 1, &structure, DEFAULT_MULTIVAL_SEPARATOR).expect("transform");
    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.records.contains_key(&1));
}

#[test]
fn named_column_resolves_through_the_header() {
    let structure = StructureDescriptor::new(vec![
        FieldSpec::new("title", FieldType::Text).with_column(ColumnRef::Name("Title".to_string())),
    ]);
    let mut rows = BTreeMap::new();
    rows.insert(1, vec!["Pandoc".to_string()]);
    let table = RawTable::new(vec!["Title".to_string()], rows);

    let outcome =
        transform(&table, 0, &structure, DEFAULT_MULTIVAL_SEPARATOR).expect("transform");
    assert_eq!(
        outcome.records[&1].get("title"),
        Some(&FieldValue::text("Pandoc"))
    );
}

#[test]
fn unknown_header_name_is_a_configuration_error() {
    let structure = StructureDescriptor::new(vec![
        FieldSpec::new("title", FieldType::Text).with_column(ColumnRef::Name("Nope".to_string())),
    ]);
    let table = RawTable::new(vec!["Title".to_string()], BTreeMap::new());
    let error = transform(&table, 0, &structure, DEFAULT_MULTIVAL_SEPARATOR).unwrap_err();
    assert!(matches!(error, ImportError::Configuration { .. }));
}

#[test]
fn ignore_import_reads_nothing_but_identifier_keeps_row_index() {
    let mut id = FieldSpec::new("id", FieldType::Identifier);
    id.ignore_import = true;
    let mut legacy = field("legacy", FieldType::Text, 5);
    legacy.ignore_import = true;
    let structure = StructureDescriptor::new(vec![id, legacy, field("title", FieldType::Text, 0)]);

    let table = table(vec![vec!["X"]]);
    let outcome =
        transform(&table, 0, &structure, DEFAULT_MULTIVAL_SEPARATOR).expect("transform");
    let record = &outcome.records[&0];
    assert_eq!(record.get("id"), Some(&FieldValue::id(0)));
    assert!(record.get("legacy").is_none());
}

#[test]
fn transform_is_deterministic() {
    let table = table(vec![
        vec!["A", "http://a.org"],
        vec!["B", "http://b.org ; http://c.org"],
    ]);
    let structure = basic_structure();
    let first = transform(&table, 0, &structure, DEFAULT_MULTIVAL_SEPARATOR).expect("first");
    let second = transform(&table, 0, &structure, DEFAULT_MULTIVAL_SEPARATOR).expect("second");
    assert_eq!(first.records, second.records);
}

#[test]
fn cell_without_separator_is_a_single_element_sequence() {
    let structure = StructureDescriptor::new(vec![field("title", FieldType::Text, 0)]);
    let table = table(vec![vec!["semi;but;not;separated"]]);
    let outcome =
        transform(&table, 0, &structure, DEFAULT_MULTIVAL_SEPARATOR).expect("transform");
    assert_eq!(
        outcome.records[&0].get("title"),
        Some(&FieldValue::text("semi;but;not;separated"))
    );
}
