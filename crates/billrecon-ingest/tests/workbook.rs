//! Tests for loading spreadsheet datasets.

use std::path::Path;

use billrecon_ingest::{IngestError, SheetSelector, find_latest_dataset, read_reference_table};
use rust_xlsxwriter::{Format, Workbook};
use tempfile::TempDir;

fn write_registry(path: &Path) {
    let mut workbook = Workbook::new();

    let notes = workbook.add_worksheet();
    notes.set_name("Notes").expect("name sheet");
    notes.write_string(0, 0, "Exported registry").expect("write");

    let owners = workbook.add_worksheet();
    owners.set_name("Owners").expect("name sheet");
    owners.write_string(0, 0, "IMO No").expect("write");
    owners.write_string(0, 1, "Vessel Name").expect("write");
    owners
        .write_string(0, 2, "Technincal Manager - Care of")
        .expect("write");
    owners.write_number(1, 0, 8423154.0).expect("write");
    owners.write_string(1, 1, "LSC Boat V").expect("write");
    owners
        .write_string(1, 2, "Lloyd's Shipping Co.")
        .expect("write");
    owners.write_number(2, 0, 9000001.0).expect("write");
    owners.write_string(2, 1, "Northern Star").expect("write");

    workbook.save(path).expect("save workbook");
}

#[test]
fn reads_named_sheet_as_text() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("LloydsCurrentOwnership 28-Apr-2025.xlsx");
    write_registry(&path);

    let table = read_reference_table(&path, &SheetSelector::Name("Owners".to_string()))
        .expect("read workbook");

    assert_eq!(
        table.headers(),
        vec!["IMO No", "Vessel Name", "Technincal Manager - Care of"]
    );
    let rows = table.rows().expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "8423154");
    assert_eq!(rows[0][2], "Lloyd's Shipping Co.");
    // Missing cells come back as empty strings.
    assert_eq!(rows[1][2], "");
}

#[test]
fn reads_sheet_by_index() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("registry.xlsx");
    write_registry(&path);

    let table = read_reference_table(&path, &SheetSelector::Index(1)).expect("read workbook");
    assert_eq!(table.height(), 2);
}

#[test]
fn unknown_sheet_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("registry.xlsx");
    write_registry(&path);

    let result = read_reference_table(&path, &SheetSelector::Name("Missing".to_string()));
    assert!(matches!(result, Err(IngestError::SheetNotFound { .. })));
}

#[test]
fn discovers_and_loads_latest_workbook() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("LloydsCurrentOwnership 28-Apr-2025.xlsx");
    write_registry(&path);

    let found = find_latest_dataset(dir.path(), "LloydsCurrentOwnership").expect("discover");
    assert_eq!(found, path);

    let table = read_reference_table(&found, &SheetSelector::Index(1)).expect("load");
    assert_eq!(table.path, path);
}

#[test]
fn date_cells_read_as_iso_text() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("registry.xlsx");

    let mut workbook = Workbook::new();
    let date = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "IMO No").expect("write");
    sheet.write_string(0, 1, "Ownership Date").expect("write");
    sheet.write_number(1, 0, 8423154.0).expect("write");
    sheet
        .write_number_with_format(1, 1, 45775.0, &date)
        .expect("write");
    workbook.save(&path).expect("save workbook");

    let table = read_reference_table(&path, &SheetSelector::Index(0)).expect("read workbook");
    let rows = table.rows().expect("rows");
    assert_eq!(rows[0][0], "8423154");
    assert_eq!(rows[0][1], "2025-04-28");
}
