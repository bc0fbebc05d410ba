use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use billrecon_model::ReconciledRecord;

use crate::types::{BatchResult, DatasetStatus, DocumentSummary};

pub fn print_batch_summary(result: &BatchResult) {
    if result.documents.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Document"),
        header_cell("Vessel"),
        header_cell("Customer"),
        header_cell("Manager"),
        header_cell("Address"),
        header_cell("Result"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Center);

    for document in &result.documents {
        table.add_row(document_row(document));
    }
    println!("{table}");

    let failed = result
        .documents
        .iter()
        .filter(|doc| doc.error.is_some())
        .count();
    println!(
        "{} document(s), {} need review, {} failed",
        result.documents.len(),
        result.needs_review(),
        failed
    );
}

pub fn document_row(document: &DocumentSummary) -> Vec<Cell> {
    let name = file_name(&document.source);
    let Some(record) = &document.record else {
        let error = document.error.clone().unwrap_or_default();
        return vec![
            Cell::new(name),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            Cell::new(error).fg(Color::Red),
        ];
    };

    vec![
        Cell::new(name),
        vessel_cell(record),
        customer_cell(record),
        verdict_cell(record.verdict.billing_vs_manager),
        verdict_cell(record.verdict.billing_address_vs_customer_address),
        match &document.output {
            Some(path) => Cell::new(path.display()),
            None => dim_cell("-"),
        },
    ]
}

pub fn print_dataset_table(statuses: &[DatasetStatus]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Prefix"),
        header_cell("File"),
        header_cell("Rows"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);

    for status in statuses {
        let file = match (&status.path, &status.error) {
            (_, Some(error)) => Cell::new(error).fg(Color::Red),
            (Some(path), None) => Cell::new(path.display()),
            (None, None) => dim_cell("-"),
        };
        let rows = match status.records {
            Some(count) => Cell::new(count),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(status.kind)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&status.prefix),
            file,
            rows,
        ]);
    }
    println!("{table}");
}

fn vessel_cell(record: &ReconciledRecord) -> Cell {
    match &record.from_lloyd {
        Some(vessel) => Cell::new(format!("{} ({})", vessel.vessel_name, vessel.imo_number)),
        None => dim_cell("-"),
    }
}

fn customer_cell(record: &ReconciledRecord) -> Cell {
    match &record.from_customer_db {
        Some(customer) => Cell::new(format!(
            "{} ({})",
            customer.invoice_name, customer.customer_code
        )),
        None => dim_cell("-"),
    }
}

fn verdict_cell(verdict: Option<bool>) -> Cell {
    match verdict {
        Some(true) => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        Some(false) => Cell::new("✗")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        None => dim_cell("-"),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
