//! Loading reference datasets into string-typed DataFrames.

use std::fmt;
use std::path::{Path, PathBuf};

use calamine::{Reader, Sheets, open_workbook_auto};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cell::{cell_text, unique_headers};
use crate::error::{IngestError, Result};

/// Which sheet of a workbook holds the dataset.
///
/// Ignored for CSV files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    /// Zero-based sheet position.
    Index(usize),
    /// Sheet name.
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(idx) => write!(f, "#{idx}"),
            Self::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// A loaded reference dataset.
///
/// Every column is `String`; empty cells are read back as `""`.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    /// File the table was loaded from.
    pub path: PathBuf,
    /// Table contents, one `String` column per header.
    pub frame: DataFrame,
}

impl ReferenceTable {
    /// Builds a table from a header row and data rows.
    ///
    /// Short rows are padded with empty cells, long rows are truncated, and
    /// rows with no non-blank cell are skipped.
    pub fn from_rows(
        path: impl Into<PathBuf>,
        headers: &[String],
        rows: Vec<Vec<String>>,
    ) -> Result<Self> {
        let path = path.into();
        let headers = unique_headers(headers);
        let mut columns: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); headers.len()];

        for row in rows {
            if row.iter().all(|value| value.trim().is_empty()) {
                continue;
            }
            let mut cells = row.into_iter();
            for column in &mut columns {
                column.push(cells.next().unwrap_or_default());
            }
        }

        let columns: Vec<Column> = headers
            .iter()
            .zip(columns)
            .map(|(name, values)| Series::new(name.as_str().into(), values).into_column())
            .collect();
        let frame = DataFrame::new(columns)?;

        Ok(Self { path, frame })
    }

    /// Column names in file order.
    pub fn headers(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Row-major copy of the table as text.
    pub fn rows(&self) -> Result<Vec<Vec<String>>> {
        let text_columns: Vec<Series> = self
            .frame
            .get_columns()
            .iter()
            .map(|col| {
                col.cast(&DataType::String)
                    .map(Column::take_materialized_series)
            })
            .collect::<PolarsResult<_>>()?;
        let chunked: Vec<&StringChunked> = text_columns
            .iter()
            .map(|series| series.str())
            .collect::<PolarsResult<_>>()?;

        let rows = (0..self.frame.height())
            .map(|row_idx| {
                chunked
                    .iter()
                    .map(|ca| ca.get(row_idx).unwrap_or("").to_string())
                    .collect()
            })
            .collect();
        Ok(rows)
    }
}

/// Reads a reference dataset. The first row is the header.
///
/// CSV files are read with Polars with schema inference disabled, so every
/// column stays text. Spreadsheets (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`) are
/// read with calamine from the selected sheet.
pub fn read_reference_table(path: &Path, sheet: &SheetSelector) -> Result<ReferenceTable> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let mut raw_rows = if is_csv {
        read_csv_rows(path)?
    } else {
        read_workbook_rows(path, sheet)?
    };

    if raw_rows.is_empty() {
        return Err(IngestError::EmptyDataset {
            path: path.to_path_buf(),
        });
    }
    let headers = raw_rows.remove(0);
    let table = ReferenceTable::from_rows(path, &headers, raw_rows)?;

    tracing::info!(
        path = %path.display(),
        rows = table.height(),
        columns = table.frame.width(),
        "Loaded reference dataset"
    );
    Ok(table)
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let headerless = ReferenceTable {
        path: path.to_path_buf(),
        frame: df,
    };
    let mut rows = headerless.rows()?;
    // A UTF-8 BOM can survive in the first header cell.
    if let Some(first) = rows.first_mut().and_then(|row| row.first_mut()) {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }
    Ok(rows)
}

fn read_workbook_rows(path: &Path, sheet: &SheetSelector) -> Result<Vec<Vec<String>>> {
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| IngestError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        SheetSelector::Index(idx) => sheet_names.get(*idx).cloned(),
        SheetSelector::Name(name) => sheet_names.iter().find(|n| *n == name).cloned(),
    }
    .ok_or_else(|| IngestError::SheetNotFound {
        sheet: sheet.to_string(),
        path: path.to_path_buf(),
    })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::Workbook {
            path: path.to_path_buf(),
            message: format!("sheet '{sheet_name}': {e}"),
        })?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_keeps_text() {
        let file = create_temp_csv("IMO No,Vessel Name\n08423154,LSC Boat V\n9000001,\n");
        let table = read_reference_table(file.path(), &SheetSelector::default()).unwrap();

        assert_eq!(table.headers(), vec!["IMO No", "Vessel Name"]);
        let rows = table.rows().unwrap();
        assert_eq!(rows.len(), 2);
        // Leading zeros survive because nothing is inferred as a number.
        assert_eq!(rows[0], vec!["08423154", "LSC Boat V"]);
        assert_eq!(rows[1], vec!["9000001", ""]);
    }

    #[test]
    fn test_read_csv_with_bom() {
        let file = create_temp_csv("\u{feff}Code,NameInvoiceAddress\nC1,Acme\n");
        let table = read_reference_table(file.path(), &SheetSelector::default()).unwrap();
        assert_eq!(table.headers(), vec!["Code", "NameInvoiceAddress"]);
    }

    #[test]
    fn test_from_rows_pads_and_skips_blank_rows() {
        let headers = vec!["A".to_string(), "B".to_string()];
        let rows = vec![
            vec!["1".to_string()],
            vec![String::new(), " ".to_string()],
            vec!["2".to_string(), "x".to_string(), "extra".to_string()],
        ];
        let table = ReferenceTable::from_rows("mem", &headers, rows).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(
            table.rows().unwrap(),
            vec![vec!["1", ""], vec!["2", "x"]]
        );
    }

    #[test]
    fn test_empty_csv_is_rejected() {
        let file: NamedTempFile = create_temp_csv("");
        let result = read_reference_table(file.path(), &SheetSelector::default());
        assert!(result.is_err());
    }
}
