//! Raw table reading for spreadsheet and CSV sources.
//!
//! Readers produce an untyped [`RawTable`]; interpreting cells is left to
//! the normalization step.

use super::error::{LoadError, Result};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::NaiveDateTime;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// A single untyped cell.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl RawValue {
    /// Wrap a text field, mapping blank strings to `Empty`.
    pub fn from_text(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            RawValue::Empty
        } else {
            RawValue::Text(s.to_string())
        }
    }

    fn from_cell(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => RawValue::Empty,
            Data::String(s) | Data::DurationIso(s) => RawValue::from_text(s),
            Data::Float(f) => RawValue::Number(*f),
            Data::Int(i) => RawValue::Number(*i as f64),
            Data::Bool(b) => RawValue::Text(b.to_string()),
            Data::DateTime(_) | Data::DateTimeIso(_) => cell
                .as_datetime()
                .map_or(RawValue::Empty, RawValue::DateTime),
        }
    }
}

/// Header row plus data rows, as read from the source.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

/// Source file kinds we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Spreadsheet,
}

impl SourceKind {
    /// Detect the kind from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(SourceKind::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceKind::Spreadsheet),
            _ => None,
        }
    }
}

/// Read a source file into a raw table.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    match SourceKind::from_path(path) {
        Some(SourceKind::Csv) => read_csv(File::open(path)?),
        Some(SourceKind::Spreadsheet) => read_spreadsheet(path, sheet),
        None => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Read CSV data with a header row.
pub fn read_csv<R: std::io::Read>(reader: R) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Byte records so a stray non-UTF-8 byte only degrades that one field
    let headers: Vec<String> = csv_reader
        .byte_headers()?
        .iter()
        .map(|field| String::from_utf8_lossy(field).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in csv_reader.byte_records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| RawValue::from_text(&String::from_utf8_lossy(field)))
                .collect(),
        );
    }

    debug!("Read {} CSV rows with {} columns", rows.len(), headers.len());

    Ok(RawTable { headers, rows })
}

/// Read one worksheet. `sheet` is a sheet name, or a 0-based index when no
/// sheet has that name; defaults to the first sheet.
fn read_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    let (label, range) = match sheet {
        Some(sel) if sheet_names.iter().any(|n| n == sel) => {
            (sel.to_string(), workbook.worksheet_range(sel)?)
        }
        Some(sel) => {
            let not_found = || LoadError::SheetNotFound(sel.to_string());
            let idx = sel.parse::<usize>().map_err(|_| not_found())?;
            let range = workbook.worksheet_range_at(idx).ok_or_else(not_found)??;
            let label = sheet_names.get(idx).cloned().unwrap_or_else(|| sel.to_string());
            (label, range)
        }
        None => {
            let first = sheet_names
                .first()
                .cloned()
                .ok_or_else(|| LoadError::EmptySheet(path.display().to_string()))?;
            let range = workbook.worksheet_range(&first)?;
            (first, range)
        }
    };

    info!("Reading sheet '{}' from {}", label, path.display());

    let mut row_iter = range.rows();
    let headers: Vec<String> = match row_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|c| c.as_string().unwrap_or_else(|| c.to_string()))
            .collect(),
        None => return Err(LoadError::EmptySheet(label)),
    };

    let rows: Vec<Vec<RawValue>> = row_iter
        .map(|r| r.iter().map(RawValue::from_cell).collect())
        .collect();

    debug!("Read {} spreadsheet rows with {} columns", rows.len(), headers.len());

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
    use std::path::PathBuf;

    #[test]
    fn test_source_kind_detection() {
        assert_eq!(
            SourceKind::from_path(Path::new("sales.CSV")),
            Some(SourceKind::Csv)
        );
        assert_eq!(
            SourceKind::from_path(Path::new("Copy of finalProj_df.xlsx")),
            Some(SourceKind::Spreadsheet)
        );
        assert_eq!(SourceKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(SourceKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_read_csv() {
        let data = "id,category,after_discount\n1, Books ,10.5\n2,,\n";
        let table = read_csv(data.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["id", "category", "after_discount"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], RawValue::Text("Books".to_string()));
        assert_eq!(table.rows[1][1], RawValue::Empty);
        assert_eq!(table.rows[1][2], RawValue::Empty);
    }

    #[test]
    fn test_read_csv_with_invalid_utf8() {
        let data: &[u8] = b"id,order_date,category,after_discount,cogs,sku_id,sku_name\n\
1,2023-01-05,A,100,40,P1,Pen\n\
2,2023-02-10,A,50,10,P2,Caf\xE9\n";

        let table = read_csv(data).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][6], RawValue::Text("Caf\u{FFFD}".to_string()));
        assert_eq!(table.rows[1][3], RawValue::Text("50".to_string()));
    }

    #[test]
    fn test_missing_file() {
        let err = read_table(&PathBuf::from("/nonexistent/sales.xlsx"), None).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_unsupported_format() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let err = read_table(file.path(), None).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));
    }

    /// Workbook with a "Sales" sheet, a sheet named "2023" and an empty sheet.
    fn create_test_workbook() -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();

        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm");

        let sales = workbook.add_worksheet();
        sales.set_name("Sales").unwrap();
        for (col, header) in ["id", "order_date", "category", "after_discount"]
            .iter()
            .enumerate()
        {
            sales.write_string(0, col as u16, *header).unwrap();
        }
        let ordered = ExcelDateTime::from_ymd(2023, 1, 5)
            .unwrap()
            .and_hms(10, 30, 0)
            .unwrap();
        sales.write_number(1, 0, 1.0).unwrap();
        sales
            .write_datetime_with_format(1, 1, &ordered, &date_format)
            .unwrap();
        sales.write_string(1, 2, "Books").unwrap();
        sales.write_number(1, 3, 125.5).unwrap();

        let year = workbook.add_worksheet();
        year.set_name("2023").unwrap();
        year.write_string(0, 0, "id").unwrap();
        year.write_string(1, 0, "from-2023").unwrap();

        let empty = workbook.add_worksheet();
        empty.set_name("Empty").unwrap();

        workbook.save(file.path()).unwrap();
        file
    }

    #[test]
    fn test_read_spreadsheet_first_sheet() {
        let file = create_test_workbook();
        let table = read_table(file.path(), None).unwrap();

        assert_eq!(
            table.headers,
            vec!["id", "order_date", "category", "after_discount"]
        );
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], RawValue::Number(1.0));
        assert_eq!(table.rows[0][2], RawValue::Text("Books".to_string()));
        assert_eq!(table.rows[0][3], RawValue::Number(125.5));

        let expected = chrono::NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(table.rows[0][1], RawValue::DateTime(expected));
    }

    #[test]
    fn test_select_sheet_by_name_or_index() {
        let file = create_test_workbook();

        // a numeric-looking name wins over the index
        let by_name = read_table(file.path(), Some("2023")).unwrap();
        assert_eq!(by_name.rows[0][0], RawValue::Text("from-2023".to_string()));

        let by_index = read_table(file.path(), Some("1")).unwrap();
        assert_eq!(by_index.headers, vec!["id"]);
        assert_eq!(by_index.rows[0][0], RawValue::Text("from-2023".to_string()));

        let sales = read_table(file.path(), Some("Sales")).unwrap();
        assert_eq!(sales.headers.len(), 4);
    }

    #[test]
    fn test_unknown_sheet() {
        let file = create_test_workbook();

        let err = read_table(file.path(), Some("Missing")).unwrap_err();
        assert!(matches!(err, LoadError::SheetNotFound(ref s) if s == "Missing"));

        let err = read_table(file.path(), Some("9")).unwrap_err();
        assert!(matches!(err, LoadError::SheetNotFound(_)));
    }

    #[test]
    fn test_empty_sheet() {
        let file = create_test_workbook();

        let err = read_table(file.path(), Some("Empty")).unwrap_err();
        assert!(matches!(err, LoadError::EmptySheet(ref s) if s == "Empty"));
    }
}
