// src/process/loader.rs
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use encoding_rs::Encoding;
use std::{borrow::Cow, fs, io, path::Path};
use tracing::{debug, warn};

use crate::errors::PipelineError;
use crate::process::raw_table::{RawRecord, RawTable, RawValue};
use crate::schema::{ColumnRef, SourceFormat, SourceSchema};

/// Read the source described by `schema` and map its rows onto
/// date/title/body.
///
/// Rows whose cells are all empty are skipped. Missing trailing cells read
/// as [`RawValue::Empty`].
#[tracing::instrument(level = "info", skip(schema), fields(source = %schema.name, path = %schema.path.display()))]
pub fn load_records(schema: &SourceSchema) -> Result<Vec<RawRecord>, PipelineError> {
    let table = load_table(schema)?;
    let records = map_columns(&table, schema)?;
    debug!(rows = records.len(), "loaded records");
    Ok(records)
}

/// Read the raw cell grid, splitting off the header row when the source has one.
pub fn load_table(schema: &SourceSchema) -> Result<RawTable, PipelineError> {
    let path = schema.path.as_path();
    if !path.is_file() {
        return Err(PipelineError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut rows = match &schema.format {
        SourceFormat::Csv { delimiter } => {
            let text = decode_file(path, &schema.encoding)?;
            read_delimited(path, &text, *delimiter)?
        }
        SourceFormat::Spreadsheet { sheet } => read_spreadsheet(path, *sheet)?,
    };
    rows.retain(|row| row.iter().any(|c| *c != RawValue::Empty));

    let headers = if schema.has_header && !rows.is_empty() {
        rows.remove(0)
            .iter()
            .map(|c| c.to_text().trim().to_string())
            .collect()
    } else {
        Vec::new()
    };
    Ok(RawTable { headers, rows })
}

/// Decode a whole file with the declared WHATWG encoding label. A leading
/// byte-order mark wins over the declared label.
pub fn decode_file(path: &Path, label: &str) -> Result<String, PipelineError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PipelineError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => PipelineError::Io(e),
    })?;
    decode_bytes(path, &bytes, label)
}

pub fn decode_bytes(path: &Path, bytes: &[u8], label: &str) -> Result<String, PipelineError> {
    let declared = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| PipelineError::Configuration(format!("unknown encoding '{}'", label)))?;
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((declared, 0));
    if encoding != declared {
        warn!(declared = declared.name(), bom = encoding.name(), "byte-order mark overrides declared encoding");
    }
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .map(Cow::into_owned)
        .ok_or_else(|| PipelineError::DecodeError {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        })
}

fn read_delimited(
    path: &Path,
    text: &str,
    delimiter: char,
) -> Result<Vec<Vec<RawValue>>, PipelineError> {
    if !delimiter.is_ascii() {
        return Err(PipelineError::Configuration(format!(
            "delimiter {:?} for {} is not a single byte",
            delimiter,
            path.display()
        )));
    }
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter as u8)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(RawValue::text).collect());
    }
    Ok(rows)
}

fn read_spreadsheet(path: &Path, sheet: usize) -> Result<Vec<Vec<RawValue>>, PipelineError> {
    let spreadsheet_err = |details: String| PipelineError::Spreadsheet {
        path: path.to_path_buf(),
        details,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_err(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(sheet)
        .ok_or_else(|| PipelineError::SchemaMismatch {
            path: path.to_path_buf(),
            details: format!("workbook has no sheet #{}", sheet),
        })?
        .map_err(|e| spreadsheet_err(e.to_string()))?;

    // calamine ranges start at the first used cell; pad back to column A so
    // positional column references stay aligned.
    let lead = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    Ok(range
        .rows()
        .map(|row| {
            std::iter::repeat(RawValue::Empty)
                .take(lead)
                .chain(row.iter().map(cell_to_raw))
                .collect()
        })
        .collect())
}

pub fn cell_to_raw(cell: &Data) -> RawValue {
    match cell {
        Data::String(s) => RawValue::text(s.as_str()),
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Float(f) => RawValue::Number(*f),
        Data::Bool(b) => RawValue::Text(b.to_string()),
        Data::DateTime(dt) => dt.as_datetime().map(RawValue::Date).unwrap_or(RawValue::Empty),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::text(s.as_str()),
        Data::Error(_) | Data::Empty => RawValue::Empty,
    }
}

fn resolve(table: &RawTable, col: &ColumnRef, path: &Path) -> Result<usize, PipelineError> {
    match col {
        ColumnRef::Index(i) if *i < table.width() => Ok(*i),
        ColumnRef::Index(i) => Err(PipelineError::SchemaMismatch {
            path: path.to_path_buf(),
            details: format!("column #{} requested but rows have {} columns", i, table.width()),
        }),
        ColumnRef::Name(name) => table
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PipelineError::SchemaMismatch {
                path: path.to_path_buf(),
                details: format!("column '{}' not in header {:?}", name, table.headers),
            }),
    }
}

/// Resolve the schema's column references against `table` and pull out
/// one [`RawRecord`] per row.
pub fn map_columns(table: &RawTable, schema: &SourceSchema) -> Result<Vec<RawRecord>, PipelineError> {
    if table.rows.is_empty() && table.headers.is_empty() {
        warn!(source = %schema.name, "source is empty");
        return Ok(Vec::new());
    }
    let path = schema.path.as_path();
    let date_ix = resolve(table, &schema.columns.date, path)?;
    let body_ix = resolve(table, &schema.columns.body, path)?;
    let title_ix = schema
        .columns
        .title
        .as_ref()
        .map(|c| resolve(table, c, path))
        .transpose()?;

    let cell = |row: &[RawValue], i: usize| row.get(i).cloned().unwrap_or(RawValue::Empty);
    Ok(table
        .rows
        .iter()
        .map(|row| RawRecord {
            date: cell(row, date_ix),
            title: title_ix.map_or(RawValue::Empty, |i| cell(row, i)),
            body: cell(row, body_ix),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::date_parser::normalize;
    use crate::process::xlsx_fixture::{write_xlsx, Cell};
    use crate::schema::{ColumnMap, DateStrategy, DedupKey, Terminal};
    use anyhow::Result;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::{tempdir, NamedTempFile};

    fn csv_schema(path: PathBuf, encoding: &str, has_header: bool, columns: ColumnMap) -> SourceSchema {
        SourceSchema {
            name: "test".into(),
            path,
            format: SourceFormat::Csv { delimiter: ',' },
            encoding: encoding.into(),
            has_header,
            columns,
            date: DateStrategy::DayFirst,
            dedup: DedupKey::Raw,
            terminal: Terminal::PerDay,
            output: PathBuf::from("out.csv"),
        }
    }

    fn positional() -> ColumnMap {
        ColumnMap {
            date: ColumnRef::Index(0),
            title: Some(ColumnRef::Index(1)),
            body: ColumnRef::Index(2),
        }
    }

    #[test]
    fn reads_headerless_latin1() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        // "Café" in latin-1
        tmp.write_all(b"25/12/2023,Caf\xe9,body one\n2023/12/25,,body two\n")?;
        let schema = csv_schema(tmp.path().to_path_buf(), "latin1", false, positional());

        let records = load_records(&schema)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, RawValue::Text("25/12/2023".into()));
        assert_eq!(records[0].title, RawValue::Text("Café".into()));
        assert_eq!(records[1].title, RawValue::Empty);
        assert_eq!(records[1].body, RawValue::Text("body two".into()));
        Ok(())
    }

    #[test]
    fn maps_named_columns_in_any_order() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all("\u{feff}title,text,date\nT,B,2024 年 7 月 3 日\n".as_bytes())?;
        let columns = ColumnMap {
            date: ColumnRef::Name("date".into()),
            title: Some(ColumnRef::Name("title".into())),
            body: ColumnRef::Name("text".into()),
        };
        let schema = csv_schema(tmp.path().to_path_buf(), "utf-8", true, columns);

        let records = load_records(&schema)?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, RawValue::Text("2024 年 7 月 3 日".into()));
        assert_eq!(records[0].title, RawValue::Text("T".into()));
        assert_eq!(records[0].body, RawValue::Text("B".into()));
        Ok(())
    }

    #[test]
    fn missing_named_column_is_schema_mismatch() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"DATE,CONTENT\n2023/1/1,x\n")?;
        let columns = ColumnMap {
            date: ColumnRef::Name("DATE".into()),
            title: Some(ColumnRef::Name("TITLE".into())),
            body: ColumnRef::Name("CONTENT".into()),
        };
        let schema = csv_schema(tmp.path().to_path_buf(), "utf-8", true, columns);
        let err = load_records(&schema).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
        Ok(())
    }

    #[test]
    fn index_past_widest_row_is_schema_mismatch() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"2023/1/1,x\n")?;
        let schema = csv_schema(tmp.path().to_path_buf(), "utf-8", false, positional());
        let err = load_records(&schema).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
        Ok(())
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let schema = csv_schema(PathBuf::from("/definitely/not/here.csv"), "utf-8", false, positional());
        let err = load_records(&schema).unwrap_err();
        assert!(matches!(err, PipelineError::SourceNotFound { .. }));
    }

    #[test]
    fn malformed_utf8_is_decode_error() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"2023/1/1,\xff\xfe\xfa,x\n")?;
        let schema = csv_schema(tmp.path().to_path_buf(), "utf-8", false, positional());
        let err = load_records(&schema).unwrap_err();
        assert!(matches!(err, PipelineError::DecodeError { .. }));
        Ok(())
    }

    #[test]
    fn short_rows_and_blank_rows() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"2023/1/1,t,b\n,,\n2023/1/2,t\n")?;
        let schema = csv_schema(tmp.path().to_path_buf(), "utf-8", false, positional());
        let records = load_records(&schema)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].body, RawValue::Empty);
        Ok(())
    }

    fn xlsx_schema(path: PathBuf, sheet: usize, has_header: bool, columns: ColumnMap) -> SourceSchema {
        SourceSchema {
            format: SourceFormat::Spreadsheet { sheet },
            ..csv_schema(path, "utf-8", has_header, columns)
        }
    }

    fn christmas_2023() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 12, 25)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn reads_headerless_workbook_starting_past_column_a() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("news.xlsx");
        // data starts in column B
        write_xlsx(
            &path,
            1,
            &[
                vec![Cell::Date(45285.0), Cell::Text("T1"), Cell::Text("B1")],
                vec![Cell::Number(20231225.0), Cell::Text("T2"), Cell::Text("B2")],
            ],
        )?;
        let columns = ColumnMap {
            date: ColumnRef::Index(1),
            title: Some(ColumnRef::Index(2)),
            body: ColumnRef::Index(3),
        };
        let records = load_records(&xlsx_schema(path, 0, false, columns))?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, RawValue::Date(christmas_2023()));
        assert_eq!(records[0].title, RawValue::Text("T1".into()));
        assert_eq!(records[1].date, RawValue::Number(20231225.0));
        assert_eq!(records[1].body, RawValue::Text("B2".into()));
        Ok(())
    }

    #[test]
    fn reads_headed_workbook_by_column_name() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("late.xlsx");
        write_xlsx(
            &path,
            0,
            &[
                vec![Cell::Text("date"), Cell::Text("title"), Cell::Text(" text ")],
                vec![Cell::Text("2024 年 7 月 3 日"), Cell::Text("T"), Cell::Text("B")],
                vec![Cell::Date(45285.0), Cell::Text("T2"), Cell::Blank],
            ],
        )?;
        let columns = ColumnMap {
            date: ColumnRef::Name("date".into()),
            title: Some(ColumnRef::Name("title".into())),
            body: ColumnRef::Name("text".into()),
        };
        let records = load_records(&xlsx_schema(path, 0, true, columns))?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, RawValue::Text("2024 年 7 月 3 日".into()));
        assert_eq!(records[1].body, RawValue::Empty);

        let tokens = DateStrategy::TokenText {
            year: "年".into(),
            month: "月".into(),
            day: "日".into(),
        };
        assert_eq!(normalize(&records[0].date, &tokens), NaiveDate::from_ymd_opt(2024, 7, 3));
        assert_eq!(normalize(&records[1].date, &tokens), Some(christmas_2023().date()));
        Ok(())
    }

    #[test]
    fn missing_sheet_is_schema_mismatch() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("one_sheet.xlsx");
        write_xlsx(&path, 0, &[vec![Cell::Text("2023/1/1"), Cell::Text("t"), Cell::Text("b")]])?;
        let err = load_records(&xlsx_schema(path, 2, false, positional())).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
        Ok(())
    }

    #[test]
    fn converts_spreadsheet_cells() {
        assert_eq!(cell_to_raw(&Data::Int(20230101)), RawValue::Number(20230101.0));
        assert_eq!(cell_to_raw(&Data::String(String::new())), RawValue::Empty);
        assert_eq!(
            cell_to_raw(&Data::DateTimeIso("2023-12-25".into())),
            RawValue::Text("2023-12-25".into())
        );
        assert_eq!(cell_to_raw(&Data::Empty), RawValue::Empty);
    }
}
