use chrono::NaiveDateTime;

use crate::process::utils::coerce_text;

/// A single cell as it came out of the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    /// A typed date cell from a spreadsheet.
    Date(NaiveDateTime),
    Empty,
}

impl RawValue {
    /// Text as-is, with empty strings mapped to [`RawValue::Empty`].
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            RawValue::Empty
        } else {
            RawValue::Text(s)
        }
    }

    /// Textual form used for dedup keys and content fusion.
    pub fn to_text(&self) -> String {
        coerce_text(self)
    }
}

/// One source row reduced to the three fields every source maps onto.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub date: RawValue,
    /// `Empty` when the source has no title column.
    pub title: RawValue,
    pub body: RawValue,
}

/// Grid of cells read from one source, before column mapping.
#[derive(Debug, Default)]
pub struct RawTable {
    /// Header row, empty when the file has none.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    /// Widest row seen, including the header.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}
