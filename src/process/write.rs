use csv::{Terminator, WriterBuilder};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use crate::errors::PipelineError;

pub const DATE_COLUMN: &str = "DATE";
pub const CONTENT_COLUMN: &str = "CONTENT";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write a `DATE,CONTENT` artifact: UTF-8 with BOM, header row, `\n` line
/// ends. Written to a temp file and renamed over `path`, so readers never see
/// a half-written file. Returns the number of data rows.
pub fn write_artifact<'a, I>(path: &Path, rows: I) -> Result<usize, PipelineError>
where
    I: IntoIterator<Item = (String, &'a str)>,
{
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = dir {
        fs::create_dir_all(dir)?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact.csv".into());
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let written = write_rows(&tmp_path, rows).and_then(|count| {
        fs::rename(&tmp_path, path)?;
        Ok(count)
    });
    if written.is_err() {
        // leave no partial temp file behind
        let _ = fs::remove_file(&tmp_path);
    }
    written
}

fn write_rows<'a, I>(tmp_path: &Path, rows: I) -> Result<usize, PipelineError>
where
    I: IntoIterator<Item = (String, &'a str)>,
{
    let mut out = BufWriter::new(File::create(tmp_path)?);
    out.write_all(UTF8_BOM)?;
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);
    wtr.write_record([DATE_COLUMN, CONTENT_COLUMN])?;
    let mut count = 0;
    for (date, content) in rows {
        wtr.write_record([date.as_str(), content])?;
        count += 1;
    }
    let mut out = wtr
        .into_inner()
        .map_err(|e| PipelineError::Io(e.into_error()))?;
    out.flush()?;
    Ok(count)
}
