use arrow::{
    csv::ReaderBuilder,
    datatypes::{DataType, Field, Schema},
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{
    fs::{self, File},
    io::Cursor,
    path::Path,
    sync::Arc,
};
use tracing::info;

use crate::errors::PipelineError;
use crate::process::utils::strip_bom;

const BATCH_ROWS: usize = 8192;

/// Transcode a CSV artifact to Parquet. Every column is read as `Utf8`, so
/// dates and numbers inside the text keep their exact spelling.
/// Returns the number of rows written.
pub fn export_parquet(csv_path: &Path, parquet_path: &Path) -> Result<usize, PipelineError> {
    let bytes = fs::read(csv_path)?;
    let body = strip_bom(&bytes);

    let headers: Vec<String> = {
        let mut rdr = csv::ReaderBuilder::new().from_reader(body);
        rdr.headers()?.iter().map(str::to_string).collect()
    };
    let fields: Vec<Field> = headers
        .iter()
        .map(|n| Field::new(n, DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(BATCH_ROWS)
        .build(Cursor::new(body))?;

    if let Some(dir) = parquet_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file = File::create(parquet_path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;

    let mut rows = 0;
    for batch in reader {
        let batch = batch?;
        rows += batch.num_rows();
        writer.write(&batch)?;
    }
    writer.close()?;

    info!(rows, parquet = %parquet_path.display(), "wrote parquet");
    Ok(rows)
}
