//! Output artifacts for merged records
//!
//! Two artifacts are produced from a merge:
//! - the merged CSV: UTF-8 with BOM, every field quoted, fixed column order
//! - the JSON map payload consumed by the map front end

use crate::app::models::{CategoryColorTable, MapCenter, MapPayload, NormalizedRecord};
use crate::config::TargetSchema;
use crate::constants::UTF8_BOM;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Render a coordinate; whole numbers keep a trailing `.0`
pub fn format_coordinate(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) => {
            let text = v.to_string();
            if v.is_finite() && !text.contains('.') {
                format!("{}.0", text)
            } else {
                text
            }
        }
    }
}

fn record_fields(record: &NormalizedRecord, include_category: bool) -> Vec<String> {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let mut fields = vec![
        text(&record.name),
        text(&record.address),
        text(&record.url),
        format_coordinate(record.latitude),
        format_coordinate(record.longitude),
        record.source_file.clone(),
    ];
    if include_category {
        fields.push(text(&record.category));
    }
    fields
}

/// Write the merged CSV to any writer
pub fn write_csv_to<W: Write>(
    writer: W,
    records: &[NormalizedRecord],
    schema: &TargetSchema,
) -> Result<W> {
    let mut writer = writer;
    writer
        .write_all(UTF8_BOM)
        .map_err(|e| Error::io("Failed to write byte order mark", e))?;

    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    csv_writer
        .write_record(schema.output_columns())
        .map_err(|e| Error::csv_parsing("output", "Failed to write header", Some(e)))?;

    for record in records {
        csv_writer
            .write_record(record_fields(record, schema.include_category))
            .map_err(|e| Error::csv_parsing("output", "Failed to write record", Some(e)))?;
    }

    csv_writer
        .into_inner()
        .map_err(|e| Error::io("Failed to flush CSV output", e.into_error()))
}

/// Write the merged CSV file
pub fn write_csv(path: &Path, records: &[NormalizedRecord], schema: &TargetSchema) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::io(format!("Failed to create {}", path.display()), e))?;

    let mut writer = write_csv_to(BufWriter::new(file), records, schema)?;
    writer
        .flush()
        .map_err(|e| Error::io(format!("Failed to flush {}", path.display()), e))?;

    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Assemble the map payload from merged records
pub fn build_map_payload(
    records: &[NormalizedRecord],
    colors: &CategoryColorTable,
    center: MapCenter,
) -> MapPayload {
    MapPayload {
        records: records.to_vec(),
        category_colors: colors.hex_map(),
        center,
    }
}

/// Write the map payload as pretty-printed JSON
pub fn write_map_payload(path: &Path, payload: &MapPayload) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::io(format!("Failed to create {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, payload)?;
    writer
        .flush()
        .map_err(|e| Error::io(format!("Failed to flush {}", path.display()), e))?;

    info!(
        "Wrote map payload with {} records to {}",
        payload.records.len(),
        path.display()
    );
    Ok(())
}
