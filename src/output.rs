//! Rendering of the district table: CSV for publishing, plus a text table
//! and JSON for the terminal.

use anyhow::Result;
use csv::WriterBuilder;
use std::io::Write;
use tracing::debug;

use crate::record::{DistrictRecord, OUTPUT_COLUMNS};

/// Writes `records` as CSV with a header row.
pub fn write_csv<W: Write>(records: &[DistrictRecord], writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);

    if records.is_empty() {
        wtr.write_record(OUTPUT_COLUMNS)?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;

    debug!(rows = records.len(), "CSV written");
    Ok(())
}

/// Serializes `records` into an in-memory CSV payload.
pub fn to_csv_bytes(records: &[DistrictRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(buf)
}

/// Pretty-printed JSON array of `records`.
pub fn to_json(records: &[DistrictRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Renders a fixed-width text table with a row index column and a size
/// footer, the way a dataframe prints.
pub fn render_table(records: &[DistrictRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut cells = vec![i.to_string()];
            cells.extend(cells_of(r));
            cells
        })
        .collect();

    let mut header = vec![String::new()];
    header.extend(OUTPUT_COLUMNS.iter().map(|c| c.to_string()));

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(header[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for line in std::iter::once(&header).chain(rows.iter()) {
        let padded: Vec<String> = line
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, width)| format!("{cell:>width$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }
    out.push_str(&format!(
        "\n[{} rows x {} columns]\n",
        records.len(),
        OUTPUT_COLUMNS.len()
    ));
    out
}

fn cells_of(r: &DistrictRecord) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.state.clone(),
        r.state_id.to_string(),
        r.district.clone(),
        r.cases.to_string(),
        r.cases_delta.to_string(),
        r.deaths.to_string(),
        r.deaths_delta.to_string(),
        r.recovered.to_string(),
        r.recovered_delta.to_string(),
        r.population.to_string(),
        rate_cell(r.incidence),
        rate_cell(r.death_rate),
        r.new_cases_7d.to_string(),
        rate_cell(r.incidence_7d),
        r.stand.clone(),
    ]
}

fn rate_cell(rate: Option<f64>) -> String {
    rate.map_or_else(|| "NaN".to_string(), |v| format!("{v:.6}"))
}
