//! Result table rendering and CSV export.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use flux_common::{EnrichedRow, ResultTable};
use tracing::info;

/// The cell values of one row, in column order.
fn row_fields(row: &EnrichedRow) -> Vec<String> {
    let opt = |field: &Option<String>| field.clone().unwrap_or_default();

    vec![
        row.row.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        row.row.latitude.to_string(),
        row.row.longitude.to_string(),
        row.row.value.to_string(),
        opt(&row.location),
        opt(&row.address.country),
        opt(&row.address.county),
        opt(&row.address.state),
        opt(&row.address.district),
        opt(&row.address.pincode),
        opt(&row.address.region_code),
        opt(&row.address.country_code),
    ]
}

/// Render the table to a writer as aligned columns.
pub fn render_table(table: &ResultTable, out: &mut impl Write) -> Result<()> {
    let headers = table.headers();
    let rows: Vec<Vec<String>> = table.rows.iter().map(row_fields).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    write_line(out, &headers, &widths)?;
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        write_line(out, &cells, &widths)?;
    }

    Ok(())
}

fn write_line(out: &mut impl Write, cells: &[&str], widths: &[usize]) -> std::io::Result<()> {
    let formatted: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    writeln!(out, "{}", formatted.join("  ").trim_end())
}

/// Print the table to stdout.
pub fn print_table(table: &ResultTable) -> Result<()> {
    let stdout = std::io::stdout();
    render_table(table, &mut stdout.lock())
}

/// Export the table to a CSV file.
pub fn write_csv(table: &ResultTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    writer.write_record(table.headers())?;
    for row in &table.rows {
        writer.write_record(row_fields(row))?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = table.len(), "Wrote CSV export");
    Ok(())
}
