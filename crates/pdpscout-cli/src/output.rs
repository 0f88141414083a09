//! Result table writers.

use std::io::Write;

use clap::ValueEnum;
use pdpscout_scraper::ResultTable;

use crate::input::IDENTIFIER_COLUMN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `EAN` column followed by one column per store slug
    Csv,
    /// The whole table as JSON
    Json,
}

pub(crate) fn write_table<W: Write>(
    table: &ResultTable,
    format: OutputFormat,
    writer: W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Csv => write_csv(table, writer),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(writer, table)?;
            Ok(())
        }
    }
}

fn write_csv<W: Write>(table: &ResultTable, writer: W) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.stores.len() + 1);
    header.push(IDENTIFIER_COLUMN);
    header.extend(table.stores.iter().map(String::as_str));
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.cells.len() + 1);
        record.push(row.identifier.as_str());
        record.extend(row.cells.iter().map(|cell| cell.as_cell()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
