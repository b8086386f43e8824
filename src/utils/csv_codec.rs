//! CSV import/export of inventory tables.
//!
//! Exports always use the canonical headers. Imports also accept the Polish
//! display labels older exports were written with, ignore unknown columns, and
//! never trust an incoming `value` column.

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::debug;
use thiserror::Error;

use crate::models::{ItemDraft, ItemError, ItemRecord};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Quantity,
    UnitPrice,
    Value,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Name, Column::Quantity, Column::UnitPrice, Column::Value];
    pub const REQUIRED: [Column; 3] = [Column::Name, Column::Quantity, Column::UnitPrice];

    pub fn header(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Quantity => "quantity",
            Column::UnitPrice => "unitPrice",
            Column::Value => "value",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Name => &["Nazwa Towaru"],
            Column::Quantity => &["Ilość"],
            Column::UnitPrice => &["unit_price", "Cena Jednostkowa (PLN)"],
            Column::Value => &["Wartość (PLN)"],
        }
    }

    pub fn matching(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL
            .into_iter()
            .find(|column| column.header() == header || column.aliases().contains(&header))
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV file is missing required column(s): {}", .missing.join(", "))]
    MissingColumns { missing: Vec<&'static str> },
    #[error("could not parse CSV: {0}")]
    Parse(#[from] csv::Error),
    #[error("line {line}: {source}")]
    InvalidRow { line: u64, source: ItemError },
}

impl ImportError {
    /// True for a well-formed file that lacks required columns, false for
    /// content that could not be read.
    pub fn is_validation(&self) -> bool {
        matches!(self, ImportError::MissingColumns { .. })
    }
}

fn canonical_headers(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .map(|header| Column::matching(header).map_or(header, |column| column.header()))
        .collect()
}

pub fn read_drafts(bytes: &[u8]) -> Result<Vec<ItemDraft>, ImportError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = canonical_headers(reader.headers()?);
    let missing: Vec<&'static str> = Column::REQUIRED
        .into_iter()
        .map(Column::header)
        .filter(|required| !headers.iter().any(|header| header == *required))
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns { missing });
    }

    let mut drafts = Vec::new();
    for result in reader.records() {
        let record = result?;
        let draft: ItemDraft = record.deserialize(Some(&headers))?;
        if draft.name.is_empty() {
            let line = record.position().map_or(0, |position| position.line());
            return Err(ImportError::InvalidRow { line, source: ItemError::EmptyName });
        }
        drafts.push(draft);
    }

    debug!("Parsed {} rows from CSV upload", drafts.len());
    Ok(drafts)
}

pub fn write_items(items: &[ItemRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    // Written by hand so an empty table still produces a header row.
    writer.write_record(Column::ALL.into_iter().map(Column::header))?;
    for item in items {
        writer.serialize(item)?;
    }

    writer.into_inner().map_err(|err| err.into_error().into())
}
