use log::info;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{check_new_item, seed_records, ItemDraft, ItemError, ItemRecord};
use crate::utils::csv_codec::{read_drafts, write_items};

pub use crate::utils::csv_codec::ImportError;

/// A rejected row of a bulk replacement. `row` is 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {row_number}: {source}", row_number = .row + 1)]
pub struct RowError {
    pub row: usize,
    pub source: ItemError,
}

/// Ordered inventory of one session. Every record's value is derived when the
/// record enters the store, so `value == quantity * unit_price` always holds.
#[derive(Debug, Clone, Default)]
pub struct InventoryStore {
    items: Vec<ItemRecord>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        Self {
            items: seed_records(),
        }
    }

    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of every record's value. Mutations refuse records that would push
    /// the sum out of `Decimal` range, so the fold never saturates in practice.
    pub fn total_value(&self) -> Decimal {
        checked_total(&self.items).unwrap_or(Decimal::MAX)
    }

    pub fn drafts(&self) -> Vec<ItemDraft> {
        self.items.iter().map(ItemRecord::to_draft).collect()
    }

    pub fn add_item(
        &mut self,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Result<&ItemRecord, ItemError> {
        check_new_item(quantity, unit_price)?;
        let record = ItemDraft::new(name, quantity, unit_price).into_record()?;
        self.total_value()
            .checked_add(record.value())
            .ok_or(ItemError::TotalOverflow)?;

        info!("Adding item '{}' ({} x {})", record.name(), quantity, unit_price);
        self.items.push(record);
        Ok(self.items.last().expect("record was just pushed"))
    }

    /// Swap the whole table for `drafts`. Nothing changes unless every row
    /// converts.
    pub fn replace_all<I>(&mut self, drafts: I) -> Result<(), RowError>
    where
        I: IntoIterator<Item = ItemDraft>,
    {
        let mut total = Decimal::ZERO;
        let items = drafts
            .into_iter()
            .enumerate()
            .map(|(row, draft)| {
                let record = draft.into_record().map_err(|source| RowError { row, source })?;
                total = total.checked_add(record.value()).ok_or(RowError {
                    row,
                    source: ItemError::TotalOverflow,
                })?;
                Ok(record)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Replacing inventory: {} -> {} items", self.items.len(), items.len());
        self.items = items;
        Ok(())
    }

    pub fn export_csv(&self) -> Result<Vec<u8>, csv::Error> {
        write_items(&self.items)
    }

    /// Replace the table with the rows of a CSV upload and return how many were
    /// imported. On error the table is left as it was.
    pub fn import_csv(&mut self, bytes: &[u8]) -> Result<usize, ImportError> {
        let drafts = read_drafts(bytes)?;
        let count = drafts.len();

        // Data rows start on line 2.
        self.replace_all(drafts).map_err(|err| ImportError::InvalidRow {
            line: err.row as u64 + 2,
            source: err.source,
        })?;

        Ok(count)
    }
}

fn checked_total(items: &[ItemRecord]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.value()))
}
