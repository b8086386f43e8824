use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Demonstration rows every new session starts with.
pub const SEED_ITEMS: [(&str, u32, Decimal); 4] = [
    ("Laptop Business", 15, dec!(3500.00)),
    ("Monitor 27\"", 30, dec!(850.00)),
    ("Mysz Bezprzewodowa", 50, dec!(75.00)),
    ("Klawiatura Mechaniczna", 25, dec!(420.00)),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("item name must not be empty")]
    EmptyName,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("unit price must be greater than zero")]
    NonPositivePrice,
    #[error("value of {quantity} x {unit_price} is out of range")]
    ValueOverflow { quantity: u32, unit_price: Decimal },
    #[error("total inventory value is out of range")]
    TotalOverflow,
}

/// The editable columns of an inventory line. Whatever `value` an import or
/// form carried is not part of a draft; it is always derived again.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: String,
    pub quantity: u32,
    #[serde(deserialize_with = "decimal_from_text")]
    pub unit_price: Decimal,
}

// Goes through the text form so CSV cells like "3500.00" never pass through f64.
fn decimal_from_text<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    Decimal::from_str(text.trim()).map_err(serde::de::Error::custom)
}

impl ItemDraft {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Derive the record. Only structural problems are rejected here; bounds on
    /// quantity and price belong to the caller that owns the input.
    pub fn into_record(self) -> Result<ItemRecord, ItemError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ItemError::EmptyName);
        }

        let value = Decimal::from(self.quantity)
            .checked_mul(self.unit_price)
            .ok_or(ItemError::ValueOverflow {
                quantity: self.quantity,
                unit_price: self.unit_price,
            })?;

        Ok(ItemRecord {
            name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            value,
        })
    }
}

/// One inventory line. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    name: String,
    quantity: u32,
    unit_price: Decimal,
    value: Decimal,
}

impl ItemRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft::new(self.name.clone(), self.quantity, self.unit_price)
    }
}

/// Bounds applied to items entered one at a time through the add form.
pub fn check_new_item(quantity: u32, unit_price: Decimal) -> Result<(), ItemError> {
    if quantity < 1 {
        return Err(ItemError::ZeroQuantity);
    }
    if unit_price <= Decimal::ZERO {
        return Err(ItemError::NonPositivePrice);
    }
    Ok(())
}

pub fn seed_records() -> Vec<ItemRecord> {
    SEED_ITEMS
        .iter()
        .map(|(name, quantity, unit_price)| ItemRecord {
            name: name.to_string(),
            quantity: *quantity,
            unit_price: *unit_price,
            value: Decimal::from(*quantity) * *unit_price,
        })
        .collect()
}
