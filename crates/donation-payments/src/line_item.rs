//! Line Item Normalization
//!
//! Clients submit the amount as a dollar figure (string or number). Stripe
//! wants a quantity and an integer count of cents, so the item is rebuilt
//! before it goes anywhere near the processor.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DonationError, Result};

/// Product name shown on the checkout page when the client sends none
pub const DEFAULT_ITEM_NAME: &str = "Donation";

/// A normalized donation line item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product name shown on the checkout page
    pub name: String,

    /// Optional description shown under the name
    #[serde(default)]
    pub description: Option<String>,

    /// Amount in cents
    pub amount: i64,

    /// Always 1
    pub quantity: u64,
}

impl LineItem {
    /// Normalize the raw `line_item` object from a request body
    pub fn from_json(raw: &Map<String, Value>) -> Result<Self> {
        let amount = raw
            .get("amount")
            .ok_or_else(|| DonationError::UnparseableAmount("amount missing".into()))
            .and_then(parse_amount)?;

        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_ITEM_NAME)
            .to_string();

        let description = raw
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            name,
            description,
            amount: to_minor_units(amount)?,
            quantity: 1,
        })
    }
}

/// Parse a JSON number or numeric string into an exact decimal
pub fn parse_amount(value: &Value) -> Result<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(DonationError::UnparseableAmount(format!(
                "expected a number, got {other}"
            )));
        }
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| DonationError::UnparseableAmount(format!("{text:?}: {e}")))
}

/// Convert a dollar amount to cents, rounding half up
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    let cents = amount
        .checked_mul(dec!(100))
        .and_then(|cents| cents.checked_add(dec!(0.5)))
        .and_then(|cents| cents.trunc().to_i64())
        .ok_or_else(|| DonationError::UnparseableAmount(format!("{amount} is out of range")))?;

    if cents < 1 {
        return Err(DonationError::UnparseableAmount(format!(
            "{amount} is below the smallest donation"
        )));
    }

    Ok(cents)
}
