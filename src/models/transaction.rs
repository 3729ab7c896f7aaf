//! Transaction model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{MemberId, TransactionId, TransactionKind};

/// A ledger entry as returned by the transactions endpoints.
///
/// Read-only: the export pipeline never mutates transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Ledger key.
    pub id: TransactionId,
    /// Member the entry belongs to, if any.
    #[serde(default)]
    pub member_id: Option<MemberId>,
    /// Non-negative amount in birr.
    pub amount: Decimal,
    /// Transaction kind; determines the cash-flow direction.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Free-text category label.
    pub category: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional payment method label.
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Calendar date of the transaction.
    #[serde(rename = "transactionDate", with = "calendar_date")]
    pub occurred_at: NaiveDate,
    /// Embedded member record, when the API joins it.
    #[serde(default)]
    pub member: Option<Member>,
}

/// The subset of a member record embedded in transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Database key.
    pub id: MemberId,
    /// Display name.
    pub full_name: String,
}

impl Transaction {
    /// Display name of the associated member, if one is embedded.
    #[inline]
    #[must_use]
    pub fn counterparty_name(&self) -> Option<&str> {
        self.member.as_ref().map(|member| member.full_name.as_str())
    }

    /// The description, or the category when no description is set.
    #[inline]
    #[must_use]
    pub fn description_or_category(&self) -> &str {
        self.description
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(&self.category)
    }
}

/// Serde adapter for `transactionDate`.
///
/// Accepts a plain `YYYY-MM-DD` date or any timestamp starting with one
/// (e.g. `2024-01-15T08:30:00.000Z`); the time part is dropped.
mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Date format on the wire.
    const FORMAT: &str = "%Y-%m-%d";

    /// Serializes as `YYYY-MM-DD`.
    pub(super) fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    /// Deserializes from a date or a timestamp prefixed by a date.
    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, FORMAT).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid transaction date: {raw:?}")))
    }
}
