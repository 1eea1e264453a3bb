use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Incoming bank transaction as supplied by the caller (unvalidated).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPayment {
    pub id: i64,
    pub amount_minor: i64,
    #[serde(default)]
    pub raw_reference: Option<String>,
    #[serde(default)]
    pub raw_info: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Validated bank transaction. Immutable for the duration of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTransaction {
    pub id: i64,
    pub amount_minor: i64,
    pub raw_reference: Option<String>,
    pub raw_info: Option<String>,
    pub bank_name: String,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<RawPayment> for PaymentTransaction {
    type Error = InputError;

    fn try_from(raw: RawPayment) -> Result<Self, Self::Error> {
        if raw.amount_minor <= 0 {
            return Err(InputError::NonPositiveAmount {
                payment_id: raw.id,
                amount_minor: raw.amount_minor,
            });
        }

        let bank_name = match raw.bank_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(InputError::MissingBankName { payment_id: raw.id }),
        };

        let timestamp = raw
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| InputError::InvalidTimestamp {
                payment_id: raw.id,
                value: raw.timestamp.clone().unwrap_or_default(),
            })?;

        Ok(Self {
            id: raw.id,
            amount_minor: raw.amount_minor,
            raw_reference: raw.raw_reference,
            raw_info: raw.raw_info,
            bank_name,
            timestamp,
        })
    }
}

/// Accepts RFC 3339 or a naive `YYYY-MM-DD[ HH:MM:SS]` value (read as UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Identifiers pulled out of a payment's reference and memo text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIdentifiers {
    pub extracted_reference: Option<String>,
    pub extracted_other_number: Option<String>,
    pub extracted_damage_number: Option<String>,
    pub alternate_references: IndexSet<String>,
}

impl ParsedIdentifiers {
    /// Primary identifiers in priority order, skipping the unset ones.
    pub fn primary(&self) -> impl Iterator<Item = &str> {
        [
            self.extracted_reference.as_deref(),
            self.extracted_other_number.as_deref(),
            self.extracted_damage_number.as_deref(),
        ]
        .into_iter()
        .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.primary().next().is_none() && self.alternate_references.is_empty()
    }
}
