use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Claim, PayoutRecord, RawPayment};

/// NUMERIC kronor -> integer öre. `None` if the value does not fit.
pub fn to_minor_units(amount: &BigDecimal) -> Option<i64> {
    (amount * BigDecimal::from(100)).round(0).to_i64()
}

/// Bank payment row (t_bank_payment)
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub fid: i64,
    pub famount: BigDecimal,
    pub freference: Option<String>,
    pub finfo: Option<String>,
    pub fbankname: Option<String>,
    pub ftimestamp: Option<String>,
}

impl From<PaymentRow> for RawPayment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.fid,
            // unconvertible amounts are rejected as non-positive
            amount_minor: to_minor_units(&row.famount).unwrap_or(0),
            raw_reference: row.freference,
            raw_info: row.finfo,
            bank_name: row.fbankname,
            timestamp: row.ftimestamp,
        }
    }
}

/// Errand row (t_errand)
#[derive(Debug, Clone, FromRow)]
pub struct ClaimRow {
    pub fid: i64,
    pub freference: Option<String>,
    pub fdamagenumber: Option<String>,
    pub finvoicereference: Option<String>,
    pub focrnumber: Option<String>,
    pub fsettlementamount: Option<BigDecimal>,
    pub fcreatetime: DateTime<Utc>,
    pub finsurer: Option<String>,
    pub fclinic: Option<String>,
    pub fanimalid: Option<String>,
}

impl From<ClaimRow> for Claim {
    fn from(row: ClaimRow) -> Self {
        Self {
            id: row.fid,
            reference: row.freference,
            damage_number: row.fdamagenumber,
            invoice_reference: row.finvoicereference,
            ocr_number: row.focrnumber,
            settlement_amount_minor: row.fsettlementamount.as_ref().and_then(to_minor_units),
            created_at: row.fcreatetime,
            counterparty_insurer: row.finsurer,
            counterparty_clinic: row.fclinic,
            distinguishing_key: row.fanimalid,
        }
    }
}

/// Recorded payout row (t_payout)
#[derive(Debug, Clone, FromRow)]
pub struct PayoutRow {
    pub ftransactionid: Option<i64>,
    pub freference: String,
    pub famount: BigDecimal,
    pub fclinicname: Option<String>,
    pub fpayouttype: Option<String>,
    pub fcreatetime: DateTime<Utc>,
}

impl PayoutRow {
    pub fn into_record(self) -> Option<PayoutRecord> {
        let Some(amount_minor) = to_minor_units(&self.famount) else {
            tracing::warn!("Payout {} has unconvertible amount {}, skipped", self.freference, self.famount);
            return None;
        };
        Some(PayoutRecord {
            transaction_id: self.ftransactionid,
            reference: self.freference,
            amount_minor,
            clinic_name: self.fclinicname,
            payout_type: self.fpayouttype,
            created_at: self.fcreatetime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn kronor_are_converted_to_ore() {
        let amount = BigDecimal::from_str("1137.00").unwrap();
        assert_eq!(to_minor_units(&amount), Some(113700));

        let amount = BigDecimal::from_str("12.345").unwrap();
        assert_eq!(to_minor_units(&amount), Some(1235));
    }
}
