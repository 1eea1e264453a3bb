use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Previously recorded disbursement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRecord {
    #[serde(default)]
    pub transaction_id: Option<i64>,
    pub reference: String,
    pub amount_minor: i64,
    #[serde(default)]
    pub clinic_name: Option<String>,
    #[serde(default)]
    pub payout_type: Option<String>,
    pub created_at: DateTime<Utc>,
}
