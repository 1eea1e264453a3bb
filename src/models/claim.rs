use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Insurance claim ("errand") awaiting settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: i64,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub damage_number: Option<String>,
    #[serde(default)]
    pub invoice_reference: Option<String>,
    #[serde(default)]
    pub ocr_number: Option<String>,
    #[serde(default)]
    pub settlement_amount_minor: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub counterparty_insurer: Option<String>,
    #[serde(default)]
    pub counterparty_clinic: Option<String>,
    /// Extra grouping key for entity matching (the animal id in the claim data).
    #[serde(default)]
    pub distinguishing_key: Option<String>,
}

impl Claim {
    /// A claim cannot settle a payment made before it existed.
    pub fn existed_at(&self, at: DateTime<Utc>) -> bool {
        self.created_at <= at
    }

    /// Key used for the reference -> amount map and evidence lists.
    pub fn evidence_key(&self) -> String {
        self.reference
            .clone()
            .unwrap_or_else(|| format!("errand:{}", self.id))
    }
}
