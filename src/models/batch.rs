use serde::{Deserialize, Serialize};

use super::{BankRuleSpec, Claim, EntityMapping, MatchResult, PayoutRecord, RawPayment};
use crate::error::InputError;

/// Self-contained batch: payments plus every table the engine reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInput {
    pub payments: Vec<RawPayment>,
    #[serde(default)]
    pub claims: Vec<Claim>,
    #[serde(default)]
    pub payouts: Vec<PayoutRecord>,
    #[serde(default)]
    pub rule_table: Vec<BankRuleSpec>,
    #[serde(default)]
    pub entity_table: Vec<EntityMapping>,
}

/// Payment excluded from a batch before matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedPayment {
    pub payment_id: i64,
    pub reason: String,
}

impl From<InputError> for RejectedPayment {
    fn from(e: InputError) -> Self {
        Self {
            payment_id: e.payment_id(),
            reason: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub results: Vec<MatchResult>,
    pub rejected: Vec<RejectedPayment>,
}
