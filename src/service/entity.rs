use std::collections::BTreeMap;

use crate::models::{
    Claim, ClaimSnapshot, EntitySource, EntityTable, MatchStatus, PaymentTransaction, StageOutcome,
};
use crate::service::amount::reconcile_by_sum;

/// (insurer, clinic, distinguishing key)
type GroupKey<'a> = (Option<&'a str>, Option<&'a str>, Option<&'a str>);

/// Fallback matching through the payer entity behind the bank account name.
///
/// Claims of the resolved entity are grouped by counterparties and
/// distinguishing key; the first group (in key order) whose amounts sum
/// exactly to the payment wins.
pub fn match_by_entity(
    payment: &PaymentTransaction,
    snapshot: &ClaimSnapshot,
    entities: &EntityTable,
    max_candidates: usize,
) -> Option<StageOutcome> {
    let Some(entity) = entities.resolve(&payment.bank_name) else {
        tracing::debug!("Payment {}: no entity for bank {:?}", payment.id, payment.bank_name);
        return None;
    };

    let mut groups: BTreeMap<GroupKey<'_>, Vec<&Claim>> = BTreeMap::new();
    for claim in snapshot.claims() {
        if !claim.existed_at(payment.timestamp) {
            continue;
        }
        let counterparty = match entity.source {
            EntitySource::InsuranceCompany => claim.counterparty_insurer.as_deref(),
            EntitySource::Clinic => claim.counterparty_clinic.as_deref(),
        };
        if !counterparty.is_some_and(|name| entity.is_known_as(name)) {
            continue;
        }
        groups
            .entry((
                claim.counterparty_insurer.as_deref(),
                claim.counterparty_clinic.as_deref(),
                claim.distinguishing_key.as_deref(),
            ))
            .or_default()
            .push(claim);
    }

    tracing::debug!(
        "Payment {}: entity {} has {} errand group(s)",
        payment.id,
        entity.entity_name,
        groups.len()
    );

    for claims in groups.values() {
        let Some(outcome) = reconcile_by_sum(payment, claims, max_candidates) else {
            continue;
        };
        let status = match outcome.status {
            MatchStatus::PerfectSingle => MatchStatus::EntityMatchedSingle,
            MatchStatus::PartialTotalMatch => MatchStatus::EntityMatchedPartialTotal,
            _ => continue,
        };
        return Some(
            StageOutcome::new(status, outcome.claim_ids)
                .with_note(format!("matched via payout entity {}", entity.entity_name)),
        );
    }

    None
}
