use indexmap::IndexSet;

use crate::models::{
    ClaimSnapshot, IdentifierField, MatchStatus, ParsedIdentifiers, PaymentTransaction,
    StageOutcome,
};

/// Result of exact identifier lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceOutcome {
    /// No identifier hit any claim.
    NoCandidates,
    /// Amount confirmed on the identified claim(s).
    Matched(StageOutcome),
    /// Claims were identified but amounts did not confirm. Their references
    /// join the alternate references for sum reconciliation.
    Unresolved {
        candidate_ids: Vec<i64>,
        candidate_references: Vec<String>,
    },
}

fn field_value(parsed: &ParsedIdentifiers, field: IdentifierField) -> Option<&str> {
    match field {
        IdentifierField::Reference => parsed.extracted_reference.as_deref(),
        IdentifierField::OtherNumber => parsed.extracted_other_number.as_deref(),
        IdentifierField::DamageNumber => parsed.extracted_damage_number.as_deref(),
    }
}

pub fn match_by_reference(
    payment: &PaymentTransaction,
    parsed: &ParsedIdentifiers,
    snapshot: &ClaimSnapshot,
) -> ReferenceOutcome {
    let mut candidates: IndexSet<i64> = IndexSet::new();

    for field in IdentifierField::PRIORITY {
        let Some(value) = field_value(parsed, field) else {
            continue;
        };
        let hits: IndexSet<i64> = snapshot
            .by_field(field, value)
            .into_iter()
            .filter(|c| c.existed_at(payment.timestamp))
            .map(|c| c.id)
            .collect();
        if !hits.is_empty() {
            tracing::debug!(
                "Payment {}: {:?} {} hit {} errand(s)",
                payment.id,
                field,
                value,
                hits.len()
            );
        }
        candidates.extend(hits);
    }

    if candidates.is_empty() {
        return ReferenceOutcome::NoCandidates;
    }

    let amount_confirmed = |id: &i64| {
        snapshot
            .claim(*id)
            .and_then(|c| c.settlement_amount_minor)
            .is_some_and(|amount| amount == payment.amount_minor)
    };
    let confirmed: Vec<i64> = candidates.iter().copied().filter(amount_confirmed).collect();

    if confirmed.len() == 1 {
        return ReferenceOutcome::Matched(StageOutcome::new(MatchStatus::PerfectSingle, confirmed));
    }
    if confirmed.len() > 1 && confirmed.len() == candidates.len() {
        return ReferenceOutcome::Matched(
            StageOutcome::new(MatchStatus::PerfectMultipleEachAmount, confirmed)
                .with_note(format!("{} errands each match the full amount", candidates.len())),
        );
    }

    let candidate_ids: Vec<i64> = candidates.into_iter().collect();
    let candidate_references = candidate_ids
        .iter()
        .filter_map(|id| snapshot.claim(*id))
        .filter_map(|c| c.reference.clone())
        .collect();
    ReferenceOutcome::Unresolved {
        candidate_ids,
        candidate_references,
    }
}
