use indexmap::IndexSet;

use crate::models::{MatchStatus, ParsedIdentifiers, PaymentTransaction, PayoutRecord, StageOutcome};

/// Detect payments that settle an already recorded payout.
pub fn verify_payout(
    payment: &PaymentTransaction,
    parsed: &ParsedIdentifiers,
    payouts: &[PayoutRecord],
) -> StageOutcome {
    let identifiers: IndexSet<&str> = parsed.primary().collect();
    if identifiers.is_empty() {
        return StageOutcome::not_found();
    }

    let hits: Vec<&PayoutRecord> = payouts
        .iter()
        .filter(|p| p.amount_minor == payment.amount_minor)
        .filter(|p| identifiers.contains(p.reference.trim()))
        .collect();

    if hits.is_empty() {
        return StageOutcome::not_found();
    }

    let mut note = format!("{} matching payout(s)", hits.len());
    let clinics: IndexSet<&str> = hits.iter().filter_map(|p| p.clinic_name.as_deref()).collect();
    if !clinics.is_empty() {
        note.push_str(&format!("; clinic: {}", clinics.into_iter().collect::<Vec<_>>().join(", ")));
    }
    let types: IndexSet<&str> = hits.iter().filter_map(|p| p.payout_type.as_deref()).collect();
    if !types.is_empty() {
        note.push_str(&format!("; type: {}", types.into_iter().collect::<Vec<_>>().join(", ")));
    }

    let evidence = hits.iter().map(|p| p.reference.trim().to_string()).collect();
    StageOutcome::new(MatchStatus::AlreadyPaidOut, Vec::new())
        .with_evidence(evidence)
        .with_note(note)
}
