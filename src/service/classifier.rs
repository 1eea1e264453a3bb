use indexmap::IndexSet;

use crate::models::{ClaimSnapshot, MatchResult, StageOutcome};

/// Normalise the terminating stage's outcome into the published result.
///
/// Claim evidence is positional: one entry per matched id, in id order, even
/// when several claims share a reference. Stage evidence (payout references)
/// follows, deduplicated.
pub fn classify(payment_id: i64, outcome: StageOutcome, snapshot: &ClaimSnapshot) -> MatchResult {
    let claim_ids: IndexSet<i64> = outcome.claim_ids.into_iter().collect();

    let mut evidence: Vec<String> = claim_ids
        .iter()
        .map(|id| match snapshot.claim(*id) {
            Some(claim) => claim.evidence_key(),
            None => format!("errand:{}", id),
        })
        .collect();
    let extra: IndexSet<String> = outcome.extra_evidence.into_iter().collect();
    evidence.extend(extra);

    MatchResult {
        payment_id,
        status: outcome.status,
        matched_claim_ids: claim_ids.into_iter().collect(),
        evidence_references: evidence,
        note: outcome.note,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Claim, MatchStatus};
    use chrono::{TimeZone, Utc};

    fn mk(id: i64, reference: Option<&str>) -> Claim {
        Claim {
            id,
            reference: reference.map(str::to_string),
            damage_number: None,
            invoice_reference: None,
            ocr_number: None,
            settlement_amount_minor: Some(100),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            counterparty_insurer: None,
            counterparty_clinic: None,
            distinguishing_key: None,
        }
    }

    #[test]
    fn ids_are_deduplicated_in_first_seen_order() {
        let snapshot = ClaimSnapshot::new(vec![mk(1, Some("A")), mk(2, None), mk(3, Some("A"))], Vec::new());

        let result = classify(
            9,
            StageOutcome::new(MatchStatus::PartialTotalMatch, vec![3, 2, 3, 1]),
            &snapshot,
        );
        assert_eq!(result.matched_claim_ids, vec![3, 2, 1]);
        assert_eq!(
            result.evidence_references,
            vec!["A".to_string(), "errand:2".to_string(), "A".to_string()]
        );
    }

    #[test]
    fn shared_reference_keeps_one_evidence_entry_per_claim() {
        let snapshot = ClaimSnapshot::new(vec![mk(10, Some("555")), mk(11, Some("555"))], Vec::new());

        let result = classify(
            4,
            StageOutcome::new(MatchStatus::PerfectMultipleEachAmount, vec![10, 11])
                .with_evidence(vec!["P-1".to_string(), "P-1".to_string()]),
            &snapshot,
        );
        assert_eq!(result.matched_claim_ids, vec![10, 11]);
        assert_eq!(
            result.evidence_references,
            vec!["555".to_string(), "555".to_string(), "P-1".to_string()]
        );
    }
}
