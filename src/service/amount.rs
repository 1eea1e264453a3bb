use indexmap::IndexMap;

use crate::models::{Claim, MatchStatus, PaymentTransaction, StageOutcome};

/// Lexicographic k-combinations of `0..n`, the same order as `itertools::combinations`.
struct Combinations {
    n: usize,
    indices: Vec<usize>,
    first: bool,
    done: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            first: true,
            done: k == 0 || k > n,
        }
    }

    fn advance(&mut self) -> Option<&[usize]> {
        if self.done {
            return None;
        }
        if self.first {
            self.first = false;
            return Some(&self.indices);
        }

        let k = self.indices.len();
        let mut i = k;
        while i > 0 {
            i -= 1;
            if self.indices[i] != i + self.n - k {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                return Some(&self.indices);
            }
        }
        self.done = true;
        None
    }
}

/// One entry of the reference -> amount map.
#[derive(Debug, Clone, Copy)]
struct Entry {
    claim_id: i64,
    amount: i64,
}

/// First subset (by size, then discovery order) whose amounts sum to `target`.
fn first_exact_subset(entries: &[Entry], target: i64, max_size: usize) -> Option<Vec<i64>> {
    for size in 1..=max_size.min(entries.len()) {
        let mut combos = Combinations::new(entries.len(), size);
        while let Some(combo) = combos.advance() {
            let sum: i128 = combo.iter().map(|&i| entries[i].amount as i128).sum();
            if sum == target as i128 {
                return Some(combo.iter().map(|&i| entries[i].claim_id).collect());
            }
        }
    }
    None
}

/// Explain the payment amount with one or more candidate claims.
///
/// Enumerates subsets by increasing size, so the cost is exponential in
/// the candidate count. Above `max_candidates` only single claims are
/// tried and the payment is escalated as an amount mismatch.
///
/// Claims are keyed by evidence key (reference, or `errand:<id>`). When
/// several claims share a key, the first one in candidate order supplies
/// both the position and the amount; later duplicates are ignored.
///
/// Returns `None` when there are no candidates at all.
pub fn reconcile_by_sum(
    payment: &PaymentTransaction,
    candidates: &[&Claim],
    max_candidates: usize,
) -> Option<StageOutcome> {
    if candidates.is_empty() {
        return None;
    }

    let mut by_reference: IndexMap<String, Entry> = IndexMap::new();
    for claim in candidates {
        let Some(amount) = claim.settlement_amount_minor else {
            continue;
        };
        by_reference.entry(claim.evidence_key()).or_insert(Entry {
            claim_id: claim.id,
            amount,
        });
    }

    let mut entries: Vec<Entry> = by_reference.into_values().collect();
    // With no negative amounts, zero or oversized entries can never be part
    // of the smallest exact subset.
    if entries.iter().all(|e| e.amount >= 0) {
        entries.retain(|e| e.amount > 0 && e.amount <= payment.amount_minor);
    }

    let max_size = if entries.len() > max_candidates {
        tracing::warn!(
            "Payment {}: {} candidate amounts exceed subset search limit {}, trying single errands only",
            payment.id,
            entries.len(),
            max_candidates
        );
        1
    } else {
        entries.len()
    };

    match first_exact_subset(&entries, payment.amount_minor, max_size) {
        Some(ids) if ids.len() == 1 => Some(StageOutcome::new(MatchStatus::PerfectSingle, ids)),
        Some(ids) => {
            let note = format!("{} errands sum to the paid amount", ids.len());
            Some(StageOutcome::new(MatchStatus::PartialTotalMatch, ids).with_note(note))
        }
        None => {
            let mut note = format!(
                "{} relevant errand(s), no combination matches the amount",
                candidates.len()
            );
            if max_size < entries.len() {
                note.push_str(&format!(" (search limited to {} candidates)", max_candidates));
            }
            Some(StageOutcome::new(MatchStatus::RelevantAmountMismatch, Vec::new()).with_note(note))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn claim(id: i64, reference: &str, amount: Option<i64>) -> Claim {
        Claim {
            id,
            reference: Some(reference.to_string()),
            damage_number: None,
            invoice_reference: None,
            ocr_number: None,
            settlement_amount_minor: amount,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            counterparty_insurer: None,
            counterparty_clinic: None,
            distinguishing_key: None,
        }
    }

    fn payment(amount: i64) -> PaymentTransaction {
        PaymentTransaction {
            id: 1,
            amount_minor: amount,
            raw_reference: None,
            raw_info: None,
            bank_name: "Agria".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn combinations_follow_lexicographic_order() {
        let mut combos = Combinations::new(4, 2);
        let mut seen = Vec::new();
        while let Some(c) = combos.advance() {
            seen.push(c.to_vec());
        }
        assert_eq!(
            seen,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }

    #[test]
    fn empty_candidates_yield_nothing() {
        assert_eq!(reconcile_by_sum(&payment(100), &[], 20), None);
    }

    #[test]
    fn smaller_subsets_win_over_earlier_larger_ones() {
        let claims = [
            claim(1, "A", Some(1000)),
            claim(2, "B", Some(4000)),
            claim(3, "C", Some(5000)),
        ];
        let refs: Vec<&Claim> = claims.iter().collect();
        let outcome = reconcile_by_sum(&payment(5000), &refs, 20).unwrap();
        assert_eq!(outcome.status, MatchStatus::PerfectSingle);
        assert_eq!(outcome.claim_ids, vec![3]);
    }

    #[test]
    fn first_pair_in_discovery_order() {
        let claims = [
            claim(1, "A", Some(2000)),
            claim(2, "B", Some(3000)),
            claim(3, "C", Some(1000)),
            claim(4, "D", Some(4000)),
        ];
        let refs: Vec<&Claim> = claims.iter().collect();
        let outcome = reconcile_by_sum(&payment(5000), &refs, 20).unwrap();
        assert_eq!(outcome.status, MatchStatus::PartialTotalMatch);
        assert_eq!(outcome.claim_ids, vec![1, 2]);
    }

    #[test]
    fn duplicate_references_count_once() {
        let claims = [claim(1, "A", Some(2500)), claim(2, "A", Some(2500))];
        let refs: Vec<&Claim> = claims.iter().collect();
        let outcome = reconcile_by_sum(&payment(5000), &refs, 20).unwrap();
        assert_eq!(outcome.status, MatchStatus::RelevantAmountMismatch);
        assert!(outcome.note.starts_with("2 relevant"));
    }

    #[test]
    fn claims_without_amount_still_count_as_relevant() {
        let claims = [claim(1, "A", None)];
        let refs: Vec<&Claim> = claims.iter().collect();
        let outcome = reconcile_by_sum(&payment(5000), &refs, 20).unwrap();
        assert_eq!(outcome.status, MatchStatus::RelevantAmountMismatch);
        assert!(outcome.claim_ids.is_empty());
    }

    #[test]
    fn cap_limits_search_to_single_claims() {
        let claims: Vec<Claim> = (0..6).map(|i| claim(i, &format!("R{i}"), Some(100))).collect();
        let refs: Vec<&Claim> = claims.iter().collect();

        let outcome = reconcile_by_sum(&payment(200), &refs, 4).unwrap();
        assert_eq!(outcome.status, MatchStatus::RelevantAmountMismatch);
        assert!(outcome.note.contains("limited to 4"));

        let outcome = reconcile_by_sum(&payment(100), &refs, 4).unwrap();
        assert_eq!(outcome.status, MatchStatus::PerfectSingle);
        assert_eq!(outcome.claim_ids, vec![0]);
    }

    #[test]
    fn first_claim_per_reference_supplies_the_amount() {
        let claims = [claim(1, "A", Some(1000)), claim(2, "A", Some(3000))];
        let refs: Vec<&Claim> = claims.iter().collect();

        let outcome = reconcile_by_sum(&payment(1000), &refs, 20).unwrap();
        assert_eq!(outcome.status, MatchStatus::PerfectSingle);
        assert_eq!(outcome.claim_ids, vec![1]);

        let outcome = reconcile_by_sum(&payment(3000), &refs, 20).unwrap();
        assert_eq!(outcome.status, MatchStatus::RelevantAmountMismatch);
    }
}
