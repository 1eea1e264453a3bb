use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::models::{
    BatchInput, BatchOutcome, Claim, ClaimSnapshot, EngineConfig, MatchResult, MatchStatus,
    PaymentTransaction, RawPayment, RejectedPayment, StageOutcome,
};
use crate::service::amount::reconcile_by_sum;
use crate::service::classifier::classify;
use crate::service::entity::match_by_entity;
use crate::service::parser::parse_payment;
use crate::service::payout::verify_payout;
use crate::service::reference::{match_by_reference, ReferenceOutcome};

/// Payment-to-errand reconciliation engine.
///
/// Stateless between payments: every result is a pure function of the
/// payment, the snapshot and the configuration, so a batch can be
/// processed in parallel without locking.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: EngineConfig,
}

impl MatchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run the staged pipeline for one validated payment.
    ///
    /// parse -> reference -> sum -> entity -> payout -> classify. A terminal
    /// status short-circuits; an amount mismatch is kept unless a later
    /// stage finds a match.
    pub fn match_payment(&self, payment: &PaymentTransaction, snapshot: &ClaimSnapshot) -> MatchResult {
        let parsed = parse_payment(payment, &self.config.rules);

        let mut lookup_keys: IndexSet<String> = parsed.alternate_references.clone();
        let mut carried_ids: Vec<i64> = Vec::new();

        match match_by_reference(payment, &parsed, snapshot) {
            ReferenceOutcome::Matched(outcome) => return self.finish(payment, outcome, snapshot),
            ReferenceOutcome::Unresolved {
                candidate_ids,
                candidate_references,
            } => {
                lookup_keys.extend(candidate_references);
                carried_ids = candidate_ids;
            }
            ReferenceOutcome::NoCandidates => {}
        }

        let candidates = sum_candidates(payment, snapshot, &lookup_keys, &carried_ids);
        let mut fallback = None;
        if let Some(outcome) = reconcile_by_sum(payment, &candidates, self.config.max_subset_candidates) {
            if outcome.status.is_terminal() {
                return self.finish(payment, outcome, snapshot);
            }
            fallback = Some(outcome);
        }

        if let Some(outcome) = match_by_entity(
            payment,
            snapshot,
            &self.config.entities,
            self.config.max_subset_candidates,
        ) {
            return self.finish(payment, outcome, snapshot);
        }

        let outcome = verify_payout(payment, &parsed, snapshot.payouts());
        let outcome = match (outcome.status, fallback) {
            (MatchStatus::AlreadyPaidOut, _) => outcome,
            (_, Some(mismatch)) => mismatch,
            (_, None) => outcome,
        };
        self.finish(payment, outcome, snapshot)
    }

    fn finish(
        &self,
        payment: &PaymentTransaction,
        outcome: StageOutcome,
        snapshot: &ClaimSnapshot,
    ) -> MatchResult {
        let result = classify(payment.id, outcome, snapshot);
        tracing::debug!(
            "Payment {}: {} -> {:?}",
            payment.id,
            result.status.as_str(),
            result.matched_claim_ids
        );
        result
    }

    /// Validate and match a batch. Results keep the input order of the
    /// accepted payments; rejected payments are listed separately.
    pub fn run_batch(&self, payments: Vec<RawPayment>, snapshot: &ClaimSnapshot) -> BatchOutcome {
        let mut accepted = Vec::with_capacity(payments.len());
        let mut rejected = Vec::new();
        for raw in payments {
            match PaymentTransaction::try_from(raw) {
                Ok(payment) => accepted.push(payment),
                Err(e) => {
                    tracing::warn!("{}", e);
                    rejected.push(RejectedPayment::from(e));
                }
            }
        }

        let results: Vec<MatchResult> = accepted
            .par_iter()
            .map(|payment| self.match_payment(payment, snapshot))
            .collect();

        let mut per_status: BTreeMap<MatchStatus, usize> = BTreeMap::new();
        for r in &results {
            *per_status.entry(r.status).or_default() += 1;
        }
        let summary: Vec<String> = per_status
            .iter()
            .map(|(status, count)| format!("{}={}", status.as_str(), count))
            .collect();
        tracing::info!(
            "Batch matched: {} payments, {} rejected [{}]",
            results.len(),
            rejected.len(),
            summary.join(", ")
        );

        BatchOutcome { results, rejected }
    }
}

/// Build engine + snapshot from a self-contained input and run it.
pub fn run_input(input: BatchInput) -> BatchOutcome {
    let engine = MatchEngine::new(EngineConfig::new(&input.rule_table, &input.entity_table));
    let snapshot = ClaimSnapshot::new(input.claims, input.payouts);
    engine.run_batch(input.payments, &snapshot)
}

/// Candidates for sum reconciliation: claims carrying any lookup key, in
/// key order, followed by the identified-but-unconfirmed claims.
fn sum_candidates<'a>(
    payment: &PaymentTransaction,
    snapshot: &'a ClaimSnapshot,
    lookup_keys: &IndexSet<String>,
    carried_ids: &[i64],
) -> Vec<&'a Claim> {
    let mut found: IndexMap<i64, &'a Claim> = IndexMap::new();
    for key in lookup_keys {
        for claim in snapshot.by_any_identifier(key) {
            if claim.existed_at(payment.timestamp) {
                found.entry(claim.id).or_insert(claim);
            }
        }
    }
    for id in carried_ids {
        if let Some(claim) = snapshot.claim(*id) {
            found.entry(claim.id).or_insert(claim);
        }
    }
    found.into_values().collect()
}
