use serde::{Deserialize, Serialize};

/// Final classification of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchStatus {
    PerfectSingle,
    PerfectMultipleEachAmount,
    PartialTotalMatch,
    RelevantAmountMismatch,
    EntityMatchedSingle,
    EntityMatchedPartialTotal,
    AlreadyPaidOut,
    NotFound,
}

impl MatchStatus {
    /// Terminal statuses stop the pipeline; the others let later stages try.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::RelevantAmountMismatch | Self::NotFound)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerfectSingle => "perfect_single",
            Self::PerfectMultipleEachAmount => "perfect_multiple_each_amount",
            Self::PartialTotalMatch => "partial_total_match",
            Self::RelevantAmountMismatch => "relevant_amount_mismatch",
            Self::EntityMatchedSingle => "entity_matched_single",
            Self::EntityMatchedPartialTotal => "entity_matched_partial_total",
            Self::AlreadyPaidOut => "already_paid_out",
            Self::NotFound => "not_found",
        }
    }
}

/// Structured outcome for one payment. Never mutated after assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub payment_id: i64,
    pub status: MatchStatus,
    pub matched_claim_ids: Vec<i64>,
    pub evidence_references: Vec<String>,
    pub note: String,
}

/// What a single pipeline stage concluded, before normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub status: MatchStatus,
    pub claim_ids: Vec<i64>,
    /// Proof that is not tied to a matched claim (e.g. payout references).
    pub extra_evidence: Vec<String>,
    pub note: String,
}

impl StageOutcome {
    pub fn new(status: MatchStatus, claim_ids: Vec<i64>) -> Self {
        Self {
            status,
            claim_ids,
            extra_evidence: Vec::new(),
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.extra_evidence = evidence;
        self
    }

    pub fn not_found() -> Self {
        Self::new(MatchStatus::NotFound, Vec::new())
    }
}
