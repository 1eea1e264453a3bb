use std::collections::{BTreeSet, HashMap};

use super::{Claim, IdentifierField, PayoutRecord};

/// Read-only claims + payouts for one batch, with inverted identifier indexes.
///
/// Every lookup returns claims in snapshot order so that candidate discovery
/// order is stable across runs.
#[derive(Debug, Default)]
pub struct ClaimSnapshot {
    claims: Vec<Claim>,
    payouts: Vec<PayoutRecord>,
    by_id: HashMap<i64, usize>,
    by_reference: HashMap<String, Vec<usize>>,
    by_damage_number: HashMap<String, Vec<usize>>,
    by_invoice_reference: HashMap<String, Vec<usize>>,
    by_ocr_number: HashMap<String, Vec<usize>>,
}

fn index_column(
    index: &mut HashMap<String, Vec<usize>>,
    value: Option<&String>,
    pos: usize,
) {
    if let Some(v) = value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
        index.entry(v.to_string()).or_default().push(pos);
    }
}

impl ClaimSnapshot {
    pub fn new(claims: Vec<Claim>, payouts: Vec<PayoutRecord>) -> Self {
        let mut snapshot = Self {
            claims: Vec::new(),
            payouts,
            ..Default::default()
        };

        for (pos, claim) in claims.iter().enumerate() {
            if snapshot.by_id.contains_key(&claim.id) {
                tracing::warn!("Duplicate errand id {} in snapshot, keeping the first", claim.id);
            } else {
                snapshot.by_id.insert(claim.id, pos);
            }
            index_column(&mut snapshot.by_reference, claim.reference.as_ref(), pos);
            index_column(&mut snapshot.by_damage_number, claim.damage_number.as_ref(), pos);
            index_column(&mut snapshot.by_invoice_reference, claim.invoice_reference.as_ref(), pos);
            index_column(&mut snapshot.by_ocr_number, claim.ocr_number.as_ref(), pos);
        }
        snapshot.claims = claims;

        tracing::debug!(
            "Snapshot built: {} errands, {} payouts",
            snapshot.claims.len(),
            snapshot.payouts.len()
        );
        snapshot
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn payouts(&self) -> &[PayoutRecord] {
        &self.payouts
    }

    pub fn claim(&self, id: i64) -> Option<&Claim> {
        self.by_id.get(&id).map(|&pos| &self.claims[pos])
    }

    /// Claims whose column(s) for `field` equal `value` exactly.
    pub fn by_field(&self, field: IdentifierField, value: &str) -> Vec<&Claim> {
        let indexes = match field {
            IdentifierField::Reference => vec![&self.by_reference],
            IdentifierField::OtherNumber => vec![&self.by_invoice_reference, &self.by_ocr_number],
            IdentifierField::DamageNumber => vec![&self.by_damage_number],
        };
        self.collect(&indexes, value)
    }

    /// Claims carrying `value` in any identifier column.
    pub fn by_any_identifier(&self, value: &str) -> Vec<&Claim> {
        self.collect(
            &[
                &self.by_reference,
                &self.by_damage_number,
                &self.by_invoice_reference,
                &self.by_ocr_number,
            ],
            value,
        )
    }

    fn collect(&self, indexes: &[&HashMap<String, Vec<usize>>], value: &str) -> Vec<&Claim> {
        let positions: BTreeSet<usize> = indexes
            .iter()
            .filter_map(|idx| idx.get(value.trim()))
            .flatten()
            .copied()
            .collect();
        positions.into_iter().map(|pos| &self.claims[pos]).collect()
    }
}
