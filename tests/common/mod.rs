//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use errand_payment_matcher::models::{
    BankRuleSpec, Claim, EntityMapping, EntitySource, IdentifierField, PayoutRecord, RawPayment,
    RuleSpec,
};

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, d, 10, 0, 0).unwrap()
}

pub fn claim(id: i64, reference: &str, amount: i64, created: u32) -> Claim {
    Claim {
        id,
        reference: Some(reference.to_string()),
        damage_number: None,
        invoice_reference: None,
        ocr_number: None,
        settlement_amount_minor: Some(amount),
        created_at: day(created),
        counterparty_insurer: Some("Agria".to_string()),
        counterparty_clinic: Some("Evidensia Specialistdjursjukhuset".to_string()),
        distinguishing_key: Some(format!("pet-{}", id % 3)),
    }
}

pub fn payment(id: i64, amount: i64, reference: Option<&str>, info: Option<&str>, bank: &str) -> RawPayment {
    RawPayment {
        id,
        amount_minor: amount,
        raw_reference: reference.map(str::to_string),
        raw_info: info.map(str::to_string),
        bank_name: Some(bank.to_string()),
        timestamp: Some("2024-06-15T08:30:00Z".to_string()),
    }
}

pub fn payout(reference: &str, amount: i64) -> PayoutRecord {
    PayoutRecord {
        transaction_id: Some(42),
        reference: reference.to_string(),
        amount_minor: amount,
        clinic_name: Some("AniCura Albano".to_string()),
        payout_type: Some("direktreglering".to_string()),
        created_at: day(2),
    }
}

pub fn rule_table() -> Vec<BankRuleSpec> {
    vec![BankRuleSpec {
        bank_prefix: "Agria".to_string(),
        rules: vec![
            RuleSpec {
                field: IdentifierField::Reference,
                pattern: r"(?i)ref[:\s]+(\d+)".to_string(),
            },
            RuleSpec {
                field: IdentifierField::Reference,
                pattern: r"(?i)samt[:\s]+(\d+)".to_string(),
            },
            RuleSpec {
                field: IdentifierField::OtherNumber,
                pattern: r"(?i)faktura[:\s]+(\d+)".to_string(),
            },
            RuleSpec {
                field: IdentifierField::DamageNumber,
                pattern: r"(?i)skadenummer[:\s]+(\d+)".to_string(),
            },
        ],
    }]
}

pub fn entity_table() -> Vec<EntityMapping> {
    vec![EntityMapping {
        bank_name: "AGRIA DJURFORSAKRING".to_string(),
        entity_name: "Agria".to_string(),
        source: EntitySource::InsuranceCompany,
    }]
}
