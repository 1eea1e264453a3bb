use crate::models::{IdentifierField, ParsedIdentifiers, PaymentTransaction, RuleTable};

/// Digits of `raw`, concatenated. `None` when there are none.
pub fn digits_only(raw: Option<&str>) -> Option<String> {
    let digits: String = raw?.chars().filter(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}

/// Extract identifiers from a payment's reference field and memo text.
///
/// Pure function of its inputs. An unknown bank only disables memo
/// extraction; it never fails.
pub fn parse(
    raw_reference: Option<&str>,
    raw_info: Option<&str>,
    bank_name: &str,
    rules: &RuleTable,
) -> ParsedIdentifiers {
    let mut parsed = ParsedIdentifiers {
        extracted_reference: digits_only(raw_reference),
        ..Default::default()
    };

    if let (Some(info), Some(bank)) = (raw_info, rules.rules_for(bank_name)) {
        for rule in &bank.rules {
            let Some(caps) = rule.pattern.captures(info) else {
                continue;
            };
            let value = caps
                .get(1)
                .or_else(|| caps.get(0))
                .map(|m| m.as_str().trim())
                .unwrap_or_default();
            if value.is_empty() {
                continue;
            }

            let slot = match rule.field {
                IdentifierField::Reference => &mut parsed.extracted_reference,
                IdentifierField::OtherNumber => &mut parsed.extracted_other_number,
                IdentifierField::DamageNumber => &mut parsed.extracted_damage_number,
            };

            if slot.is_none() {
                *slot = Some(value.to_string());
            } else if slot.as_deref() != Some(value) {
                parsed.alternate_references.insert(value.to_string());
            }
        }
    }

    // reference > other number > damage number
    if parsed.extracted_damage_number.is_some()
        && parsed.extracted_damage_number == parsed.extracted_other_number
    {
        parsed.extracted_damage_number = None;
    }
    if parsed.extracted_other_number.is_some()
        && parsed.extracted_reference == parsed.extracted_other_number
    {
        parsed.extracted_other_number = None;
    }
    if parsed.extracted_damage_number.is_some()
        && parsed.extracted_reference == parsed.extracted_damage_number
    {
        parsed.extracted_damage_number = None;
    }

    parsed
}

/// [`parse`] over a validated payment's fields.
pub fn parse_payment(payment: &PaymentTransaction, rules: &RuleTable) -> ParsedIdentifiers {
    parse(
        payment.raw_reference.as_deref(),
        payment.raw_info.as_deref(),
        &payment.bank_name,
        rules,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BankRuleSpec, RuleSpec};

    fn agria_rules() -> RuleTable {
        RuleTable::compile(&[BankRuleSpec {
            bank_prefix: "Agria".to_string(),
            rules: vec![
                RuleSpec {
                    field: IdentifierField::Reference,
                    pattern: r"(?i)ref(?:erens)?[:\s]+(\d{6,})".to_string(),
                },
                RuleSpec {
                    field: IdentifierField::OtherNumber,
                    pattern: r"(?i)faktura[:\s]+(\d+)".to_string(),
                },
                RuleSpec {
                    field: IdentifierField::DamageNumber,
                    pattern: r"(?i)skadenr[:\s]+(\d+)".to_string(),
                },
                RuleSpec {
                    field: IdentifierField::Reference,
                    pattern: r"(?i)samt[:\s]+(\d{6,})".to_string(),
                },
            ],
        }])
    }

    #[test]
    fn reference_digits_are_concatenated() {
        let parsed = parse(Some("OCR 1000-5227 04"), None, "Unknown", &RuleTable::default());
        assert_eq!(parsed.extracted_reference.as_deref(), Some("1000522704"));

        let parsed = parse(Some("no digits"), None, "Unknown", &RuleTable::default());
        assert_eq!(parsed.extracted_reference, None);
    }

    #[test]
    fn unknown_bank_skips_memo_extraction() {
        let parsed = parse(None, Some("Faktura: 998877"), "Folksam", &agria_rules());
        assert!(parsed.is_empty());
    }

    #[test]
    fn second_reference_goes_to_alternates() {
        let parsed = parse(
            Some("1000522704"),
            Some("Ref: 1000522711 samt 1000522799"),
            "Agria Djurförsäkring",
            &agria_rules(),
        );
        assert_eq!(parsed.extracted_reference.as_deref(), Some("1000522704"));
        let alternates: Vec<&str> = parsed.alternate_references.iter().map(String::as_str).collect();
        assert_eq!(alternates, vec!["1000522711", "1000522799"]);
    }

    #[test]
    fn damage_number_yields_to_other_number() {
        let parsed = parse(
            None,
            Some("Faktura: 4455 Skadenr: 4455"),
            "Agria",
            &agria_rules(),
        );
        assert_eq!(parsed.extracted_other_number.as_deref(), Some("4455"));
        assert_eq!(parsed.extracted_damage_number, None);
    }

    #[test]
    fn reference_wins_over_other_number() {
        let parsed = parse(Some("4455"), Some("Faktura: 4455 Skadenr: 4455"), "Agria", &agria_rules());
        assert_eq!(parsed.extracted_reference.as_deref(), Some("4455"));
        assert_eq!(parsed.extracted_other_number, None);
        assert_eq!(parsed.extracted_damage_number, None);
    }

    #[test]
    fn damage_number_yields_to_reference() {
        let parsed = parse(
            Some("1000522704"),
            Some("Faktura: 998877 Skadenr: 1000522704"),
            "Agria",
            &agria_rules(),
        );
        assert_eq!(parsed.extracted_reference.as_deref(), Some("1000522704"));
        assert_eq!(parsed.extracted_other_number.as_deref(), Some("998877"));
        assert_eq!(parsed.extracted_damage_number, None);
    }
}
