use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Default upper bound on candidates for the combinatorial subset search.
pub const DEFAULT_MAX_SUBSET_CANDIDATES: usize = 20;

/// Payment identifier a bank rule fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentifierField {
    Reference,
    OtherNumber,
    DamageNumber,
}

impl IdentifierField {
    /// Priority order used by reference matching.
    pub const PRIORITY: [IdentifierField; 3] = [
        IdentifierField::Reference,
        IdentifierField::OtherNumber,
        IdentifierField::DamageNumber,
    ];
}

/// One uncompiled rule as stored in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub field: IdentifierField,
    pub pattern: String,
}

/// Rules for all banks whose name starts with `bank_prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankRuleSpec {
    pub bank_prefix: String,
    pub rules: Vec<RuleSpec>,
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub field: IdentifierField,
    pub pattern: Regex,
}

#[derive(Debug, Clone)]
pub struct BankRules {
    pub bank_prefix: String,
    pub rules: Vec<CompiledRule>,
}

/// Compiled bank rule sets. Malformed patterns are dropped at construction.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    banks: Vec<BankRules>,
}

impl RuleTable {
    pub fn compile(specs: &[BankRuleSpec]) -> Self {
        let mut reported: HashSet<&str> = HashSet::new();
        let mut banks = Vec::with_capacity(specs.len());

        for spec in specs {
            let prefix = spec.bank_prefix.trim();
            if prefix.is_empty() {
                tracing::warn!("Rule set with empty bank prefix ignored");
                continue;
            }

            let mut rules = Vec::with_capacity(spec.rules.len());
            for rule in &spec.rules {
                match Regex::new(&rule.pattern) {
                    Ok(pattern) => rules.push(CompiledRule {
                        field: rule.field,
                        pattern,
                    }),
                    Err(e) => {
                        if reported.insert(rule.pattern.as_str()) {
                            tracing::warn!(
                                "Skipping malformed pattern {:?} for bank prefix {}: {}",
                                rule.pattern,
                                prefix,
                                e
                            );
                        }
                    }
                }
            }

            banks.push(BankRules {
                bank_prefix: prefix.to_lowercase(),
                rules,
            });
        }

        Self { banks }
    }

    /// Case-insensitive prefix lookup; the longest matching prefix wins.
    pub fn rules_for(&self, bank_name: &str) -> Option<&BankRules> {
        let bank = bank_name.trim().to_lowercase();
        let mut best: Option<&BankRules> = None;
        for candidate in self.banks.iter().filter(|b| bank.starts_with(&b.bank_prefix)) {
            // equal lengths: first declared wins
            if best.map_or(true, |b| candidate.bank_prefix.len() > b.bank_prefix.len()) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Number of bank prefixes, including those whose patterns all failed to compile.
    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

/// Which counterparty column an entity is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntitySource {
    InsuranceCompany,
    Clinic,
}

/// Bank account name -> payout entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMapping {
    pub bank_name: String,
    pub entity_name: String,
    pub source: EntitySource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntity {
    pub entity_name: String,
    pub source: EntitySource,
    /// Lowercased names a claim counterparty may carry for this entity.
    pub names: BTreeSet<String>,
}

impl ResolvedEntity {
    pub fn is_known_as(&self, name: &str) -> bool {
        self.names.contains(&name.trim().to_lowercase())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    by_bank: HashMap<String, usize>,
    entities: Vec<ResolvedEntity>,
}

impl EntityTable {
    pub fn new(mappings: &[EntityMapping]) -> Self {
        let mut by_bank = HashMap::new();
        let mut by_entity: HashMap<(String, EntitySource), usize> = HashMap::new();
        let mut entities: Vec<ResolvedEntity> = Vec::new();

        for m in mappings {
            let bank = m.bank_name.trim().to_lowercase();
            let entity_key = (m.entity_name.trim().to_lowercase(), m.source);

            let idx = *by_entity.entry(entity_key.clone()).or_insert_with(|| {
                let mut names = BTreeSet::new();
                names.insert(entity_key.0.clone());
                entities.push(ResolvedEntity {
                    entity_name: m.entity_name.trim().to_string(),
                    source: m.source,
                    names,
                });
                entities.len() - 1
            });

            entities[idx].names.insert(bank.clone());

            if by_bank.contains_key(&bank) {
                tracing::warn!("Duplicate entity mapping for bank {:?}, keeping the first", m.bank_name);
                continue;
            }
            by_bank.insert(bank, idx);
        }

        Self { by_bank, entities }
    }

    /// Exact bank name lookup, ignoring case and surrounding whitespace.
    pub fn resolve(&self, bank_name: &str) -> Option<&ResolvedEntity> {
        self.by_bank
            .get(&bank_name.trim().to_lowercase())
            .map(|&idx| &self.entities[idx])
    }

    pub fn len(&self) -> usize {
        self.by_bank.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_bank.is_empty()
    }
}

/// Immutable engine configuration, built once and shared across a batch.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub rules: RuleTable,
    pub entities: EntityTable,
    pub max_subset_candidates: usize,
}

impl EngineConfig {
    pub fn new(rules: &[BankRuleSpec], entities: &[EntityMapping]) -> Self {
        Self {
            rules: RuleTable::compile(rules),
            entities: EntityTable::new(entities),
            max_subset_candidates: DEFAULT_MAX_SUBSET_CANDIDATES,
        }
    }

    pub fn with_max_subset_candidates(mut self, cap: usize) -> Self {
        self.max_subset_candidates = cap;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(&[], &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(prefix: &str, patterns: &[(IdentifierField, &str)]) -> BankRuleSpec {
        BankRuleSpec {
            bank_prefix: prefix.to_string(),
            rules: patterns
                .iter()
                .map(|(field, p)| RuleSpec {
                    field: *field,
                    pattern: p.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn malformed_pattern_is_skipped() {
        let table = RuleTable::compile(&[spec(
            "Agria",
            &[
                (IdentifierField::Reference, r"Ref (\d+"),
                (IdentifierField::DamageNumber, r"Skadenr (\d+)"),
            ],
        )]);

        let bank = table.rules_for("Agria Djurförsäkring").unwrap();
        assert_eq!(bank.rules.len(), 1);
        assert_eq!(bank.rules[0].field, IdentifierField::DamageNumber);
    }

    #[test]
    fn longest_prefix_wins() {
        let table = RuleTable::compile(&[
            spec("Sveland", &[(IdentifierField::Reference, r"(\d+)")]),
            spec("Sveland Djur", &[
                (IdentifierField::Reference, r"(\d+)"),
                (IdentifierField::OtherNumber, r"F(\d+)"),
            ]),
        ]);

        assert_eq!(table.rules_for("SVELAND DJURFÖRSÄKRINGAR").unwrap().rules.len(), 2);
        assert_eq!(table.rules_for("Sveland Sak").unwrap().rules.len(), 1);
        assert!(table.rules_for("Folksam").is_none());
    }

    #[test]
    fn entity_names_include_bank_aliases() {
        let table = EntityTable::new(&[
            EntityMapping {
                bank_name: "AGRIA DJURFORS".to_string(),
                entity_name: "Agria".to_string(),
                source: EntitySource::InsuranceCompany,
            },
            EntityMapping {
                bank_name: "Agria Pet Insurance".to_string(),
                entity_name: "Agria".to_string(),
                source: EntitySource::InsuranceCompany,
            },
        ]);

        let entity = table.resolve("agria djurfors").unwrap();
        assert_eq!(entity.entity_name, "Agria");
        assert!(entity.is_known_as("AGRIA"));
        assert!(entity.is_known_as("Agria Pet Insurance"));
        assert!(table.resolve("Folksam").is_none());
    }
}
