use indexmap::IndexMap;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::error::TableLoadError;
use crate::models::{BankRuleSpec, EntityMapping, EntitySource, IdentifierField, RuleSpec};

#[derive(Debug, Deserialize)]
struct RuleRow {
    bank_prefix: String,
    field: IdentifierField,
    pattern: String,
}

#[derive(Debug, Deserialize)]
struct EntityRow {
    bank_name: String,
    entity_name: String,
    source: EntitySource,
}

fn open(path: &Path) -> Result<std::fs::File, TableLoadError> {
    std::fs::File::open(path).map_err(|source| TableLoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Read `bank_prefix,field,pattern` rows, grouped by prefix in file order.
pub fn read_rule_table<R: Read>(reader: R, origin: &str) -> Result<Vec<BankRuleSpec>, TableLoadError> {
    let mut grouped: IndexMap<String, Vec<RuleSpec>> = IndexMap::new();
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Fields).from_reader(reader);

    for row in csv_reader.deserialize::<RuleRow>() {
        let row = row.map_err(|source| TableLoadError::Csv {
            path: origin.to_string(),
            source,
        })?;
        grouped.entry(row.bank_prefix).or_default().push(RuleSpec {
            field: row.field,
            pattern: row.pattern,
        });
    }

    Ok(grouped
        .into_iter()
        .map(|(bank_prefix, rules)| BankRuleSpec { bank_prefix, rules })
        .collect())
}

/// Read `bank_name,entity_name,source` rows.
pub fn read_entity_table<R: Read>(reader: R, origin: &str) -> Result<Vec<EntityMapping>, TableLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Fields).from_reader(reader);
    csv_reader
        .deserialize::<EntityRow>()
        .map(|row| -> Result<EntityMapping, TableLoadError> {
            let row = row.map_err(|source| TableLoadError::Csv {
                path: origin.to_string(),
                source,
            })?;
            Ok(EntityMapping {
                bank_name: row.bank_name,
                entity_name: row.entity_name,
                source: row.source,
            })
        })
        .collect()
}

pub fn load_rule_table(path: &Path) -> Result<Vec<BankRuleSpec>, TableLoadError> {
    let table = read_rule_table(open(path)?, &path.display().to_string())?;
    tracing::info!("Loaded {} bank rule set(s) from {}", table.len(), path.display());
    Ok(table)
}

pub fn load_entity_table(path: &Path) -> Result<Vec<EntityMapping>, TableLoadError> {
    let table = read_entity_table(open(path)?, &path.display().to_string())?;
    tracing::info!("Loaded {} entity mapping(s) from {}", table.len(), path.display());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_are_grouped_by_prefix() {
        let csv = "bank_prefix,field,pattern\n\
                   Agria,reference,Ref (\\d+)\n\
                   Sveland,damageNumber,Skada (\\d+)\n\
                   Agria,otherNumber,Faktura (\\d+)\n";
        let table = read_rule_table(csv.as_bytes(), "inline").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].bank_prefix, "Agria");
        assert_eq!(table[0].rules.len(), 2);
        assert_eq!(table[0].rules[1].field, IdentifierField::OtherNumber);
        assert_eq!(table[1].rules[0].pattern, "Skada (\\d+)");
    }

    #[test]
    fn unknown_source_is_an_error() {
        let csv = "bank_name,entity_name,source\nAGRIA,Agria,Bank\n";
        assert!(matches!(
            read_entity_table(csv.as_bytes(), "inline"),
            Err(TableLoadError::Csv { .. })
        ));
    }

    #[test]
    fn entity_rows_load() {
        let csv = "bank_name,entity_name,source\nAGRIA DJURFORS,Agria,InsuranceCompany\nAniCura Bromma,AniCura,Clinic\n";
        let table = read_entity_table(csv.as_bytes(), "inline").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[1].source, EntitySource::Clinic);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_rule_table(Path::new("/nonexistent/rules.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rules.csv"));
    }
}
