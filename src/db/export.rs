use crate::models::MatchResult;
use std::path::Path;

/// Write match results to a CSV report.
pub fn export_to_csv(results: &[MatchResult], output_path: &Path) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record(["payment_id", "status", "errand_ids", "evidence", "note"])?;

    for result in results {
        let ids: Vec<String> = result.matched_claim_ids.iter().map(i64::to_string).collect();
        writer.write_record([
            result.payment_id.to_string(),
            result.status.as_str().to_string(),
            ids.join(";"),
            result.evidence_references.join(";"),
            result.note.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchStatus;

    #[test]
    fn writes_one_line_per_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.csv");
        let results = vec![MatchResult {
            payment_id: 3,
            status: MatchStatus::PartialTotalMatch,
            matched_claim_ids: vec![10, 11],
            evidence_references: vec!["A".to_string(), "B".to_string()],
            note: "2 errands sum to the paid amount".to_string(),
        }];

        export_to_csv(&results, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "payment_id,status,errand_ids,evidence,note");
        assert_eq!(lines[1], "3,partial_total_match,10;11,A;B,2 errands sum to the paid amount");
    }
}
