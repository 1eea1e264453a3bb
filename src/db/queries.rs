use crate::models::{Claim, ClaimRow, MatchResult, PaymentRow, PayoutRecord, PayoutRow, RawPayment};
use sqlx::PgPool;

/// Load bank payments by id, oldest first.
pub async fn load_payments(pool: &PgPool, payment_ids: &[i64]) -> Result<Vec<RawPayment>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PaymentRow>(
        r#"
        SELECT fid,
               famount,
               freference,
               finfo,
               fbankname,
               to_char(ftimestamp AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') as ftimestamp
        FROM t_bank_payment
        WHERE fid = ANY($1)
        ORDER BY ftimestamp, fid
        "#,
    )
    .bind(payment_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(RawPayment::from).collect())
}

/// Load every errand (the claims snapshot).
pub async fn load_claims(pool: &PgPool) -> Result<Vec<Claim>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ClaimRow>(
        r#"
        SELECT fid, freference, fdamagenumber, finvoicereference, focrnumber,
               fsettlementamount, fcreatetime, finsurer, fclinic, fanimalid
        FROM t_errand
        ORDER BY fcreatetime, fid
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Claim::from).collect())
}

/// Load every recorded payout (the payouts snapshot).
pub async fn load_payouts(pool: &PgPool) -> Result<Vec<PayoutRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PayoutRow>(
        r#"
        SELECT ftransactionid, freference, famount, fclinicname, fpayouttype, fcreatetime
        FROM t_payout
        ORDER BY fcreatetime
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(PayoutRow::into_record).collect())
}

/// Bulk insert match results.
pub async fn insert_results(pool: &PgPool, results: &[MatchResult]) -> Result<(), sqlx::Error> {
    if results.is_empty() {
        return Ok(());
    }

    tracing::debug!("Building result insert, {} rows", results.len());
    let start_time = std::time::Instant::now();

    let mut query_builder = sqlx::QueryBuilder::new(
        "INSERT INTO t_payment_match_result (
            fpaymentid, fstatus, fclaimids, fevidence, fnote, fmatchtime
        ) ",
    );

    let matched_at = chrono::Utc::now();
    query_builder.push_values(results, |mut b, result| {
        b.push_bind(result.payment_id)
            .push_bind(result.status.as_str())
            .push_bind(result.matched_claim_ids.clone())
            .push_bind(result.evidence_references.clone())
            .push_bind(&result.note)
            .push_bind(matched_at);
    });

    // 30 second ceiling per chunk
    let execute_result = tokio::time::timeout(
        std::time::Duration::from_secs(30),
        query_builder.build().execute(pool),
    )
    .await;

    match execute_result {
        Ok(Ok(result)) => {
            tracing::info!(
                "Inserted {} match results in {:?}",
                result.rows_affected(),
                start_time.elapsed()
            );
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!("Result insert failed after {:?}: {:?}", start_time.elapsed(), e);
            Err(e)
        }
        Err(_) => {
            tracing::error!("Result insert timed out (>30s)");
            Err(sqlx::Error::PoolTimedOut)
        }
    }
}
