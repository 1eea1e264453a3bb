use crate::db::{export_to_csv, queries};
use crate::error::MatcherResult;
use crate::models::{BatchOutcome, ClaimSnapshot};
use crate::service::MatchEngine;
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;

/// Database-backed batch matching.
///
/// Loads the full snapshot up front, runs the engine off the async
/// runtime, then persists the results.
pub struct MatcherService {
    pool: PgPool,
    engine: Arc<MatchEngine>,
    export_path: Option<PathBuf>,
}

impl MatcherService {
    pub fn new(pool: PgPool, engine: Arc<MatchEngine>) -> Self {
        Self {
            pool,
            engine,
            export_path: None,
        }
    }

    pub fn with_export_path(mut self, path: Option<PathBuf>) -> Self {
        self.export_path = path;
        self
    }

    pub async fn match_payments(&self, payment_ids: &[i64]) -> MatcherResult<BatchOutcome> {
        let start = std::time::Instant::now();

        let (payments, claims, payouts) = futures::try_join!(
            queries::load_payments(&self.pool, payment_ids),
            queries::load_claims(&self.pool),
            queries::load_payouts(&self.pool),
        )?;
        tracing::info!(
            "Snapshot loaded: {} payments ({} requested), {} errands, {} payouts in {:?}",
            payments.len(),
            payment_ids.len(),
            claims.len(),
            payouts.len(),
            start.elapsed()
        );

        let engine = Arc::clone(&self.engine);
        let outcome = tokio::task::spawn_blocking(move || {
            let snapshot = ClaimSnapshot::new(claims, payouts);
            engine.run_batch(payments, &snapshot)
        })
        .await?;

        for chunk in outcome.results.chunks(1000) {
            queries::insert_results(&self.pool, chunk).await?;
        }

        if let Some(path) = &self.export_path {
            export_to_csv(&outcome.results, path)?;
            tracing::info!("Exported {} results to {}", outcome.results.len(), path.display());
        }

        tracing::info!(
            "Batch of {} payments finished in {:?}",
            payment_ids.len(),
            start.elapsed()
        );
        Ok(outcome)
    }
}
