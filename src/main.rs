use errand_payment_matcher::db::{load_entity_table, load_rule_table};
use errand_payment_matcher::{
    api, create_pool, AppConfig, EngineConfig, MatchEngine, MatcherResult, MatcherService,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> MatcherResult<()> {
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    // rule/entity tables are loaded once; the engine config is immutable afterwards
    let rules = match &config.matching.rule_table_path {
        Some(path) => load_rule_table(path)?,
        None => {
            tracing::warn!("No rule table configured, memo extraction disabled");
            Vec::new()
        }
    };
    let entities = match &config.matching.entity_table_path {
        Some(path) => load_entity_table(path)?,
        None => {
            tracing::warn!("No entity table configured, entity matching disabled");
            Vec::new()
        }
    };
    let engine_config = EngineConfig::new(&rules, &entities)
        .with_max_subset_candidates(config.matching.max_subset_candidates);
    info!(
        "Engine ready: {} bank rule sets, {} entity mappings, subset cap {}",
        engine_config.rules.len(),
        engine_config.entities.len(),
        engine_config.max_subset_candidates
    );
    let engine = Arc::new(MatchEngine::new(engine_config));

    let pool = create_pool(&config.database).await?;

    let service = Arc::new(
        MatcherService::new(pool, engine).with_export_path(config.matching.export_path.clone()),
    );

    let app = api::router(service).layer(ServiceBuilder::new());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/match/batch   - match stored payments");
    info!("  POST /api/match/inline  - match a self-contained batch");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
