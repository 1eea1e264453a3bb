pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use db::create_pool;
pub use error::{InputError, MatcherError, MatcherResult, TableLoadError};
pub use models::{BatchInput, BatchOutcome, EngineConfig, MatchResult, MatchStatus};
pub use service::{run_input, MatchEngine, MatcherService};
