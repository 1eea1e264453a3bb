pub mod export;
pub mod pool;
pub mod queries;
pub mod tables;

pub use export::export_to_csv;
pub use pool::create_pool;
pub use queries::*;
pub use tables::{load_entity_table, load_rule_table};
