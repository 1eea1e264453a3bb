pub mod amount;
pub mod classifier;
pub mod entity;
pub mod matcher;
pub mod parser;
pub mod payout;
pub mod pipeline;
pub mod reference;

pub use matcher::MatcherService;
pub use pipeline::{run_input, MatchEngine};
