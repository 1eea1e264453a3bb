pub mod batch;
pub mod claim;
pub mod payment;
pub mod payout;
pub mod result;
pub mod rows;
pub mod rules;
pub mod snapshot;

pub use batch::{BatchInput, BatchOutcome, RejectedPayment};
pub use claim::Claim;
pub use payment::{parse_timestamp, ParsedIdentifiers, PaymentTransaction, RawPayment};
pub use payout::PayoutRecord;
pub use result::{MatchResult, MatchStatus, StageOutcome};
pub use rows::{to_minor_units, ClaimRow, PaymentRow, PayoutRow};
pub use rules::{
    BankRuleSpec, EngineConfig, EntityMapping, EntitySource, EntityTable, IdentifierField,
    ResolvedEntity, RuleSpec, RuleTable,
};
pub use snapshot::ClaimSnapshot;
