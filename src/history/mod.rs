//! Test execution history and its running failure totals.

mod ledger;
mod record;

pub use ledger::FailureLedger;
pub use record::{ExecutionRecord, Outcome, TokenError, TokenVocabulary};
