//! cfp - Test ordering by conditional failure probability.
//!
//! Given a history of test suite executions, cfp computes the order in
//! which to run the tests so that failures surface as early as possible.
//! Tests that failed most often are scheduled first; after each choice,
//! executions in which the chosen test failed are set aside, so the next
//! choice reflects failures *not* already explained by earlier tests.
//!
//! # Example
//!
//! ```
//! use cfp::history::{ExecutionRecord, FailureLedger};
//! use cfp::order::order_tests;
//!
//! let records = [
//!     ["fail", "pass", "pass"],
//!     ["fail", "fail", "pass"],
//!     ["pass", "pass", "pass"],
//! ]
//! .into_iter()
//! .map(ExecutionRecord::from_tokens)
//! .collect::<Result<Vec<_>, _>>()
//! .unwrap();
//!
//! let ledger = FailureLedger::new(records).unwrap();
//! assert_eq!(order_tests(ledger).unwrap(), vec![0, 1, 2]);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod history;
pub mod loader;
pub mod order;
pub mod output;
pub mod report;

pub use crate::core::{Error, Result};
pub use history::{ExecutionRecord, FailureLedger, Outcome};
pub use order::{order_tests, GreedyOrderer, TestOrder};
