//! Ordering reports: a snapshot of the history alongside the computed order.

use serde::Serialize;

use crate::core::Result;
use crate::history::ExecutionRecord;
use crate::loader::History;
use crate::order::{GreedyOrderer, Selection, TestOrder};

/// Everything shown to the user for one ordering run.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReport {
    /// Number of executions in the history.
    pub executions: usize,
    /// Number of tests per execution.
    pub tests: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_names: Option<Vec<String>>,
    /// Every execution record, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ExecutionRecord>>,
    /// Failures per test across the whole history.
    pub summary: ExecutionRecord,
    /// Test indices in run order.
    pub order: Vec<usize>,
    /// Test names in run order, when the history names its tests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_order: Option<Vec<String>>,
    pub selections: Vec<Selection>,
    pub drained: Vec<usize>,
}

impl OrderReport {
    /// Order the tests of `history` and capture the result.
    pub fn build(history: &History, show_history: bool) -> Result<Self> {
        let ledger = history.ledger()?;
        let executions = ledger.num_executions();
        let tests = ledger.num_tests();
        let summary = ledger.summary();

        let TestOrder {
            order,
            selections,
            drained,
        } = GreedyOrderer::new(ledger).run()?;

        let named_order = history
            .test_names
            .as_ref()
            .map(|_| order.iter().map(|&i| history.test_name(i)).collect());

        Ok(Self {
            executions,
            tests,
            test_names: history.test_names.clone(),
            history: show_history.then(|| history.records.clone()),
            summary,
            order,
            named_order,
            selections,
            drained,
        })
    }
}
