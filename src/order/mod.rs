//! Greedy test ordering by conditional failure probability.
//!
//! The orderer repeatedly schedules the test that failed most often in the
//! remaining history, then discards every execution in which that test
//! failed: once it runs first, those executions say nothing about which of
//! the other tests is likely to fail next. When no remaining execution
//! records a failure, the unscheduled tests follow in index order.
//!
//! Each execution is added to the ledger summary once and subtracted at
//! most once, and every selection discards at least one execution, so a
//! full ordering costs `O(executions * tests)`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::history::FailureLedger;

/// One greedy choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Index of the scheduled test.
    pub test: usize,
    /// Its failure sum over the working set when it was chosen.
    pub failures: u32,
    /// Executions discarded because this test failed in them.
    pub executions_removed: usize,
}

/// A complete run order for a test suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOrder {
    /// Every test index exactly once, in the order to run them.
    pub order: Vec<usize>,
    /// Tests chosen by failure history, in selection order.
    pub selections: Vec<Selection>,
    /// Tests with no remaining failure signal, ascending.
    pub drained: Vec<usize>,
}

impl TestOrder {
    pub fn into_indices(self) -> Vec<usize> {
        self.order
    }
}

/// Drives a single ledger to a full test order.
///
/// The ledger is consumed: ordering mutates it, so each ordering needs a
/// ledger freshly built from the original records.
pub struct GreedyOrderer {
    ledger: FailureLedger,
}

impl GreedyOrderer {
    pub fn new(ledger: FailureLedger) -> Self {
        Self { ledger }
    }

    /// The ledger in its current state.
    pub fn ledger(&self) -> &FailureLedger {
        &self.ledger
    }

    /// Compute the run order.
    pub fn run(mut self) -> Result<TestOrder> {
        let num_tests = self.ledger.num_tests();
        let mut remaining: BTreeSet<usize> = (0..num_tests).collect();
        let mut order = Vec::with_capacity(num_tests);
        let mut selections = Vec::new();

        // Executions in which every test passed are never removed.
        while let Some(test) = self.ledger.most_failing_test() {
            let failures = self.ledger.failures_of(test).unwrap_or(0);
            order.push(test);
            remaining.remove(&test);
            let executions_removed = self.ledger.remove_if_failing(test)?;
            tracing::debug!(test, failures, executions_removed, "scheduled test");
            selections.push(Selection {
                test,
                failures,
                executions_removed,
            });
        }

        let drained: Vec<usize> = remaining.into_iter().collect();
        order.extend_from_slice(&drained);

        tracing::info!(
            tests = num_tests,
            selected = selections.len(),
            drained = drained.len(),
            "computed test order"
        );

        Ok(TestOrder {
            order,
            selections,
            drained,
        })
    }
}

/// Order the tests of `ledger`, most likely failures first.
pub fn order_tests(ledger: FailureLedger) -> Result<Vec<usize>> {
    Ok(GreedyOrderer::new(ledger).run()?.into_indices())
}
