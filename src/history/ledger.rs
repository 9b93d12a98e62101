//! Failure ledger: a shrinking working set of executions plus per-test failure sums.

use std::fmt;

use rand::Rng;

use super::record::{ExecutionRecord, Outcome};
use crate::core::{ensure_contract, Error, Result};

/// Historical executions of a test suite together with how often each test
/// failed across them.
///
/// After every operation `summary[i]` equals the sum of `record[i]` over the
/// records still in the working set, with not-run counted as zero.
/// The working set only ever shrinks, so a ledger drives a single ordering;
/// ordering again requires building a new ledger from the original records.
#[derive(Debug, Clone)]
pub struct FailureLedger {
    num_tests: usize,
    executions: Vec<ExecutionRecord>,
    summary: ExecutionRecord,
}

impl FailureLedger {
    /// Build a ledger from a non-empty collection of equal-length records.
    pub fn new(records: impl IntoIterator<Item = ExecutionRecord>) -> Result<Self> {
        let executions: Vec<ExecutionRecord> = records.into_iter().collect();
        let num_tests = match executions.first() {
            Some(first) => first.len(),
            None => return Err(Error::contract("a failure ledger needs at least one execution")),
        };
        if let Some((index, ragged)) = executions
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != num_tests)
        {
            return Err(Error::contract(format!(
                "execution {index} has {} tests, expected {num_tests}",
                ragged.len()
            )));
        }

        let mut totals = vec![0u64; num_tests];
        for record in &executions {
            for (total, outcome) in totals.iter_mut().zip(record.outcomes()) {
                *total += u64::from(outcome.count());
            }
        }
        if let Some(test) = totals.iter().position(|&t| t > u64::from(u32::MAX)) {
            return Err(Error::contract(format!(
                "failure count for test {test} exceeds {}",
                u32::MAX
            )));
        }

        let mut summary = ExecutionRecord::all_zeroes(num_tests);
        for record in &executions {
            summary.increment_by(record);
        }

        tracing::debug!(
            executions = executions.len(),
            tests = num_tests,
            "built failure ledger"
        );

        Ok(Self {
            num_tests,
            executions,
            summary,
        })
    }

    /// A ledger of `num_executions` random records over `num_tests` tests.
    pub fn random<R: Rng + ?Sized>(
        num_executions: usize,
        num_tests: usize,
        failure_probability: f64,
        rng: &mut R,
    ) -> Result<Self> {
        let records: Vec<_> = (0..num_executions)
            .map(|_| ExecutionRecord::random(num_tests, failure_probability, rng))
            .collect();
        Self::new(records)
    }

    /// Number of tests in each execution.
    pub fn num_tests(&self) -> usize {
        self.num_tests
    }

    /// Number of executions still in the working set.
    pub fn num_executions(&self) -> usize {
        self.executions.len()
    }

    /// The working set, in insertion order.
    pub fn executions(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.executions.iter()
    }

    /// Copy of the per-test failure sums over the working set.
    pub fn summary(&self) -> ExecutionRecord {
        self.summary.clone()
    }

    /// Index of the test with the largest positive failure sum, lowest index
    /// on ties. `None` once no remaining execution records a failure.
    pub fn most_failing_test(&self) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (index, outcome) in self.summary.outcomes().iter().enumerate() {
            let failures = outcome.count();
            if failures > best.map_or(0, |(_, max)| max) {
                best = Some((index, failures));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Current failure sum for one test.
    pub fn failures_of(&self, test_index: usize) -> Option<u32> {
        self.summary.get(test_index).map(Outcome::count)
    }

    /// Drop every execution in which `test_index` failed and subtract it from
    /// the summary. Returns how many executions were dropped.
    pub fn remove_if_failing(&mut self, test_index: usize) -> Result<usize> {
        ensure_contract(test_index < self.num_tests, || {
            format!(
                "test index {test_index} out of range for {} tests",
                self.num_tests
            )
        })?;

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.executions)
            .into_iter()
            .partition(|record| record.failed_at(test_index));
        self.executions = kept;

        for record in &removed {
            self.summary.decrement_by(record);
        }

        tracing::debug!(
            test = test_index,
            removed = removed.len(),
            remaining = self.executions.len(),
            "removed executions failing test"
        );
        Ok(removed.len())
    }
}

impl fmt::Display for FailureLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "FailureLedger({} executions of {} tests):",
            self.num_executions(),
            self.num_tests
        )?;
        for record in &self.executions {
            writeln!(f, "{record}")?;
        }
        write!(f, "Summary: {}", self.summary)
    }
}
