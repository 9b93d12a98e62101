//! Execution records: one outcome per test for a single suite run.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of one test in one execution.
///
/// A record may also aggregate several executions, in which case the
/// count is the number of times the test failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    /// The test was not run.
    NotRun,
    /// The test ran and failed this many times (0 = passed).
    Ran(u32),
}

impl Outcome {
    pub const PASS: Outcome = Outcome::Ran(0);
    pub const FAIL: Outcome = Outcome::Ran(1);

    /// Failure count, treating a test that did not run as zero.
    pub fn count(self) -> u32 {
        match self {
            Outcome::NotRun => 0,
            Outcome::Ran(n) => n,
        }
    }

    /// Whether the test ran and failed at least once.
    pub fn is_failure(self) -> bool {
        self.count() > 0
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NotRun => f.write_str("-"),
            Outcome::Ran(n) => write!(f, "{n}"),
        }
    }
}

/// Spellings of the three outcome tokens in history input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenVocabulary {
    /// Token for a passing test.
    pub pass: String,
    /// Token for a failing test.
    pub fail: String,
    /// Token for a test that did not run.
    pub not_run: String,
}

impl Default for TokenVocabulary {
    fn default() -> Self {
        Self {
            pass: "pass".to_string(),
            fail: "fail".to_string(),
            not_run: String::new(),
        }
    }
}

impl TokenVocabulary {
    /// Map a token to its outcome, or `None` if it is not in the vocabulary.
    pub fn parse(&self, token: &str) -> Option<Outcome> {
        if token == self.not_run {
            Some(Outcome::NotRun)
        } else if token == self.pass {
            Some(Outcome::PASS)
        } else if token == self.fail {
            Some(Outcome::FAIL)
        } else {
            None
        }
    }

    /// Token to write for an outcome. Aggregated counts collapse to the fail token.
    pub fn token_for(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::NotRun => &self.not_run,
            Outcome::Ran(0) => &self.pass,
            Outcome::Ran(_) => &self.fail,
        }
    }

    /// Check that the three tokens are pairwise distinct.
    pub fn validate(&self) -> crate::core::Result<()> {
        if self.pass == self.fail || self.pass == self.not_run || self.fail == self.not_run {
            return Err(crate::core::Error::config(format!(
                "outcome tokens must be distinct (pass={:?}, fail={:?}, not_run={:?})",
                self.pass, self.fail, self.not_run
            )));
        }
        Ok(())
    }
}

/// A token that is none of not-run, pass or fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized outcome token {token:?} for test {column}")]
pub struct TokenError {
    /// Index of the test the token belongs to.
    pub column: usize,
    /// The offending token.
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Add,
    Subtract,
}

/// Outcomes of every test in one execution of the suite.
///
/// Records built from input are never edited; only the ledger's summary
/// is updated in place, through [`ExecutionRecord::increment_by`] and
/// [`ExecutionRecord::decrement_by`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionRecord {
    outcomes: Vec<Outcome>,
}

impl ExecutionRecord {
    /// A record of `size` passing outcomes.
    pub fn all_zeroes(size: usize) -> Self {
        Self {
            outcomes: vec![Outcome::PASS; size],
        }
    }

    /// A record where each test independently fails with `failure_probability`.
    ///
    /// The probability is not validated; values at or below 0 never fail and
    /// values above 1 always fail.
    pub fn random<R: Rng + ?Sized>(size: usize, failure_probability: f64, rng: &mut R) -> Self {
        let outcomes = (0..size)
            .map(|_| {
                if rng.gen::<f64>() < failure_probability {
                    Outcome::FAIL
                } else {
                    Outcome::PASS
                }
            })
            .collect();
        Self { outcomes }
    }

    /// Parse tokens spelled with the default vocabulary (`""`, `pass`, `fail`).
    pub fn from_tokens<I, S>(tokens: I) -> std::result::Result<Self, TokenError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_tokens_with(tokens, &TokenVocabulary::default())
    }

    /// Parse tokens spelled with the given vocabulary.
    pub fn from_tokens_with<I, S>(
        tokens: I,
        vocabulary: &TokenVocabulary,
    ) -> std::result::Result<Self, TokenError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let outcomes = tokens
            .into_iter()
            .enumerate()
            .map(|(column, token)| {
                let token = token.as_ref();
                vocabulary.parse(token).ok_or_else(|| TokenError {
                    column,
                    token: token.to_string(),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { outcomes })
    }

    /// Number of tests in this record.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome of the test at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<Outcome> {
        self.outcomes.get(index).copied()
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Whether the test at `index` ran and failed. Out-of-range indices never fail.
    pub fn failed_at(&self, index: usize) -> bool {
        self.get(index).is_some_and(Outcome::is_failure)
    }

    /// Add `other` element-wise into this record.
    pub(crate) fn increment_by(&mut self, other: &ExecutionRecord) {
        self.combine(other, Sign::Add);
    }

    /// Subtract `other` element-wise from this record.
    pub(crate) fn decrement_by(&mut self, other: &ExecutionRecord) {
        self.combine(other, Sign::Subtract);
    }

    /// Element-wise arithmetic with not-run read as zero on both sides.
    /// Every position of the result holds a concrete count.
    ///
    /// Panics on a length mismatch or if a count would leave `u32`; both
    /// mean the caller broke the ledger's bookkeeping.
    fn combine(&mut self, other: &ExecutionRecord, sign: Sign) {
        assert_eq!(
            self.len(),
            other.len(),
            "cannot combine execution records of different lengths"
        );
        for (index, (mine, theirs)) in self.outcomes.iter_mut().zip(&other.outcomes).enumerate() {
            let lhs = mine.count();
            let rhs = theirs.count();
            let value = match sign {
                Sign::Add => lhs.checked_add(rhs),
                Sign::Subtract => lhs.checked_sub(rhs),
            };
            match value {
                Some(value) => *mine = Outcome::Ran(value),
                None => panic!(
                    "failure count for test {index} out of range ({lhs} {sign:?} {rhs})"
                ),
            }
        }
    }
}

impl From<Vec<Outcome>> for ExecutionRecord {
    fn from(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes }
    }
}

impl FromIterator<Outcome> for ExecutionRecord {
    fn from_iter<T: IntoIterator<Item = Outcome>>(iter: T) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ExecutionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{outcome}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(outcomes: &[Outcome]) -> ExecutionRecord {
        ExecutionRecord::from(outcomes.to_vec())
    }

    fn failures(record: &ExecutionRecord) -> u32 {
        record.outcomes().iter().map(|o| o.count()).sum()
    }

    #[test]
    fn test_all_zeroes() {
        let r = ExecutionRecord::all_zeroes(3);
        assert_eq!(r.outcomes(), &[Outcome::PASS; 3]);
        assert_eq!(failures(&r), 0);
        assert!(ExecutionRecord::all_zeroes(0).is_empty());
    }

    #[test]
    fn test_from_tokens_default_vocabulary() {
        let r = ExecutionRecord::from_tokens(["", "pass", "fail"]).unwrap();
        assert_eq!(r.outcomes(), &[Outcome::NotRun, Outcome::PASS, Outcome::FAIL]);
    }

    #[test]
    fn test_from_tokens_rejects_unknown_token() {
        let err = ExecutionRecord::from_tokens(["pass", "maybe", "fail"]).unwrap_err();
        assert_eq!(err.column, 1);
        assert_eq!(err.token, "maybe");
    }

    #[test]
    fn test_from_tokens_is_case_sensitive() {
        assert!(ExecutionRecord::from_tokens(["PASS"]).is_err());
        assert!(ExecutionRecord::from_tokens([" pass"]).is_err());
    }

    #[test]
    fn test_from_tokens_custom_vocabulary() {
        let vocabulary = TokenVocabulary {
            pass: "ok".to_string(),
            fail: "ko".to_string(),
            not_run: "skip".to_string(),
        };
        let r = ExecutionRecord::from_tokens_with(["ok", "ko", "skip"], &vocabulary).unwrap();
        assert_eq!(r.outcomes(), &[Outcome::PASS, Outcome::FAIL, Outcome::NotRun]);
        assert!(ExecutionRecord::from_tokens_with(["pass"], &vocabulary).is_err());
    }

    #[test]
    fn test_vocabulary_validate() {
        assert!(TokenVocabulary::default().validate().is_ok());
        let clash = TokenVocabulary {
            pass: "x".to_string(),
            fail: "x".to_string(),
            not_run: String::new(),
        };
        match clash.validate() {
            Err(crate::core::Error::Config(message)) => assert!(message.contains("distinct")),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_token_for_round_trips_single_outcomes() {
        let vocabulary = TokenVocabulary::default();
        for outcome in [Outcome::NotRun, Outcome::PASS, Outcome::FAIL] {
            assert_eq!(vocabulary.parse(vocabulary.token_for(outcome)), Some(outcome));
        }
        assert_eq!(vocabulary.token_for(Outcome::Ran(7)), "fail");
    }

    #[test]
    fn test_increment_treats_not_run_as_zero() {
        let mut sum = record(&[Outcome::NotRun, Outcome::Ran(2), Outcome::NotRun]);
        sum.increment_by(&record(&[Outcome::FAIL, Outcome::NotRun, Outcome::NotRun]));
        assert_eq!(
            sum.outcomes(),
            &[Outcome::Ran(1), Outcome::Ran(2), Outcome::Ran(0)]
        );
    }

    #[test]
    fn test_decrement_reverses_increment() {
        let base = record(&[Outcome::Ran(3), Outcome::Ran(1), Outcome::Ran(0)]);
        let delta = record(&[Outcome::FAIL, Outcome::NotRun, Outcome::PASS]);
        let mut sum = base.clone();
        sum.increment_by(&delta);
        sum.decrement_by(&delta);
        assert_eq!(sum, base);
    }

    #[test]
    #[should_panic(expected = "different lengths")]
    fn test_combine_rejects_length_mismatch() {
        let mut sum = ExecutionRecord::all_zeroes(2);
        sum.increment_by(&ExecutionRecord::all_zeroes(3));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_decrement_below_zero_panics() {
        let mut sum = ExecutionRecord::all_zeroes(1);
        sum.decrement_by(&record(&[Outcome::FAIL]));
    }

    #[test]
    fn test_random_respects_extreme_probabilities() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(failures(&ExecutionRecord::random(20, 0.0, &mut rng)), 0);
        assert_eq!(failures(&ExecutionRecord::random(20, 1.0, &mut rng)), 20);
    }

    #[test]
    fn test_random_is_reproducible_with_seed() {
        let a = ExecutionRecord::random(50, 0.3, &mut StdRng::seed_from_u64(42));
        let b = ExecutionRecord::random(50, 0.3, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(a.outcomes().iter().all(|o| matches!(o, Outcome::Ran(0 | 1))));
    }

    #[test]
    fn test_failed_at() {
        let r = record(&[Outcome::NotRun, Outcome::PASS, Outcome::Ran(3)]);
        assert!(!r.failed_at(0));
        assert!(!r.failed_at(1));
        assert!(r.failed_at(2));
        assert!(!r.failed_at(3));
    }

    #[test]
    fn test_display() {
        let r = record(&[Outcome::FAIL, Outcome::PASS, Outcome::NotRun]);
        assert_eq!(r.to_string(), "[1, 0, -]");
    }

    #[test]
    fn test_serializes_not_run_as_null() {
        let r = record(&[Outcome::NotRun, Outcome::Ran(2)]);
        assert_eq!(serde_json::to_string(&r).unwrap(), "[null,2]");
        let back: ExecutionRecord = serde_json::from_str("[null,2]").unwrap();
        assert_eq!(back, r);
    }
}
