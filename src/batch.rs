use chrono::{DateTime, Utc};

use crate::accrual::{LoanAccrualEngine, Settlement};
use crate::errors::{LoanError, Result};
use crate::loan::Loan;
use crate::types::LoanId;

/// outcome for one loan in a pass
#[derive(Debug, Clone, PartialEq)]
pub struct LoanAccrualResult {
    pub loan_id: LoanId,
    pub outcome: Result<Settlement>,
}

/// per-loan results of one accrual pass, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub as_of: Option<DateTime<Utc>>,
    pub results: Vec<LoanAccrualResult>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.results.len()
    }

    pub fn settlements(&self) -> impl Iterator<Item = &Settlement> {
        self.results.iter().filter_map(|r| r.outcome.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&LoanId, &LoanError)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref().err().map(|e| (&r.loan_id, e)))
    }

    pub fn succeeded(&self) -> usize {
        self.settlements().count()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    /// loans whose snapshot must be written back
    pub fn changed(&self) -> usize {
        self.settlements().filter(|s| s.changed).count()
    }

    /// loans completed as expired during the pass
    pub fn expired(&self) -> usize {
        self.settlements().filter(|s| s.completed.is_some()).count()
    }
}

/// runs accrual over many loans, isolating failures per loan
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchAccrualRunner {
    engine: LoanAccrualEngine,
}

impl BatchAccrualRunner {
    pub fn new(engine: LoanAccrualEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &LoanAccrualEngine {
        &self.engine
    }

    /// accrue every loan as of `now`; one bad record never stops the rest
    pub fn run_accrual_pass<'a, I>(&self, loans: I, now: DateTime<Utc>) -> BatchReport
    where
        I: IntoIterator<Item = &'a Loan>,
    {
        let results = loans
            .into_iter()
            .map(|loan| self.process_one(loan, now))
            .collect();

        self.finish(results, now)
    }

    pub(crate) fn finish(&self, results: Vec<LoanAccrualResult>, now: DateTime<Utc>) -> BatchReport {
        let report = BatchReport {
            as_of: Some(now),
            results,
        };

        tracing::info!(
            processed = report.processed(),
            changed = report.changed(),
            expired = report.expired(),
            failed = report.failed(),
            "accrual pass finished"
        );

        report
    }

    pub(crate) fn process_one(&self, loan: &Loan, now: DateTime<Utc>) -> LoanAccrualResult {
        let outcome = self.engine.accrue_and_settle(loan, now);
        if let Err(err) = &outcome {
            tracing::warn!(loan_id = %loan.id, error = %err, "failed to accrue interest for loan");
        }
        LoanAccrualResult {
            loan_id: loan.id.clone(),
            outcome,
        }
    }
}
