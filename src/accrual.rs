use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::completion::{complete, CompletedLoanRecord};
use crate::config::PolicyConfig;
use crate::errors::{LoanError, Result};
use crate::interest::{InterestComputation, InterestPolicy};
use crate::loan::Loan;
use crate::types::CompletionReason;

/// what the caller should do after accrual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccrualDecision {
    /// keep the loan active
    None,
    /// loan reached its term and must be completed as expired
    Expire,
}

/// updated snapshot plus what happened to it
#[derive(Debug, Clone, PartialEq)]
pub struct AccrualOutcome {
    pub loan: Loan,
    pub computation: InterestComputation,
    /// snapshot differs from the input and needs writing back
    pub changed: bool,
    pub decision: AccrualDecision,
}

/// accrual followed by the expiry transition when it fired
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub loan: Loan,
    pub computation: InterestComputation,
    pub changed: bool,
    pub completed: Option<CompletedLoanRecord>,
}

/// applies the interest policy to loan snapshots
#[derive(Debug, Clone, Copy, Default)]
pub struct LoanAccrualEngine {
    policy: InterestPolicy,
}

impl LoanAccrualEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            policy: InterestPolicy::new(config),
        }
    }

    pub fn policy(&self) -> &InterestPolicy {
        &self.policy
    }

    /// recompute a loan's interest as of `now`.
    ///
    /// Interest is always recomputed from principal and start date, so any
    /// number of calls converge and a wrong stored value is overwritten. When
    /// interest and total already match, the snapshot comes back untouched,
    /// including `last_interest_updated`.
    pub fn accrue(&self, loan: &Loan, now: DateTime<Utc>) -> Result<AccrualOutcome> {
        loan.ensure_active()?;

        if loan.principal_amount.is_negative() {
            return Err(LoanError::invalid_state(
                &loan.id,
                format!("negative principal {}", loan.principal_amount),
            ));
        }
        if loan.amount_paid.is_negative() {
            return Err(LoanError::invalid_state(
                &loan.id,
                format!("negative amount paid {}", loan.amount_paid),
            ));
        }

        let computation = self.policy.evaluate(loan.principal_amount, loan.start_date, now);

        let mut updated = loan.clone();
        updated.current_interest = computation.interest;
        let expected_total = updated.expected_total();

        let changed = loan.current_interest != computation.interest || loan.total_amount != expected_total;
        if changed {
            updated.total_amount = expected_total;
            // never moves backwards under clock skew
            updated.last_interest_updated = loan.last_interest_updated.max(now);

            tracing::debug!(
                loan_id = %loan.id,
                elapsed_months = computation.elapsed_months,
                previous = %loan.current_interest,
                interest = %computation.interest,
                total = %updated.total_amount,
                "interest recomputed"
            );
        }

        updated.check_ledger()?;

        let decision = if computation.matured {
            AccrualDecision::Expire
        } else {
            AccrualDecision::None
        };

        Ok(AccrualOutcome {
            loan: if changed { updated } else { loan.clone() },
            computation,
            changed,
            decision,
        })
    }

    /// accrue, then complete as expired if the loan has matured
    pub fn accrue_and_settle(&self, loan: &Loan, now: DateTime<Utc>) -> Result<Settlement> {
        let outcome = self.accrue(loan, now)?;

        match outcome.decision {
            AccrualDecision::None => Ok(Settlement {
                loan: outcome.loan,
                computation: outcome.computation,
                changed: outcome.changed,
                completed: None,
            }),
            AccrualDecision::Expire => {
                let (record, loan) = complete(&outcome.loan, now, CompletionReason::Expired)?;
                Ok(Settlement {
                    loan,
                    computation: outcome.computation,
                    changed: true,
                    completed: Some(record),
                })
            }
        }
    }
}
