use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::decimal::{Money, Rate};
use crate::interest::months::{calendar_month_distance, first_of_month};

/// result of evaluating the policy for one loan at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestComputation {
    /// total interest owed since the start date
    pub interest: Money,
    /// calendar month boundaries crossed since the start date
    pub elapsed_months: u32,
    /// elapsed months reached the maturity term
    pub matured: bool,
}

/// total simple interest owed as of `as_of`.
///
/// Months are counted between the first of `start_date`'s month and the
/// first of `as_of`'s month, so crossing a month boundary is what counts,
/// not the number of days. Negative distances clamp to zero.
pub fn compute_interest(
    principal: Money,
    start_date: DateTime<Utc>,
    as_of: DateTime<Utc>,
    monthly_rate: Rate,
) -> (Money, u32) {
    let months = calendar_month_distance(first_of_month(as_of), first_of_month(start_date));
    let elapsed = u32::try_from(months.max(0)).unwrap_or(u32::MAX);
    (principal.simple_interest(monthly_rate, elapsed), elapsed)
}

/// monthly simple-interest policy with a maturity term
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterestPolicy {
    config: PolicyConfig,
}

impl InterestPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn monthly_rate(&self) -> Rate {
        self.config.monthly_rate
    }

    pub fn maturity_months(&self) -> u32 {
        self.config.maturity_months
    }

    pub fn is_matured(&self, elapsed_months: u32) -> bool {
        elapsed_months >= self.config.maturity_months
    }

    /// recompute interest from scratch; calling this any number of times
    /// with the same inputs gives the same answer
    pub fn evaluate(
        &self,
        principal: Money,
        start_date: DateTime<Utc>,
        as_of: DateTime<Utc>,
    ) -> InterestComputation {
        let (interest, elapsed_months) =
            compute_interest(principal, start_date, as_of, self.config.monthly_rate);

        InterestComputation {
            interest,
            elapsed_months,
            matured: self.is_matured(elapsed_months),
        }
    }
}

impl Default for InterestPolicy {
    fn default() -> Self {
        Self::new(PolicyConfig::gold_loan())
    }
}
