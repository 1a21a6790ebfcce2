use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::loan::Loan;

/// dashboard totals over the active book
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub active_loans: usize,
    pub completed_loans: usize,
    pub total_principal: Money,
    pub total_interest: Money,
    /// principal plus interest, before payments
    pub total_amount: Money,
    /// sum of what is still owed
    pub total_outstanding: Money,
}

impl PortfolioSummary {
    pub fn from_loans<'a, I>(active: I, completed_loans: usize) -> Self
    where
        I: IntoIterator<Item = &'a Loan>,
    {
        let mut summary = Self {
            completed_loans,
            ..Self::default()
        };

        for loan in active.into_iter().filter(|l| l.is_active()) {
            summary.active_loans += 1;
            summary.total_principal += loan.principal_amount;
            summary.total_interest += loan.current_interest;
            summary.total_outstanding += loan.total_amount;
        }
        summary.total_amount = summary.total_principal + summary.total_interest;

        summary
    }
}
