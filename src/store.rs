use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::completion::CompletedLoanRecord;
use crate::errors::{LoanError, Result};
use crate::loan::Loan;
use crate::payments::PaymentRecord;
use crate::types::LoanId;

/// everything one operation writes back for a single loan
#[derive(Debug, Clone, PartialEq)]
pub struct LoanCommit {
    pub loan: Loan,
    pub payment: Option<PaymentRecord>,
    pub completed: Option<CompletedLoanRecord>,
}

impl LoanCommit {
    pub fn loan(loan: Loan) -> Self {
        Self {
            loan,
            payment: None,
            completed: None,
        }
    }
}

/// persistence boundary for loans and their history.
///
/// `commit` must apply the snapshot and its history entries together: after
/// a failure the store holds either all of them or none.
pub trait LoanStore: Send + Sync {
    fn load(&self, id: &LoanId) -> Result<Option<Loan>>;

    fn contains(&self, id: &LoanId) -> Result<bool>;

    fn active_loans(&self) -> Result<Vec<Loan>>;

    fn commit(&self, commit: LoanCommit) -> Result<()>;

    fn payments_for(&self, id: &LoanId) -> Result<Vec<PaymentRecord>>;

    /// newest first
    fn recent_payments(&self, limit: usize) -> Result<Vec<PaymentRecord>>;

    fn completed_loans(&self) -> Result<Vec<CompletedLoanRecord>>;

    fn completed_count(&self) -> Result<usize>;
}

#[derive(Debug, Default)]
struct Tables {
    loans: HashMap<LoanId, Loan>,
    payments: Vec<PaymentRecord>,
    completed: Vec<CompletedLoanRecord>,
}

/// process-local store
#[derive(Debug, Default)]
pub struct InMemoryLoanStore {
    tables: RwLock<Tables>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| LoanError::StoreUnavailable {
            message: "loan table lock poisoned".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| LoanError::StoreUnavailable {
            message: "loan table lock poisoned".to_string(),
        })
    }
}

impl LoanStore for InMemoryLoanStore {
    fn load(&self, id: &LoanId) -> Result<Option<Loan>> {
        Ok(self.read()?.loans.get(id).cloned())
    }

    fn contains(&self, id: &LoanId) -> Result<bool> {
        Ok(self.read()?.loans.contains_key(id))
    }

    fn active_loans(&self) -> Result<Vec<Loan>> {
        Ok(self
            .read()?
            .loans
            .values()
            .filter(|l| l.is_active())
            .cloned()
            .collect())
    }

    fn commit(&self, commit: LoanCommit) -> Result<()> {
        let mut tables = self.write()?;
        if let Some(payment) = commit.payment {
            tables.payments.push(payment);
        }
        if let Some(completed) = commit.completed {
            tables.completed.push(completed);
        }
        tables.loans.insert(commit.loan.id.clone(), commit.loan);
        Ok(())
    }

    fn payments_for(&self, id: &LoanId) -> Result<Vec<PaymentRecord>> {
        Ok(self
            .read()?
            .payments
            .iter()
            .filter(|p| &p.loan_id == id)
            .cloned()
            .collect())
    }

    fn recent_payments(&self, limit: usize) -> Result<Vec<PaymentRecord>> {
        let mut payments = self.read()?.payments.clone();
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        payments.truncate(limit);
        Ok(payments)
    }

    fn completed_loans(&self) -> Result<Vec<CompletedLoanRecord>> {
        Ok(self.read()?.completed.clone())
    }

    fn completed_count(&self) -> Result<usize> {
        Ok(self.read()?.completed.len())
    }
}
