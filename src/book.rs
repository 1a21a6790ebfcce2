use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};

use crate::accrual::{LoanAccrualEngine, Settlement};
use crate::batch::{BatchAccrualRunner, BatchReport, LoanAccrualResult};
use crate::completion::CompletedLoanRecord;
use crate::config::LoanBookConfig;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::loan::Loan;
use crate::payments::{apply_payment_with, PaymentDetails, PaymentOutcome, PaymentRecord};
use crate::store::{LoanCommit, LoanStore};
use crate::summary::PortfolioSummary;
use crate::types::{CollateralRef, LoanId, OwnerRef};

/// attempts at drawing an unused generated id before giving up
const ID_ATTEMPTS: usize = 16;

/// request to open a new loan
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub owner_ref: OwnerRef,
    pub collateral_ref: CollateralRef,
    pub principal: Money,
    /// backdated start; defaults to now
    pub start_date: Option<DateTime<Utc>>,
}

/// loan book: the store plus the engine, a clock and per-loan locks.
///
/// Each read-compute-write on a loan holds that loan's lock, so accrual and
/// payments on the same loan never interleave. Different loans proceed
/// independently.
pub struct LoanBook<S: LoanStore> {
    store: S,
    config: LoanBookConfig,
    runner: BatchAccrualRunner,
    time: SafeTimeProvider,
    locks: Mutex<HashMap<LoanId, Arc<Mutex<()>>>>,
    events: Mutex<EventStore>,
}

impl<S: LoanStore> LoanBook<S> {
    pub fn new(store: S, config: LoanBookConfig, time: SafeTimeProvider) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            runner: BatchAccrualRunner::new(LoanAccrualEngine::new(config.policy)),
            time,
            locks: Mutex::new(HashMap::new()),
            events: Mutex::new(EventStore::new()),
        })
    }

    /// book driven by the system clock
    pub fn with_system_clock(store: S, config: LoanBookConfig) -> Result<Self> {
        Self::new(store, config, SafeTimeProvider::new(TimeSource::System))
    }

    pub fn config(&self) -> &LoanBookConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.time.now()
    }

    /// open a loan under a freshly generated id
    pub fn originate(&self, request: NewLoan) -> Result<Loan> {
        for _ in 0..ID_ATTEMPTS {
            match self.originate_with_id(LoanId::generate(), request.clone()) {
                Err(LoanError::DuplicateLoan { .. }) => continue,
                other => return other,
            }
        }
        Err(LoanError::StoreUnavailable {
            message: format!("no free loan id after {} attempts", ID_ATTEMPTS),
        })
    }

    pub fn originate_with_id(&self, id: LoanId, request: NewLoan) -> Result<Loan> {
        let key = id.clone();
        self.with_loan_lock(&key, || self.originate_locked(id, request))
    }

    fn originate_locked(&self, id: LoanId, request: NewLoan) -> Result<Loan> {
        if self.store.contains(&id)? {
            return Err(LoanError::DuplicateLoan { loan_id: id });
        }

        let start_date = request.start_date.unwrap_or_else(|| self.now());
        let loan = Loan::originate(
            id,
            request.owner_ref,
            request.collateral_ref,
            request.principal,
            start_date,
        )?;
        self.store.commit(LoanCommit::loan(loan.clone()))?;

        tracing::info!(loan_id = %loan.id, principal = %loan.principal_amount, "loan originated");
        self.emit(Event::LoanOriginated {
            loan_id: loan.id.clone(),
            principal: loan.principal_amount,
            start_date,
        });

        Ok(loan)
    }

    /// bring one loan's interest up to date, completing it if matured
    pub fn refresh(&self, id: &LoanId) -> Result<Settlement> {
        self.with_loan_lock(id, || {
            let now = self.now();
            let loan = self.load(id)?;
            let settlement = self.runner.engine().accrue_and_settle(&loan, now)?;
            self.persist_settlement(&settlement, now)?;
            Ok(settlement)
        })
    }

    /// accrue to now, then apply a repayment.
    ///
    /// Nothing is written if the payment is rejected. If the loan turns out
    /// to have matured, the expiry is recorded and the payment is refused.
    pub fn record_payment(
        &self,
        id: &LoanId,
        amount: Money,
        details: PaymentDetails,
    ) -> Result<PaymentOutcome> {
        self.with_loan_lock(id, || self.pay_locked(id, amount, details))
    }

    fn pay_locked(&self, id: &LoanId, amount: Money, details: PaymentDetails) -> Result<PaymentOutcome> {
        let now = self.now();
        let loan = self.load(id)?;
        let settlement = self.runner.engine().accrue_and_settle(&loan, now)?;

        if settlement.completed.is_some() {
            self.persist_settlement(&settlement, now)?;
            return Err(LoanError::NotActive {
                loan_id: id.clone(),
                status: settlement.loan.status,
            });
        }

        let outcome = apply_payment_with(&settlement.loan, amount, now, details)?;
        self.store.commit(LoanCommit {
            loan: outcome.loan.clone(),
            payment: Some(outcome.payment.clone()),
            completed: outcome.completed.clone(),
        })?;

        if settlement.changed {
            self.emit_accrual(&settlement, now);
        }
        self.emit(Event::PaymentReceived {
            loan_id: id.clone(),
            amount,
            remaining_amount: outcome.payment.remaining_amount,
            timestamp: now,
        });
        if let Some(record) = &outcome.completed {
            self.emit_completion(record);
        }

        Ok(outcome)
    }

    /// accrue every active loan; each loan is locked, reloaded and written
    /// on its own, so a failure on one does not affect the others
    pub fn run_accrual_pass(&self) -> Result<BatchReport> {
        let now = self.now();
        let active = self.store.active_loans()?;

        // walked in order; the per-loan locks would also allow spreading the
        // pass over threads
        let results = active
            .iter()
            .map(|listed| {
                let outcome = self.accrue_locked(&listed.id, now);
                if let Err(err) = &outcome {
                    self.emit(Event::AccrualFailed {
                        loan_id: listed.id.clone(),
                        error: err.to_string(),
                        timestamp: now,
                    });
                }
                LoanAccrualResult {
                    loan_id: listed.id.clone(),
                    outcome,
                }
            })
            .collect();

        Ok(self.runner.finish(results, now))
    }

    fn accrue_locked(&self, id: &LoanId, now: DateTime<Utc>) -> Result<Settlement> {
        self.with_loan_lock(id, || {
            // reload: the listing may be stale by the time the lock is held
            let loan = self.load(id)?;
            let result = self.runner.process_one(&loan, now);
            let settlement = result.outcome?;
            if let Err(err) = self.persist_settlement(&settlement, now) {
                tracing::warn!(loan_id = %id, error = %err, "failed to store accrued loan");
                return Err(err);
            }
            Ok(settlement)
        })
    }

    fn persist_settlement(&self, settlement: &Settlement, now: DateTime<Utc>) -> Result<()> {
        if !settlement.changed {
            return Ok(());
        }

        self.store.commit(LoanCommit {
            loan: settlement.loan.clone(),
            payment: None,
            completed: settlement.completed.clone(),
        })?;

        self.emit_accrual(settlement, now);
        if let Some(record) = &settlement.completed {
            self.emit_completion(record);
        }
        Ok(())
    }

    pub fn loan(&self, id: &LoanId) -> Result<Loan> {
        self.load(id)
    }

    /// active loans, newest start first
    pub fn active_loans(&self) -> Result<Vec<Loan>> {
        let mut loans = self.store.active_loans()?;
        loans.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(loans)
    }

    /// completion history, newest first
    pub fn completed_loans(&self) -> Result<Vec<CompletedLoanRecord>> {
        let mut records = self.store.completed_loans()?;
        records.sort_by(|a, b| b.completed_date.cmp(&a.completed_date));
        Ok(records)
    }

    pub fn payments_for(&self, id: &LoanId) -> Result<Vec<PaymentRecord>> {
        if !self.store.contains(id)? {
            return Err(LoanError::LoanNotFound { loan_id: id.clone() });
        }
        self.store.payments_for(id)
    }

    /// latest payments across all loans; page size is clamped to the
    /// configured maximum
    pub fn recent_payments(&self, limit: Option<usize>) -> Result<Vec<PaymentRecord>> {
        let limit = limit
            .unwrap_or(self.config.recent_payments_default)
            .clamp(1, self.config.recent_payments_max);
        self.store.recent_payments(limit)
    }

    pub fn summary(&self) -> Result<PortfolioSummary> {
        let active = self.store.active_loans()?;
        let completed = self.store.completed_count()?;
        Ok(PortfolioSummary::from_loans(&active, completed))
    }

    pub fn take_events(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(mut events) => events.take_events(),
            Err(poisoned) => poisoned.into_inner().take_events(),
        }
    }

    fn load(&self, id: &LoanId) -> Result<Loan> {
        self.store
            .load(id)?
            .ok_or_else(|| LoanError::LoanNotFound { loan_id: id.clone() })
    }

    /// run `op` while holding the loan's lock. The table entry is dropped
    /// again once no other caller holds or waits on it.
    fn with_loan_lock<T>(&self, id: &LoanId, op: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.loan_lock(id)?;
        let result = acquire(&lock).and_then(|_guard| op());
        self.release_lock(id, lock);
        result
    }

    fn loan_lock(&self, id: &LoanId) -> Result<Arc<Mutex<()>>> {
        let mut locks = self.locks.lock().map_err(|_| LoanError::StoreUnavailable {
            message: "loan lock table poisoned".to_string(),
        })?;
        Ok(locks.entry(id.clone()).or_default().clone())
    }

    fn release_lock(&self, id: &LoanId, lock: Arc<Mutex<()>>) {
        let mut locks = match self.locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        };
        // the table's handle and ours; any other holder got it under this mutex
        if Arc::strong_count(&lock) == 2 {
            locks.remove(id);
        }
    }

    #[cfg(test)]
    fn lock_table_len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or_default()
    }

    fn emit(&self, event: Event) {
        match self.events.lock() {
            Ok(mut events) => events.emit(event),
            Err(poisoned) => poisoned.into_inner().emit(event),
        }
    }

    fn emit_accrual(&self, settlement: &Settlement, now: DateTime<Utc>) {
        self.emit(Event::InterestAccrued {
            loan_id: settlement.loan.id.clone(),
            interest: settlement.loan.current_interest,
            elapsed_months: settlement.computation.elapsed_months,
            total_amount: settlement.loan.total_amount,
            timestamp: now,
        });
    }

    fn emit_completion(&self, record: &CompletedLoanRecord) {
        self.emit(Event::LoanCompleted {
            loan_id: record.loan_id.clone(),
            reason: record.reason,
            total_paid: record.total_paid,
            written_off: record.written_off,
            timestamp: record.completed_date,
        });
    }
}

fn acquire(lock: &Mutex<()>) -> Result<MutexGuard<'_, ()>> {
    lock.lock().map_err(|_| LoanError::StoreUnavailable {
        message: "loan lock poisoned".to_string(),
    })
}
