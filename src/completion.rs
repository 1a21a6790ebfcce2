use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::interest::calendar_month_distance;
use crate::loan::Loan;
use crate::types::{CollateralRef, CompletionReason, LoanId, LoanStatus, OwnerRef};

/// history entry written when a loan leaves the active set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedLoanRecord {
    pub loan_id: LoanId,
    pub owner_ref: OwnerRef,
    pub collateral_ref: CollateralRef,
    pub principal_amount: Money,
    /// amount paid at the moment of completion
    pub total_paid: Money,
    pub start_date: DateTime<Utc>,
    pub completed_date: DateTime<Utc>,
    /// whole months between the raw start and completion instants
    pub duration_months: i64,
    pub reason: CompletionReason,
    /// balance still owed when an expired loan was closed; zero when repaid
    pub written_off: Money,
}

/// move an active loan to its terminal state.
///
/// The loan is kept (with status completed) so payment history can still
/// resolve it. Duration is measured between the raw instants, not between
/// month starts as interest is, so the two counts can differ by one near a
/// month boundary.
pub fn complete(
    loan: &Loan,
    now: DateTime<Utc>,
    reason: CompletionReason,
) -> Result<(CompletedLoanRecord, Loan)> {
    loan.ensure_active()?;

    let written_off = match reason {
        CompletionReason::Repaid => Money::ZERO,
        CompletionReason::Expired => loan.total_amount.max(Money::ZERO),
    };

    let record = CompletedLoanRecord {
        loan_id: loan.id.clone(),
        owner_ref: loan.owner_ref.clone(),
        collateral_ref: loan.collateral_ref.clone(),
        principal_amount: loan.principal_amount,
        total_paid: loan.amount_paid,
        start_date: loan.start_date,
        completed_date: now,
        duration_months: calendar_month_distance(now, loan.start_date),
        reason,
        written_off,
    };

    let mut completed = loan.clone();
    completed.status = LoanStatus::Completed;

    tracing::info!(
        loan_id = %loan.id,
        %reason,
        total_paid = %record.total_paid,
        written_off = %record.written_off,
        "loan completed"
    );

    Ok((record, completed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LoanError;
    use crate::loan::fixtures::{at, loan};

    #[test]
    fn test_complete_repaid() {
        let mut active = loan("LN-200001", 10_000, at(2024, 1, 15));
        active.current_interest = Money::from_major(600);
        active.amount_paid = Money::from_major(10_600);
        active.total_amount = Money::ZERO;

        let (record, done) = complete(&active, at(2024, 4, 20), CompletionReason::Repaid).unwrap();

        assert_eq!(done.status, LoanStatus::Completed);
        assert_eq!(done.id, active.id);
        assert_eq!(record.total_paid, Money::from_major(10_600));
        assert_eq!(record.principal_amount, Money::from_major(10_000));
        assert_eq!(record.completed_date, at(2024, 4, 20));
        assert_eq!(record.duration_months, 3);
        assert_eq!(record.written_off, Money::ZERO);
        assert_eq!(record.reason, CompletionReason::Repaid);
    }

    #[test]
    fn test_expired_records_unrecovered_balance() {
        let mut active = loan("LN-200002", 10_000, at(2024, 1, 10));
        active.current_interest = Money::from_major(2_400);
        active.amount_paid = Money::from_major(1_000);
        active.total_amount = Money::from_major(11_400);

        let (record, done) = complete(&active, at(2025, 1, 2), CompletionReason::Expired).unwrap();

        assert_eq!(done.status, LoanStatus::Completed);
        assert_eq!(done.total_amount, Money::from_major(11_400));
        assert_eq!(record.total_paid, Money::from_major(1_000));
        assert_eq!(record.written_off, Money::from_major(11_400));
    }

    #[test]
    fn test_duration_differs_from_interest_months_near_boundary() {
        // started on the 28th, expired on the 1st: interest counts 12 months,
        // raw-instant duration counts 11
        let active = loan("LN-200003", 10_000, at(2024, 1, 28));
        let (record, _) = complete(&active, at(2025, 1, 1), CompletionReason::Expired).unwrap();
        assert_eq!(record.duration_months, 11);
    }

    #[test]
    fn test_duration_at_month_end() {
        let active = loan("LN-200005", 10_000, at(2024, 1, 31));
        let (record, _) = complete(&active, at(2024, 2, 28), CompletionReason::Repaid).unwrap();
        assert_eq!(record.duration_months, 1);

        let active = loan("LN-200006", 10_000, at(2024, 3, 31));
        let (record, _) = complete(&active, at(2024, 6, 30), CompletionReason::Repaid).unwrap();
        assert_eq!(record.duration_months, 2);
    }

    #[test]
    fn test_cannot_complete_twice() {
        let active = loan("LN-200004", 10_000, at(2024, 1, 1));
        let (_, done) = complete(&active, at(2024, 2, 1), CompletionReason::Repaid).unwrap();

        let again = complete(&done, at(2024, 3, 1), CompletionReason::Expired);
        assert!(matches!(again, Err(LoanError::NotActive { status: LoanStatus::Completed, .. })));
    }
}
