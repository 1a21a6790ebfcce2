use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::completion::{complete, CompletedLoanRecord};
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::loan::Loan;
use crate::types::{CompletionReason, LoanId};

/// append-only payment history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: Uuid,
    pub loan_id: LoanId,
    pub amount: Money,
    pub payment_date: DateTime<Utc>,
    /// loan total immediately after this payment
    pub remaining_amount: Money,
    pub paid_by: Option<String>,
    pub notes: Option<String>,
}

/// optional counter details recorded with a payment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub paid_by: Option<String>,
    pub notes: Option<String>,
}

/// result of applying one payment
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub loan: Loan,
    pub payment: PaymentRecord,
    /// present when the payment cleared the balance
    pub completed: Option<CompletedLoanRecord>,
}

impl PaymentOutcome {
    pub fn is_settled(&self) -> bool {
        self.completed.is_some()
    }
}

pub fn apply_payment(loan: &Loan, amount: Money, now: DateTime<Utc>) -> Result<PaymentOutcome> {
    apply_payment_with(loan, amount, now, PaymentDetails::default())
}

/// apply a repayment against the loan's current total.
///
/// Partial payments are always accepted; anything above the total due is
/// rejected and the loan is left as it was. A payment that brings the total
/// to zero completes the loan as repaid.
pub fn apply_payment_with(
    loan: &Loan,
    amount: Money,
    now: DateTime<Utc>,
    details: PaymentDetails,
) -> Result<PaymentOutcome> {
    loan.ensure_active()?;

    if !amount.is_positive() {
        return Err(LoanError::InvalidAmount { amount });
    }
    if amount > loan.total_amount {
        return Err(LoanError::AmountExceedsDue {
            due: loan.total_amount,
            requested: amount,
        });
    }

    loan.check_ledger()?;

    let mut updated = loan.clone();
    updated.amount_paid += amount;
    updated.total_amount -= amount;

    let settled = !updated.total_amount.is_positive();
    if settled {
        updated.total_amount = Money::ZERO;
    }

    let payment = PaymentRecord {
        payment_id: Uuid::new_v4(),
        loan_id: loan.id.clone(),
        amount,
        payment_date: now,
        remaining_amount: updated.total_amount,
        paid_by: details.paid_by,
        notes: details.notes,
    };

    tracing::info!(
        loan_id = %loan.id,
        %amount,
        remaining = %payment.remaining_amount,
        "payment applied"
    );

    if settled {
        let (record, completed) = complete(&updated, now, CompletionReason::Repaid)?;
        return Ok(PaymentOutcome {
            loan: completed,
            payment,
            completed: Some(record),
        });
    }

    Ok(PaymentOutcome {
        loan: updated,
        payment,
        completed: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accrual::LoanAccrualEngine;
    use crate::config::PolicyConfig;
    use crate::loan::fixtures::{at, loan};
    use crate::types::LoanStatus;

    fn accrued(principal: i64, start: DateTime<Utc>, now: DateTime<Utc>) -> Loan {
        LoanAccrualEngine::new(PolicyConfig::gold_loan())
            .accrue(&loan("LN-400000", principal, start), now)
            .unwrap()
            .loan
    }

    #[test]
    fn test_partial_payment() {
        let current = accrued(10_000, at(2024, 1, 1), at(2024, 4, 1));
        assert_eq!(current.total_amount, Money::from_major(10_600));

        let outcome = apply_payment(&current, Money::from_major(600), at(2024, 4, 2)).unwrap();
        assert_eq!(outcome.loan.amount_paid, Money::from_major(600));
        assert_eq!(outcome.loan.total_amount, Money::from_major(10_000));
        assert_eq!(outcome.loan.total_amount, outcome.loan.expected_total());
        assert_eq!(outcome.payment.remaining_amount, Money::from_major(10_000));
        assert_eq!(outcome.payment.payment_date, at(2024, 4, 2));
        assert!(!outcome.is_settled());
        assert_eq!(outcome.loan.status, LoanStatus::Active);
    }

    #[test]
    fn test_full_repayment_completes() {
        let current = accrued(10_000, at(2024, 1, 1), at(2024, 4, 1));
        assert_eq!(current.current_interest, Money::from_major(600));

        let outcome = apply_payment(&current, Money::from_major(10_600), at(2024, 4, 3)).unwrap();

        assert!(outcome.is_settled());
        assert_eq!(outcome.loan.status, LoanStatus::Completed);
        assert_eq!(outcome.loan.total_amount, Money::ZERO);
        assert_eq!(outcome.payment.remaining_amount, Money::ZERO);

        let record = outcome.completed.unwrap();
        assert_eq!(record.total_paid, Money::from_major(10_600));
        assert_eq!(record.reason, CompletionReason::Repaid);
    }

    #[test]
    fn test_overpayment_rejected() {
        let current = accrued(10_000, at(2024, 1, 1), at(2024, 4, 1));
        let before = current.clone();

        let result = apply_payment(&current, Money::from_str_exact("10600.01").unwrap(), at(2024, 4, 2));
        assert!(matches!(result, Err(LoanError::AmountExceedsDue { .. })));
        assert_eq!(current, before);
    }

    #[test]
    fn test_non_positive_rejected() {
        let current = loan("LN-400001", 10_000, at(2024, 1, 1));

        assert!(matches!(
            apply_payment(&current, Money::ZERO, at(2024, 1, 2)),
            Err(LoanError::InvalidAmount { .. })
        ));
        assert!(matches!(
            apply_payment(&current, Money::from_major(-100), at(2024, 1, 2)),
            Err(LoanError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_completed_loan_rejects_payment() {
        let current = loan("LN-400002", 1_000, at(2024, 1, 1));
        let done = apply_payment(&current, Money::from_major(1_000), at(2024, 1, 2)).unwrap();

        assert!(matches!(
            apply_payment(&done.loan, Money::from_major(1), at(2024, 1, 3)),
            Err(LoanError::NotActive { .. })
        ));
    }

    #[test]
    fn test_details_recorded() {
        let current = loan("LN-400003", 5_000, at(2024, 1, 1));
        let details = PaymentDetails {
            paid_by: Some("Ravi".to_string()),
            notes: Some("cash at counter".to_string()),
        };

        let outcome = apply_payment_with(&current, Money::from_minor(123_456), at(2024, 1, 9), details).unwrap();
        assert_eq!(outcome.payment.paid_by.as_deref(), Some("Ravi"));
        assert_eq!(outcome.payment.notes.as_deref(), Some("cash at counter"));
        assert_eq!(outcome.loan.total_amount, Money::from_str_exact("3765.44").unwrap());
    }

    #[test]
    fn test_invariant_across_mixed_operations() {
        let engine = LoanAccrualEngine::new(PolicyConfig::gold_loan());
        let mut current = loan("LN-400004", 25_000, at(2024, 1, 20));

        let steps: [(DateTime<Utc>, Option<i64>); 8] = [
            (at(2024, 2, 1), None),
            (at(2024, 2, 5), Some(3_000)),
            (at(2024, 3, 1), None),
            (at(2024, 3, 2), Some(750)),
            (at(2024, 3, 2), Some(1)),
            (at(2024, 5, 15), None),
            (at(2024, 5, 16), Some(10_000)),
            (at(2024, 7, 1), None),
        ];

        for (now, payment) in steps {
            current = match payment {
                None => engine.accrue(&current, now).unwrap().loan,
                Some(amount) => apply_payment(&current, Money::from_major(amount), now).unwrap().loan,
            };
            assert_eq!(current.total_amount, current.expected_total());
            assert!(!current.total_amount.is_negative());
        }

        // 6 months of 500 interest, 13_751 paid
        assert_eq!(current.current_interest, Money::from_major(3_000));
        assert_eq!(current.total_amount, Money::from_major(14_249));
    }
}
