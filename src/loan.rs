use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::{CollateralRef, LoanId, LoanStatus, OwnerRef};

/// loan snapshot as read from and written back to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    // identification
    pub id: LoanId,
    pub owner_ref: OwnerRef,
    pub collateral_ref: CollateralRef,

    // fixed at origination
    pub principal_amount: Money,
    pub start_date: DateTime<Utc>,

    // derived balances
    pub current_interest: Money,
    pub amount_paid: Money,
    pub total_amount: Money,

    pub last_interest_updated: DateTime<Utc>,
    pub status: LoanStatus,
}

impl Loan {
    /// new active loan: no interest, nothing paid, total equals principal
    pub fn originate(
        id: LoanId,
        owner_ref: OwnerRef,
        collateral_ref: CollateralRef,
        principal_amount: Money,
        start_date: DateTime<Utc>,
    ) -> Result<Self> {
        if !principal_amount.is_positive() {
            return Err(LoanError::InvalidAmount {
                amount: principal_amount,
            });
        }

        Ok(Self {
            id,
            owner_ref,
            collateral_ref,
            principal_amount,
            start_date,
            current_interest: Money::ZERO,
            amount_paid: Money::ZERO,
            total_amount: principal_amount,
            last_interest_updated: start_date,
            status: LoanStatus::Active,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// principal + interest - paid
    pub fn expected_total(&self) -> Money {
        self.principal_amount + self.current_interest - self.amount_paid
    }

    /// reject snapshots whose ledger cannot be right
    pub fn check_ledger(&self) -> Result<()> {
        if self.principal_amount.is_negative() {
            return Err(LoanError::invalid_state(
                &self.id,
                format!("negative principal {}", self.principal_amount),
            ));
        }
        if self.current_interest.is_negative() {
            return Err(LoanError::invalid_state(
                &self.id,
                format!("negative interest {}", self.current_interest),
            ));
        }
        if self.amount_paid.is_negative() {
            return Err(LoanError::invalid_state(
                &self.id,
                format!("negative amount paid {}", self.amount_paid),
            ));
        }
        if self.total_amount.is_negative() {
            return Err(LoanError::invalid_state(
                &self.id,
                format!("negative total amount {}", self.total_amount),
            ));
        }
        if self.amount_paid > self.principal_amount + self.current_interest {
            return Err(LoanError::invalid_state(
                &self.id,
                format!(
                    "amount paid {} exceeds principal {} plus interest {}",
                    self.amount_paid, self.principal_amount, self.current_interest
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(LoanError::NotActive {
                loan_id: self.id.clone(),
                status: self.status,
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    pub fn loan(id: &str, principal: i64, start: DateTime<Utc>) -> Loan {
        Loan::originate(
            LoanId::new(id),
            OwnerRef(format!("user-{}", id)),
            CollateralRef(format!("gold-{}", id)),
            Money::from_major(principal),
            start,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_originate() {
        let start = at(2024, 1, 10);
        let loan = loan("LN-100001", 50_000, start);

        assert_eq!(loan.total_amount, Money::from_major(50_000));
        assert_eq!(loan.current_interest, Money::ZERO);
        assert_eq!(loan.amount_paid, Money::ZERO);
        assert_eq!(loan.last_interest_updated, start);
        assert!(loan.is_active());
        assert!(loan.check_ledger().is_ok());
        assert_eq!(loan.expected_total(), loan.total_amount);
    }

    #[test]
    fn test_originate_rejects_non_positive_principal() {
        let result = Loan::originate(
            LoanId::new("LN-100002"),
            OwnerRef("u".to_string()),
            CollateralRef("g".to_string()),
            Money::ZERO,
            at(2024, 1, 1),
        );
        assert!(matches!(result, Err(LoanError::InvalidAmount { .. })));
    }

    #[test]
    fn test_check_ledger_catches_corruption() {
        let mut bad = loan("LN-100003", 10_000, at(2024, 1, 1));
        bad.amount_paid = Money::from_major(10_001);
        assert!(matches!(bad.check_ledger(), Err(LoanError::InvalidLoanState { .. })));

        let mut bad = loan("LN-100004", 10_000, at(2024, 1, 1));
        bad.principal_amount = Money::from_major(-5);
        assert!(matches!(bad.check_ledger(), Err(LoanError::InvalidLoanState { .. })));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let loan = loan("LN-100005", 10_000, at(2024, 1, 1));
        let json = serde_json::to_value(&loan).unwrap();
        assert_eq!(json["id"], "LN-100005");
        assert_eq!(json["status"], "active");
        assert_eq!(json["principal_amount"], "10000");

        let back: Loan = serde_json::from_value(json).unwrap();
        assert_eq!(back, loan);
    }
}
