use thiserror::Error;

use crate::decimal::Money;
use crate::types::{LoanId, LoanStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoanError {
    #[error("invalid payment amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("payment exceeds due amount: due {due}, requested {requested}")]
    AmountExceedsDue {
        due: Money,
        requested: Money,
    },

    #[error("invalid state for loan {loan_id}: {reason}")]
    InvalidLoanState {
        loan_id: LoanId,
        reason: String,
    },

    #[error("loan not found: {loan_id}")]
    LoanNotFound {
        loan_id: LoanId,
    },

    #[error("loan {loan_id} not active: current status is {status:?}")]
    NotActive {
        loan_id: LoanId,
        status: LoanStatus,
    },

    #[error("loan already exists: {loan_id}")]
    DuplicateLoan {
        loan_id: LoanId,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("loan store unavailable: {message}")]
    StoreUnavailable {
        message: String,
    },
}

impl LoanError {
    pub(crate) fn invalid_state(loan_id: &LoanId, reason: impl Into<String>) -> Self {
        LoanError::InvalidLoanState {
            loan_id: loan_id.clone(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
