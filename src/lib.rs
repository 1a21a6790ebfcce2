pub mod accrual;
pub mod batch;
pub mod book;
pub mod completion;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod loan;
pub mod payments;
pub mod store;
pub mod summary;
pub mod types;

// re-export key types
pub use accrual::{AccrualDecision, AccrualOutcome, LoanAccrualEngine, Settlement};
pub use batch::{BatchAccrualRunner, BatchReport, LoanAccrualResult};
pub use book::{LoanBook, NewLoan};
pub use completion::{complete, CompletedLoanRecord};
pub use config::{LoanBookConfig, PolicyConfig};
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use events::{Event, EventStore};
pub use interest::{calendar_month_distance, compute_interest, InterestComputation, InterestPolicy};
pub use loan::Loan;
pub use payments::{apply_payment, apply_payment_with, PaymentDetails, PaymentOutcome, PaymentRecord};
pub use store::{InMemoryLoanStore, LoanCommit, LoanStore};
pub use summary::PortfolioSummary;
pub use types::{CollateralRef, CompletionReason, LoanId, LoanStatus, OwnerRef};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
