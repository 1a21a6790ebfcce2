use serde::{Deserialize, Serialize};
use std::fmt;
use rand::Rng;

/// unique loan identifier, e.g. `LN-482913`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(String);

impl LoanId {
    pub fn new(id: impl Into<String>) -> Self {
        LoanId(id.into())
    }

    /// generate a shop-style id in the range LN-100000..=LN-999999
    pub fn generate() -> Self {
        let n: u32 = rand::thread_rng().gen_range(100_000..=999_999);
        LoanId(format!("LN-{}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LoanId {
    fn from(s: &str) -> Self {
        LoanId::new(s)
    }
}

/// opaque reference to the customer who owns a loan
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerRef(pub String);

/// opaque reference to the pledged gold item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollateralRef(pub String);

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// accruing interest and accepting payments
    Active,
    /// terminal, kept for history
    Completed,
}

/// why a loan left the active set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionReason {
    /// balance paid down to zero
    Repaid,
    /// reached the maturity term
    Expired,
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionReason::Repaid => f.write_str("repaid"),
            CompletionReason::Expired => f.write_str("expired"),
        }
    }
}
