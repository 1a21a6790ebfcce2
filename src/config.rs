use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{LoanError, Result};

/// interest policy parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// simple interest charged per elapsed calendar month
    #[serde(default = "default_monthly_rate")]
    pub monthly_rate: Rate,
    /// elapsed months after which a loan is force-completed as expired
    #[serde(default = "default_maturity_months")]
    pub maturity_months: u32,
}

fn default_monthly_rate() -> Rate {
    Rate::from_decimal(dec!(0.02))
}

fn default_maturity_months() -> u32 {
    12
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::gold_loan()
    }
}

impl PolicyConfig {
    /// standard shop terms: 2% per month, one-year term
    pub fn gold_loan() -> Self {
        Self {
            monthly_rate: default_monthly_rate(),
            maturity_months: default_maturity_months(),
        }
    }

    pub fn new(monthly_rate: Rate, maturity_months: u32) -> Result<Self> {
        let config = Self {
            monthly_rate,
            maturity_months,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.monthly_rate.is_negative() {
            return Err(LoanError::InvalidConfiguration {
                message: format!("monthly rate must not be negative, got {}", self.monthly_rate),
            });
        }
        if self.maturity_months == 0 {
            return Err(LoanError::InvalidConfiguration {
                message: "maturity must be at least one month".to_string(),
            });
        }
        Ok(())
    }

    /// parse and validate from json; missing fields take the shop defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| LoanError::InvalidConfiguration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// loan book settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanBookConfig {
    #[serde(default)]
    pub policy: PolicyConfig,
    /// page size for recent payments when the caller gives none
    #[serde(default = "default_recent_payments")]
    pub recent_payments_default: usize,
    /// hard cap on recent payments page size
    #[serde(default = "default_recent_payments_max")]
    pub recent_payments_max: usize,
}

fn default_recent_payments() -> usize {
    10
}

fn default_recent_payments_max() -> usize {
    100
}

impl Default for LoanBookConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::gold_loan(),
            recent_payments_default: default_recent_payments(),
            recent_payments_max: default_recent_payments_max(),
        }
    }
}

impl LoanBookConfig {
    pub fn with_policy(policy: PolicyConfig) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.policy.validate()?;
        if self.recent_payments_default == 0 || self.recent_payments_max < self.recent_payments_default {
            return Err(LoanError::InvalidConfiguration {
                message: format!(
                    "recent payments page must satisfy 1 <= default ({}) <= max ({})",
                    self.recent_payments_default, self.recent_payments_max
                ),
            });
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| LoanError::InvalidConfiguration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gold_loan_defaults() {
        let config = PolicyConfig::default();
        assert_eq!(config.monthly_rate, Rate::from_percentage(2));
        assert_eq!(config.maturity_months, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_policy() {
        assert!(matches!(
            PolicyConfig::new(Rate::from_decimal(dec!(-0.01)), 12),
            Err(LoanError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            PolicyConfig::new(Rate::from_percentage(2), 0),
            Err(LoanError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_from_json_with_defaults() {
        let config = PolicyConfig::from_json(r#"{"maturity_months": 6}"#).unwrap();
        assert_eq!(config.maturity_months, 6);
        assert_eq!(config.monthly_rate, Rate::from_percentage(2));

        let config = PolicyConfig::from_json(r#"{"monthly_rate": "0.015"}"#).unwrap();
        assert_eq!(config.monthly_rate, Rate::from_decimal(dec!(0.015)));

        assert!(PolicyConfig::from_json(r#"{"maturity_months": 0}"#).is_err());
        assert!(PolicyConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_book_config() {
        let config = LoanBookConfig::from_json(r#"{"recent_payments_default": 20}"#).unwrap();
        assert_eq!(config.recent_payments_default, 20);
        assert_eq!(config.recent_payments_max, 100);
        assert_eq!(config.policy, PolicyConfig::gold_loan());

        assert!(LoanBookConfig::from_json(r#"{"recent_payments_default": 0}"#).is_err());
        assert!(LoanBookConfig::from_json(r#"{"recent_payments_max": 5}"#).is_err());
    }
}
