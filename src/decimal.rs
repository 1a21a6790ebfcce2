use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

/// decimal places kept for money (rupees and paise)
pub const MONEY_DP: u32 = 2;

/// Money type rounded to paise
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(from = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const ONE: Money = Money(Decimal::ONE);
    pub const PAISA: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(MONEY_DP))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s)?.round_dp(MONEY_DP)))
    }

    /// create from whole rupees
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from paise
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, MONEY_DP))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// simple (non-compounding) interest for a number of whole periods
    pub fn simple_interest(&self, rate: Rate, periods: u32) -> Self {
        Money::from_decimal(self.0 * rate.as_decimal() * Decimal::from(periods))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(MONEY_DP))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(MONEY_DP);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(MONEY_DP))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(MONEY_DP);
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money((self.0 * other).round_dp(MONEY_DP))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

/// monthly interest rate as a fraction (0.02 is 2% per month)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from decimal (e.g., 0.02 for 2%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 2 for 2%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// create from basis points (e.g., 200 for 2%)
    pub fn from_bps(bps: u32) -> Self {
        Rate(Decimal::from(bps) / Decimal::from(10000))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_rounds_to_paise() {
        let m = Money::from_str_exact("100.126").unwrap();
        assert_eq!(m.to_string(), "100.13");

        assert_eq!(Money::from_minor(1), Money::PAISA);
        assert_eq!(Money::from_minor(1050), Money::from_str_exact("10.50").unwrap());
    }

    #[test]
    fn test_sign_checks() {
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::ZERO.is_negative());
        assert!(Money::from_major(1).is_positive());
        assert!((Money::ZERO - Money::PAISA).is_negative());
    }

    #[test]
    fn test_simple_interest() {
        let principal = Money::from_major(10_000);
        let rate = Rate::from_percentage(2);

        assert_eq!(principal.simple_interest(rate, 0), Money::ZERO);
        assert_eq!(principal.simple_interest(rate, 3), Money::from_major(600));

        let odd = Money::from_str_exact("333.33").unwrap();
        assert_eq!(odd.simple_interest(rate, 1), Money::from_str_exact("6.67").unwrap());
    }

    #[test]
    fn test_rate_conversions() {
        assert_eq!(Rate::from_bps(200), Rate::from_percentage(2));
        assert_eq!(Rate::from_decimal(dec!(0.02)), Rate::from_percentage(2));
        assert_eq!(Rate::from_percentage(2).to_string(), "2%");
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::ONE, Money::from_minor(50)].into_iter().sum();
        assert_eq!(total, Money::from_str_exact("1.50").unwrap());
        assert_eq!(Money::ONE, Money::from_major(1));
    }

    #[test]
    fn test_deserialize_rounds_to_paise() {
        let tiny: Money = serde_json::from_str("\"0.004\"").unwrap();
        assert_eq!(tiny, Money::ZERO);
        assert!(!tiny.is_positive());

        let amount: Money = serde_json::from_str("\"1250.456\"").unwrap();
        assert_eq!(amount, Money::from_minor(125_046));
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"1250.46\"");
    }
}
