//! Rupee amounts.
//!
//! All catalog prices and fees are whole rupees, so amounts are plain
//! integers with checked arithmetic. The payment provider expects minor
//! currency units (paise), which [`Amount::to_paise`] produces.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Amount Error
#[derive(Debug, Error)]
pub enum Error {
    /// Amount overflow
    #[error("Amount overflow")]
    AmountOverflow,
}

/// Whole-rupee amount
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Zero rupees
    pub const ZERO: Amount = Amount(0);

    /// Amount in rupees
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Amount in paise, the minor currency unit expected by the payment
    /// provider
    pub fn to_paise(&self) -> u64 {
        self.0 * 100
    }

    /// Checked addition
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked multiplication by a line quantity
    pub fn checked_mul_quantity(self, quantity: u32) -> Option<Amount> {
        self.0.checked_mul(u64::from(quantity)).map(Amount)
    }

    /// Sum an iterator of amounts, failing on overflow
    pub fn try_sum<I>(iter: I) -> Result<Amount, Error>
    where
        I: IntoIterator<Item = Amount>,
    {
        iter.into_iter().try_fold(Amount::ZERO, |acc, amount| {
            acc.checked_add(amount).ok_or(Error::AmountOverflow)
        })
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(value)
    }
}

impl From<Amount> for u64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0.checked_add(rhs.0).expect("amount overflow"))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl core::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, amount| acc + amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_paise() {
        assert_eq!(Amount::from(300).to_paise(), 30_000);
        assert_eq!(Amount::ZERO.to_paise(), 0);
    }

    #[test]
    fn test_try_sum() {
        let amounts = vec![Amount::from(300), Amount::from(60)];
        assert_eq!(Amount::try_sum(amounts).unwrap(), Amount::from(360));

        let overflowing = vec![Amount::from(u64::MAX), Amount::from(1)];
        assert!(Amount::try_sum(overflowing).is_err());
    }

    #[test]
    fn test_checked_mul_quantity() {
        assert_eq!(
            Amount::from(300).checked_mul_quantity(2),
            Some(Amount::from(600))
        );
        assert!(Amount::from(u64::MAX).checked_mul_quantity(2).is_none());
    }
}
