//! Fixed-point monetary values.
//!
//! Amounts are stored as `i64` minor units (cents) everywhere inside the
//! service and in the database. The decimal major-unit form (`123.45`)
//! exists only at the wire boundary, where `rust_decimal` does the exact
//! conversion in both directions.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A monetary amount in integer minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("amount is not representable in minor units")]
pub struct MoneyOutOfRange;

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(units: i64) -> Self {
        Money(units)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Major-unit decimal form (two fractional digits).
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Converts a major-unit decimal into minor units, rounding half-up to
    /// the cent. Fails only when the value does not fit in `i64`.
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyOutOfRange> {
        let cents = value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(MoneyOutOfRange)?;
        cents.to_i64().map(Money).ok_or(MoneyOutOfRange)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Emits the decimal digits as a JSON number, exact over the whole
        // i64 range. A plain f64 would lose cents beyond 2^53 minor units.
        rust_decimal::serde::arbitrary_precision::serialize(&self.to_decimal(), serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = rust_decimal::serde::arbitrary_precision::deserialize(deserializer)?;
        Money::from_decimal(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_round_trip_through_decimal() {
        for minor in [0i64, 1, 99, 100, 12345, 9_999_999_999] {
            let money = Money::from_minor(minor);
            assert_eq!(Money::from_decimal(money.to_decimal()), Ok(money));
        }
    }

    #[test]
    fn from_decimal_rounds_half_up_to_cents() {
        let d: Decimal = "729.985".parse().expect("decimal literal");
        assert_eq!(Money::from_decimal(d), Ok(Money::from_minor(72999)));
    }

    #[test]
    fn json_round_trip() {
        let money = Money::from_minor(72998);
        let json = serde_json::to_string(&money).expect("serialize");
        assert_eq!(json, "729.98");
        let back: Money = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, money);
    }

    #[test]
    fn json_round_trips_extreme_minor_units() {
        // Values past 2^53 cents would be corrupted by an f64 wire form.
        for minor in [i64::MAX, i64::MAX - 7, i64::MIN] {
            let money = Money::from_minor(minor);
            let json = serde_json::to_string(&money).expect("serialize");
            let back: Money = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, money);
        }
    }

    #[test]
    fn deserializes_whole_numbers() {
        let money: Money = serde_json::from_str("500").expect("deserialize");
        assert_eq!(money.minor(), 50_000);
    }

    #[test]
    fn display_is_major_units() {
        assert_eq!(Money::from_minor(12345).to_string(), "123.45");
    }
}
