//! Currency precision and rounding.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount is a `rust_decimal::Decimal` rounded through [`Currency::round`].

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    #[default]
    Usd,
    /// Euro
    Eur,
    /// Mexican Peso
    Mxn,
    /// Indonesian Rupiah
    Idr,
    /// Japanese Yen
    Jpy,
}

impl Currency {
    /// ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Mxn => "MXN",
            Self::Idr => "IDR",
            Self::Jpy => "JPY",
        }
    }

    /// Decimal places of the smallest unit.
    #[must_use]
    pub const fn decimal_places(self) -> u32 {
        match self {
            Self::Jpy => 0,
            Self::Usd | Self::Eur | Self::Mxn | Self::Idr => 2,
        }
    }

    /// Rounds half away from zero to the currency's precision.
    #[must_use]
    pub fn round(self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.decimal_places(), RoundingStrategy::MidpointAwayFromZero)
    }

    /// Returns true if the amount rounds to zero.
    #[must_use]
    pub fn is_zero(self, amount: Decimal) -> bool {
        self.round(amount).is_zero()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Usd, Self::Eur, Self::Mxn, Self::Idr, Self::Jpy]
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown currency: {s}"))
    }
}

/// An amount tagged with its currency, used for reported values such as
/// net book value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in currency units.
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: Currency,
}

impl Money {
    /// Tags `amount` with `currency`, rounding it to the currency's precision.
    #[must_use]
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: currency.round(amount),
            currency,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
