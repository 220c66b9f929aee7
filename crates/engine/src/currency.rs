//! The module contains the currency table and the amount conversion used when
//! a donation cascades across profiles tracking different currencies.
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currencies the engine accepts.
///
/// Every profile tracks its running total in its own currency, so a donation
/// is converted once per ancestor profile before it is staged. Exchange rates
/// are fixed and expressed against the `USD` base.
///
/// ## Minor units
///
/// Monetary values are stored as an `i64` number of **minor units** (cents).
/// [`convert_amount`] returns whole minor units, rounding down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    #[default]
    Aud,
}

impl Currency {
    const ALL: [Currency; 3] = [Currency::Usd, Currency::Eur, Currency::Aud];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Aud => "AUD",
        }
    }

    /// Human readable currency name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Aud => "Australian Dollar",
        }
    }

    /// Symbol used when formatting amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Aud => "A$",
        }
    }

    /// Fixed exchange rate against the `USD` base.
    #[must_use]
    pub const fn exchange_rate(self) -> f64 {
        match self {
            Currency::Usd => 1.0,
            Currency::Eur => 1.18,
            Currency::Aud => 0.74,
        }
    }

    fn supported_codes() -> String {
        Currency::ALL.map(Currency::code).join(", ")
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "AUD" => Ok(Currency::Aud),
            other => Err(EngineError::UnknownCurrency(format!(
                "{other}. This service only supports {}",
                Currency::supported_codes()
            ))),
        }
    }
}

/// Converts `amount_minor` from one currency into another.
///
/// Multiplies by the ratio of the two fixed rates and rounds the result down
/// to a whole number of minor units. Converting a currency into itself is the
/// identity, no rounding applied.
#[must_use]
pub fn convert_amount(amount_minor: i64, from: Currency, to: Currency) -> i64 {
    if from == to {
        return amount_minor;
    }
    let rate = from.exchange_rate() / to.exchange_rate();
    ((amount_minor as f64) * rate).floor() as i64
}
