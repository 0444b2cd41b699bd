//! Supported currencies and conversion request parsing.

use std::fmt;
use std::str::FromStr;

use crate::convertor::ConvertError;

/// A currency the bot is allowed to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Rub,
    Eur,
    Usd,
    Gbp,
    Aud,
    Jpy,
}

impl Currency {
    /// The allow-list, in the order it is shown to users.
    pub const ALL: [Currency; 6] = [
        Currency::Rub,
        Currency::Eur,
        Currency::Usd,
        Currency::Gbp,
        Currency::Aud,
        Currency::Jpy,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Aud => "AUD",
            Currency::Jpy => "JPY",
        }
    }

    /// Comma separated list of all supported codes, e.g. for error messages.
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(Currency::code)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| ConvertError::InvalidCurrency {
                code: s.to_string(),
            })
    }
}

/// Parse a user supplied amount. Both `.` and `,` are accepted as the decimal separator.
/// `inf`, `NaN` and values overflowing `f64` are rejected.
pub fn parse_amount(amount: &str) -> Result<f64, ConvertError> {
    amount
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ConvertError::InvalidAmount(amount.to_string()))
}

/// A validated conversion, built fresh for every command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRequest {
    pub base: Currency,
    pub quote: Currency,
    pub amount: f64,
}

impl ConversionRequest {
    /// Validates currencies first, then the amount.
    pub fn parse(base: &str, quote: &str, amount: &str) -> Result<Self, ConvertError> {
        let base = base.parse::<Currency>()?;
        let quote = quote.parse::<Currency>()?;
        let amount = parse_amount(amount)?;
        Ok(Self { base, quote, amount })
    }

    /// Upstream identifier of the pair, always uppercase: `USD_RUB`.
    pub fn pair_key(&self) -> String {
        format!("{}_{}", self.base, self.quote)
    }
}
