//! Value Objects for checkout pricing and order identity

use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Net/gross amount in an opaque currency code.
///
/// Prices are immutable and arithmetic never rounds; rounding happens once,
/// at the point where a line, group or order total is computed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    net: Decimal,
    gross: Decimal,
    currency: String,
}

impl Price {
    pub fn new(net: Decimal, gross: Decimal, currency: &str) -> Self {
        Self { net, gross, currency: currency.to_string() }
    }

    /// The additive identity in `currency`.
    pub fn zero(currency: &str) -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO, currency)
    }

    pub fn net(&self) -> Decimal { self.net }
    pub fn gross(&self) -> Decimal { self.gross }
    pub fn currency(&self) -> &str { &self.currency }

    pub fn try_add(&self, other: &Price) -> Result<Price, PriceError> {
        if self.currency != other.currency {
            return Err(PriceError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(Price::new(self.net + other.net, self.gross + other.gross, &self.currency))
    }

    pub fn times(&self, quantity: u32) -> Price {
        let quantity = Decimal::from(quantity);
        Price::new(self.net * quantity, self.gross * quantity, &self.currency)
    }

    /// Both sides quantized to 2 decimal places with banker's rounding.
    pub fn rounded(&self) -> Price {
        Price::new(
            self.net.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
            self.gross.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
            &self.currency,
        )
    }

    /// Folds prices already minted in `currency`, seeding with the zero price.
    pub(crate) fn sum(currency: &str, prices: impl IntoIterator<Item = Price>) -> Price {
        prices.into_iter().fold(Self::zero(currency), |acc, p| {
            debug_assert_eq!(acc.currency, p.currency);
            Price::new(acc.net + p.net, acc.gross + p.gross, currency)
        })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.net, self.gross, self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceError { CurrencyMismatch { left: String, right: String } }
impl std::error::Error for PriceError {}
impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrencyMismatch { left, right } => write!(f, "Currency mismatch: {left} vs {right}"),
        }
    }
}

pub const TOKEN_LENGTH: usize = 32;
const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque customer-facing order identifier: 32 lowercase alphanumerics.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderToken(String);

impl OrderToken {
    /// Draws a fresh token. Uniqueness against the store is the caller's job.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let token = (0..TOKEN_LENGTH)
            .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
            .collect();
        Self(token)
    }

    pub fn parse(value: impl Into<String>) -> Result<Self, TokenError> {
        let value = value.into();
        if value.len() != TOKEN_LENGTH {
            return Err(TokenError::InvalidLength(value.len()));
        }
        if !value.bytes().all(|b| TOKEN_ALPHABET.contains(&b)) {
            return Err(TokenError::InvalidCharacter);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for OrderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError { InvalidLength(usize), InvalidCharacter }
impl std::error::Error for TokenError {}
impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength(len) => write!(f, "Token must be {TOKEN_LENGTH} characters, got {len}"),
            Self::InvalidCharacter => write!(f, "Token must be lowercase alphanumeric"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_add() {
        let a = Price::new(Decimal::new(1000, 2), Decimal::new(1200, 2), "USD");
        let b = Price::new(Decimal::new(500, 2), Decimal::new(600, 2), "USD");
        let sum = a.try_add(&b).unwrap();
        assert_eq!(sum.net(), Decimal::new(1500, 2));
        assert_eq!(sum.gross(), Decimal::new(1800, 2));
    }

    #[test]
    fn test_price_add_currency_mismatch() {
        let a = Price::zero("USD");
        let b = Price::zero("EUR");
        assert!(matches!(a.try_add(&b), Err(PriceError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_zero_is_identity() {
        let a = Price::new(Decimal::new(999, 2), Decimal::new(1199, 2), "EUR");
        assert_eq!(a.try_add(&Price::zero("EUR")).unwrap(), a);
    }

    #[test]
    fn test_times_does_not_round() {
        let unit = Price::new(Decimal::new(3335, 3), Decimal::new(3335, 3), "USD");
        let total = unit.times(3);
        assert_eq!(total.net(), Decimal::new(10005, 3));
    }

    #[test]
    fn test_rounding_is_half_even() {
        let p = Price::new(Decimal::new(10005, 3), Decimal::new(10015, 3), "USD");
        let rounded = p.rounded();
        assert_eq!(rounded.net(), Decimal::new(1000, 2));
        assert_eq!(rounded.gross(), Decimal::new(1002, 2));
    }

    #[test]
    fn test_sum_of_nothing_is_zero() {
        assert_eq!(Price::sum("USD", []), Price::zero("USD"));
    }

    #[test]
    fn test_token_generate() {
        let token = OrderToken::generate();
        assert_eq!(token.as_str().len(), TOKEN_LENGTH);
        assert!(token.as_str().bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        assert_ne!(token, OrderToken::generate());
    }

    #[test]
    fn test_token_parse() {
        let token = OrderToken::generate();
        assert_eq!(OrderToken::parse(token.as_str()).unwrap(), token);
        assert!(matches!(OrderToken::parse("short"), Err(TokenError::InvalidLength(5))));
        assert!(matches!(
            OrderToken::parse("ABCDEFGHIJKLMNOPQRSTUVWXYZ012345"),
            Err(TokenError::InvalidCharacter)
        ));
    }
}
