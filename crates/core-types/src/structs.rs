use crate::error::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// A persisted client record.
///
/// `balance` is held as a `Decimal` end to end and is only turned into a JSON
/// float when the record is serialized for a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// The writable fields of a client, already validated.
///
/// The only way to build one is [`ClientInput::parse`] (or [`ClientInput::new`]),
/// so anything holding a `ClientInput` carries a non-empty trimmed name and a
/// finite balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInput {
    name: String,
    balance: Decimal,
}

impl ClientInput {
    /// Validates an already-typed name and balance.
    pub fn new(name: &str, balance: Decimal) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            balance,
        })
    }

    /// Validates the raw fields of a create/update request body.
    ///
    /// The name is checked first so a request missing both fields reports the
    /// name.
    pub fn parse(name: Option<&str>, balance: Option<&Value>) -> Result<Self, ValidationError> {
        let name = name.unwrap_or_default();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let balance = parse_balance(balance.unwrap_or(&Value::Null))?;
        Self::new(name, balance)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }
}

/// Parses a balance given either as a JSON number or as a numeric string.
///
/// The value is taken exactly or not at all. A finite number that a `Decimal`
/// cannot hold without rounding (more than 28 significant digits, a magnitude
/// of 2^96 or more, or a scale beyond 28) is reported as
/// [`ValidationError::UnrepresentableBalance`]. Text that is not a finite
/// number at all is [`ValidationError::InvalidBalance`].
pub fn parse_balance(raw: &Value) -> Result<Decimal, ValidationError> {
    let text = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        Value::Null => return Err(ValidationError::MissingBalance),
        other => return Err(ValidationError::InvalidBalance(other.to_string())),
    };
    if text.is_empty() {
        return Err(ValidationError::MissingBalance);
    }

    if let Some(balance) = parse_decimal_exact(&text) {
        return Ok(balance);
    }
    match f64::from_str(&text) {
        Ok(value) if value.is_finite() => Err(ValidationError::UnrepresentableBalance(text)),
        _ => Err(ValidationError::InvalidBalance(text)),
    }
}

/// Plain or scientific notation, without any rounding.
fn parse_decimal_exact(text: &str) -> Option<Decimal> {
    let Some((mantissa, exponent)) = text.split_once(['e', 'E']) else {
        return Decimal::from_str_exact(text).ok();
    };
    let mantissa = Decimal::from_str_exact(mantissa).ok()?.normalize();
    let exponent: i64 = exponent.parse().ok()?;
    if mantissa.is_zero() {
        return Some(Decimal::ZERO);
    }

    let scale = i64::from(mantissa.scale()) - exponent;
    let mut value = mantissa;
    if scale >= 0 {
        value.set_scale(u32::try_from(scale).ok()?).ok()?;
        return Some(value);
    }

    value.set_scale(0).ok()?;
    let mut factor = Decimal::ONE;
    for _ in 0..scale.unsigned_abs().min(Decimal::MAX_SCALE as u64 + 1) {
        factor = factor.checked_mul(Decimal::TEN)?;
    }
    value.checked_mul(factor)
}
