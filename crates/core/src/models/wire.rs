//! Boundary helpers for numeric columns.
//!
//! Relational `numeric` columns may come back as JSON numbers or as strings
//! depending on precision settings; both are accepted, anything non-finite is
//! rejected so a malformed row never reaches the in-memory list.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

pub(crate) fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Numeric::deserialize(deserializer)? {
        Numeric::Number(n) => n,
        Numeric::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("'{s}' is not a decimal number")))?,
    };
    if !value.is_finite() {
        return Err(de::Error::custom("decimal value must be finite"));
    }
    Ok(value)
}

pub(crate) fn whole_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Numeric::deserialize(deserializer)? {
        Numeric::Number(n) => n,
        Numeric::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("'{s}' is not a quantity")))?,
    };
    if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > f64::from(u32::MAX) {
        return Err(de::Error::custom(format!(
            "quantity must be a positive whole number, got {value}"
        )));
    }
    Ok(value as u32)
}
