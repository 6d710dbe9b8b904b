//! Lenient price parsing. Stored prices may be integers, decimals or numeric strings.

use serde::{Deserialize, Deserializer, de};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

/// Reads a price written as a JSON number or a numeric string (`"12.99"`).
pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawPrice::deserialize(deserializer)? {
        RawPrice::Number(value) => Ok(value),
        RawPrice::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| de::Error::custom(format!("invalid price '{text}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Priced {
        #[serde(deserialize_with = "super::deserialize")]
        price: f64,
    }

    fn parse(json: &str) -> serde_json::Result<f64> {
        serde_json::from_str::<Priced>(json).map(|p| p.price)
    }

    #[test]
    fn test_accepts_integer_decimal_and_string() {
        assert_eq!(parse(r#"{"price":12}"#).unwrap(), 12.0);
        assert_eq!(parse(r#"{"price":12.99}"#).unwrap(), 12.99);
        assert_eq!(parse(r#"{"price":" 8.50 "}"#).unwrap(), 8.5);
    }

    #[test]
    fn test_rejects_non_numeric_string() {
        assert!(parse(r#"{"price":"twelve"}"#).is_err());
    }
}
