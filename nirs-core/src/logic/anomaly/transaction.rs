use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::rules::Observation;
use crate::logic::dataset::record::as_number;

/// Digital-asset transfer. Not a Record; only the engine consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    /// Any other submitted attributes, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A transaction rejected by the pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub index: usize,
    pub reason: String,
}

impl Transaction {
    /// Lenient parse: `value` may be a numeric string, `asset` is optional
    pub fn from_value(item: &Value) -> Result<Self, String> {
        let object = item
            .as_object()
            .ok_or_else(|| "transaction is not an object".to_string())?;

        let from = address(object, "from")?;
        let to = address(object, "to")?;
        let value = match object.get("value") {
            None | Some(Value::Null) => return Err("missing 'value'".to_string()),
            Some(v) => as_number(v)
                .filter(|n| n.is_finite())
                .ok_or_else(|| format!("'value' is not numeric: {}", v))?,
        };
        let asset = match object.get("asset") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => return Err(format!("'asset' is not a string: {}", other)),
        };

        let extra = object
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "from" | "to" | "value" | "asset"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self { from, to, value, asset, extra })
    }
}

fn address(object: &Map<String, Value>, key: &str) -> Result<String, String> {
    match object.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(format!("empty '{}' address", key)),
        Some(other) if !other.is_null() => Err(format!("'{}' is not a string", key)),
        _ => Err(format!("missing '{}'", key)),
    }
}

impl Observation for Transaction {
    fn value(&self) -> Option<f64> {
        Some(self.value)
    }

    fn asset(&self) -> Option<&str> {
        self.asset.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_transaction() {
        let tx = Transaction::from_value(&json!({
            "from": "0x742d35Cc", "to": "0x8ba1f109", "value": 1500000,
            "asset": "ETH", "hash": "0xabc"
        }))
        .unwrap();

        assert_eq!(tx.from, "0x742d35Cc");
        assert_eq!(tx.value, 1_500_000.0);
        assert_eq!(tx.asset.as_deref(), Some("ETH"));
        assert_eq!(tx.extra["hash"], "0xabc");
    }

    #[test]
    fn test_numeric_string_value() {
        let tx = Transaction::from_value(&json!({"from": "A", "to": "B", "value": "2.5"})).unwrap();
        assert_eq!(tx.value, 2.5);
        assert_eq!(tx.asset, None);
    }

    #[test]
    fn test_malformed_transactions() {
        let cases = [
            (json!({"to": "B", "value": 1}), "missing 'from'"),
            (json!({"from": "A", "value": 1}), "missing 'to'"),
            (json!({"from": "A", "to": "B"}), "missing 'value'"),
            (json!({"from": "A", "to": "B", "value": "lots"}), "'value' is not numeric: \"lots\""),
            (json!({"from": 7, "to": "B", "value": 1}), "'from' is not a string"),
            (json!({"from": " ", "to": "B", "value": 1}), "empty 'from' address"),
            (json!([1, 2]), "transaction is not an object"),
        ];
        for (input, expected) in cases {
            assert_eq!(Transaction::from_value(&input).unwrap_err(), expected);
        }
    }
}
