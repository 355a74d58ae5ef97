//! Defensive conversion of upstream quote fields.
//!
//! Market-data rows arrive with nulls, NaN placeholders and strings such as
//! `"N/A"`. These helpers never fail: anything that is not a usable number
//! becomes the caller's default.

use serde_json::Value;

pub fn coerce_f64(value: &Value, default: f64) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|v| v.is_finite()).unwrap_or(default)
}

/// Non-negative integer; fractional numbers truncate, negatives default.
pub fn coerce_u64(value: &Value, default: u64) -> u64 {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                v
            } else if n.is_i64() {
                default
            } else {
                n.as_f64()
                    .filter(|v| v.is_finite() && *v >= 0.0 && *v < u64::MAX as f64)
                    .map(|v| v.trunc() as u64)
                    .unwrap_or(default)
            }
        }
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(default),
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_f64_numbers() {
        assert_eq!(coerce_f64(&json!(1.25), 0.0), 1.25);
        assert_eq!(coerce_f64(&json!(3), 0.0), 3.0);
        assert_eq!(coerce_f64(&json!(" 2.5 "), 0.0), 2.5);
    }

    #[test]
    fn test_coerce_f64_malformed() {
        assert_eq!(coerce_f64(&Value::Null, 0.0), 0.0);
        assert_eq!(coerce_f64(&json!("N/A"), 0.0), 0.0);
        assert_eq!(coerce_f64(&json!("NaN"), 7.0), 7.0);
        assert_eq!(coerce_f64(&json!(true), 1.5), 1.5);
        assert_eq!(coerce_f64(&json!([1.0]), 0.0), 0.0);
    }

    #[test]
    fn test_coerce_u64() {
        assert_eq!(coerce_u64(&json!(42), 0), 42);
        assert_eq!(coerce_u64(&json!(12.9), 0), 12);
        assert_eq!(coerce_u64(&json!("15"), 0), 15);
        assert_eq!(coerce_u64(&json!("N/A"), 0), 0);
        assert_eq!(coerce_u64(&json!(-3), 0), 0);
        assert_eq!(coerce_u64(&json!(-3.5), 0), 0);
        assert_eq!(coerce_u64(&Value::Null, 5), 5);
    }
}
