//! Polymorphic numeric coercion for upstream payloads.
//!
//! The UAC returns JSON where a given field may arrive as a wider
//! integer, a narrower integer, a float, a nullable wider integer, or (for
//! timestamps) an RFC-3339 string. Rather than introspecting a decoded
//! JSON map dynamically, each field is coerced through a small ordered
//! chain of attempts over `serde_json::Value`.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Attempt, in order: wider nullable int -> wider int -> float -> narrower
/// int, truncating to `i64` at the end. Returns `None` if the value is
/// `null`, missing, or not numeric in any of those shapes (missing or
/// unparsable fields yield null rather than an error).
pub fn coerce_i64(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    match value {
        Value::Null => None,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            if let Some(u) = n.as_u64() {
                return Some(u as i64);
            }
            if let Some(f) = n.as_f64() {
                return Some(f.trunc() as i64);
            }
            None
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Like [`coerce_i64`] but preserves "absent" as `None` rather than
/// coercing to zero; used for `executor_corporation_id` and `faction_id`,
/// which are genuinely optional fields, not just unparsable ones.
pub fn coerce_opt_i64(value: Option<&Value>) -> Option<i64> {
    match value {
        None => None,
        Some(Value::Null) => None,
        other => coerce_i64(other),
    }
}

/// `date_founded` may arrive as a Unix timestamp (seconds, any numeric
/// width) or an RFC-3339 string.
pub fn coerce_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let value = value?;
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let secs = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp(secs, 0)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_wide_and_narrow_ints() {
        assert_eq!(coerce_i64(Some(&json!(99_000_123_i64))), Some(99_000_123));
        assert_eq!(coerce_i64(Some(&json!(42_u8 as u64))), Some(42));
    }

    #[test]
    fn coerces_float_by_truncation() {
        assert_eq!(coerce_i64(Some(&json!(123.9))), Some(123));
    }

    #[test]
    fn coerces_numeric_string() {
        assert_eq!(coerce_i64(Some(&json!("456"))), Some(456));
    }

    #[test]
    fn null_and_missing_coerce_to_none() {
        assert_eq!(coerce_i64(Some(&Value::Null)), None);
        assert_eq!(coerce_i64(None), None);
    }

    #[test]
    fn optional_field_absence_is_preserved_not_zeroed() {
        assert_eq!(coerce_opt_i64(None), None);
        assert_eq!(coerce_opt_i64(Some(&Value::Null)), None);
        assert_eq!(coerce_opt_i64(Some(&json!(7))), Some(7));
    }

    #[test]
    fn timestamp_parses_rfc3339_string() {
        let parsed = coerce_timestamp(Some(&json!("2020-05-06T00:00:00Z"))).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2020-05-06T00:00:00+00:00");
    }

    #[test]
    fn timestamp_parses_numeric_unix_seconds() {
        let parsed = coerce_timestamp(Some(&json!(1_588_723_200_i64))).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2020-05-06T00:00:00+00:00");
    }
}
