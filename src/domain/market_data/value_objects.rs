use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Value Object - calendar trading day
///
/// Deliberately permissive: only integrality of the three fields is checked,
/// never calendar validity. Upstream feeds occasionally carry synthetic
/// settlement dates and the charting layer accepts them as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display(fmt = "{:04}-{:02}-{:02}", year, month, day)]
pub struct BusinessDate {
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

impl BusinessDate {
    pub fn new(year: i32, month: i32, day: i32) -> Self {
        Self { year, month, day }
    }

    /// Parse a "YYYY-MM-DD" string. Exactly three '-'-separated parts, each
    /// an integer; no day-of-month range checks.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split('-');
        let year = parts.next()?.trim().parse::<i32>().ok()?;
        let month = parts.next()?.trim().parse::<i32>().ok()?;
        let day = parts.next()?.trim().parse::<i32>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Compact `YYYYMMDD` key used as the sole lookup mechanism between
    /// independently-loaded row sets (instrument vs. benchmark calendars).
    pub fn compact_key(&self) -> String {
        format!("{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// Permissive numeric coercion for raw feed fields.
///
/// Accepts JSON numbers and numeric strings; everything else (including
/// non-finite results) coerces to None.
pub fn coerce_finite(value: &serde_json::Value) -> Option<f64> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates() {
        assert_eq!(BusinessDate::parse("2024-03-08"), Some(BusinessDate::new(2024, 3, 8)));
        assert_eq!(BusinessDate::parse("2024-3-8"), Some(BusinessDate::new(2024, 3, 8)));
    }

    #[test]
    fn rejects_malformed_dates() {
        assert_eq!(BusinessDate::parse("2024-03"), None);
        assert_eq!(BusinessDate::parse("2024-03-08-01"), None);
        assert_eq!(BusinessDate::parse("2024-0x-08"), None);
        assert_eq!(BusinessDate::parse(""), None);
    }

    #[test]
    fn keeps_calendar_nonsense() {
        // Integrality is the only rule; Feb 31 passes through untouched.
        assert_eq!(BusinessDate::parse("2024-02-31"), Some(BusinessDate::new(2024, 2, 31)));
    }

    #[test]
    fn compact_key_is_zero_padded() {
        assert_eq!(BusinessDate::new(987, 3, 8).compact_key(), "09870308");
        assert_eq!(BusinessDate::new(2024, 12, 31).compact_key(), "20241231");
    }

    #[test]
    fn coercion_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_finite(&serde_json::json!(12.5)), Some(12.5));
        assert_eq!(coerce_finite(&serde_json::json!("  73200 ")), Some(73200.0));
        assert_eq!(coerce_finite(&serde_json::json!("abc")), None);
        assert_eq!(coerce_finite(&serde_json::json!(null)), None);
        assert_eq!(coerce_finite(&serde_json::json!("inf")), None);
    }
}
