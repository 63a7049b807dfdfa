use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::Category;

/// A normalized spending transaction, independent of import source.
///
/// `date` always renders as `YYYY-MM-DD`; `amount` is the non-negative
/// magnitude (sign information is consumed during normalization);
/// `merchant` is whitespace-collapsed and trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub merchant: String,
    pub amount: f64,
    pub category: Category,
    /// Category as suggested by an upstream extractor. Audit only — never
    /// consulted by later categorization decisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction {
            id: "t-1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            merchant: "Starbucks".to_string(),
            amount: 4.5,
            category: Category::EatingOut,
            original_category: None,
        }
    }

    #[test]
    fn serializes_date_as_iso() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["date"], "2026-01-15");
    }

    #[test]
    fn original_category_omitted_when_absent() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("originalCategory").is_none());

        let tx = Transaction { original_category: Some("Dining".to_string()), ..sample() };
        let json = serde_json::to_value(tx).unwrap();
        assert_eq!(json["originalCategory"], "Dining");
    }

    #[test]
    fn deserializes_canonical_shape() {
        let tx: Transaction = serde_json::from_str(
            r#"{"id":"x","date":"2026-02-03","merchant":"Shell Gas","amount":40.0,"category":"Transport & Fuel"}"#,
        )
        .unwrap();
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2026, 2, 3).unwrap());
        assert_eq!(tx.category, Category::TransportFuel);
        assert_eq!(tx.original_category, None);
    }
}
