use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use moneta_core::{MerchantMap, MonthKey, Transaction};

use crate::categorize::categorize;
use crate::csv::parse_csv;
use crate::date::{is_canonical, normalize_date};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a JSON array of records")]
    NotAnArray,
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

/// A transaction as it arrives from any source — AI extraction, CSV rows,
/// or hand-pasted JSON. Every field is permissive; normalization decides
/// what survives.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTransaction {
    pub date: String,
    pub merchant: String,
    pub amount: Value,
    pub category: Option<String>,
}

// ── Header detection ─────────────────────────────────────────────────────────

const DATE_COLUMNS: &[&str] = &["date", "transaction date", "posted date", "trans date"];
const MERCHANT_COLUMNS: &[&str] = &["merchant", "description", "name", "memo"];
const AMOUNT_COLUMNS: &[&str] = &["amount", "transaction amount", "amt"];
const DEBIT_COLUMNS: &[&str] = &["debit"];
const CREDIT_COLUMNS: &[&str] = &["credit"];

/// Resolved header positions for one CSV export.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub date: usize,
    pub merchant: usize,
    pub amount: Option<usize>,
    pub debit: Option<usize>,
    pub credit: Option<usize>,
}

impl ColumnMap {
    pub fn detect(header: &[String]) -> Result<Self, ImportError> {
        let date = find_column(header, DATE_COLUMNS)
            .ok_or_else(|| ImportError::MissingColumn("date".to_string()))?;
        let merchant = find_column(header, MERCHANT_COLUMNS)
            .ok_or_else(|| ImportError::MissingColumn("merchant".to_string()))?;
        let amount = find_column(header, AMOUNT_COLUMNS);
        let debit = find_column(header, DEBIT_COLUMNS);
        let credit = find_column(header, CREDIT_COLUMNS);
        if amount.is_none() && debit.is_none() && credit.is_none() {
            return Err(ImportError::MissingColumn("amount".to_string()));
        }
        Ok(ColumnMap { date, merchant, amount, debit, credit })
    }
}

fn find_column(header: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|cand| header.iter().position(|h| h.trim().eq_ignore_ascii_case(cand)))
}

// ── Parsing ──────────────────────────────────────────────────────────────────

/// Parse raw CSV/TSV statement text into raw records for `target`'s month.
///
/// Dates resolve through the date normalizer with the target month's year
/// as fallback; rows outside the target month are discarded here,
/// independent of the caller's later month/category filter. Amounts come
/// from the amount column, or `debit − credit` when the export splits
/// them.
pub fn parse_transactions_from_csv(
    text: &str,
    target: MonthKey,
) -> Result<Vec<RawTransaction>, ImportError> {
    let mut rows = parse_csv(text).into_iter();
    let header = rows
        .next()
        .ok_or_else(|| ImportError::MissingColumn("header row".to_string()))?;
    let cols = ColumnMap::detect(&header)?;

    let mut records = Vec::new();
    for row in rows {
        let Some(date) = row.get(cols.date).and_then(|c| normalize_date(c, target.year)) else {
            continue;
        };
        if !target.contains(date) {
            continue;
        }
        let merchant = row.get(cols.merchant).cloned().unwrap_or_default();
        let amount = if cols.amount.is_some() {
            cell_amount(&row, cols.amount)
        } else {
            // Debit is spend, credit reduces spend.
            cell_amount(&row, cols.debit) - cell_amount(&row, cols.credit)
        };
        records.push(RawTransaction {
            date: date.to_string(),
            merchant,
            amount: Value::from(amount),
            category: None,
        });
    }
    Ok(records)
}

/// Parse an AI-returned or hand-pasted JSON array into raw records.
/// Malformed JSON text is fatal for the operation; malformed individual
/// elements degrade to empty records that normalization drops.
pub fn parse_transactions_from_json(text: &str) -> Result<Vec<RawTransaction>, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// Run every raw date through the date normalizer. Canonical dates pass
/// through unchanged; unresolvable ones are left as-is for
/// `finalize_transactions` to drop.
pub fn resolve_dates(records: &mut [RawTransaction], fallback_year: i32) {
    for record in records.iter_mut() {
        if let Some(date) = normalize_date(&record.date, fallback_year) {
            record.date = date.to_string();
        }
    }
}

/// Turn raw records into canonical transactions: collapse merchant
/// whitespace, coerce the amount and store its magnitude, categorize
/// against the user's mappings, assign ids. Records without a valid
/// `YYYY-MM-DD` date are dropped; input order is preserved. Any upstream
/// category suggestion is kept for audit only.
pub fn finalize_transactions(
    records: Vec<RawTransaction>,
    mappings: &MerchantMap,
) -> Vec<Transaction> {
    records
        .into_iter()
        .filter_map(|record| {
            let date_str = record.date.trim();
            if !is_canonical(date_str) {
                return None;
            }
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
            let merchant = normalize_merchant(&record.merchant);
            let signed = coerce_amount(&record.amount);
            let category = categorize(&merchant, signed, mappings);
            Some(Transaction {
                id: Uuid::new_v4().to_string(),
                date,
                merchant,
                amount: signed.abs(),
                category,
                original_category: record
                    .category
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty()),
            })
        })
        .collect()
}

/// Collapse internal whitespace runs and trim.
pub fn normalize_merchant(merchant: &str) -> String {
    merchant.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Best-effort numeric coercion; anything unusable becomes 0.
pub(crate) fn coerce_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_money(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn cell_amount(row: &[String], col: Option<usize>) -> f64 {
    col.and_then(|i| row.get(i))
        .and_then(|cell| parse_money(cell))
        .unwrap_or(0.0)
}

fn parse_money(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let (negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };
    let cleaned = s.replace(['$', ',', ' '], "");
    let value = Decimal::from_str(&cleaned).ok()?.to_f64()?;
    Some(if negative { -value } else { value })
}
