use serde::Serialize;

use super::category::Category;
use super::month::MonthKey;
use super::transaction::Transaction;

/// Per-category spend rollup for one month. Derived on every read, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub total: f64,
    pub count: usize,
    pub color: &'static str,
}

/// Roll up the given transactions for `month`, in canonical category order.
/// Categories with no transactions in the month are omitted.
pub fn summarize_month(transactions: &[Transaction], month: MonthKey) -> Vec<CategorySummary> {
    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let mut total = 0.0;
            let mut count = 0;
            for tx in transactions {
                if tx.category == category && month.contains(tx.date) {
                    total += tx.amount;
                    count += 1;
                }
            }
            (count > 0).then(|| CategorySummary { category, total, count, color: category.color() })
        })
        .collect()
}
