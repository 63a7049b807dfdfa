// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}
pub(crate) use re;

pub mod categorize;
pub mod csv;
pub mod date;
pub mod paycheck;
pub mod transaction;

pub use categorize::categorize;
pub use csv::parse_csv;
pub use date::normalize_date;
pub use paycheck::{
    apply_ocr_overrides, migrate_paycheck_record, migrate_paychecks, normalize_paycheck,
    ocr_month_from_path, parse_paychecks_from_json,
};
pub use transaction::{
    finalize_transactions, parse_transactions_from_csv, parse_transactions_from_json,
    resolve_dates, ColumnMap, ImportError, RawTransaction,
};
