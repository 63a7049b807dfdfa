pub mod category;
pub mod collection;
pub mod month;
pub mod paycheck;
pub mod summary;
pub mod transaction;

pub use category::Category;
pub use collection::{MerchantMap, RecordCollection};
pub use month::{MonthKey, MonthKeyError};
pub use paycheck::{Paycheck, PostTaxDeductions, PreTaxDeductions};
pub use summary::{summarize_month, CategorySummary};
pub use transaction::Transaction;
