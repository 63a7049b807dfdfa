use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::paycheck::Paycheck;
use super::transaction::Transaction;

/// User-taught merchant → category-label associations. Values are stored as
/// raw labels; lookups validate membership in the closed category set.
/// BTreeMap keeps the persisted form deterministic.
pub type MerchantMap = BTreeMap<String, String>;

/// Everything the records slot persists. The collection exclusively owns
/// all record instances; mutation happens only through the orchestration
/// layer's read-modify-write operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordCollection {
    pub transactions: Vec<Transaction>,
    pub paychecks: Vec<Paycheck>,
}
