use std::path::Path;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use moneta_core::{
    summarize_month, Category, CategorySummary, MerchantMap, MonthKey, Paycheck,
    RecordCollection, Transaction,
};
use moneta_import::RawTransaction;
use moneta_storage::DbPool;

use crate::error::AppError;
use crate::report::{BatchReport, FileFailure, ImportOutcome, SourceFile, SourceKind};

/// The orchestration layer: exclusive owner of the record collection and
/// the merchant map. Every user action is one atomic read-modify-write of
/// the in-memory state followed by a slot write; the mutex is the single
/// mutual-exclusion boundary around those mutations.
pub struct App {
    db: DbPool,
    state: Mutex<AppState>,
}

#[derive(Default)]
struct AppState {
    records: RecordCollection,
    mappings: MerchantMap,
}

impl App {
    /// Open the backing store, load both slots, and run the paycheck
    /// migration over the persisted records before deserializing them.
    /// The migrated form is written back only when something changed.
    pub async fn open(db_path: &Path) -> Result<App, AppError> {
        let db = moneta_storage::create_db(db_path).await?;

        let mappings: MerchantMap = moneta_storage::read_slot(&db, moneta_storage::MAPPINGS_SLOT)
            .await?
            .unwrap_or_default();

        let mut records = RecordCollection::default();
        if let Some(mut value) =
            moneta_storage::read_slot::<Value>(&db, moneta_storage::RECORDS_SLOT).await?
        {
            let migrated = moneta_import::migrate_paychecks(&mut value);
            records = serde_json::from_value(value)?;
            if migrated {
                moneta_storage::write_slot(&db, moneta_storage::RECORDS_SLOT, &records).await?;
                info!("migrated persisted paychecks to the current shape");
            }
        }

        info!(
            transactions = records.transactions.len(),
            paychecks = records.paychecks.len(),
            mappings = mappings.len(),
            "loaded record collection"
        );
        Ok(App {
            db,
            state: Mutex::new(AppState { records, mappings }),
        })
    }

    pub async fn close(self) {
        self.db.close().await;
    }

    // ── Imports ──────────────────────────────────────────────────────────────

    pub async fn import_transactions_csv(
        &self,
        csv_text: &str,
        month: MonthKey,
    ) -> Result<ImportOutcome, AppError> {
        let raws = moneta_import::parse_transactions_from_csv(csv_text, month)?;
        self.commit_transactions(raws, month).await
    }

    pub async fn import_transactions_json(
        &self,
        json_text: &str,
        month: MonthKey,
    ) -> Result<ImportOutcome, AppError> {
        let mut raws = moneta_import::parse_transactions_from_json(json_text)?;
        moneta_import::resolve_dates(&mut raws, month.year);
        self.commit_transactions(raws, month).await
    }

    async fn commit_transactions(
        &self,
        raws: Vec<RawTransaction>,
        month: MonthKey,
    ) -> Result<ImportOutcome, AppError> {
        let extracted = raws.len();
        if extracted == 0 {
            return Ok(ImportOutcome::NothingExtracted);
        }

        let mut state = self.state.lock().await;
        let finalized = moneta_import::finalize_transactions(raws, &state.mappings);
        // Payments/credits and out-of-month records are excluded for every
        // source here, on top of the CSV pre-filter.
        let kept: Vec<Transaction> = finalized
            .into_iter()
            .filter(|tx| tx.category != Category::PaymentCredit && month.contains(tx.date))
            .collect();
        if kept.is_empty() {
            debug!(extracted, "all extracted transactions were filtered out");
            return Ok(ImportOutcome::AllFiltered { extracted });
        }

        let added = kept.len();
        state.records.transactions.extend(kept);
        self.persist_records(&state).await?;
        info!(added, extracted, month = %month, "imported transactions");
        Ok(ImportOutcome::Imported { added, extracted })
    }

    /// Import a paycheck payload (JSON array, or the single object the OCR
    /// emitter prints). `source_path` enables the `<MonthName>OCR/`
    /// directory convention.
    pub async fn import_paychecks_json(
        &self,
        json_text: &str,
        source_path: Option<&str>,
        fallback_year: i32,
    ) -> Result<ImportOutcome, AppError> {
        let records = moneta_import::parse_paychecks_from_json(json_text)?;
        let extracted = records.len();
        if extracted == 0 {
            return Ok(ImportOutcome::NothingExtracted);
        }

        let mut state = self.state.lock().await;
        for record in &records {
            let mut paycheck = moneta_import::normalize_paycheck(record, fallback_year);
            if let Some(path) = source_path {
                moneta_import::apply_ocr_overrides(&mut paycheck, path, fallback_year);
            }
            state.records.paychecks.push(paycheck);
        }
        self.persist_records(&state).await?;
        info!(added = extracted, "imported paychecks");
        Ok(ImportOutcome::Imported { added: extracted, extracted })
    }

    /// Import several files strictly sequentially. A file that fails is
    /// recorded by name and does not abort the rest of the batch.
    pub async fn import_files(&self, files: &[SourceFile], month: MonthKey) -> BatchReport {
        let mut report = BatchReport::default();
        for file in files {
            let result = match file.kind {
                SourceKind::TransactionsCsv => {
                    self.import_transactions_csv(&file.contents, month).await
                }
                SourceKind::TransactionsJson => {
                    self.import_transactions_json(&file.contents, month).await
                }
                SourceKind::PaychecksJson => {
                    self.import_paychecks_json(&file.contents, Some(&file.name), month.year)
                        .await
                }
            };
            match result {
                Ok(outcome) => report.succeeded.push((file.name.clone(), outcome)),
                Err(error) => {
                    warn!(file = %file.name, %error, "file import failed");
                    report.failures.push(FileFailure {
                        file: file.name.clone(),
                        message: error.to_string(),
                    });
                }
            }
        }
        report
    }

    // ── Edits ────────────────────────────────────────────────────────────────

    /// Recategorize one transaction and teach the merchant map, so every
    /// future import of this merchant lands in `category`. Other existing
    /// transactions are left untouched.
    pub async fn recategorize(
        &self,
        transaction_id: &str,
        category: Category,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        let merchant = {
            let tx = state
                .records
                .transactions
                .iter_mut()
                .find(|t| t.id == transaction_id)
                .ok_or_else(|| AppError::NotFound(transaction_id.to_string()))?;
            tx.category = category;
            tx.merchant.clone()
        };
        state.mappings.insert(merchant.clone(), category.label().to_string());
        self.persist_records(&state).await?;
        self.persist_mappings(&state).await?;
        info!(%merchant, %category, "learned merchant mapping");
        Ok(())
    }

    /// The mapping store's `set` contract, exposed for direct edits.
    pub async fn set_mapping(&self, merchant: &str, category: Category) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state
            .mappings
            .insert(merchant.to_string(), category.label().to_string());
        self.persist_mappings(&state).await
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        let before = state.records.transactions.len();
        state.records.transactions.retain(|t| t.id != id);
        if state.records.transactions.len() == before {
            return Err(AppError::NotFound(id.to_string()));
        }
        self.persist_records(&state).await
    }

    pub async fn delete_paycheck(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        let before = state.records.paychecks.len();
        state.records.paychecks.retain(|p| p.id != id);
        if state.records.paychecks.len() == before {
            return Err(AppError::NotFound(id.to_string()));
        }
        self.persist_records(&state).await
    }

    /// Drop every record. The learned merchant map is left in place.
    pub async fn clear_all(&self) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.records = RecordCollection::default();
        self.persist_records(&state).await?;
        info!("cleared all records");
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    pub async fn transactions_for_month(
        &self,
        month: MonthKey,
        search: Option<&str>,
    ) -> Vec<Transaction> {
        let state = self.state.lock().await;
        let needle = search.map(str::to_lowercase).filter(|s| !s.is_empty());
        state
            .records
            .transactions
            .iter()
            .filter(|t| month.contains(t.date))
            .filter(|t| {
                needle
                    .as_deref()
                    .map_or(true, |n| t.merchant.to_lowercase().contains(n))
            })
            .cloned()
            .collect()
    }

    pub async fn paychecks(&self) -> Vec<Paycheck> {
        self.state.lock().await.records.paychecks.clone()
    }

    pub async fn category_summaries(&self, month: MonthKey) -> Vec<CategorySummary> {
        let state = self.state.lock().await;
        summarize_month(&state.records.transactions, month)
    }

    pub async fn mappings(&self) -> MerchantMap {
        self.state.lock().await.mappings.clone()
    }

    // ── Persistence ──────────────────────────────────────────────────────────

    async fn persist_records(&self, state: &AppState) -> Result<(), AppError> {
        moneta_storage::write_slot(&self.db, moneta_storage::RECORDS_SLOT, &state.records).await?;
        Ok(())
    }

    async fn persist_mappings(&self, state: &AppState) -> Result<(), AppError> {
        moneta_storage::write_slot(&self.db, moneta_storage::MAPPINGS_SLOT, &state.mappings)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAN: &str = "2026-01";

    fn month(key: &str) -> MonthKey {
        key.parse().unwrap()
    }

    async fn test_app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let app = App::open(&dir.path().join("moneta.db")).await.unwrap();
        (dir, app)
    }

    #[tokio::test]
    async fn opens_empty() {
        let (_dir, app) = test_app().await;
        assert!(app.transactions_for_month(month(JAN), None).await.is_empty());
        assert!(app.paychecks().await.is_empty());
        assert!(app.mappings().await.is_empty());
    }

    #[tokio::test]
    async fn csv_import_end_to_end() {
        let (_dir, app) = test_app().await;
        let outcome = app
            .import_transactions_csv("Date,Description,Amount\n01/15,Starbucks,4.50\n", month(JAN))
            .await
            .unwrap();
        assert_eq!(outcome, ImportOutcome::Imported { added: 1, extracted: 1 });

        let txs = app.transactions_for_month(month(JAN), None).await;
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].merchant, "Starbucks");
        assert_eq!(txs[0].amount, 4.5);
        assert_eq!(txs[0].category, Category::EatingOut);

        let summaries = app.category_summaries(month(JAN)).await;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].category, Category::EatingOut);
        assert_eq!(summaries[0].total, 4.5);
    }

    #[tokio::test]
    async fn json_import_excludes_payments_and_other_months() {
        let (_dir, app) = test_app().await;
        let outcome = app
            .import_transactions_json(
                r#"[{"date":"2026-01-05","merchant":"Shell Gas","amount":40},
                    {"date":"2026-01-06","merchant":"CARD PAYMENT","amount":120},
                    {"date":"2026-02-01","merchant":"Kroger","amount":55}]"#,
                month(JAN),
            )
            .await
            .unwrap();
        assert_eq!(outcome, ImportOutcome::Imported { added: 1, extracted: 3 });
        let txs = app.transactions_for_month(month(JAN), None).await;
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].category, Category::TransportFuel);
    }

    #[tokio::test]
    async fn all_filtered_is_distinct_from_nothing_extracted() {
        let (_dir, app) = test_app().await;
        let nothing = app
            .import_transactions_csv("Date,Description,Amount\n", month(JAN))
            .await
            .unwrap();
        assert_eq!(nothing, ImportOutcome::NothingExtracted);

        let filtered = app
            .import_transactions_json(
                r#"[{"date":"2026-01-06","merchant":"Refund Issued","amount":12}]"#,
                month(JAN),
            )
            .await
            .unwrap();
        assert_eq!(filtered, ImportOutcome::AllFiltered { extracted: 1 });
    }

    #[tokio::test]
    async fn malformed_json_is_a_hard_error() {
        let (_dir, app) = test_app().await;
        assert!(app
            .import_transactions_json("{{nope", month(JAN))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn recategorize_teaches_the_merchant_map() {
        let (_dir, app) = test_app().await;
        app.import_transactions_json(
            r#"[{"date":"2026-01-05","merchant":"Zzyzx Holdings","amount":10},
                {"date":"2026-01-09","merchant":"Zzyzx Holdings","amount":12}]"#,
            month(JAN),
        )
        .await
        .unwrap();

        let txs = app.transactions_for_month(month(JAN), None).await;
        assert!(txs.iter().all(|t| t.category == Category::Unknown));

        app.recategorize(&txs[0].id, Category::Entertainment).await.unwrap();

        // Only the edited transaction changed...
        let txs = app.transactions_for_month(month(JAN), None).await;
        let edited = txs.iter().filter(|t| t.category == Category::Entertainment).count();
        assert_eq!(edited, 1);

        // ...but future imports of the merchant follow the mapping.
        app.import_transactions_json(
            r#"[{"date":"2026-01-20","merchant":"Zzyzx Holdings","amount":9}]"#,
            month(JAN),
        )
        .await
        .unwrap();
        let txs = app.transactions_for_month(month(JAN), None).await;
        assert_eq!(
            txs.iter().filter(|t| t.category == Category::Entertainment).count(),
            2
        );
        assert_eq!(
            app.mappings().await.get("Zzyzx Holdings").map(String::as_str),
            Some("Entertainment")
        );
    }

    #[tokio::test]
    async fn search_filters_by_merchant_substring() {
        let (_dir, app) = test_app().await;
        app.import_transactions_json(
            r#"[{"date":"2026-01-05","merchant":"Shell Gas","amount":40},
                {"date":"2026-01-06","merchant":"Kroger","amount":20}]"#,
            month(JAN),
        )
        .await
        .unwrap();
        let txs = app.transactions_for_month(month(JAN), Some("shell")).await;
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].merchant, "Shell Gas");
    }

    #[tokio::test]
    async fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moneta.db");

        let app = App::open(&path).await.unwrap();
        app.import_transactions_json(
            r#"[{"date":"2026-01-05","merchant":"Shell Gas","amount":40}]"#,
            month(JAN),
        )
        .await
        .unwrap();
        app.set_mapping("Zzyzx Holdings", Category::Entertainment).await.unwrap();
        let before = app.transactions_for_month(month(JAN), None).await;
        app.close().await;

        let app = App::open(&path).await.unwrap();
        let after = app.transactions_for_month(month(JAN), None).await;
        assert_eq!(after, before);
        assert_eq!(
            app.mappings().await.get("Zzyzx Holdings").map(String::as_str),
            Some("Entertainment")
        );
    }

    #[tokio::test]
    async fn legacy_paychecks_migrate_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moneta.db");
        {
            let pool = moneta_storage::create_db(&path).await.unwrap();
            // A record persisted before HSA/FSA fields existed, with the
            // conflated medicare amount the guard exists for.
            moneta_storage::write_slot_raw(
                &pool,
                moneta_storage::RECORDS_SLOT,
                r#"{"transactions":[],"paychecks":[{
                    "id":"p-1","payPeriod":"","grossAmount":5000.0,
                    "federalTax":0.0,"stateTax":0.0,"localTax":0.0,
                    "medicare":30.0,"socialSecurity":0.0,
                    "preTaxDeductions":{"employee401k":250.0,"employeeFsa":50.0},
                    "netAmount":3500.0,"payDate":"","source":"Imported"}]}"#,
            )
            .await
            .unwrap();
            pool.close().await;
        }

        let app = App::open(&path).await.unwrap();
        let paychecks = app.paychecks().await;
        assert_eq!(paychecks.len(), 1);
        assert_eq!(paychecks[0].medicare, 0.0);
        assert_eq!(paychecks[0].pre_tax_deductions.employee_401k, 250.0);
        assert_eq!(paychecks[0].pre_tax_deductions.employer_hsa_match, 0.0);
        assert_eq!(paychecks[0].post_tax_deductions.garnishments, 0.0);
    }

    #[tokio::test]
    async fn paycheck_import_applies_ocr_convention() {
        let (_dir, app) = test_app().await;
        let outcome = app
            .import_paychecks_json(
                r#"{"gross_amount":5000.0,"net_amount":3500.0,"pay_date":"03/15/2026"}"#,
                Some("uploads/FebruaryOCR/stub.png"),
                2026,
            )
            .await
            .unwrap();
        assert_eq!(outcome, ImportOutcome::Imported { added: 1, extracted: 1 });
        let paychecks = app.paychecks().await;
        assert_eq!(paychecks[0].pay_date, "2026-02-01");
        assert_eq!(paychecks[0].source, "OCR");
    }

    #[tokio::test]
    async fn batch_isolates_per_file_failures() {
        let (_dir, app) = test_app().await;
        let files = vec![
            SourceFile {
                name: "good.csv".to_string(),
                kind: SourceKind::TransactionsCsv,
                contents: "Date,Description,Amount\n01/15,Starbucks,4.50\n".to_string(),
            },
            SourceFile {
                name: "broken.json".to_string(),
                kind: SourceKind::TransactionsJson,
                contents: "{{not json".to_string(),
            },
            SourceFile {
                name: "pay.json".to_string(),
                kind: SourceKind::PaychecksJson,
                contents: r#"{"gross_amount":100.0}"#.to_string(),
            },
        ];
        let report = app.import_files(&files, month(JAN)).await;
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file, "broken.json");
        assert_eq!(report.total_added(), 1);
        // The failure did not abort the later paycheck file.
        assert_eq!(app.paychecks().await.len(), 1);
    }

    #[tokio::test]
    async fn delete_and_clear() {
        let (_dir, app) = test_app().await;
        app.import_transactions_json(
            r#"[{"date":"2026-01-05","merchant":"Shell Gas","amount":40},
                {"date":"2026-01-06","merchant":"Kroger","amount":20}]"#,
            month(JAN),
        )
        .await
        .unwrap();
        app.set_mapping("Kroger", Category::FoodGroceries).await.unwrap();

        let txs = app.transactions_for_month(month(JAN), None).await;
        app.delete_transaction(&txs[0].id).await.unwrap();
        assert_eq!(app.transactions_for_month(month(JAN), None).await.len(), 1);
        assert!(matches!(
            app.delete_transaction("no-such-id").await,
            Err(AppError::NotFound(_))
        ));

        app.clear_all().await.unwrap();
        assert!(app.transactions_for_month(month(JAN), None).await.is_empty());
        // Learned mappings survive a clear.
        assert!(!app.mappings().await.is_empty());
    }
}
