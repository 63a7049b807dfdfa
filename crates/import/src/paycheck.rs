use serde_json::{Map, Value};
use uuid::Uuid;

use moneta_core::{MonthKey, Paycheck, PostTaxDeductions, PreTaxDeductions};

use crate::date::{month_from_name, normalize_date};
use crate::transaction::{coerce_amount, ImportError};

// ── Field resolution tables ──────────────────────────────────────────────────
//
// Per target field, the candidate source paths in priority order:
// snake_case AI/OCR key, nested camelCase path (re-import of exported
// data), flat legacy key, synonyms. First non-missing value wins.

const PAY_PERIOD: &[&str] = &["pay_period", "payPeriod"];
const GROSS_AMOUNT: &[&str] = &["gross_amount", "grossAmount", "gross_pay", "grossPay"];
const FEDERAL_TAX: &[&str] = &["federal_tax_amount", "federalTax", "federal_tax"];
const STATE_TAX: &[&str] = &["state_tax_amount", "stateTax", "state_tax"];
const LOCAL_TAX: &[&str] = &["local_tax_amount", "localTax", "local_tax"];
const MEDICARE: &[&str] = &["medicare_amount", "medicare"];
const SOCIAL_SECURITY: &[&str] = &["social_security_amount", "socialSecurity", "social_security"];
const NET_AMOUNT: &[&str] = &["net_amount", "netAmount", "net_pay", "netPay"];
const PAY_DATE: &[&str] = &["pay_date", "payDate"];
const SOURCE: &[&str] = &["source_system", "source"];

const EMPLOYEE_401K: &[&str] = &[
    "employee_401k_contribution",
    "preTaxDeductions.employee401k",
    "employee401k",
    "employee_401k",
];
const EMPLOYER_401K_MATCH: &[&str] = &[
    "employer_401k_match",
    "preTaxDeductions.employer401kMatch",
    "employer401kMatch",
];
const EMPLOYEE_HSA: &[&str] = &[
    "employee_hsa_contribution",
    "preTaxDeductions.employeeHsa",
    "employeeHsa",
    "hsa_contribution",
];
const EMPLOYER_HSA_MATCH: &[&str] = &[
    "employer_hsa_match",
    "preTaxDeductions.employerHsaMatch",
    "employerHsaMatch",
];
const EMPLOYEE_FSA: &[&str] = &[
    "employee_fsa_contribution",
    "preTaxDeductions.employeeFsa",
    "employeeFsa",
    "fsa_contribution",
];
const EMPLOYER_FSA_MATCH: &[&str] = &[
    "employer_fsa_match",
    "preTaxDeductions.employerFsaMatch",
    "employerFsaMatch",
];
const HEALTH_INSURANCE: &[&str] = &[
    "health_insurance",
    "preTaxDeductions.healthInsurance",
    "healthInsurance",
    "medical_insurance",
];
const OTHER_PRE_TAX: &[&str] = &[
    "other_pre_tax_deductions",
    "preTaxDeductions.other",
    "otherPreTaxDeductions",
];
// Dental/vision arrive as their own keys from some extractors and fold
// into the pre-tax "other" bucket.
const DENTAL_INSURANCE: &[&str] = &["dental_insurance", "dentalInsurance"];
const VISION_INSURANCE: &[&str] = &["vision_insurance", "visionInsurance"];
const GARNISHMENTS: &[&str] = &["garnishments", "postTaxDeductions.garnishments"];
const OTHER_POST_TAX: &[&str] = &[
    "other_post_tax_deductions",
    "postTaxDeductions.other",
    "otherPostTaxDeductions",
];

// ── Normalization ────────────────────────────────────────────────────────────

/// Parse a paycheck import payload. Accepts a JSON array of records or a
/// single object (the OCR emitter prints one record per file). Malformed
/// JSON text is fatal; anything inside a record degrades to defaults.
pub fn parse_paychecks_from_json(text: &str) -> Result<Vec<Value>, ImportError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(items),
        record @ Value::Object(_) => Ok(vec![record]),
        _ => Err(ImportError::NotAnArray),
    }
}

/// Map one permissively-shaped paycheck record into the canonical shape.
/// `fallback_year` feeds pay-date normalization for dates without a year.
pub fn normalize_paycheck(record: &Value, fallback_year: i32) -> Paycheck {
    let pay_date = resolve_text(record, PAY_DATE);
    let source = resolve_text(record, SOURCE);

    let mut paycheck = Paycheck {
        id: Uuid::new_v4().to_string(),
        pay_period: resolve_text(record, PAY_PERIOD),
        gross_amount: resolve_amount(record, GROSS_AMOUNT),
        federal_tax: resolve_amount(record, FEDERAL_TAX),
        state_tax: resolve_amount(record, STATE_TAX),
        local_tax: resolve_amount(record, LOCAL_TAX),
        medicare: resolve_amount(record, MEDICARE),
        social_security: resolve_amount(record, SOCIAL_SECURITY),
        pre_tax_deductions: PreTaxDeductions {
            employee_401k: resolve_amount(record, EMPLOYEE_401K),
            employer_401k_match: resolve_amount(record, EMPLOYER_401K_MATCH),
            employee_hsa: resolve_amount(record, EMPLOYEE_HSA),
            employer_hsa_match: resolve_amount(record, EMPLOYER_HSA_MATCH),
            employee_fsa: resolve_amount(record, EMPLOYEE_FSA),
            employer_fsa_match: resolve_amount(record, EMPLOYER_FSA_MATCH),
            health_insurance: resolve_amount(record, HEALTH_INSURANCE),
            other: resolve_amount(record, OTHER_PRE_TAX)
                + resolve_amount(record, DENTAL_INSURANCE)
                + resolve_amount(record, VISION_INSURANCE),
        },
        post_tax_deductions: PostTaxDeductions {
            garnishments: resolve_amount(record, GARNISHMENTS),
            other: resolve_amount(record, OTHER_POST_TAX),
        },
        net_amount: resolve_amount(record, NET_AMOUNT),
        pay_date: normalize_date(&pay_date, fallback_year)
            .map(|d| d.to_string())
            .unwrap_or_default(),
        source: if source.is_empty() { "Imported".to_string() } else { source },
    };
    paycheck.apply_fsa_medicare_guard();
    paycheck
}

/// Detect the `<MonthName>OCR/` directory convention in a source path.
pub fn ocr_month_from_path(path: &str) -> Option<u32> {
    path.split(['/', '\\']).find_map(|segment| {
        let lower = segment.trim().to_lowercase();
        let stem = lower.strip_suffix("ocr")?;
        month_from_name(stem)
    })
}

/// When the source path encodes a month, pin the pay date to the first of
/// that month and tag the record as OCR-sourced. Returns whether anything
/// was overridden.
pub fn apply_ocr_overrides(paycheck: &mut Paycheck, source_path: &str, fallback_year: i32) -> bool {
    let Some(month) = ocr_month_from_path(source_path) else {
        return false;
    };
    if let Some(key) = MonthKey::new(fallback_year, month) {
        paycheck.pay_date = key.first_day().to_string();
    }
    paycheck.source = "OCR".to_string();
    true
}

// ── Migration ────────────────────────────────────────────────────────────────

const PRE_TAX_KEYS: &[&str] = &[
    "employee401k",
    "employer401kMatch",
    "employeeHsa",
    "employerHsaMatch",
    "employeeFsa",
    "employerFsaMatch",
    "healthInsurance",
    "other",
];
const POST_TAX_KEYS: &[&str] = &["garnishments", "other"];

/// Bring one persisted paycheck record up to the current shape: add any
/// missing deduction sub-field with a zero default and re-apply the
/// FSA/Medicare guard (records may predate its introduction). Idempotent;
/// returns whether anything changed.
pub fn migrate_paycheck_record(record: &mut Value) -> bool {
    let Some(obj) = record.as_object_mut() else {
        return false;
    };
    let mut changed = ensure_deduction_fields(obj, "preTaxDeductions", PRE_TAX_KEYS);
    changed |= ensure_deduction_fields(obj, "postTaxDeductions", POST_TAX_KEYS);

    let fsa = obj
        .get("preTaxDeductions")
        .and_then(|d| d.get("employeeFsa"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    if fsa > 0.0 {
        let medicare = obj.get("medicare").and_then(Value::as_f64).unwrap_or(0.0);
        if medicare != 0.0 {
            obj.insert("medicare".to_string(), Value::from(0.0));
            changed = true;
        }
    }
    changed
}

/// Run the record migration over a persisted collection value's
/// `paychecks` array. Returns whether a write-back is needed.
pub fn migrate_paychecks(collection: &mut Value) -> bool {
    let Some(paychecks) = collection.get_mut("paychecks").and_then(Value::as_array_mut) else {
        return false;
    };
    let mut changed = false;
    for record in paychecks {
        changed |= migrate_paycheck_record(record);
    }
    changed
}

fn ensure_deduction_fields(obj: &mut Map<String, Value>, key: &str, fields: &[&str]) -> bool {
    let mut changed = false;
    if !obj.get(key).map(Value::is_object).unwrap_or(false) {
        obj.insert(key.to_string(), Value::Object(Map::new()));
        changed = true;
    }
    let Some(deductions) = obj.get_mut(key).and_then(Value::as_object_mut) else {
        return changed;
    };
    for field in fields {
        match deductions.get(*field) {
            None | Some(Value::Null) => {
                deductions.insert(field.to_string(), Value::from(0.0));
                changed = true;
            }
            _ => {}
        }
    }
    changed
}

// ── Lookup helpers ───────────────────────────────────────────────────────────

fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |value, key| value.get(key))
}

fn first_present<'a>(record: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    candidates.iter().find_map(|path| {
        let value = lookup(record, path)?;
        (!value.is_null()).then_some(value)
    })
}

fn resolve_amount(record: &Value, candidates: &[&str]) -> f64 {
    first_present(record, candidates).map(coerce_amount).unwrap_or(0.0)
}

fn resolve_text(record: &Value, candidates: &[&str]) -> String {
    first_present(record, candidates)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
