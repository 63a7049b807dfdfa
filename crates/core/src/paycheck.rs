use serde::{Deserialize, Serialize};

/// Named pre-tax deduction sub-amounts, all non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreTaxDeductions {
    pub employee_401k: f64,
    pub employer_401k_match: f64,
    pub employee_hsa: f64,
    pub employer_hsa_match: f64,
    pub employee_fsa: f64,
    pub employer_fsa_match: f64,
    pub health_insurance: f64,
    pub other: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostTaxDeductions {
    pub garnishments: f64,
    pub other: f64,
}

/// A normalized paycheck statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paycheck {
    pub id: String,
    /// Free-text date range, e.g. "01/01/2026 - 01/15/2026".
    pub pay_period: String,
    pub gross_amount: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub local_tax: f64,
    pub medicare: f64,
    pub social_security: f64,
    pub pre_tax_deductions: PreTaxDeductions,
    pub post_tax_deductions: PostTaxDeductions,
    pub net_amount: f64,
    /// `YYYY-MM-DD`, or empty when the statement carried no usable date.
    pub pay_date: String,
    /// Origin tag: payroll-system name, "Imported", or "OCR".
    pub source: String,
}

impl Paycheck {
    /// One upstream extractor conflates FSA and Medicare labels on certain
    /// statement layouts; a positive employee FSA contribution therefore
    /// zeroes `medicare` to avoid the double count. Returns whether the
    /// record was changed.
    pub fn apply_fsa_medicare_guard(&mut self) -> bool {
        if self.pre_tax_deductions.employee_fsa > 0.0 && self.medicare != 0.0 {
            self.medicare = 0.0;
            return true;
        }
        false
    }
}
