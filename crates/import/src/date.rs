use chrono::NaiveDate;

use crate::re;

re!(re_iso, r"^\d{4}-\d{2}-\d{2}$");
re!(re_numeric, r"^(\d{1,2})[/-](\d{1,2})(?:[/-](\d{2}|\d{4}))?$");
re!(re_month_name, r"^([A-Za-z]{3,})\.?\s+(\d{1,2})(?:,?\s+(\d{4}))?$");

/// Whether `s` is already in the canonical `YYYY-MM-DD` shape.
pub fn is_canonical(s: &str) -> bool {
    re_iso().is_match(s)
}

/// Convert a heterogeneous date string into a calendar date.
///
/// Accepted shapes, first match wins: canonical `YYYY-MM-DD`;
/// `M/D`, `M/D/YY`, `M/D/YYYY` (slashes or dashes, two-digit years get
/// 2000 added, a missing year takes `fallback_year`); `<MonthName> D` or
/// `<MonthName> D YYYY` with a case-insensitive month name or 3+ letter
/// abbreviation. Everything else, including impossible calendar dates,
/// is `None` — callers drop the owning record rather than fail.
pub fn normalize_date(raw: &str, fallback_year: i32) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if is_canonical(s) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    }

    if let Some(c) = re_numeric().captures(s) {
        let month: u32 = c.get(1)?.as_str().parse().ok()?;
        let day: u32 = c.get(2)?.as_str().parse().ok()?;
        let year = match c.get(3) {
            Some(y) if y.as_str().len() == 2 => 2000 + y.as_str().parse::<i32>().ok()?,
            Some(y) => y.as_str().parse().ok()?,
            None => fallback_year,
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(c) = re_month_name().captures(s) {
        let month = month_from_name(c.get(1)?.as_str())?;
        let day: u32 = c.get(2)?.as_str().parse().ok()?;
        let year = match c.get(3) {
            Some(y) => y.as_str().parse().ok()?,
            None => fallback_year,
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// Resolve a month name or 3+ letter prefix ("jan", "sept", "January").
pub(crate) fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june",
        "july", "august", "september", "october", "november", "december",
    ];
    let token = name.trim().trim_end_matches('.').to_lowercase();
    if token.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&token))
        .map(|i| i as u32 + 1)
}
