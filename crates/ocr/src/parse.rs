//! Pattern-matching heuristics over recognized text.
//!
//! Recovers the total price, transaction date and transaction time from noisy
//! OCR output. Every field is best-effort: no match yields `None`, never an
//! error. Date and time are returned verbatim as they appear in the text so
//! the admin can see exactly what the receipt said.

use std::sync::LazyLock;

use regex::Regex;

/// Numeric amount grammar: thousands groups separated by space or comma,
/// decimal separator period or comma, exactly two decimal digits or none.
const AMOUNT: &str = r"(?:\d{1,3}(?:[ ,]\d{3})+|\d+)(?:[.,]\d{2})?";

/// Optional currency marker ahead of an amount.
const CURRENCY: &str = r"(?:USD|EUR|R|\$|£)";

/// Keyword-anchored price pattern. Compound keywords come first so the
/// alternation prefers "Grand Total" over "Total".
static KEYWORD_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:grand\s+total|total\s+due|balance\s+due|amount\s+due|total|amount)\s*:?\s*{CURRENCY}?\s*({AMOUNT})"
    ))
    .expect("keyword price pattern must compile")
});

/// Fallback price pattern: any currency-marked or bare amount.
static BARE_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{CURRENCY}?\s*({AMOUNT})")).expect("bare price pattern must compile")
});

/// Date patterns, tried in order. The first matching substring is returned
/// verbatim, without normalization to a canonical calendar format.
static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 12/31/2023, 31-12-23
        r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b",
        // 2023-12-31, 2023/12/31
        r"\b\d{4}[/-]\d{1,2}[/-]\d{1,2}\b",
        // December 31, 2023 / Dec 31 2023
        r"\b[A-Za-z]{3,9}\s+\d{1,2},?\s+\d{4}\b",
        // 31 December 2023
        r"\b\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("date pattern must compile"))
    .collect()
});

/// Time pattern: H:MM, optional :SS, optional am/pm marker.
static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{1,2}:\d{2}(?::\d{2})?(?:\s*[ap]m)?\b")
        .expect("time pattern must compile")
});

/// Extract the total price from recognized text.
///
/// Tries keyword-anchored matches first ("Grand Total", "Total Due", "Total",
/// "Amount Due", "Amount", "Balance Due"), then falls back to the first bare
/// amount anywhere in the text. A candidate that fails numeric normalization
/// is skipped and scanning continues.
#[must_use]
pub fn extract_price(text: &str) -> Option<f64> {
    for caps in KEYWORD_PRICE.captures_iter(text) {
        if let Some(value) = caps.get(1).and_then(|m| normalize_amount(m.as_str())) {
            return Some(value);
        }
    }

    for caps in BARE_PRICE.captures_iter(text) {
        if let Some(value) = caps.get(1).and_then(|m| normalize_amount(m.as_str())) {
            return Some(value);
        }
    }

    None
}

/// Extract the transaction date from recognized text, verbatim.
#[must_use]
pub fn extract_date(text: &str) -> Option<String> {
    DATE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(text))
        .map(|m| m.as_str().to_owned())
}

/// Extract the transaction time from recognized text, verbatim.
#[must_use]
pub fn extract_time(text: &str) -> Option<String> {
    TIME_PATTERN.find(text).map(|m| m.as_str().to_owned())
}

/// Normalize a matched amount to an `f64`.
///
/// Strips spaces and thousands separators and converts a decimal comma to a
/// period. Returns `None` when the cleaned string does not parse.
fn normalize_amount(matched: &str) -> Option<f64> {
    let compact: String = matched.chars().filter(|c| *c != ' ').collect();

    // A trailing separator followed by exactly two digits is the decimal part;
    // every other comma is a thousands separator.
    let cleaned = if compact.len() >= 3
        && matches!(compact.as_bytes()[compact.len() - 3], b'.' | b',')
    {
        let (int_part, dec_part) = compact.split_at(compact.len() - 3);
        let int_part = int_part.replace(',', "");
        format!("{int_part}.{}", &dec_part[1..])
    } else {
        compact.replace(',', "")
    };

    cleaned.parse::<f64>().ok()
}
