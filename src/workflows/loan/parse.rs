//! Lexical parsing of free-text field answers.
//!
//! The number rule is a text splice, not locale-aware arithmetic: strip
//! currency symbols, commas, and whitespace, lowercase, expand `lakh`/`lac`
//! to five trailing zeros and `k` to three, then take the first run of
//! digits. The order matters ("lakh" must be expanded before the bare `k`)
//! and is part of the contract, so changing it is a behavior change.

const CURRENCY_SYMBOLS: [char; 2] = ['₹', '$'];

/// Parse a positive integer out of free text, honoring the Indian shorthand
/// suffixes. Returns `None` when no digits survive the splice.
pub fn parse_number(text: &str) -> Option<u64> {
    let stripped: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect();

    let expanded = stripped
        .to_lowercase()
        .replace("lakh", "00000")
        .replace("lac", "00000")
        .replace('k', "000");

    let digits: String = expanded
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Accept a declared name: at least two characters once trimmed, and not a
/// bare number.
pub fn parse_name(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.chars().count() < 2 {
        return None;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Tenure bounds in months.
pub const MIN_TENURE_MONTHS: u32 = 1;
pub const MAX_TENURE_MONTHS: u32 = 120;

/// Parse a repayment tenure, bounded to the offered range.
pub fn parse_tenure(text: &str) -> Option<u32> {
    let value = parse_number(text)?;
    let months = u32::try_from(value).ok()?;
    if (MIN_TENURE_MONTHS..=MAX_TENURE_MONTHS).contains(&months) {
        Some(months)
    } else {
        None
    }
}

/// Parse a strictly positive currency amount.
pub fn parse_amount(text: &str) -> Option<u64> {
    parse_number(text).filter(|value| *value > 0)
}
