//! Instrument identifier classifier
//!
//! Decides whether a query string looks like a market ticker and normalizes
//! identifiers before they reach a quote provider.
//!
//! Accepted shapes (whole trimmed string):
//! - 1-5 ASCII uppercase letters/digits starting with a letter: "AAPL", "BRK"
//! - six ASCII digits: "005930"
//! - either of the above plus an exchange suffix of 1-2 uppercase letters:
//!   "BRK.B", "005930.KS"

/// Exchange suffix appended to six-digit numeric codes (Korea Exchange)
pub const NUMERIC_CODE_SUFFIX: &str = ".KS";

const MAX_TICKER_LEN: usize = 5;
const NUMERIC_CODE_LEN: usize = 6;
const MAX_SUFFIX_LEN: usize = 2;

/// Heuristic ticker check. False positives and negatives are acceptable.
pub fn looks_like_identifier(s: &str) -> bool {
    let s = s.trim();

    let (base, suffix) = match s.split_once('.') {
        Some((base, suffix)) => (base, Some(suffix)),
        None => (s, None),
    };

    if let Some(suffix) = suffix {
        let valid_suffix = !suffix.is_empty()
            && suffix.len() <= MAX_SUFFIX_LEN
            && suffix.chars().all(|c| c.is_ascii_uppercase());
        if !valid_suffix {
            return false;
        }
    }

    is_numeric_code(base) || is_ticker_symbol(base)
}

/// Six-digit numeric codes get the fixed market suffix; anything else
/// passes through unchanged.
pub fn normalize_symbol(symbol: &str) -> String {
    if is_numeric_code(symbol) {
        format!("{}{}", symbol, NUMERIC_CODE_SUFFIX)
    } else {
        symbol.to_string()
    }
}

fn is_numeric_code(s: &str) -> bool {
    s.len() == NUMERIC_CODE_LEN && s.chars().all(|c| c.is_ascii_digit())
}

fn is_ticker_symbol(s: &str) -> bool {
    let mut chars = s.chars();

    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }

    s.len() <= MAX_TICKER_LEN && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}
