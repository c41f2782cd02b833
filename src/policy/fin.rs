//! FIN (national identifier) format validation.

use regex::Regex;
use std::sync::OnceLock;

/// Exactly twelve digits grouped as `NNNN-NNNN-NNNN`.
fn fin_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{4}-\d{4}$").expect("valid regex"))
}

#[must_use]
pub fn is_valid_fin(fin: &str) -> bool {
    fin_regex().is_match(fin)
}
