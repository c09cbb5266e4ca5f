use regex::Regex;
use std::sync::OnceLock;

fn re_transaction_ref() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)\s*\btransaction:\s*\S+.*$").expect("invalid regex"))
}

fn re_reference_tail() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)\s*\breference:\s*\S+.*$").expect("invalid regex"))
}

const MAX_DESCRIPTION_LEN: usize = 100;

/// Tidy a narrative string: drop machine reference tails, collapse
/// whitespace, cap the length. Idempotent, so the normaliser can run over
/// already-normalised data without changing it.
pub fn clean_description(raw: &str) -> String {
    let stripped = re_transaction_ref().replace(raw, "");
    let stripped = re_reference_tail().replace(&stripped, "");

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= MAX_DESCRIPTION_LEN {
        return collapsed;
    }
    collapsed.chars().take(MAX_DESCRIPTION_LEN).collect()
}
