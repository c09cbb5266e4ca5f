use regex::Regex;
use std::sync::OnceLock;

use sterling_extract::ExtractedText;

use crate::profile::{compiled_signatures, BankId, BankProfile, PROFILES, UNKNOWN_PROFILE};

/// Score at or above which a detection is trusted enough to run the bank's
/// own grammar (and to justify a refinement retry when that grammar comes
/// back empty).
pub const CONFIDENT_SCORE: u32 = 15;

#[derive(Debug)]
pub struct Detection {
    pub profile: &'static BankProfile,
    pub score: u32,
    pub matched: Vec<&'static str>,
}

impl Detection {
    pub fn id(&self) -> BankId {
        self.profile.id
    }

    pub fn is_known(&self) -> bool {
        self.profile.id != BankId::Unknown
    }

    pub fn is_confident(&self) -> bool {
        self.score >= CONFIDENT_SCORE
    }
}

/// Pick the profile whose signatures score highest against the extracted
/// text. Never fails: no match returns the unknown sentinel. Ties go to the
/// earlier declaration, which is why specific profiles precede generic ones.
pub fn detect(text: &ExtractedText) -> Detection {
    let haystack = text.full_text();
    detect_in_str(&haystack)
}

pub fn detect_in_str(haystack: &str) -> Detection {
    let compiled = compiled_signatures();
    let mut best: Option<Detection> = None;

    for (profile, regexes) in PROFILES.iter().zip(compiled) {
        let mut score = 0;
        let mut matched = Vec::new();
        for (signature, re) in profile.signatures.iter().zip(regexes) {
            if re.is_match(haystack) {
                score += signature.weight;
                matched.push(signature.pattern);
            }
        }
        if score > 0 && best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(Detection { profile, score, matched });
        }
    }

    best.unwrap_or(Detection {
        profile: &UNKNOWN_PROFILE,
        score: 0,
        matched: Vec::new(),
    })
}

// ── Account metadata ─────────────────────────────────────────────────────────

fn re_account() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"(?i)\b(?:account|acc)(?:\s+(?:number|no\.?))?[:\s]+(\d{8})\b")
            .expect("invalid regex")
    })
}

fn re_sort_code() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"(?i)\bsort\s*code[:\s]+(\d{2})[-\s]?(\d{2})[-\s]?(\d{2})\b")
            .expect("invalid regex")
    })
}

pub fn extract_account_number(text: &str) -> Option<String> {
    re_account()
        .captures(text)
        .map(|c| c[1].to_string())
}

/// Canonical `NN-NN-NN` form regardless of how the statement printed it.
pub fn extract_sort_code(text: &str) -> Option<String> {
    re_sort_code()
        .captures(text)
        .map(|c| format!("{}-{}-{}", &c[1], &c[2], &c[3]))
}

/// Lead words too generic to identify a bank on their own ("bank" would make
/// every `bank_statement.pdf` look like Bank of Scotland).
const GENERIC_NAME_WORDS: &[&str] = &["bank", "royal", "first"];

/// Display-name hint used only when content detection yields unknown. Never
/// drives parser dispatch.
pub fn bank_from_filename(filename: &str) -> Option<&'static BankProfile> {
    let lower = filename.to_lowercase();
    PROFILES.iter().find(|p| {
        let name = p.display_name.to_lowercase();
        if lower.contains(&name)
            || lower.contains(&name.replace(' ', "_"))
            || lower.contains(&name.replace(' ', ""))
        {
            return true;
        }
        let first_word = name.split_whitespace().next().unwrap_or(&name);
        !GENERIC_NAME_WORDS.contains(&first_word) && lower.contains(first_word)
    })
}
