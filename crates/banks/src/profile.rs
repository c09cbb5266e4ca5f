use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Closed set of supported statement layouts. Parser dispatch is a match on
/// this enum, never runtime type inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankId {
    Wise,
    Monzo,
    Starling,
    Revolut,
    Anna,
    Tide,
    Chase,
    FirstDirect,
    Metro,
    Coop,
    Tsb,
    Nationwide,
    VirginMoney,
    Barclays,
    Hsbc,
    Lloyds,
    Halifax,
    Natwest,
    Rbs,
    BankOfScotland,
    Ulster,
    Santander,
    Unknown,
}

/// One bank-identifying pattern with its contribution to the match score.
/// Patterns are compiled case-insensitively.
pub struct Signature {
    pub pattern: &'static str,
    pub weight: u32,
}

const fn sig(pattern: &'static str, weight: u32) -> Signature {
    Signature { pattern, weight }
}

pub struct BankProfile {
    pub id: BankId,
    pub display_name: &'static str,
    pub signatures: &'static [Signature],
}

/// Statically declared profiles. Declaration order is priority order: the
/// fintechs carry distinctive letterheads and sort-code prefixes, so they sit
/// above the high-street banks whose single-word names show up inside other
/// banks' transaction descriptions.
pub static PROFILES: &[BankProfile] = &[
    BankProfile {
        id: BankId::Wise,
        display_name: "Wise",
        signatures: &[
            sig(r"wise payments ltd", 10),
            sig(r"transferwise", 9),
            sig(r"\bTRWI[A-Z0-9]+", 8),
            sig(r"sent money to|received money from", 6),
            sig(r"wise\.com", 7),
        ],
    },
    BankProfile {
        id: BankId::Monzo,
        display_name: "Monzo",
        signatures: &[
            sig(r"monzo bank", 10),
            sig(r"MONZGB", 8),
            sig(r"monzo\.com", 7),
            sig(r"pot transfer|round up", 7),
            sig(r"sort code:?\s*04-00", 9),
        ],
    },
    BankProfile {
        id: BankId::Starling,
        display_name: "Starling Bank",
        signatures: &[
            sig(r"starling bank", 10),
            sig(r"SRLGGB", 8),
            sig(r"starlingbank\.com", 7),
            sig(r"sort code:?\s*60-83", 9),
        ],
    },
    BankProfile {
        id: BankId::Revolut,
        display_name: "Revolut",
        signatures: &[
            sig(r"revolut bank uab|revolut ltd", 10),
            sig(r"REVOGB", 8),
            sig(r"revolut\.com", 7),
        ],
    },
    BankProfile {
        id: BankId::Anna,
        display_name: "ANNA Money",
        signatures: &[
            sig(r"absolutely no nonsense admin", 10),
            sig(r"anna money|anna\.money", 9),
            sig(r"payrnet", 8),
        ],
    },
    BankProfile {
        id: BankId::Tide,
        display_name: "Tide",
        signatures: &[
            sig(r"tide platform", 10),
            sig(r"tide\.co\b", 8),
            sig(r"clearbank", 6),
        ],
    },
    BankProfile {
        id: BankId::Chase,
        display_name: "Chase",
        signatures: &[
            sig(r"j\.?p\.? morgan", 9),
            sig(r"chase\.co\.uk", 8),
            sig(r"CHASGB", 8),
        ],
    },
    BankProfile {
        id: BankId::FirstDirect,
        display_name: "First Direct",
        signatures: &[
            sig(r"first direct", 10),
            sig(r"firstdirect", 9),
            sig(r"MIDLGB2L", 8),
            sig(r"\b40-47-\d", 7),
        ],
    },
    BankProfile {
        id: BankId::Metro,
        display_name: "Metro Bank",
        signatures: &[
            sig(r"metro bank", 10),
            sig(r"METRGB", 8),
            sig(r"\b23-05-\d", 7),
        ],
    },
    BankProfile {
        id: BankId::Coop,
        display_name: "Co-operative Bank",
        signatures: &[
            sig(r"co-operative bank|co-op bank", 10),
            sig(r"CPBKGB", 8),
            sig(r"\b08-92-\d", 7),
        ],
    },
    BankProfile {
        id: BankId::Tsb,
        display_name: "TSB Bank",
        signatures: &[
            sig(r"tsb bank", 10),
            sig(r"TSBSGB", 8),
            sig(r"tsb classic", 7),
        ],
    },
    BankProfile {
        id: BankId::Nationwide,
        display_name: "Nationwide Building Society",
        signatures: &[
            sig(r"nationwide building society", 10),
            sig(r"NAIAGB", 8),
            sig(r"flexaccount|flexdirect", 7),
        ],
    },
    BankProfile {
        id: BankId::VirginMoney,
        display_name: "Virgin Money",
        signatures: &[
            sig(r"virgin money", 10),
            sig(r"virginmoney\.com", 8),
            sig(r"NRNBGB", 8),
        ],
    },
    BankProfile {
        id: BankId::Barclays,
        display_name: "Barclays",
        signatures: &[
            sig(r"barclays bank", 10),
            sig(r"barclays\.co\.uk", 8),
            sig(r"BUKBGB", 8),
            sig(r"balance b/f|balance c/f", 6),
            sig(r"barclays", 5),
        ],
    },
    BankProfile {
        id: BankId::Hsbc,
        display_name: "HSBC",
        signatures: &[
            sig(r"hsbc uk bank", 10),
            sig(r"hsbc bank plc", 9),
            sig(r"hsbc\.co\.uk", 8),
            sig(r"MIDLGB", 6),
            sig(r"hsbc", 5),
        ],
    },
    BankProfile {
        id: BankId::Lloyds,
        display_name: "Lloyds Bank",
        signatures: &[
            sig(r"lloyds bank", 10),
            sig(r"LOYDGB", 8),
            sig(r"club lloyds", 7),
            sig(r"lloyds", 5),
        ],
    },
    BankProfile {
        id: BankId::Halifax,
        display_name: "Halifax",
        signatures: &[
            sig(r"halifax", 10),
            sig(r"HLFXGB", 8),
            sig(r"halifax reward", 7),
        ],
    },
    BankProfile {
        id: BankId::Natwest,
        display_name: "NatWest",
        signatures: &[
            sig(r"natwest", 10),
            sig(r"national westminster", 10),
            sig(r"NWBKGB", 8),
        ],
    },
    // Royal Bank of Scotland must outscore its subset string "bank of
    // scotland" below, so its letterhead carries the heavier weights.
    BankProfile {
        id: BankId::Rbs,
        display_name: "Royal Bank of Scotland",
        signatures: &[
            sig(r"royal bank of scotland", 10),
            sig(r"rbs\.co\.uk", 8),
            sig(r"RBOSGB", 8),
        ],
    },
    BankProfile {
        id: BankId::BankOfScotland,
        display_name: "Bank of Scotland",
        signatures: &[
            sig(r"bank of scotland", 7),
            sig(r"bankofscotland\.co\.uk", 8),
            sig(r"BOFSGB", 8),
        ],
    },
    BankProfile {
        id: BankId::Ulster,
        display_name: "Ulster Bank",
        signatures: &[
            sig(r"ulster bank", 10),
            sig(r"ULSBGB", 8),
        ],
    },
    BankProfile {
        id: BankId::Santander,
        display_name: "Santander",
        signatures: &[
            sig(r"santander uk", 10),
            sig(r"ABBYGB", 8),
            sig(r"santander", 6),
        ],
    },
];

pub static UNKNOWN_PROFILE: BankProfile = BankProfile {
    id: BankId::Unknown,
    display_name: "Unknown Bank",
    signatures: &[],
};

/// Signature regexes compiled once, parallel to `PROFILES`.
pub(crate) fn compiled_signatures() -> &'static Vec<Vec<Regex>> {
    static COMPILED: OnceLock<Vec<Vec<Regex>>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PROFILES
            .iter()
            .map(|p| {
                p.signatures
                    .iter()
                    .map(|s| {
                        Regex::new(&format!("(?i){}", s.pattern)).expect("invalid bank signature")
                    })
                    .collect()
            })
            .collect()
    })
}

impl BankId {
    /// Stable lowercase identifier used in format metadata and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            BankId::Wise => "wise",
            BankId::Monzo => "monzo",
            BankId::Starling => "starling",
            BankId::Revolut => "revolut",
            BankId::Anna => "anna",
            BankId::Tide => "tide",
            BankId::Chase => "chase",
            BankId::FirstDirect => "firstdirect",
            BankId::Metro => "metro",
            BankId::Coop => "coop",
            BankId::Tsb => "tsb",
            BankId::Nationwide => "nationwide",
            BankId::VirginMoney => "virginmoney",
            BankId::Barclays => "barclays",
            BankId::Hsbc => "hsbc",
            BankId::Lloyds => "lloyds",
            BankId::Halifax => "halifax",
            BankId::Natwest => "natwest",
            BankId::Rbs => "rbs",
            BankId::BankOfScotland => "bankofscotland",
            BankId::Ulster => "ulster",
            BankId::Santander => "santander",
            BankId::Unknown => "unknown",
        }
    }

    pub fn profile(self) -> &'static BankProfile {
        PROFILES
            .iter()
            .find(|p| p.id == self)
            .unwrap_or(&UNKNOWN_PROFILE)
    }
}
