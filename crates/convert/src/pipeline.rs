use serde::Serialize;
use thiserror::Error;

use sterling_banks::{detect, fallback, parse_bank, refine_bank, universal, Detection};
use sterling_core::{ParseTier, ParsedStatement, Transaction};
use sterling_extract::{ExtractedText, ExtractionError, Extractor, RawDocument};

use crate::normalize::{normalize, NormalizeReport};
use crate::validate::balance_warnings;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The bytes could not be read as a document at all. Nothing to fall
    /// back to: no text means no tier can run.
    #[error("could not read file: {0}")]
    ExtractionFailed(#[from] ExtractionError),
    /// Every tier ran and produced nothing. The text was readable but not
    /// statement-shaped. Carries the tier trace so callers can see the
    /// whole chain genuinely ran.
    #[error("no transactions found in this statement")]
    NoTransactionsFound { attempts: Vec<TierAttempt> },
}

impl ConvertError {
    /// Stable identifier for API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertError::ExtractionFailed(_) => "extraction-failed",
            ConvertError::NoTransactionsFound { .. } => "no-transactions-found",
        }
    }
}

/// One tier's outcome, recorded whether or not it produced the result. The
/// sequence shows how far the fallback chain ran.
#[derive(Debug, Clone, Serialize)]
pub struct TierAttempt {
    pub tier: ParseTier,
    pub rows: usize,
    pub error: Option<String>,
}

/// A successful conversion plus the metadata callers surface to users:
/// which tier won, how sure we are, and what the normaliser discarded.
#[derive(Debug)]
pub struct Conversion {
    pub statement: ParsedStatement,
    pub tier: ParseTier,
    pub confidence: f32,
    pub report: NormalizeReport,
    pub attempts: Vec<TierAttempt>,
    pub warnings: Vec<String>,
}

/// Sequences detection and the three parsing tiers, absorbing each tier's
/// failure until the chain is exhausted. The only authority on what is
/// fatal: tier errors stop here, never at the caller.
pub struct Converter {
    extractor: Extractor,
}

impl Default for Converter {
    fn default() -> Self {
        Self { extractor: Extractor::default() }
    }
}

impl Converter {
    pub fn with_extractor(extractor: Extractor) -> Self {
        Self { extractor }
    }

    pub fn convert(&self, doc: &RawDocument) -> Result<Conversion, ConvertError> {
        let text = self.extractor.extract(doc)?;
        let detection = detect(&text);
        tracing::info!(
            bank = detection.profile.display_name,
            score = detection.score,
            "bank detection complete"
        );

        let mut attempts = Vec::new();
        let chosen = self.run_tiers(&text, &detection, &mut attempts);

        let Some((tier, raw_rows)) = chosen else {
            tracing::info!("all tiers exhausted without output");
            return Err(ConvertError::NoTransactionsFound { attempts });
        };

        let (transactions, report) = normalize(raw_rows);
        if transactions.is_empty() {
            // The tier found rows but every one violated the invariants.
            return Err(ConvertError::NoTransactionsFound { attempts });
        }
        tracing::info!(
            tier = %tier,
            kept = report.kept,
            rejected = report.rejected,
            "conversion complete"
        );

        let warnings = balance_warnings(&transactions);
        let statement = self.build_statement(doc, &text, &detection, tier, transactions);
        let confidence = confidence_for(tier, &report);

        Ok(Conversion { statement, tier, confidence, report, attempts, warnings })
    }

    /// The fallback chain: bank-specific (with confidence-gated refinement),
    /// then universal, then text fallback. First non-empty output wins.
    fn run_tiers(
        &self,
        text: &ExtractedText,
        detection: &Detection,
        attempts: &mut Vec<TierAttempt>,
    ) -> Option<(ParseTier, Vec<Transaction>)> {
        if detection.is_known() {
            let rows = self.bank_tier(text, detection, attempts);
            if !rows.is_empty() {
                return Some((ParseTier::BankSpecific, rows));
            }
        }

        let rows = universal::parse(text);
        attempts.push(TierAttempt {
            tier: ParseTier::Universal,
            rows: rows.len(),
            error: None,
        });
        if !rows.is_empty() {
            return Some((ParseTier::Universal, rows));
        }

        let rows = fallback::parse(&text.full_text());
        attempts.push(TierAttempt {
            tier: ParseTier::TextFallback,
            rows: rows.len(),
            error: None,
        });
        if !rows.is_empty() {
            return Some((ParseTier::TextFallback, rows));
        }

        None
    }

    fn bank_tier(
        &self,
        text: &ExtractedText,
        detection: &Detection,
        attempts: &mut Vec<TierAttempt>,
    ) -> Vec<Transaction> {
        let id = detection.id();
        let mut rows = match parse_bank(id, text) {
            Ok(rows) => {
                attempts.push(TierAttempt {
                    tier: ParseTier::BankSpecific,
                    rows: rows.len(),
                    error: None,
                });
                rows
            }
            Err(e) => {
                tracing::info!(bank = id.as_str(), "bank parser failed: {e}");
                attempts.push(TierAttempt {
                    tier: ParseTier::BankSpecific,
                    rows: 0,
                    error: Some(e.to_string()),
                });
                Vec::new()
            }
        };

        // Targeted retry, not a blanket one: only when we are sure of the
        // bank yet its own grammar came back empty.
        if rows.is_empty() && detection.is_confident() {
            if let Some(refined) = refine_bank(id, text) {
                match refined {
                    Ok(r) => {
                        tracing::info!(bank = id.as_str(), rows = r.len(), "refinement pass ran");
                        attempts.push(TierAttempt {
                            tier: ParseTier::BankSpecific,
                            rows: r.len(),
                            error: None,
                        });
                        rows = r;
                    }
                    Err(e) => {
                        attempts.push(TierAttempt {
                            tier: ParseTier::BankSpecific,
                            rows: 0,
                            error: Some(e.to_string()),
                        });
                    }
                }
            }
        }

        rows
    }

    fn build_statement(
        &self,
        doc: &RawDocument,
        text: &ExtractedText,
        detection: &Detection,
        tier: ParseTier,
        transactions: Vec<Transaction>,
    ) -> ParsedStatement {
        let full = text.full_text();

        // Content detection names the bank; the filename is only a display
        // hint for unknowns.
        let bank_name = if detection.is_known() {
            detection.profile.display_name.to_string()
        } else {
            sterling_banks::detect::bank_from_filename(&doc.filename)
                .map(|p| p.display_name.to_string())
                .unwrap_or_else(|| detection.profile.display_name.to_string())
        };

        let detected_format = match tier {
            ParseTier::BankSpecific => detection.id().as_str().to_string(),
            ParseTier::Universal => "universal".to_string(),
            ParseTier::TextFallback => "text-fallback".to_string(),
        };

        ParsedStatement {
            bank_name,
            detected_format,
            account_number: sterling_banks::detect::extract_account_number(&full),
            sort_code: sterling_banks::detect::extract_sort_code(&full),
            transactions,
        }
    }
}

/// Deterministic confidence: a base per tier scaled by how much of the
/// tier's output survived normalisation. No randomness anywhere.
fn confidence_for(tier: ParseTier, report: &NormalizeReport) -> f32 {
    let base = match tier {
        ParseTier::BankSpecific => 0.90,
        ParseTier::Universal => 0.60,
        ParseTier::TextFallback => 0.35,
    };
    let considered = report.kept + report.rejected;
    let survival = if considered == 0 {
        0.0
    } else {
        report.kept as f32 / considered as f32
    };
    (base * survival).clamp(0.0, 1.0)
}
