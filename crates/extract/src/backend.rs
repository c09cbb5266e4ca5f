use thiserror::Error;

use crate::model::{ExtractedText, Page};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("not a PDF: missing %PDF header")]
    NotPdf,
    #[error("document is encrypted")]
    Encrypted,
    #[error("document has no pages")]
    NoPages,
    #[error("{backend} backend failed: {details}")]
    Backend { backend: &'static str, details: String },
}

/// Abstraction over a PDF text-extraction backend. The two implementations
/// have disjoint failure modes, so the extractor can substitute one for the
/// other; neither is assumed more correct.
pub trait PdfBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError>;
}

// ── Primary: pdf-extract ─────────────────────────────────────────────────────

/// Linear text via the `pdf-extract` crate. Pages are recovered from form
/// feeds when the document emits them, otherwise the whole text lands on one
/// page.
pub struct PdfExtractBackend;

impl PdfBackend for PdfExtractBackend {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        if bytes.len() < 5 || &bytes[..4] != b"%PDF" {
            return Err(ExtractionError::NotPdf);
        }

        let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            let details = e.to_string();
            if details.to_lowercase().contains("encrypt") {
                ExtractionError::Encrypted
            } else {
                ExtractionError::Backend { backend: "pdf-extract", details }
            }
        })?;

        let pages: Vec<Page> = if text.contains('\x0C') {
            text.split('\x0C')
                .enumerate()
                .map(|(i, t)| Page::from_text(i as u32 + 1, t))
                .collect()
        } else {
            vec![Page::from_text(1, text)]
        };

        Ok(ExtractedText { pages })
    }
}

// ── Secondary: lopdf ─────────────────────────────────────────────────────────

/// Per-page text via `lopdf`. Chokes on different encodings than pdf-extract,
/// which is exactly why it exists.
pub struct LopdfBackend;

impl PdfBackend for LopdfBackend {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        if bytes.len() < 5 || &bytes[..4] != b"%PDF" {
            return Err(ExtractionError::NotPdf);
        }

        let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractionError::Backend {
            backend: "lopdf",
            details: e.to_string(),
        })?;

        if doc.is_encrypted() {
            return Err(ExtractionError::Encrypted);
        }

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(ExtractionError::NoPages);
        }

        let mut pages = Vec::with_capacity(page_numbers.len());
        let mut failures = 0usize;
        for number in page_numbers {
            match doc.extract_text(&[number]) {
                Ok(text) => pages.push(Page::from_text(number, text)),
                Err(e) => {
                    tracing::warn!(page = number, "lopdf page extraction failed: {e}");
                    failures += 1;
                    pages.push(Page::from_text(number, ""));
                }
            }
        }

        if failures == pages.len() {
            return Err(ExtractionError::Backend {
                backend: "lopdf",
                details: "no page yielded text".to_string(),
            });
        }

        Ok(ExtractedText { pages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_backends_reject_non_pdf_bytes() {
        assert!(matches!(
            PdfExtractBackend.extract(b"plain text"),
            Err(ExtractionError::NotPdf)
        ));
        assert!(matches!(
            LopdfBackend.extract(b"plain text"),
            Err(ExtractionError::NotPdf)
        ));
    }

    #[test]
    fn lopdf_rejects_truncated_pdf() {
        let err = LopdfBackend.extract(b"%PDF-1.4 then nothing").unwrap_err();
        assert!(matches!(err, ExtractionError::Backend { backend: "lopdf", .. }));
    }

    #[test]
    fn lopdf_reads_generated_document() {
        let bytes = crate::test_pdf::single_page_pdf(&[
            "Statement of account",
            "01/03/2024 TESCO STORE 12.50",
        ]);
        let extracted = LopdfBackend.extract(&bytes).unwrap();
        let text = extracted.full_text();
        assert!(text.contains("TESCO STORE"), "got: {text}");
    }
}
