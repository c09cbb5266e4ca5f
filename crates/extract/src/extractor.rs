use crate::backend::{ExtractionError, LopdfBackend, PdfBackend, PdfExtractBackend};
use crate::model::{ExtractedText, RawDocument};

/// Front door for text recovery. Tries each backend in order and returns the
/// first success; order is a performance choice, not a correctness ranking.
pub struct Extractor {
    backends: Vec<Box<dyn PdfBackend>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            backends: vec![Box::new(PdfExtractBackend), Box::new(LopdfBackend)],
        }
    }
}

impl Extractor {
    pub fn with_backends(backends: Vec<Box<dyn PdfBackend>>) -> Self {
        Self { backends }
    }

    pub fn extract(&self, doc: &RawDocument) -> Result<ExtractedText, ExtractionError> {
        // Text and CSV uploads skip the PDF machinery entirely.
        if doc.is_textual() {
            let text = String::from_utf8_lossy(&doc.bytes);
            return Ok(ExtractedText::from_plain(text.into_owned()));
        }

        if !doc.has_pdf_header() {
            // A mislabelled text export is still worth reading; raw binary
            // junk is not.
            return match std::str::from_utf8(&doc.bytes) {
                Ok(text) => Ok(ExtractedText::from_plain(text.to_string())),
                Err(_) => Err(ExtractionError::NotPdf),
            };
        }

        let mut last_err = ExtractionError::NotPdf;
        for backend in &self.backends {
            match backend.extract(&doc.bytes) {
                Ok(text) => {
                    tracing::debug!(
                        backend = backend.name(),
                        pages = text.pages.len(),
                        "extraction succeeded"
                    );
                    return Ok(text);
                }
                Err(e) => {
                    tracing::warn!(backend = backend.name(), "extraction failed: {e}");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Page;

    struct AlwaysFails;
    impl PdfBackend for AlwaysFails {
        fn name(&self) -> &'static str {
            "always-fails"
        }
        fn extract(&self, _bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
            Err(ExtractionError::Backend {
                backend: "always-fails",
                details: "nope".to_string(),
            })
        }
    }

    struct Fixed(&'static str);
    impl PdfBackend for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn extract(&self, _bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
            Ok(ExtractedText {
                pages: vec![Page::from_text(1, self.0)],
            })
        }
    }

    fn pdf_doc(bytes: &[u8]) -> RawDocument {
        RawDocument::new(bytes.to_vec(), "statement.pdf", "application/pdf")
    }

    #[test]
    fn falls_through_to_second_backend() {
        let ex = Extractor::with_backends(vec![Box::new(AlwaysFails), Box::new(Fixed("recovered"))]);
        let text = ex.extract(&pdf_doc(b"%PDF-1.4 whatever")).unwrap();
        assert_eq!(text.full_text(), "recovered");
    }

    #[test]
    fn reports_last_error_when_all_backends_fail() {
        let ex = Extractor::with_backends(vec![Box::new(AlwaysFails), Box::new(AlwaysFails)]);
        let err = ex.extract(&pdf_doc(b"%PDF-1.4 whatever")).unwrap_err();
        assert!(matches!(err, ExtractionError::Backend { .. }));
    }

    #[test]
    fn textual_upload_bypasses_backends() {
        let ex = Extractor::with_backends(vec![Box::new(AlwaysFails)]);
        let doc = RawDocument::new(b"01/03/2024,TESCO,-12.50".to_vec(), "tx.csv", "text/csv");
        let text = ex.extract(&doc).unwrap();
        assert!(text.full_text().contains("TESCO"));
    }

    #[test]
    fn mislabelled_utf8_treated_as_text() {
        let ex = Extractor::default();
        let doc = RawDocument::new(b"just some words".to_vec(), "notes.pdf", "application/pdf");
        let text = ex.extract(&doc).unwrap();
        assert_eq!(text.full_text(), "just some words");
    }

    #[test]
    fn binary_junk_is_not_a_document() {
        let ex = Extractor::default();
        let doc = RawDocument::new(vec![0u8, 159, 146, 150], "junk.pdf", "application/pdf");
        assert!(matches!(ex.extract(&doc), Err(ExtractionError::NotPdf)));
    }

    #[test]
    fn real_backends_read_generated_pdf() {
        let bytes = crate::test_pdf::single_page_pdf(&["01/03/2024 TESCO STORE 12.50"]);
        let text = Extractor::default().extract(&pdf_doc(&bytes)).unwrap();
        assert!(text.full_text().contains("TESCO STORE"));
    }
}
