/// An uploaded file exactly as received. Input only; never mutated.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: String,
}

impl RawDocument {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, mime: impl Into<String>) -> Self {
        Self { bytes, filename: filename.into(), mime: mime.into() }
    }

    pub fn has_pdf_header(&self) -> bool {
        self.bytes.len() > 4 && &self.bytes[..4] == b"%PDF"
    }

    /// Whether the declared type or extension marks this as plain text/CSV.
    pub fn is_textual(&self) -> bool {
        let mime = self.mime.to_lowercase();
        if mime.starts_with("text/") || mime == "application/csv" {
            return true;
        }
        let name = self.filename.to_lowercase();
        name.ends_with(".txt") || name.ends_with(".csv")
    }
}

/// A positioned fragment of text on a page. Coordinates are absent for
/// backends that only produce linear text.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub text: String,
    pub x: Option<f32>,
    pub y: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub number: u32,
    pub runs: Vec<TextRun>,
    pub text: String,
}

impl Page {
    pub fn from_text(number: u32, text: impl Into<String>) -> Self {
        Self { number, runs: Vec::new(), text: text.into() }
    }
}

/// Ordered page texts produced by one extraction attempt. Transient; never
/// persisted.
#[derive(Debug, Clone, Default)]
pub struct ExtractedText {
    pub pages: Vec<Page>,
}

impl ExtractedText {
    pub fn from_plain(text: impl Into<String>) -> Self {
        Self { pages: vec![Page::from_text(1, text)] }
    }

    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}
