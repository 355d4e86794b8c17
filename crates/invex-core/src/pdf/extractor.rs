//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor.
///
/// `lopdf` parses and, when needed, decrypts the document; `pdf-extract`
/// reads the text layer from the (decrypted) bytes.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Text of a loaded PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfContent {
    pub page_count: u32,
    pub text: String,
}

impl PdfContent {
    /// Whether the text layer holds anything besides whitespace.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load `data` and extract its full text in one step.
    pub fn read(data: &[u8]) -> Result<PdfContent> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        let text = extractor.extract_text()?;
        debug!(
            "Extracted {} chars from {} pages",
            text.len(),
            extractor.page_count()
        );
        Ok(PdfContent {
            page_count: extractor.page_count(),
            text,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("no document loaded".to_string()));
        }
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}
