//! File parser for PDF and plain-text documents

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::FileType;

/// Parsed document with extracted text and metadata
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// File type
    pub file_type: FileType,
    /// Extracted text content
    pub content: String,
    /// Content hash
    pub content_hash: String,
    /// Total pages (if applicable)
    pub total_pages: Option<u32>,
    /// Page-level content
    pub pages: Vec<PageContent>,
}

/// Content from a single page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Text content of the page
    pub content: String,
    /// Character offset in full document
    pub char_offset: usize,
}

/// Multi-format file parser
pub struct FileParser;

impl FileParser {
    /// Parse a file based on its extension
    ///
    /// Returns `Error::EmptyDocument` when the file is syntactically valid
    /// but yields no extractable text (e.g. a scanned-image-only PDF).
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        let file_type = FileType::from_extension(&extension);

        if !file_type.is_supported() {
            return Err(Error::UnsupportedFileType(extension));
        }

        match file_type {
            FileType::Pdf => Self::parse_pdf(filename, data),
            FileType::Txt | FileType::Markdown => Self::parse_text(filename, data, file_type),
            FileType::Unknown => unreachable!("rejected above"),
        }
    }

    /// Parse PDF document
    fn parse_pdf(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let content = Self::extract_pdf_with_timeout(filename, data)?;
        let content = normalize_extracted_text(&content);

        if content.trim().is_empty() {
            return Err(Error::EmptyDocument(format!(
                "{} (PDF may be image-based or have no text layer)",
                filename
            )));
        }

        // Count pages with lopdf; the extracted text itself is not
        // reliably splittable per page, so chunking sees one text unit.
        let total_pages = match lopdf::Document::load_mem(data) {
            Ok(doc) => Some(doc.get_pages().len() as u32),
            Err(_) => Some(1),
        };

        let pages = vec![PageContent {
            page_number: 1,
            content: content.clone(),
            char_offset: 0,
        }];

        Ok(ParsedDocument {
            file_type: FileType::Pdf,
            content_hash: hash_content(&content),
            content,
            total_pages,
            pages,
        })
    }

    /// Extract PDF text with a sync timeout to prevent hangs on problematic fonts
    fn extract_pdf_with_timeout(filename: &str, data: &[u8]) -> Result<String> {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Duration::from_secs(60)) {
            Ok(Ok(text)) => {
                let _ = handle.join();
                Ok(text)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                tracing::warn!("pdf-extract failed for {}: {}, trying lopdf fallback", filename, e);
                Self::extract_pdf_text_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // Extraction thread cannot be killed; leave it and fall back
                tracing::warn!("PDF extraction timed out for {} after 60s", filename);
                Self::extract_pdf_text_fallback(filename, data)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::warn!("PDF extraction thread crashed for {}", filename);
                Self::extract_pdf_text_fallback(filename, data)
            }
        }
    }

    /// Fallback PDF text extraction using lopdf directly
    fn extract_pdf_text_fallback(filename: &str, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("failed to load PDF: {}", e)))?;

        let mut all_text = String::new();
        for (page_num, _) in doc.get_pages() {
            match doc.extract_text(&[page_num]) {
                Ok(text) => {
                    if !text.trim().is_empty() {
                        all_text.push_str(&text);
                        all_text.push('\n');
                    }
                }
                Err(e) => {
                    tracing::debug!("could not extract text from page {}: {}", page_num, e);
                }
            }
        }

        Ok(all_text)
    }

    /// Parse plain text or markdown
    fn parse_text(filename: &str, data: &[u8], file_type: FileType) -> Result<ParsedDocument> {
        let content = String::from_utf8_lossy(data).to_string();

        if content.trim().is_empty() {
            return Err(Error::EmptyDocument(filename.to_string()));
        }

        let pages = vec![PageContent {
            page_number: 1,
            content: content.clone(),
            char_offset: 0,
        }];

        Ok(ParsedDocument {
            file_type,
            content_hash: hash_content(&content),
            content,
            total_pages: None,
            pages,
        })
    }
}

/// Clean up extracted PDF text: resolve common ligatures and typographic
/// glyphs, strip null bytes, drop blank lines
fn normalize_extracted_text(text: &str) -> String {
    let replaced = text
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2010}', '\u{2011}', '\u{2013}'], "-")
        .replace('\u{2014}', "--")
        .replace('\u{2026}', "...")
        .replace('\u{00A0}', " ")
        .replace('\0', "");

    replaced
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hash content for change detection
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_file() {
        let parsed = FileParser::parse("notes.txt", b"Rust is a systems language.").unwrap();
        assert_eq!(parsed.file_type, FileType::Txt);
        assert_eq!(parsed.pages.len(), 1);
        assert!(parsed.content.contains("systems language"));
    }

    #[test]
    fn test_parse_markdown_file() {
        let parsed = FileParser::parse("README.md", b"# Title\n\nBody text.").unwrap();
        assert_eq!(parsed.file_type, FileType::Markdown);
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let err = FileParser::parse("report.docx", b"PK\x03\x04").unwrap_err();
        assert_eq!(err.kind(), "unsupported_file_type");
    }

    #[test]
    fn test_empty_text_file_is_empty_document() {
        let err = FileParser::parse("blank.txt", b"   \n\t  ").unwrap_err();
        assert_eq!(err.kind(), "empty_document");
    }

    #[test]
    fn test_invalid_pdf_bytes_fail_parse() {
        let err = FileParser::parse("broken.pdf", b"not a pdf at all").unwrap_err();
        // pdf-extract rejects it, the lopdf fallback rejects it too
        assert!(matches!(err.kind(), "file_parse" | "empty_document"));
    }

    #[test]
    fn test_normalize_resolves_ligatures_and_blank_lines() {
        let raw = "e\u{FB03}cient\n\n\n\u{201C}quoted\u{201D}\u{00A0}text\0";
        let cleaned = normalize_extracted_text(raw);
        assert_eq!(cleaned, "efficient\n\"quoted\" text");
    }

    #[test]
    fn test_hashes_differ_per_content() {
        assert_ne!(hash_content("a"), hash_content("b"));
    }
}
