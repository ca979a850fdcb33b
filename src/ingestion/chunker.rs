//! Text chunking with overlap and page tracking

use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use super::parser::ParsedDocument;
use crate::config::ChunkingConfig;
use crate::types::Chunk;

/// Text chunker with configurable size and overlap
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks
    overlap: usize,
    /// Minimum chunk size
    min_size: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            overlap: config.chunk_overlap,
            min_size: config.min_chunk_size,
        }
    }

    /// Chunk a parsed document
    ///
    /// A non-empty document always yields at least one chunk, even when its
    /// text is shorter than the minimum chunk size.
    pub fn chunk_document(&self, document_id: Uuid, parsed: &ParsedDocument) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        if parsed.pages.len() > 1 {
            for page in &parsed.pages {
                let page_chunks = self.chunk_text(
                    &page.content,
                    document_id,
                    Some(page.page_number),
                    page.char_offset,
                    chunks.len() as u32,
                );
                chunks.extend(page_chunks);
            }
        } else {
            chunks = self.chunk_text(
                &parsed.content,
                document_id,
                parsed.pages.first().map(|p| p.page_number),
                0,
                0,
            );
        }

        if chunks.is_empty() && !parsed.content.trim().is_empty() {
            let content = parsed.content.trim().to_string();
            let len = content.len();
            chunks.push(Chunk::new(
                document_id,
                content,
                parsed.pages.first().map(|p| p.page_number),
                0,
                len,
                0,
            ));
        }

        chunks
    }

    /// Chunk a run of text, accumulating whole sentences up to the target size
    fn chunk_text(
        &self,
        text: &str,
        document_id: Uuid,
        page_number: Option<u32>,
        base_offset: usize,
        start_index: u32,
    ) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_start = 0usize;
        let mut chunk_index = start_index;
        let mut pos = 0usize;

        for sentence in text.split_sentence_bounds() {
            if !current.is_empty() && current.len() + sentence.len() > self.chunk_size {
                if current.trim().len() >= self.min_size {
                    chunks.push(Chunk::new(
                        document_id,
                        current.trim().to_string(),
                        page_number,
                        base_offset + current_start,
                        base_offset + pos,
                        chunk_index,
                    ));
                    chunk_index += 1;
                }

                // Start the next chunk with the tail of this one
                let overlap_text = self.overlap_tail(&current);
                current_start = pos.saturating_sub(overlap_text.len());
                current = overlap_text;
            }

            current.push_str(sentence);
            pos += sentence.len();
        }

        if current.trim().len() >= self.min_size {
            chunks.push(Chunk::new(
                document_id,
                current.trim().to_string(),
                page_number,
                base_offset + current_start,
                base_offset + pos,
                chunk_index,
            ));
        }

        chunks
    }

    /// Take the trailing `overlap` characters of a chunk, preferring a
    /// sentence or word boundary
    fn overlap_tail(&self, text: &str) -> String {
        if text.len() <= self.overlap {
            return text.to_string();
        }

        let mut start = text.len().saturating_sub(self.overlap);
        while start > 0 && !text.is_char_boundary(start) {
            start -= 1;
        }

        let tail = &text[start..];

        if let Some(idx) = tail.find(". ") {
            return tail[idx + 2..].to_string();
        }
        if let Some(idx) = tail.find(' ') {
            return tail[idx + 1..].to_string();
        }

        tail.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::parser::PageContent;
    use crate::types::FileType;

    fn chunker(chunk_size: usize, overlap: usize, min_size: usize) -> TextChunker {
        TextChunker::new(&ChunkingConfig {
            chunk_size,
            chunk_overlap: overlap,
            min_chunk_size: min_size,
        })
    }

    fn parsed(content: &str) -> ParsedDocument {
        ParsedDocument {
            file_type: FileType::Txt,
            content: content.to_string(),
            content_hash: String::new(),
            total_pages: None,
            pages: vec![PageContent {
                page_number: 1,
                content: content.to_string(),
                char_offset: 0,
            }],
        }
    }

    #[test]
    fn test_long_text_splits_into_multiple_chunks() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(50);
        let chunks = chunker(200, 40, 20).chunk_document(Uuid::new_v4(), &parsed(&text));

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            // One sentence of slack past the target size at most
            assert!(chunk.content.len() <= 200 + 46);
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let text = "Alpha beta gamma delta. ".repeat(40);
        let chunks = chunker(200, 60, 20).chunk_document(Uuid::new_v4(), &parsed(&text));

        assert!(chunks.len() > 1);
        let first_tail: String = chunks[0]
            .content
            .chars()
            .rev()
            .take(10)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        assert!(chunks[1].content.contains(first_tail.trim()));
    }

    #[test]
    fn test_chunk_indices_are_sequential() {
        let text = "One sentence here. ".repeat(60);
        let chunks = chunker(150, 30, 20).chunk_document(Uuid::new_v4(), &parsed(&text));

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i as u32);
        }
    }

    #[test]
    fn test_tiny_document_still_yields_one_chunk() {
        let chunks = chunker(1000, 200, 50).chunk_document(Uuid::new_v4(), &parsed("Short."));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Short.");
    }

    #[test]
    fn test_multi_page_document_tracks_page_numbers() {
        let doc = ParsedDocument {
            file_type: FileType::Pdf,
            content: String::new(),
            content_hash: String::new(),
            total_pages: Some(2),
            pages: vec![
                PageContent {
                    page_number: 1,
                    content: "First page sentence one. First page sentence two.".to_string(),
                    char_offset: 0,
                },
                PageContent {
                    page_number: 2,
                    content: "Second page sentence one. Second page sentence two.".to_string(),
                    char_offset: 49,
                },
            ],
        };

        let chunks = chunker(1000, 200, 10).chunk_document(Uuid::new_v4(), &doc);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page_number, Some(1));
        assert_eq!(chunks[1].page_number, Some(2));
    }
}
