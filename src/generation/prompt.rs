//! Prompt templates for question answering

use crate::retrieval::SearchResult;

/// Prompt builder for document-grounded questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the context block from search results
    ///
    /// Chunks appear in retrieval order as numbered blocks with their page
    /// reference when the source is paginated.
    pub fn build_context(results: &[SearchResult]) -> String {
        let mut context = String::new();

        for (i, result) in results.iter().enumerate() {
            match result.chunk.page_number {
                Some(page) => {
                    context.push_str(&format!("[{}] (Page {})\n", i + 1, page));
                }
                None => {
                    context.push_str(&format!("[{}]\n", i + 1));
                }
            }
            context.push_str(&result.chunk.content);
            context.push_str("\n\n");
        }

        context.trim_end().to_string()
    }

    /// Build the system instruction carrying the retrieved context
    ///
    /// The question goes in a separate user message; the model sees no
    /// conversation history.
    pub fn system_prompt(context: &str) -> String {
        format!(
            "You are an assistant for question-answering tasks. \
             Use the following pieces of retrieved context to answer the question. \
             If you don't know the answer, say that you don't know. \
             Keep the answer concise and helpful.\n\n{}",
            context
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;
    use uuid::Uuid;

    fn result(content: &str, page: Option<u32>, similarity: f32) -> SearchResult {
        SearchResult {
            chunk: Chunk::new(Uuid::nil(), content.to_string(), page, 0, content.len(), 0),
            similarity,
        }
    }

    #[test]
    fn test_context_numbers_chunks_and_cites_pages() {
        let results = vec![
            result("The warranty lasts two years.", Some(4), 0.9),
            result("Coverage excludes accidental damage.", None, 0.7),
        ];

        let context = PromptBuilder::build_context(&results);
        assert!(context.starts_with("[1] (Page 4)\nThe warranty lasts two years."));
        assert!(context.contains("[2]\nCoverage excludes accidental damage."));
    }

    #[test]
    fn test_system_prompt_embeds_context_and_instruction() {
        let prompt = PromptBuilder::system_prompt("some context");
        assert!(prompt.contains("say that you don't know"));
        assert!(prompt.ends_with("some context"));
    }

    #[test]
    fn test_empty_results_give_empty_context() {
        assert_eq!(PromptBuilder::build_context(&[]), "");
    }
}
