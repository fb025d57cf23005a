//! Prompt assembly for document Q&A.
//!
//! Retrieved chunks pass through a lexical gate before they are allowed into
//! the prompt: every significant term of the question must appear somewhere
//! in the chunk. This keeps loosely-related vector matches out of the
//! context the model sees.
use crate::index::search::RetrievedChunk;

/// Question words ignored by the lexical gate.
const STOPWORDS: &[&str] = &["what", "are", "the", "is", "in", "of", "as", "at"];

/// Canned reply when no chunk survives the lexical gate.
pub const NOT_PROVIDED: &str = "Information not provided.";

fn significant_terms(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .filter(|term| !STOPWORDS.contains(term))
        .map(str::to_string)
        .collect()
}

/// Whether a chunk contains every significant term of the question as a
/// substring of its combined text and table content.
fn chunk_matches(chunk: &RetrievedChunk, terms: &[String]) -> bool {
    let combined = format!(
        "{} {}",
        chunk.text.to_lowercase(),
        chunk.table_text.to_lowercase()
    );
    terms.iter().all(|term| combined.contains(term.as_str()))
}

/// Build the answer prompt from the question and its retrieved chunks.
///
/// Returns `None` when no chunk passes the lexical gate; the caller should
/// answer [`NOT_PROVIDED`] without calling the model.
pub fn build_prompt(question: &str, chunks: &[RetrievedChunk]) -> Option<String> {
    let terms = significant_terms(question);

    let matched: Vec<&RetrievedChunk> = chunks
        .iter()
        .filter(|chunk| chunk_matches(chunk, &terms))
        .collect();

    if matched.is_empty() {
        return None;
    }

    let context = matched
        .iter()
        .map(|chunk| {
            [chunk.text.as_str(), chunk.table_text.as_str()]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    Some(format!(
        r#"You are a highly accurate financial assistant designed to answer questions based strictly on the content of uploaded financial PDF documents.

Instructions:
1. Use **only exact data** from the PDFs.
2. Extract rows that match **country, term, and year** exactly.
3. If answer is not explicitly present, respond with: **"{NOT_PROVIDED}"**
4. If the year is not specified in the query and the information is provided for multiple years then respond with all the years.
5. Highlight the final answer like this: **Answer:** 29 million CHF (2024)
6. And write the answers in a structured format **bulleted points**, **one below the other**.

Context:
{context}

Question: {question}

Answer:
"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, table_text: &str) -> RetrievedChunk {
        RetrievedChunk {
            text: text.to_string(),
            table_text: table_text.to_string(),
            page_number: 1,
            similarity: 0.9,
        }
    }

    #[test]
    fn test_significant_terms_drops_stopwords() {
        let terms = significant_terms("What is the net revenue of 2024");
        assert_eq!(terms, vec!["net", "revenue", "2024"]);
    }

    #[test]
    fn test_matching_chunk_enters_context() {
        let chunks = vec![
            chunk("Net revenue for 2024 was 91,354 million.", ""),
            chunk("Employee headcount rose slightly.", ""),
        ];
        let prompt = build_prompt("What is the net revenue in 2024", &chunks).unwrap();
        assert!(prompt.contains("Net revenue for 2024 was 91,354 million."));
        assert!(!prompt.contains("Employee headcount"));
        assert!(prompt.contains("Question: What is the net revenue in 2024"));
    }

    #[test]
    fn test_table_text_counts_toward_match() {
        let chunks = vec![chunk("", "Dividend | 2024 | 3.00 CHF")];
        let prompt = build_prompt("dividend 2024", &chunks).unwrap();
        assert!(prompt.contains("Dividend | 2024 | 3.00 CHF"));
    }

    #[test]
    fn test_no_match_returns_none() {
        let chunks = vec![chunk("Operating margin improved.", "")];
        assert!(build_prompt("dividend 2024", &chunks).is_none());
    }

    #[test]
    fn test_stopword_only_question_matches_everything() {
        // With no significant terms the gate is vacuously satisfied.
        let chunks = vec![chunk("anything at all", "")];
        assert!(build_prompt("what is the", &chunks).is_some());
    }

    #[test]
    fn test_text_and_table_joined_within_block() {
        let chunks = vec![chunk("Sales summary", "Sales | 100")];
        let prompt = build_prompt("sales", &chunks).unwrap();
        assert!(prompt.contains("Sales summary\nSales | 100"));
    }
}
