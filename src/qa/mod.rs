//! Question answering over indexed documents.
//!
//! Retrieval pulls the nearest chunks for a question from one document's
//! namespace, the prompt builder filters and assembles them into context,
//! and the chat client sends the final prompt to the hosted model.
pub mod answer;
pub mod llm;
pub mod prompt;
pub mod retriever;
