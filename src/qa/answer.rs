//! End-to-end answering: retrieve, gate, prompt, and call the model.
use anyhow::Result;
use tracing::error;

use super::llm::ChatModel;
use super::prompt::{self, NOT_PROVIDED};
use super::retriever::retrieve_top_chunks;
use crate::embedder::Embedder;
use crate::index::VectorStore;

/// Reply when the namespace holds nothing retrievable for the question.
pub const NO_CONTENT: &str = "No relevant content found in the index.";

/// Reply when the chat endpoint rejects or fails the request.
pub const API_ERROR_REPLY: &str = "API error: unable to retrieve an answer.";

const ANSWER_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const CHAT_SYSTEM_PROMPT: &str = "You are a financial assistant.";

/// Answer a question about one indexed document.
///
/// Failures of the chat endpoint are reported to the user as a fixed reply
/// rather than an error; the session keeps going.
pub fn answer_question(
    store: &VectorStore,
    embedder: &dyn Embedder,
    model: &dyn ChatModel,
    model_name: &str,
    content_hash: &str,
    question: &str,
    top_k: usize,
) -> Result<String> {
    let chunks = retrieve_top_chunks(store, embedder, content_hash, question, top_k)?;
    if chunks.is_empty() {
        return Ok(NO_CONTENT.to_string());
    }

    let Some(prompt) = prompt::build_prompt(question, &chunks) else {
        return Ok(NOT_PROVIDED.to_string());
    };

    match model.complete(model_name, ANSWER_SYSTEM_PROMPT, &prompt) {
        Ok(answer) => Ok(answer.trim().to_string()),
        Err(e) => {
            error!("Chat completion failed: {e}");
            Ok(API_ERROR_REPLY.to_string())
        }
    }
}

/// Free-form chat with the financial-assistant persona, no retrieval.
pub fn chat(model: &dyn ChatModel, model_name: &str, message: &str) -> Result<String> {
    match model.complete(model_name, CHAT_SYSTEM_PROMPT, message) {
        Ok(reply) => Ok(reply.trim().to_string()),
        Err(e) => {
            error!("Chat completion failed: {e}");
            Ok(API_ERROR_REPLY.to_string())
        }
    }
}
