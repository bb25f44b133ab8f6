//! RAG (Retrieval-Augmented Generation) for grounded question answering.
//!
//! [`Retriever`] embeds chunks into a [`VectorIndex`](crate::vector_store::VectorIndex)
//! and finds the chunks closest to a question; [`AnswerComposer`] turns those
//! chunks and the question into a grounding prompt for the language model.

mod composer;
mod retriever;

pub use composer::{format_context_for_prompt, AnswerComposer};
pub use retriever::Retriever;
