//! 물어보연세: search-augmented campus Q&A assistant.
//!
//! A user question is rewritten into a search string, answered by a
//! tool-using agent loop with one web search tool, and post-processed into
//! display text plus link buttons.

pub mod bootstrap;
pub mod core;
pub mod llm;
pub mod subsystems;

pub use bootstrap::logger;
pub use core::{config, error};

#[cfg(test)]
mod test_support;
