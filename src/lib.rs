//! Concurrent question categorization against an OpenAI-style chat
//! endpoint: fetch a question dataset, fan the questions out under a
//! concurrency bound with retry, backoff, and memoization, then persist
//! and summarize the answers.

pub mod client;
pub mod config;
pub mod dataset;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod memo;
pub mod persist;
pub mod prompt;
pub mod report;
pub mod response;
