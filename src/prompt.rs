//! Prompt text sent to the chat endpoint.
//!
//! Three instruction variants are rotated across retry attempts so a
//! failing question is not retried with the exact same prompt.

pub const VARIANTS: [&str; 3] = [
    "Categorize and answer the following question. Respond in JSON format with 'category' and 'answer' fields:",
    "Please provide a category and answer for this question. Use JSON format with 'category' and 'answer' keys:",
    "Analyze and respond to the following question. Return a JSON with 'category' for the question type and 'answer' for your response:",
];

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that provides answers in JSON format with 'category' and 'answer' fields.";

/// Stable caller tag attached to every completion request.
pub const CALLER_TAG: &str = "experiment_run_1";

/// Instruction variant for a zero-based attempt number. Wraps around, so
/// any retry budget cycles through all variants in order.
pub fn variant_for(attempt: u32) -> &'static str {
    VARIANTS[attempt as usize % VARIANTS.len()]
}

/// Full prompt for one attempt: instruction variant plus the question.
pub fn render(variant: &str, question: &str) -> String {
    format!("{variant} {question}")
}
