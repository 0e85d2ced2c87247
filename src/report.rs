use std::collections::BTreeMap;

use crate::error::SquadronError;
use crate::response::QuestionResult;

/// Descriptive statistics over a finished batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    /// Category → share, ordered by category name.
    pub categories: BTreeMap<String, CategoryShare>,
    pub most_common: String,
    pub mean_answer_chars: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub count: usize,
    pub percentage: f64,
}

/// Category distribution, most common category, and mean answer length
/// in characters. An empty batch has nothing to divide by and is an
/// error.
pub fn analyze(results: &[QuestionResult]) -> Result<Summary, SquadronError> {
    if results.is_empty() {
        return Err(SquadronError::EmptyResults);
    }

    let total = results.len();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for result in results {
        *counts.entry(result.category.clone()).or_insert(0) += 1;
    }

    tracing::info!("category distribution over {total} answers:");
    let mut categories = BTreeMap::new();
    for (category, count) in &counts {
        let percentage = (*count as f64 / total as f64) * 100.0;
        tracing::info!("  {category}: {percentage:.2}%");
        categories.insert(
            category.clone(),
            CategoryShare {
                count: *count,
                percentage,
            },
        );
    }

    // First strictly-greater count wins, so a tie resolves to the
    // alphabetically smallest category. Deterministic across runs.
    let mut most_common = String::new();
    let mut best = 0;
    for (category, count) in &counts {
        if *count > best {
            best = *count;
            most_common = category.clone();
        }
    }

    let answer_chars: usize = results.iter().map(|r| r.answer.chars().count()).sum();
    let mean_answer_chars = answer_chars as f64 / total as f64;

    tracing::info!("most common category: {most_common}");
    tracing::info!("average answer length: {mean_answer_chars:.2} characters");

    Ok(Summary {
        total,
        categories,
        most_common,
        mean_answer_chars,
    })
}
