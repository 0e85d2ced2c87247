use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::config::Config;
use crate::error::SquadronError;

// SQuAD train is ~42MB; leave generous headroom before bailing.
const MAX_DATASET_BYTES: usize = 256 * 1024 * 1024;

#[derive(Deserialize)]
struct SquadFile {
    data: Vec<Article>,
}

#[derive(Deserialize)]
struct Article {
    paragraphs: Vec<Paragraph>,
}

#[derive(Deserialize)]
struct Paragraph {
    qas: Vec<QuestionEntry>,
}

#[derive(Deserialize)]
struct QuestionEntry {
    question: String,
}

/// Download the question dataset and flatten it to a shuffled list of
/// question strings, truncated to the configured batch size. Any
/// failure here aborts the run.
pub async fn fetch_questions(
    client: &reqwest::Client,
    config: &Config,
) -> Result<Vec<String>, SquadronError> {
    tracing::info!("downloading dataset from {}", config.dataset_url);

    let response = client.get(&config.dataset_url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SquadronError::Upstream {
            message: format!("dataset fetch returned {status}"),
            status: Some(status.as_u16()),
        });
    }

    let bytes = response.bytes().await?;
    if bytes.len() > MAX_DATASET_BYTES {
        return Err(SquadronError::Dataset(format!(
            "dataset too large: {} bytes (max {MAX_DATASET_BYTES})",
            bytes.len()
        )));
    }

    let file: SquadFile = serde_json::from_slice(&bytes)
        .map_err(|e| SquadronError::Dataset(format!("unexpected dataset shape: {e}")))?;

    let mut questions: Vec<String> = file
        .data
        .into_iter()
        .flat_map(|article| article.paragraphs)
        .flat_map(|paragraph| paragraph.qas)
        .map(|entry| entry.question)
        .collect();

    questions.shuffle(&mut rand::thread_rng());
    questions.truncate(config.max_questions);

    tracing::info!("dataset ready: {} questions", questions.len());
    Ok(questions)
}
