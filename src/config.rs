use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SquadronError;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_DATASET_URL: &str =
    "https://rajpurkar.github.io/SQuAD-explorer/dataset/train-v2.0.json";

const DEFAULT_MAX_QUESTIONS: usize = 1000;
const DEFAULT_MEMO_CAPACITY: usize = 1000;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_MAX_IN_FLIGHT: usize = 8;
const DEFAULT_BACKOFF_MS: u64 = 1000;
const DEFAULT_RESULTS_PATH: &str = "results.json";

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub dataset_url: String,
    pub max_questions: usize,
    pub memo_capacity: usize,
    pub max_retries: u32,
    pub max_in_flight: usize,
    pub backoff_unit: Duration,
    pub results_path: PathBuf,
}

impl Config {
    /// Build the run configuration from the environment. Only a missing
    /// API key is fatal; malformed numeric overrides warn and fall back
    /// to their defaults.
    pub fn from_env() -> Result<Self, SquadronError> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SquadronError::MissingCredential("OPENAI_API_KEY"))?;

        Ok(Config {
            api_key,
            model: env_string("SQUADRON_MODEL", DEFAULT_MODEL),
            base_url: env_string("SQUADRON_BASE_URL", DEFAULT_BASE_URL),
            dataset_url: env_string("SQUADRON_DATASET_URL", DEFAULT_DATASET_URL),
            max_questions: env_parsed("SQUADRON_MAX_QUESTIONS", DEFAULT_MAX_QUESTIONS),
            memo_capacity: env_parsed("SQUADRON_MEMO_CAPACITY", DEFAULT_MEMO_CAPACITY),
            max_retries: env_parsed("SQUADRON_MAX_RETRIES", DEFAULT_MAX_RETRIES),
            max_in_flight: env_parsed("SQUADRON_MAX_IN_FLIGHT", DEFAULT_MAX_IN_FLIGHT),
            backoff_unit: Duration::from_millis(env_parsed(
                "SQUADRON_BACKOFF_MS",
                DEFAULT_BACKOFF_MS,
            )),
            results_path: env_string("SQUADRON_RESULTS_PATH", DEFAULT_RESULTS_PATH).into(),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("dataset_url", &self.dataset_url)
            .field("max_questions", &self.max_questions)
            .field("memo_capacity", &self.memo_capacity)
            .field("max_retries", &self.max_retries)
            .field("max_in_flight", &self.max_in_flight)
            .field("backoff_unit", &self.backoff_unit)
            .field("results_path", &self.results_path)
            .finish()
    }
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parsed<T: FromStr + fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("{name}={raw} is not a valid value, using default {default}");
                default
            }
        },
        Err(_) => default,
    }
}
