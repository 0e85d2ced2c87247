//! Batch executor: fan-out/fan-in totality, memoization across the
//! batch, the in-flight bound, panic attribution, and cancellation.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use squadron::client::AskClient;
use squadron::endpoint::ChatEndpoint;
use squadron::error::SquadronError;
use squadron::executor::BatchExecutor;
use squadron::memo::ResponseMemo;
use squadron::response::Verdict;

/// Succeeds immediately and counts invocations.
#[derive(Default)]
struct CountingEndpoint {
    calls: AtomicU32,
}

#[async_trait]
impl ChatEndpoint for CountingEndpoint {
    async fn complete(&self, _prompt: &str) -> Result<String, SquadronError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(r#"{"category": "test", "answer": "ok"}"#.to_string())
    }
}

/// Panics on prompts containing the trigger word, succeeds otherwise.
struct ExplosiveEndpoint {
    trigger: &'static str,
}

#[async_trait]
impl ChatEndpoint for ExplosiveEndpoint {
    async fn complete(&self, prompt: &str) -> Result<String, SquadronError> {
        assert!(!prompt.contains(self.trigger), "scripted task panic");
        Ok(r#"{"category": "test", "answer": "ok"}"#.to_string())
    }
}

/// Tracks how many completions run at the same time.
#[derive(Default)]
struct GaugeEndpoint {
    current: AtomicUsize,
    high_water: AtomicUsize,
}

#[async_trait]
impl ChatEndpoint for GaugeEndpoint {
    async fn complete(&self, _prompt: &str) -> Result<String, SquadronError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(r#"{"category": "test", "answer": "ok"}"#.to_string())
    }
}

fn executor(endpoint: Arc<dyn ChatEndpoint>, max_in_flight: usize) -> BatchExecutor {
    let client = AskClient::new(endpoint, 3, Duration::from_millis(1));
    BatchExecutor::new(client, ResponseMemo::new(100), max_in_flight)
}

// ---------------------------------------------------------------------------
// Totality
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_question_gets_exactly_one_record() {
    let endpoint = Arc::new(CountingEndpoint::default());
    let batch = executor(endpoint, 4);

    let questions = vec![
        "Q alpha?".to_string(),
        "Q beta?".to_string(),
        "Q alpha?".to_string(),
        "Q gamma?".to_string(),
    ];
    let results = batch.run(questions.clone(), CancellationToken::new()).await;

    assert_eq!(results.len(), questions.len());
    let mut asked = questions;
    let mut answered: Vec<String> = results.iter().map(|r| r.question.clone()).collect();
    asked.sort();
    answered.sort();
    assert_eq!(answered, asked);
}

#[tokio::test]
async fn empty_batch_is_an_empty_result_set() {
    let endpoint = Arc::new(CountingEndpoint::default());
    let batch = executor(endpoint.clone(), 4);

    let results = batch.run(Vec::new(), CancellationToken::new()).await;

    assert!(results.is_empty());
    assert_eq!(endpoint.calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Memoization across the batch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_questions_hit_the_endpoint_once() {
    let endpoint = Arc::new(CountingEndpoint::default());
    // Serialize asks so the first repeat lands after the insert.
    let batch = executor(endpoint.clone(), 1);

    let questions = vec![
        "Q same?".to_string(),
        "Q same?".to_string(),
        "Q same?".to_string(),
        "Q other?".to_string(),
    ];
    let results = batch.run(questions, CancellationToken::new()).await;

    assert_eq!(results.len(), 4);
    assert_eq!(endpoint.calls.load(Ordering::SeqCst), 2);
}

// ---------------------------------------------------------------------------
// In-flight bound
// ---------------------------------------------------------------------------

#[tokio::test]
async fn in_flight_asks_never_exceed_the_bound() {
    let endpoint = Arc::new(GaugeEndpoint::default());
    let batch = executor(endpoint.clone(), 3);

    let questions: Vec<String> = (0..12).map(|i| format!("Q number {i}?")).collect();
    let results = batch.run(questions, CancellationToken::new()).await;

    assert_eq!(results.len(), 12);
    let peak = endpoint.high_water.load(Ordering::SeqCst);
    assert!(peak <= 3, "in-flight peak {peak} exceeded the bound");
    assert!(peak >= 1);
}

// ---------------------------------------------------------------------------
// Panic attribution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn panicked_task_still_yields_a_failure_record() {
    let endpoint = Arc::new(ExplosiveEndpoint { trigger: "kaboom" });
    let batch = executor(endpoint, 2);

    let questions = vec![
        "Q calm one?".to_string(),
        "Q kaboom now?".to_string(),
        "Q calm two?".to_string(),
    ];
    let results = batch.run(questions, CancellationToken::new()).await;

    assert_eq!(results.len(), 3);
    let blown = results
        .iter()
        .find(|r| r.question == "Q kaboom now?")
        .expect("panicked question must keep its slot");
    assert_eq!(blown.category, "error");
    assert_eq!(blown.answer, "Failed to get response");

    for calm in results.iter().filter(|r| r.question != "Q kaboom now?") {
        assert_eq!(calm.category, "test");
        assert_eq!(calm.answer, "ok");
    }
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancelled_batch_still_records_every_question() {
    let endpoint = Arc::new(CountingEndpoint::default());
    let batch = executor(endpoint.clone(), 4);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let questions: Vec<String> = (0..6).map(|i| format!("Q number {i}?")).collect();
    let results = batch.run(questions, cancel).await;

    assert_eq!(results.len(), 6);
    let failure = Verdict::failure();
    for record in &results {
        assert_eq!(record.category, failure.category);
        assert_eq!(record.answer, failure.answer);
    }
    assert_eq!(endpoint.calls.load(Ordering::SeqCst), 0);
}
