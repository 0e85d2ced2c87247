use std::collections::HashMap;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::{Id as TaskId, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::client::AskClient;
use crate::memo::ResponseMemo;
use crate::response::{QuestionResult, Verdict};

const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg} (ETA: {eta})";

/// Fans a batch of questions out to concurrent asks and collects the
/// records in completion order.
///
/// - In-flight asks are bounded by a semaphore; remaining tasks queue
///   on it rather than on a spawn backlog.
/// - Repeated questions are served from the memo.
/// - A panicked task is attributed back to its question via the task ID
///   and recorded as a failure, so the batch always yields exactly one
///   record per input question.
pub struct BatchExecutor {
    client: Arc<AskClient>,
    memo: Arc<ResponseMemo>,
    limiter: Arc<Semaphore>,
}

impl BatchExecutor {
    pub fn new(client: AskClient, memo: ResponseMemo, max_in_flight: usize) -> Self {
        Self {
            client: Arc::new(client),
            memo: Arc::new(memo),
            // A zero bound would strand every task on acquire.
            limiter: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub async fn run(
        &self,
        questions: Vec<String>,
        cancel: CancellationToken,
    ) -> Vec<QuestionResult> {
        if questions.is_empty() {
            return Vec::new();
        }

        let total = questions.len();
        let mut set = JoinSet::new();

        // Track task ID → question mapping for panic attribution
        let mut task_questions: HashMap<TaskId, String> = HashMap::new();

        for question in questions {
            let client = self.client.clone();
            let memo = self.memo.clone();
            let limiter = self.limiter.clone();
            let cancel = cancel.clone();
            let q = question.clone();

            let abort_handle = set.spawn(async move {
                // Holds until a slot frees up. Err only if the semaphore
                // is closed, which this executor never does.
                let _permit = limiter.acquire_owned().await.ok();

                // Clones move into the compute future; `q` stays for the
                // record below.
                let ask_client = client.clone();
                let ask_cancel = cancel.clone();
                let ask_question = q.clone();
                let verdict = memo
                    .get_or_compute(&q, move || async move {
                        ask_client.ask(&ask_question, &ask_cancel).await
                    })
                    .await;
                QuestionResult::new(q, verdict)
            });
            task_questions.insert(abort_handle.id(), question);
        }

        let progress = ProgressBar::new(total as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_TEMPLATE)
                .expect("Invalid progress bar template")
                .progress_chars("█▓▒░ "),
        );
        progress.set_message("categorizing");

        let mut results = Vec::with_capacity(total);
        while let Some(join_result) = set.join_next().await {
            match join_result {
                Ok(record) => results.push(record),
                Err(join_err) => {
                    // Attribute the failure to the correct question via
                    // the task ID so no input drops out of the batch.
                    tracing::error!("question task failed: {join_err}");
                    if let Some(question) = task_questions.get(&join_err.id()) {
                        results.push(QuestionResult::new(question.clone(), Verdict::failure()));
                    }
                }
            }
            progress.inc(1);
        }
        progress.finish_with_message("done");

        results
    }
}
