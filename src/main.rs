use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use squadron::client::AskClient;
use squadron::config::Config;
use squadron::endpoint::OpenAiEndpoint;
use squadron::executor::BatchExecutor;
use squadron::memo::ResponseMemo;
use squadron::{dataset, persist, report};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    dotenvy::dotenv().ok();

    tracing::info!("squadron starting");

    let config = Config::from_env()?;
    tracing::debug!("effective configuration: {config:?}");

    let http = reqwest::Client::new();
    let questions = dataset::fetch_questions(&http, &config).await?;

    let endpoint = Arc::new(OpenAiEndpoint::new(&config));
    let client = AskClient::new(endpoint, config.max_retries, config.backoff_unit);
    let executor = BatchExecutor::new(
        client,
        ResponseMemo::new(config.memo_capacity),
        config.max_in_flight,
    );

    // Ctrl-C stops in-flight asks at their next suspension point; every
    // question still gets a record.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling in-flight questions");
            signal_cancel.cancel();
        }
    });

    let results = executor.run(questions, cancel).await;

    persist::save_results(&results, &config.results_path).await?;

    let summary = report::analyze(&results)?;
    tracing::info!(
        "run complete: {} records, most common category '{}'",
        summary.total,
        summary.most_common
    );

    Ok(())
}
