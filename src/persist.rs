use std::path::Path;

use crate::error::SquadronError;
use crate::response::QuestionResult;

/// Write the full result set to `path` as a pretty-printed JSON array.
pub async fn save_results(results: &[QuestionResult], path: &Path) -> Result<(), SquadronError> {
    let json = serde_json::to_string_pretty(results).map_err(std::io::Error::other)?;

    // Atomic write: temp file + rename prevents partial reads
    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, json.as_bytes()).await?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }

    tracing::info!("results saved to {}", path.display());
    Ok(())
}
