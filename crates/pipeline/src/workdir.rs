//! Per-dream working directories for render staging.

use std::path::PathBuf;

use campfire_core::types::EntityId;

/// Local staging directory for one dream's render artifacts.
pub fn working_dir(dream_id: EntityId) -> PathBuf {
    std::env::temp_dir().join("campfire").join(dream_id.to_string())
}

/// Remove a dream's working directory.
///
/// Best-effort: a failure is logged and swallowed, since the artifact
/// has already been uploaded by the time this runs.
pub async fn cleanup(dream_id: EntityId) {
    let dir = working_dir(dream_id);
    match tokio::fs::remove_dir_all(&dir).await {
        Ok(()) => tracing::debug!(%dream_id, "Working directory removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(%dream_id, error = %e, "Failed to remove working directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_dir_is_deterministic_and_namespaced() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(working_dir(id), working_dir(id));
        assert!(working_dir(id).ends_with(id.to_string()));
    }

    #[tokio::test]
    async fn cleanup_of_missing_directory_is_silent() {
        // Must not panic or log an error for a dream that never rendered.
        cleanup(uuid::Uuid::new_v4()).await;
    }
}
