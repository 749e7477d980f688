//! Deterministic object-key derivation.
//!
//! Keys are pure functions of the dream id (and filename for audio), so
//! retries and re-runs always target the same object.

use campfire_core::types::EntityId;

/// Key for a segment audio upload: `dreams/{dream_id}/{filename}`.
pub fn audio_key(dream_id: EntityId, filename: &str) -> String {
    format!("dreams/{dream_id}/{filename}")
}

/// Key for the rendered video artifact: `videos/{dream_id}.mp4`.
pub fn video_key(dream_id: EntityId) -> String {
    format!("videos/{dream_id}.mp4")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_per_dream() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(video_key(id), video_key(id));
        assert_eq!(audio_key(id, "a.m4a"), format!("dreams/{id}/a.m4a"));
        assert_eq!(video_key(id), format!("videos/{id}.mp4"));
    }
}
