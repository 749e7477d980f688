//! Transcript assembly.
//!
//! The authoritative whole-dream transcript is always recomputed from the
//! segments: sorted by playback order, non-empty transcripts joined with
//! single spaces, trimmed. The incrementally-appended `dreams.transcript`
//! column is only a best-effort cache of this value.

/// A segment's contribution to the assembled transcript.
#[derive(Debug, Clone)]
pub struct TranscriptPart {
    /// Playback order. Not required to be contiguous or zero-based.
    pub sort_order: i32,
    /// `None` when transcription has not run or returned nothing.
    pub transcript: Option<String>,
}

/// Assemble the full transcript from segment parts.
///
/// Parts are sorted by `sort_order`; segments without a transcript
/// contribute nothing. The result carries no leading, trailing, or
/// doubled spaces regardless of whitespace in the inputs.
pub fn assemble(parts: &[TranscriptPart]) -> String {
    let mut sorted: Vec<&TranscriptPart> = parts.iter().collect();
    sorted.sort_by_key(|p| p.sort_order);

    sorted
        .iter()
        .filter_map(|p| p.transcript.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(order: i32, text: Option<&str>) -> TranscriptPart {
        TranscriptPart {
            sort_order: order,
            transcript: text.map(str::to_string),
        }
    }

    #[test]
    fn joins_in_sort_order_regardless_of_input_order() {
        let parts = vec![part(1, Some("hello")), part(0, Some("world"))];
        assert_eq!(assemble(&parts), "world hello");
    }

    #[test]
    fn skips_missing_and_empty_transcripts() {
        let parts = vec![
            part(0, Some("one")),
            part(1, None),
            part(2, Some("   ")),
            part(3, Some("two")),
        ];
        assert_eq!(assemble(&parts), "one two");
    }

    #[test]
    fn trims_whitespace_within_parts() {
        let parts = vec![part(0, Some("  a  ")), part(1, Some(" b"))];
        assert_eq!(assemble(&parts), "a b");
    }

    #[test]
    fn non_contiguous_orders_sort_numerically() {
        let parts = vec![part(100, Some("last")), part(-5, Some("first")), part(7, Some("mid"))];
        assert_eq!(assemble(&parts), "first mid last");
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(assemble(&[]), "");
        assert_eq!(assemble(&[part(0, None)]), "");
    }
}
