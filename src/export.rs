use crate::core::MemoryRecord;

/// Character limit for the reflection excerpt in a shared summary
pub const SUMMARY_TEXT_LIMIT: usize = 120;

/// Short human-readable summary of one record for the clipboard sink:
/// date, song, inferred emotion, truncated reflection. Read-only over
/// the record; sharing never touches the data model.
pub fn summary_text(record: &MemoryRecord) -> String {
    format!(
        "{} | \"{}\" by {}\nFeeling: {}\n{}",
        record.timestamp.format("%Y-%m-%d"),
        record.song.title,
        record.song.artist,
        record.analysis.inferred_emotion,
        truncate(&record.analysis.analysis_text, SUMMARY_TEXT_LIMIT),
    )
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        format!("{}...", text.chars().take(limit).collect::<String>())
    } else {
        text.to_string()
    }
}
