use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::error::{DiaryError, Result};
use super::tags::{self, MAX_TAGS};

/// Mood score bounds: negative = quiet/cool, positive = active/warm
pub const MOOD_SCORE_MIN: i32 = -50;
pub const MOOD_SCORE_MAX: i32 = 50;

/// Language a record was authored and analyzed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ja,
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Ja => write!(f, "ja"),
        }
    }
}

impl std::str::FromStr for Language {
    type Err = DiaryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ja" | "japanese" => Ok(Language::Ja),
            _ => Err(DiaryError::Validation(format!("Unknown language: {}", s))),
        }
    }
}

/// The user's post-hoc verdict on the inferred emotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserFeedback {
    Unset,
    Correct,
    Incorrect,
}

impl Default for UserFeedback {
    fn default() -> Self {
        UserFeedback::Unset
    }
}

/// The remembered song a diary entry is paired with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
}

impl Song {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Song {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

/// AI-generated reflection, produced once at creation and never altered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Emotion label inferred from the entry
    pub inferred_emotion: String,

    /// Empathetic narrative text
    pub analysis_text: String,

    /// Hex color representing the mood
    pub mood_color: String,

    /// Prompt handed to the image-generation model
    pub image_prompt: String,
}

/// One saved diary entry pairing a song, a mood, and an AI reflection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique identifier using ULID (time-sortable)
    pub id: String,

    /// Free-text note, may be empty
    pub content: String,

    /// Signed mood score in [-50, 50]
    pub mood_score: i32,

    /// Up to 3 tags from the fixed vocabulary, in selection order
    pub mood_tags: Vec<String>,

    /// User-chosen date for the entry (not necessarily creation time)
    pub timestamp: DateTime<Utc>,

    pub song: Song,

    pub analysis: Analysis,

    /// Opaque image reference, empty when generation failed
    #[serde(default)]
    pub image_url: String,

    #[serde(default)]
    pub user_feedback: UserFeedback,

    #[serde(default)]
    pub language: Language,
}

impl MemoryRecord {
    /// Assemble a record from a validated draft plus the analysis outcome.
    /// The mood score is clamped into range here so no out-of-range value
    /// can ever be persisted.
    pub fn new(draft: EntryDraft, analysis: Analysis, image_url: String) -> Self {
        MemoryRecord {
            id: Ulid::new().to_string(),
            content: draft.content,
            mood_score: draft.mood_score.clamp(MOOD_SCORE_MIN, MOOD_SCORE_MAX),
            mood_tags: draft.mood_tags,
            timestamp: draft.date,
            song: draft.song,
            analysis,
            image_url,
            user_feedback: UserFeedback::Unset,
            language: draft.language,
        }
    }
}

/// Raw user input for one creation attempt, collected before any
/// external call is made
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub date: DateTime<Utc>,
    pub song: Song,
    pub mood_score: i32,
    pub mood_tags: Vec<String>,
    pub content: String,
    pub language: Language,
}

impl EntryDraft {
    pub fn new(date: DateTime<Utc>, song: Song, language: Language) -> Self {
        EntryDraft {
            date,
            song,
            mood_score: 0,
            mood_tags: Vec::new(),
            content: String::new(),
            language,
        }
    }

    /// Check the collaborator contract before the creation sequence runs:
    /// both song fields present, tags within bounds and from the vocabulary.
    pub fn validate(&self) -> Result<()> {
        if self.song.title.trim().is_empty() {
            return Err(DiaryError::Validation("Song title is required".to_string()));
        }
        if self.song.artist.trim().is_empty() {
            return Err(DiaryError::Validation("Song artist is required".to_string()));
        }
        if self.mood_tags.len() > MAX_TAGS {
            return Err(DiaryError::Validation(format!(
                "At most {} mood tags are allowed",
                MAX_TAGS
            )));
        }
        for tag in &self.mood_tags {
            if !tags::is_known(tag) {
                return Err(DiaryError::Validation(format!("Unknown mood tag: {}", tag)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> EntryDraft {
        let mut d = EntryDraft::new(
            Utc::now(),
            Song::new("Fly Me to the Moon", "Sample Artist"),
            Language::En,
        );
        d.mood_score = 30;
        d.mood_tags = vec!["Nostalgic".to_string()];
        d
    }

    fn analysis() -> Analysis {
        Analysis {
            inferred_emotion: "nostalgia".to_string(),
            analysis_text: "A warm look back.".to_string(),
            mood_color: "#f4a261".to_string(),
            image_prompt: "warm abstract shapes".to_string(),
        }
    }

    #[test]
    fn test_new_record() {
        let record = MemoryRecord::new(draft(), analysis(), String::new());

        assert!(!record.id.is_empty());
        assert_eq!(record.mood_score, 30);
        assert_eq!(record.song.title, "Fly Me to the Moon");
        assert_eq!(record.user_feedback, UserFeedback::Unset);
        assert!(record.image_url.is_empty());
    }

    #[test]
    fn test_mood_score_clamped() {
        let mut d = draft();
        d.mood_score = 999;
        let record = MemoryRecord::new(d, analysis(), String::new());
        assert_eq!(record.mood_score, MOOD_SCORE_MAX);

        let mut d = draft();
        d.mood_score = -999;
        let record = MemoryRecord::new(d, analysis(), String::new());
        assert_eq!(record.mood_score, MOOD_SCORE_MIN);
    }

    #[test]
    fn test_validate_requires_song() {
        let mut d = draft();
        d.song.title = "  ".to_string();
        assert!(d.validate().is_err());

        let mut d = draft();
        d.song.artist = String::new();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_validate_tag_bounds() {
        let mut d = draft();
        d.mood_tags = vec![
            "Nostalgic".to_string(),
            "Happy".to_string(),
            "Calm".to_string(),
            "Lonely".to_string(),
        ];
        assert!(d.validate().is_err());

        let mut d = draft();
        d.mood_tags = vec!["NotATag".to_string()];
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_language_roundtrip() {
        assert_eq!("ja".parse::<Language>().unwrap(), Language::Ja);
        assert_eq!(Language::En.to_string(), "en");
        assert!("fr".parse::<Language>().is_err());
    }
}
