use super::record::Language;

/// Upper bound on mood tags per entry
pub const MAX_TAGS: usize = 3;

/// Fixed mood-tag vocabulary: canonical name plus display labels.
/// The canonical (English) name is what gets stored on records.
pub const MOOD_TAGS: &[(&str, &str)] = &[
    ("Nostalgic", "なつかしい"),
    ("Happy", "うれしい"),
    ("Calm", "おだやか"),
    ("Energetic", "元気"),
    ("Melancholy", "ゆううつ"),
    ("Lonely", "さみしい"),
    ("Hopeful", "希望"),
    ("Bittersweet", "ほろ苦い"),
];

/// Check whether a tag belongs to the fixed vocabulary
pub fn is_known(tag: &str) -> bool {
    MOOD_TAGS.iter().any(|(name, _)| *name == tag)
}

/// Display label for a tag in the given language. Falls back to the
/// canonical name for tags no longer in the vocabulary.
pub fn label(tag: &str, language: Language) -> &str {
    match language {
        Language::En => tag,
        Language::Ja => MOOD_TAGS
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, ja)| *ja)
            .unwrap_or(tag),
    }
}

/// Bounded multi-select over the tag vocabulary. Selection order is
/// preserved for display.
#[derive(Debug, Clone, Default)]
pub struct TagSelection {
    selected: Vec<String>,
}

impl TagSelection {
    pub fn new() -> Self {
        TagSelection {
            selected: Vec::new(),
        }
    }

    /// Toggle a tag: selected tags are removed, new tags are appended
    /// while fewer than MAX_TAGS are selected. Toggling a new tag at the
    /// limit is a no-op, not an error.
    pub fn toggle(&mut self, tag: &str) {
        if let Some(pos) = self.selected.iter().position(|t| t == tag) {
            self.selected.remove(pos);
        } else if self.selected.len() < MAX_TAGS {
            self.selected.push(tag.to_string());
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn into_tags(self) -> Vec<String> {
        self.selected
    }
}
