use anyhow::Result;

use crate::core::{DiaryError, EntryDraft, MemoryRecord, MemoryStore, Storage};
use crate::export;
use crate::provider::{fallback_analysis, AnalysisOutcome, AnalysisProvider, AnalysisRequest};

/// Outcome of one creation sequence, for the caller to report
pub struct CreateResult {
    pub record: MemoryRecord,
    /// True when the analysis step fell back to the fixed payload
    pub analysis_degraded: bool,
}

/// Orchestrates the record lifecycle over an injected store and provider.
///
/// The creation sequence treats a failed analysis call as an expected,
/// recoverable outcome: the entry is still saved, with the fixed fallback
/// reflection. Only validation and persistence failures abort an attempt.
pub struct DiaryService<S: Storage, P: AnalysisProvider> {
    store: MemoryStore<S>,
    provider: P,
}

impl<S: Storage, P: AnalysisProvider> DiaryService<S, P> {
    pub fn new(store: MemoryStore<S>, provider: P) -> Self {
        DiaryService { store, provider }
    }

    /// Run the full creation sequence:
    /// validate -> analyze (fallback on failure) -> illustrate (empty on
    /// failure) -> persist. The two provider calls are awaited one after
    /// the other; nothing here runs concurrently.
    pub async fn create(&mut self, draft: EntryDraft) -> Result<CreateResult> {
        draft.validate()?;

        let request = AnalysisRequest {
            content: draft.content.clone(),
            song: draft.song.clone(),
            mood_score: draft.mood_score,
            mood_tags: draft.mood_tags.clone(),
            date: draft.date,
            language: draft.language,
        };

        let outcome = match self.provider.analyze(&request).await {
            Ok(analysis) => AnalysisOutcome::Generated(analysis),
            Err(e) => {
                eprintln!("⚠️  Reflection unavailable, saving with fallback: {}", e);
                AnalysisOutcome::Fallback(fallback_analysis(draft.language))
            }
        };

        let image_url = match self
            .provider
            .generate_image(&outcome.analysis().image_prompt)
            .await
        {
            Ok(reference) => reference,
            Err(e) => {
                eprintln!("⚠️  Illustration unavailable: {}", e);
                String::new()
            }
        };

        let analysis_degraded = outcome.is_fallback();
        let record = self
            .store
            .create(draft, outcome.into_analysis(), image_url)?;

        Ok(CreateResult {
            record,
            analysis_degraded,
        })
    }

    pub fn set_feedback(&mut self, id: &str, correct: bool) -> Result<()> {
        self.store.set_feedback(id, correct)?;
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.store.delete(id)?;
        Ok(())
    }

    pub fn records(&self) -> &[MemoryRecord] {
        self.store.records()
    }

    pub fn get(&self, id: &str) -> Option<&MemoryRecord> {
        self.store.get(id)
    }

    /// Clipboard summary for one record; the only lookup that must name
    /// a missing id
    pub fn export_summary(&self, id: &str) -> Result<String> {
        let record = self
            .store
            .get(id)
            .ok_or_else(|| DiaryError::NotFound(id.to_string()))?;
        Ok(export::summary_text(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{Language, Song};
    use crate::core::storage::MemoryStorage;
    use crate::core::Analysis;
    use crate::provider::FALLBACK_EMOTION;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider fake: failure modes are set per test, calls are counted
    struct FakeProvider {
        fail_analyze: bool,
        fail_image: bool,
        analyze_calls: AtomicUsize,
        image_calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(fail_analyze: bool, fail_image: bool) -> Self {
            FakeProvider {
                fail_analyze,
                fail_image,
                analyze_calls: AtomicUsize::new(0),
                image_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AnalysisProvider for FakeProvider {
        async fn analyze(&self, _request: &AnalysisRequest) -> Result<Analysis> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_analyze {
                anyhow::bail!("provider down");
            }
            Ok(Analysis {
                inferred_emotion: "nostalgia".to_string(),
                analysis_text: "A warm look back.".to_string(),
                mood_color: "#f4a261".to_string(),
                image_prompt: "warm abstract shapes".to_string(),
            })
        }

        async fn generate_image(&self, _prompt: &str) -> Result<String> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_image {
                anyhow::bail!("image service down");
            }
            Ok("fake://image".to_string())
        }
    }

    fn draft_on(y: i32, m: u32, d: u32) -> EntryDraft {
        let ts = Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
        let mut draft = EntryDraft::new(
            ts,
            Song::new("Fly Me to the Moon", "Sample Artist"),
            Language::En,
        );
        draft.mood_score = 30;
        draft.mood_tags = vec!["Nostalgic".to_string()];
        draft
    }

    fn service(provider: FakeProvider) -> DiaryService<MemoryStorage, FakeProvider> {
        DiaryService::new(MemoryStore::new(MemoryStorage::new()), provider)
    }

    #[tokio::test]
    async fn test_create_happy_path() {
        let mut service = service(FakeProvider::new(false, false));

        let result = service.create(draft_on(2025, 7, 1)).await.unwrap();

        assert!(!result.analysis_degraded);
        assert_eq!(result.record.analysis.inferred_emotion, "nostalgia");
        assert_eq!(result.record.image_url, "fake://image");
        assert_eq!(service.records().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_down_saves_fallback_record() {
        let mut service = service(FakeProvider::new(true, true));
        service.create(draft_on(2025, 7, 1)).await.unwrap();

        let result = service.create(draft_on(2025, 7, 2)).await.unwrap();

        assert!(result.analysis_degraded);
        assert_eq!(result.record.analysis.inferred_emotion, FALLBACK_EMOTION);
        assert!(result.record.image_url.is_empty());
        // The user's input survives the degraded path
        assert_eq!(result.record.song.title, "Fly Me to the Moon");
        assert_eq!(result.record.mood_tags, vec!["Nostalgic".to_string()]);
        // Most recent timestamp lands at the head of the list
        assert_eq!(service.records()[0].id, result.record.id);
    }

    #[tokio::test]
    async fn test_image_failure_is_cosmetic() {
        let mut service = service(FakeProvider::new(false, true));

        let result = service.create(draft_on(2025, 7, 1)).await.unwrap();

        assert!(!result.analysis_degraded);
        assert_eq!(result.record.analysis.inferred_emotion, "nostalgia");
        assert!(result.record.image_url.is_empty());
    }

    #[tokio::test]
    async fn test_validation_blocks_before_any_provider_call() {
        let provider = FakeProvider::new(false, false);
        let mut draft = draft_on(2025, 7, 1);
        draft.song.title = String::new();

        let mut service = service(provider);
        let result = service.create(draft).await;

        assert!(result.is_err());
        assert!(service.records().is_empty());
        assert_eq!(service.provider.analyze_calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.provider.image_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_prompt_still_goes_to_image_step() {
        let mut service = service(FakeProvider::new(true, false));

        let result = service.create(draft_on(2025, 7, 1)).await.unwrap();

        assert!(result.analysis_degraded);
        // Image generation ran with the fallback prompt and succeeded
        assert_eq!(result.record.image_url, "fake://image");
        assert_eq!(service.provider.image_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_export_summary_names_missing_id() {
        let service = service(FakeProvider::new(false, false));
        assert!(service.export_summary("no-such-id").is_err());
    }
}
