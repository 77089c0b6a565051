use std::path::PathBuf;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde_json::json;
use ulid::Ulid;

use crate::core::{Analysis, Language, Song};

/// Sentinel emotion label used when the analysis call fails
pub const FALLBACK_EMOTION: &str = "unknown";

/// Neutral gray used for fallback records
pub const FALLBACK_COLOR: &str = "#9ca3af";

/// Everything the provider needs to produce a reflection for one entry
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub content: String,
    pub song: Song,
    pub mood_score: i32,
    pub mood_tags: Vec<String>,
    pub date: DateTime<Utc>,
    pub language: Language,
}

/// External analysis collaborator. Only these two calls are consumed;
/// both may take arbitrarily long and both may fail.
#[async_trait]
pub trait AnalysisProvider {
    /// Produce the structured reflection for a diary entry
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Analysis>;

    /// Produce an opaque image reference for a prompt
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}

/// Result of the analysis step: either the provider's reflection or the
/// fixed degraded payload. A failed call is an expected outcome, carried
/// as a value instead of an error path.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Generated(Analysis),
    Fallback(Analysis),
}

impl AnalysisOutcome {
    pub fn analysis(&self) -> &Analysis {
        match self {
            AnalysisOutcome::Generated(a) | AnalysisOutcome::Fallback(a) => a,
        }
    }

    pub fn into_analysis(self) -> Analysis {
        match self {
            AnalysisOutcome::Generated(a) | AnalysisOutcome::Fallback(a) => a,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisOutcome::Fallback(_))
    }
}

/// The fixed substitute reflection saved when the provider fails: the
/// user's entry is kept, only the AI portion degrades.
pub fn fallback_analysis(language: Language) -> Analysis {
    let analysis_text = match language {
        Language::En => {
            "The reflection could not be written this time, but your memory has been saved just as you recorded it."
        }
        Language::Ja => {
            "今回はAIによる振り返りを作成できませんでしたが、あなたの記録はそのまま保存されています。"
        }
    };

    Analysis {
        inferred_emotion: FALLBACK_EMOTION.to_string(),
        analysis_text: analysis_text.to_string(),
        mood_color: FALLBACK_COLOR.to_string(),
        image_prompt: "A gentle abstract painting with soft muted colors and slowly drifting shapes"
            .to_string(),
    }
}

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini-backed provider. Text analysis uses a JSON response schema so
/// the reply parses straight into `Analysis`; illustrations come back as
/// inline base64 and are written under the data directory.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    image_model: String,
    image_dir: PathBuf,
}

impl GeminiProvider {
    pub fn new(
        api_key: Option<String>,
        model: String,
        image_model: String,
        image_dir: PathBuf,
    ) -> Self {
        GeminiProvider {
            client: reqwest::Client::new(),
            api_key,
            model,
            image_model,
            image_dir,
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow!("Gemini API key not configured"))
    }

    fn build_prompt(request: &AnalysisRequest) -> String {
        let language_line = match request.language {
            Language::En => "Write the reflection in English.",
            Language::Ja => "Write the reflection in Japanese.",
        };

        let tags_line = if request.mood_tags.is_empty() {
            "none".to_string()
        } else {
            request.mood_tags.join(", ")
        };

        format!(
            "You are an empathetic diary companion. A person paired a remembered song \
             with how they felt on {date}.\n\
             Song: \"{title}\" by {artist}\n\
             Mood score: {score} on a -50 (quiet, cool) to +50 (active, warm) scale\n\
             Mood tags: {tags}\n\
             Diary note: {content}\n\n\
             Infer the single emotion that best fits, write a short warm reflection \
             addressed to the writer, choose a hex color for the mood, and write a prompt \
             for an abstract illustration of the feeling (no people, no text in the image). \
             {language_line}",
            date = request.date.format("%Y-%m-%d"),
            title = request.song.title,
            artist = request.song.artist,
            score = request.mood_score,
            tags = tags_line,
            content = if request.content.is_empty() {
                "(none)"
            } else {
                request.content.as_str()
            },
            language_line = language_line,
        )
    }

    fn response_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "inferred_emotion": {
                    "type": "string",
                    "description": "Single lowercase emotion word"
                },
                "analysis_text": {
                    "type": "string",
                    "description": "Short empathetic reflection addressed to the writer"
                },
                "mood_color": {
                    "type": "string",
                    "description": "Hex color like #aabbcc"
                },
                "image_prompt": {
                    "type": "string",
                    "description": "Abstract illustration prompt"
                }
            },
            "required": ["inferred_emotion", "analysis_text", "mood_color", "image_prompt"]
        })
    }
}

#[async_trait]
impl AnalysisProvider for GeminiProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Analysis> {
        let api_key = self.api_key()?;
        let prompt = Self::build_prompt(request);

        let request_body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": Self::response_schema(),
                "temperature": 0.7
            }
        });

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, api_key
        );
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("Gemini API error: {}", error_text));
        }

        let response_json: serde_json::Value = response.json().await?;

        let text = response_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid Gemini response format"))?;

        let analysis: Analysis = serde_json::from_str(text)?;
        Ok(analysis)
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key()?;

        let request_body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"]
            }
        });

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.image_model, api_key
        );
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!("Gemini image API error: {}", error_text));
        }

        let response_json: serde_json::Value = response.json().await?;

        let parts = response_json["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| anyhow!("Invalid Gemini image response format"))?;

        let data = parts
            .iter()
            .find_map(|part| part["inlineData"]["data"].as_str())
            .ok_or_else(|| anyhow!("Gemini response contained no image data"))?;

        let bytes = base64::engine::general_purpose::STANDARD.decode(data)?;

        std::fs::create_dir_all(&self.image_dir)?;
        let path = self.image_dir.join(format!("{}.png", Ulid::new()));
        std::fs::write(&path, bytes)?;

        Ok(path.to_string_lossy().into_owned())
    }
}
