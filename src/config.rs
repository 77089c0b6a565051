use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::Language;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,

    /// Gemini API key; the GEMINI_API_KEY environment variable wins when
    /// the file has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub model: String,

    pub image_model: String,

    #[serde(default)]
    pub language: Language,
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("melodiary")
        });

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        let config_path = data_dir.join("config.json");

        if config_path.exists() {
            let config_str =
                std::fs::read_to_string(&config_path).context("Failed to read config.json")?;

            if !config_str.trim().is_empty() {
                let mut config: Config =
                    serde_json::from_str(&config_str).context("Failed to parse config.json")?;
                config.data_dir = data_dir;
                return Ok(config);
            }
        }

        let config = Config {
            data_dir,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            language: Language::default(),
        };
        config.save()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = self.data_dir.join("config.json");
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content).context("Failed to write config.json")?;
        Ok(())
    }

    /// Key for the provider: config file first, then the environment
    pub fn gemini_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
    }

    /// The single persistence slot for the record collection
    pub fn memories_path(&self) -> PathBuf {
        self.data_dir.join("memories.json")
    }

    /// Where generated illustrations are written
    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }
}
