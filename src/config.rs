use crate::ai_provider::AiProvider;
use crate::error::{MapperError, Result};
use chd_mapper_common::MatchStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// プロセス全体の設定
///
/// 起動時に1回だけ読み込み、以降は参照で渡す（実行中は変更しない）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub api_base_url: String,
    pub strategy: MatchStrategy,
    pub provider: AiProvider,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".into(),
            temperature: 0.0,
            api_base_url: "https://api.openai.com/v1".into(),
            strategy: MatchStrategy::Substring,
            provider: AiProvider::OpenAi,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| MapperError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("chd-mapper").join("config.json"))
    }

    /// APIキーを取得（環境変数を優先）
    pub fn get_api_key(&self) -> Result<String> {
        self.get_api_key_from(std::env::var(API_KEY_ENV).ok())
    }

    /// 環境変数の値を受け取ってAPIキーを決定（空白のみの値は未設定扱い）
    pub fn get_api_key_from(&self, env_key: Option<String>) -> Result<String> {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            return Ok(key);
        }

        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(MapperError::MissingApiKey)
    }

    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_ok()
    }

    /// 温度は 0.0〜2.0 に制限
    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(MapperError::Config(format!(
                "temperatureは0.0〜2.0で指定してください: {}",
                temperature
            )));
        }
        self.temperature = temperature;
        Ok(())
    }
}
