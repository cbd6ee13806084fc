use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 外部モデル戦略の推論バックエンド
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// OpenAI互換の Chat Completions API
    #[default]
    #[value(name = "openai")]
    OpenAi,
    /// ローカルの claude CLI
    Claude,
}

impl AiProvider {
    pub fn requires_api_key(&self) -> bool {
        matches!(self, AiProvider::OpenAi)
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiProvider::OpenAi => write!(f, "openai"),
            AiProvider::Claude => write!(f, "claude"),
        }
    }
}
