//! 推論バックエンド
//!
//! 外部モデル戦略が使う `CompletionClient` の実装:
//! - OpenAiClient: OpenAI互換 Chat Completions API（blocking HTTP）
//! - ClaudeCliClient: ローカルの claude CLI

mod claude_cli;
mod openai;

pub use claude_cli::ClaudeCliClient;
pub use openai::OpenAiClient;

use crate::ai_provider::AiProvider;
use crate::config::{Config, API_KEY_ENV};
use crate::error::Result;
use chd_mapper_common::CompletionClient;

/// 設定に従って推論クライアントを構築
///
/// OpenAIプロバイダでAPIキーが無い場合は、レポート処理前に `MissingApiKey` で失敗する。
pub fn build_client(config: &Config, verbose: bool) -> Result<Box<dyn CompletionClient>> {
    build_client_from(config, std::env::var(API_KEY_ENV).ok(), verbose)
}

/// 環境変数の値を明示して推論クライアントを構築
pub fn build_client_from(
    config: &Config,
    env_key: Option<String>,
    verbose: bool,
) -> Result<Box<dyn CompletionClient>> {
    match config.provider {
        AiProvider::OpenAi => {
            let api_key = config.get_api_key_from(env_key)?;
            Ok(Box::new(OpenAiClient::new(config, api_key)?))
        }
        AiProvider::Claude => Ok(Box::new(ClaudeCliClient::new(verbose))),
    }
}
