//! OpenAI互換 Chat Completions API連携

use crate::config::Config;
use crate::error::{MapperError, Result};
use chd_mapper_common::{CompletionClient, InferenceError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 推論呼び出しのタイムアウト（なし: 応答が返るまで待つ）
const REQUEST_TIMEOUT: Option<Duration> = None;

/// Chat Completionsリクエスト
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat Completionsレスポンス
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(config: &Config, api_key: String) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MapperError::Config(format!("HTTPクライアント初期化エラー: {}", e)))?;

        Ok(Self {
            http,
            endpoint: chat_endpoint(&config.api_base_url),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, system_instruction: &str, user_prompt: &str) -> std::result::Result<String, InferenceError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage { role: "system", content: system_instruction },
                ChatMessage { role: "user", content: user_prompt },
            ],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_chat_response(&body)
    }
}

/// ベースURLから Chat Completions エンドポイントを組み立てる
fn chat_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

/// レスポンスボディから応答テキストを取り出す
fn parse_chat_response(body: &str) -> std::result::Result<String, InferenceError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| InferenceError::Malformed(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(InferenceError::EmptyResponse)
}
