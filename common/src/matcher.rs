//! CHDマッチングモジュール
//!
//! レポート本文と参照語彙から該当CHDを判定する。戦略は3種類:
//! - Substring: 正規化名の部分一致
//! - Assertion: 断定表現を伴う記載をASSERTED、名称のみをINFERREDに分類
//! - Model: 外部言語モデルに語彙を制約したプロンプトで問い合わせる

use crate::error::InferenceError;
use crate::parser::parse_model_response;
use crate::prompts::{build_chd_prompt, SYSTEM_INSTRUCTION};
use crate::types::{ConfidenceClass, MatchResult};
use crate::vocabulary::{normalize_name, Vocabulary};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 断定表現のテンプレート（`{name}` に正規化CHD名が入る）
pub const ASSERTION_TEMPLATES: &[&str] = &[
    "diagnosed with {name}",
    "confirmed {name}",
    "has {name}",
    "presence of {name}",
    "evidence of {name}",
];

/// マッチング戦略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    #[default]
    Substring,
    Assertion,
    Model,
}

impl std::str::FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substring" | "contains" => Ok(MatchStrategy::Substring),
            "assertion" | "asserted" | "pattern" => Ok(MatchStrategy::Assertion),
            "model" | "llm" | "gpt" => Ok(MatchStrategy::Model),
            _ => Err(format!("Unknown strategy: {}. Use substring, assertion, or model", s)),
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::Substring => write!(f, "substring"),
            MatchStrategy::Assertion => write!(f, "assertion"),
            MatchStrategy::Model => write!(f, "model"),
        }
    }
}

/// マッチャー共通インターフェース
///
/// 空白のみのレポートには常に空の結果を返す。
/// 失敗しうるのは外部モデル戦略のみ。
pub trait Matcher {
    fn match_report(
        &self,
        report_text: &str,
        vocabulary: &Vocabulary,
    ) -> Result<Vec<MatchResult>, InferenceError>;

    fn strategy(&self) -> MatchStrategy;
}

/// テキスト補完サービス（外部モデル）
pub trait CompletionClient {
    fn complete(&self, system_instruction: &str, user_prompt: &str) -> Result<String, InferenceError>;
}

/// 部分一致戦略
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl Matcher for SubstringMatcher {
    fn match_report(
        &self,
        report_text: &str,
        vocabulary: &Vocabulary,
    ) -> Result<Vec<MatchResult>, InferenceError> {
        let text = normalize_name(report_text);
        if text.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vocabulary
            .normalized_entries()
            .filter(|(key, _)| text.contains(key))
            .map(|(_, entry)| MatchResult::resolved(entry, ConfidenceClass::Inferred))
            .collect())
    }

    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::Substring
    }
}

/// 断定表現戦略
#[derive(Debug, Clone, Copy, Default)]
pub struct AssertionMatcher;

impl AssertionMatcher {
    /// 正規化済みの本文と名前から確度区分を判定（該当なしはNone）
    pub fn classify(text: &str, name: &str) -> Option<ConfidenceClass> {
        let asserted = ASSERTION_TEMPLATES
            .iter()
            .any(|template| text.contains(&template.replace("{name}", name)));

        if asserted {
            Some(ConfidenceClass::Asserted)
        } else if text.contains(name) {
            Some(ConfidenceClass::Inferred)
        } else {
            None
        }
    }
}

impl Matcher for AssertionMatcher {
    fn match_report(
        &self,
        report_text: &str,
        vocabulary: &Vocabulary,
    ) -> Result<Vec<MatchResult>, InferenceError> {
        let text = normalize_name(report_text);
        if text.is_empty() {
            return Ok(Vec::new());
        }

        Ok(vocabulary
            .normalized_entries()
            .filter_map(|(key, entry)| {
                Self::classify(&text, key).map(|class| MatchResult::resolved(entry, class))
            })
            .collect())
    }

    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::Assertion
    }
}

/// 外部モデル戦略
///
/// 語彙で解決できたラベルはASSERTED（プロンプトが明示的な記載のみを要求するため）、
/// 解決できないラベルはUNKNOWNとして残す。
pub struct ModelMatcher {
    client: Box<dyn CompletionClient>,
}

impl ModelMatcher {
    pub fn new(client: Box<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// パース済みラベルを語彙で解決
    pub fn resolve_labels(labels: &[String], vocabulary: &Vocabulary) -> Vec<MatchResult> {
        labels
            .iter()
            .map(|label| match vocabulary.lookup(label) {
                Some(entry) => MatchResult::resolved(entry, ConfidenceClass::Asserted),
                None => {
                    log::warn!("model returned a label not in the reference table: {}", label);
                    MatchResult::unresolved(label)
                }
            })
            .collect()
    }
}

impl Matcher for ModelMatcher {
    fn match_report(
        &self,
        report_text: &str,
        vocabulary: &Vocabulary,
    ) -> Result<Vec<MatchResult>, InferenceError> {
        let report_text = report_text.trim();
        if report_text.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_chd_prompt(report_text, &vocabulary.names());
        let response = self.client.complete(SYSTEM_INSTRUCTION, &prompt)?;
        let labels = parse_model_response(&response);

        Ok(Self::resolve_labels(&labels, vocabulary))
    }

    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::Model
    }
}
