//! CHDマッピングの型定義
//!
//! CLIとテストで共有される型:
//! - ReferenceEntry: 参照語彙（CHD名 → ICD-11コード）の1行
//! - Report: 胎児超音波レポート1件
//! - MatchResult: マッチャーの出力
//! - OutputRecord: 出力テーブルの1行

use serde::{Deserialize, Serialize};
use std::fmt;

/// 1件もマッチしなかった場合のセンチネル
pub const NO_CHD_IDENTIFIED: &str = "No CHD identified";

/// レポート本文が空の場合のセンチネル
pub const NO_REPORT_PROVIDED: &str = "No report provided";

/// 参照語彙で解決できなかったラベルの接頭辞
pub const NOT_FOUND_PREFIX: &str = "Not found in reference: ";

/// レポート単位の推論エラーの接頭辞
pub const ERROR_PREFIX: &str = "Error: ";

/// 参照語彙の1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// 参照テーブル上の表記（大文字小文字そのまま）
    pub chd_name: String,
    pub icd11_code: String,
    #[serde(default)]
    pub reference_number: Option<String>,
}

impl ReferenceEntry {
    pub fn new(chd_name: impl Into<String>, icd11_code: impl Into<String>) -> Self {
        Self {
            chd_name: chd_name.into(),
            icd11_code: icd11_code.into(),
            reference_number: None,
        }
    }

    pub fn with_reference_number(mut self, reference_number: impl Into<String>) -> Self {
        self.reference_number = Some(reference_number.into());
        self
    }
}

/// 胎児超音波レポート
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub scan_id: String,
    pub text: String,
}

impl Report {
    /// scan_idが無い（空）場合は `ROW_<index>` を合成する
    pub fn new(scan_id: Option<&str>, index: usize, text: &str) -> Self {
        let scan_id = match scan_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("ROW_{}", index),
        };

        Self {
            scan_id,
            text: text.trim().to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// マッチの確度区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceClass {
    /// 断定表現（"diagnosed with ..." 等）を伴う記載
    Asserted,
    /// 名称のみの記載
    Inferred,
    /// 参照語彙で解決できないラベル
    Unknown,
}

impl fmt::Display for ConfidenceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceClass::Asserted => write!(f, "ASSERTED"),
            ConfidenceClass::Inferred => write!(f, "INFERRED"),
            ConfidenceClass::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// マッチャーの出力
///
/// `Unknown` の場合 `chd_name` には未解決のラベルがそのまま入り、
/// コード類は `None` になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub chd_name: String,
    pub icd11_code: Option<String>,
    pub reference_number: Option<String>,
    pub confidence_class: ConfidenceClass,
}

impl MatchResult {
    /// 参照語彙で解決済みのマッチ
    pub fn resolved(entry: &ReferenceEntry, confidence_class: ConfidenceClass) -> Self {
        Self {
            chd_name: entry.chd_name.clone(),
            icd11_code: Some(entry.icd11_code.clone()),
            reference_number: entry.reference_number.clone(),
            confidence_class,
        }
    }

    /// 参照語彙に存在しないラベル
    pub fn unresolved(label: &str) -> Self {
        Self {
            chd_name: label.to_string(),
            icd11_code: None,
            reference_number: None,
            confidence_class: ConfidenceClass::Unknown,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.confidence_class != ConfidenceClass::Unknown
    }
}

/// 出力テーブルの1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub scan_id: String,
    #[serde(rename = "report")]
    pub report_text: String,
    pub chd_name: String,
    pub icd11_code: Option<String>,
    pub reference_number: Option<String>,
    pub confidence_class: Option<ConfidenceClass>,
}

impl OutputRecord {
    /// コード類を持たないセンチネル行
    pub fn sentinel(report: &Report, chd_name: impl Into<String>) -> Self {
        Self {
            scan_id: report.scan_id.clone(),
            report_text: report.text.clone(),
            chd_name: chd_name.into(),
            icd11_code: None,
            reference_number: None,
            confidence_class: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_synthesizes_scan_id() {
        let report = Report::new(None, 3, "text");
        assert_eq!(report.scan_id, "ROW_3");

        let report = Report::new(Some("   "), 7, "text");
        assert_eq!(report.scan_id, "ROW_7");

        let report = Report::new(Some("S-001"), 0, "text");
        assert_eq!(report.scan_id, "S-001");
    }

    #[test]
    fn test_report_trims_text() {
        let report = Report::new(Some("S-1"), 0, "  echo normal \n");
        assert_eq!(report.text, "echo normal");
        assert!(!report.is_blank());
        assert!(Report::new(None, 0, " \t\n").is_blank());
    }

    #[test]
    fn test_confidence_class_display() {
        assert_eq!(ConfidenceClass::Asserted.to_string(), "ASSERTED");
        assert_eq!(ConfidenceClass::Inferred.to_string(), "INFERRED");
        assert_eq!(ConfidenceClass::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_confidence_class_serde() {
        let json = serde_json::to_string(&ConfidenceClass::Asserted).unwrap();
        assert_eq!(json, "\"ASSERTED\"");
    }

    #[test]
    fn test_match_result_unresolved() {
        let result = MatchResult::unresolved("Truncus Arteriosus Type Z");
        assert!(!result.is_resolved());
        assert_eq!(result.chd_name, "Truncus Arteriosus Type Z");
        assert!(result.icd11_code.is_none());
    }

    #[test]
    fn test_match_result_resolved_keeps_reference_casing() {
        let entry = ReferenceEntry::new("Tetralogy of Fallot", "LA88.2").with_reference_number("7");
        let result = MatchResult::resolved(&entry, ConfidenceClass::Inferred);
        assert_eq!(result.chd_name, "Tetralogy of Fallot");
        assert_eq!(result.icd11_code.as_deref(), Some("LA88.2"));
        assert_eq!(result.reference_number.as_deref(), Some("7"));
    }
}
