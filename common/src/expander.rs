//! 行展開モジュール
//!
//! レポート1件とマッチ結果から出力テーブルの行を作る（1:N）。

use crate::types::{
    MatchResult, OutputRecord, Report, ERROR_PREFIX, NOT_FOUND_PREFIX, NO_CHD_IDENTIFIED,
    NO_REPORT_PROVIDED,
};

/// 未解決ラベルのマーカー
pub fn not_found_marker(label: &str) -> String {
    format!("{}{}", NOT_FOUND_PREFIX, label)
}

/// レポート1件を出力行に展開
///
/// - 本文が空 → "No report provided" の1行
/// - マッチなし → "No CHD identified" の1行
/// - それ以外 → マッチ1件につき1行（UNKNOWNは未解決マーカー付き）
pub fn expand(report: &Report, matches: &[MatchResult]) -> Vec<OutputRecord> {
    if report.is_blank() {
        return vec![OutputRecord::sentinel(report, NO_REPORT_PROVIDED)];
    }

    if matches.is_empty() {
        return vec![OutputRecord::sentinel(report, NO_CHD_IDENTIFIED)];
    }

    matches
        .iter()
        .map(|m| {
            let chd_name = if m.is_resolved() {
                m.chd_name.clone()
            } else {
                not_found_marker(&m.chd_name)
            };

            OutputRecord {
                scan_id: report.scan_id.clone(),
                report_text: report.text.clone(),
                chd_name,
                icd11_code: m.icd11_code.clone(),
                reference_number: m.reference_number.clone(),
                confidence_class: Some(m.confidence_class),
            }
        })
        .collect()
}

/// マッチャーが失敗したレポートのエラーマーカー行
pub fn error_record(report: &Report, message: &str) -> OutputRecord {
    OutputRecord::sentinel(report, format!("{}{}", ERROR_PREFIX, message))
}
