//! モデルレスポンスパーサー
//!
//! 外部モデルのテキスト応答からCHD名の候補を取り出す。
//! プロンプトとの取り決め（1行1件、該当なしはセンチネル行）はここに閉じ込める。

use crate::types::NO_CHD_IDENTIFIED;
use crate::vocabulary::normalize_name;
use regex::Regex;
use std::collections::HashSet;

/// 行頭のリスト記号（"- ", "* ", "• ", "1. ", "2) "）
fn strip_list_marker(line: &str) -> &str {
    lazy_static::lazy_static! {
        static ref LIST_MARKER: Regex = Regex::new(r"^(?:[-*•]|\d+[.)])\s+").unwrap();
    }

    match LIST_MARKER.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// コードフェンスのみの行（"```" / "```text" 等）か
fn is_bare_fence(line: &str) -> bool {
    lazy_static::lazy_static! {
        static ref BARE_FENCE: Regex = Regex::new(r"^```[\w-]*$").unwrap();
    }

    BARE_FENCE.is_match(line)
}

/// センチネル行か（大文字小文字を無視した部分一致）
pub fn is_no_chd_line(line: &str) -> bool {
    line.to_lowercase().contains(&NO_CHD_IDENTIFIED.to_lowercase())
}

/// モデル応答をCHD名候補の列にパース
///
/// 処理:
/// 1. 改行で分割し、前後空白を除去
/// 2. 空行・フェンスのみの行・センチネル行を除外
/// 3. 行頭のリスト記号・バッククォートを除去
/// 4. 正規化名で重複を除く（先勝ち、順序は応答のまま）
///
/// # Examples
/// ```
/// use chd_mapper_common::parse_model_response;
///
/// let labels = parse_model_response("Tetralogy of Fallot\n\nTruncus Arteriosus\n");
/// assert_eq!(labels, vec!["Tetralogy of Fallot", "Truncus Arteriosus"]);
/// ```
pub fn parse_model_response(response: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut labels = Vec::new();

    for line in response.lines() {
        let line = line.trim();
        if line.is_empty() || is_bare_fence(line) || is_no_chd_line(line) {
            continue;
        }

        let label = strip_list_marker(line).trim_start_matches('`').trim();
        if label.is_empty() {
            continue;
        }

        if seen.insert(normalize_name(label)) {
            labels.push(label.to_string());
        }
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_one_per_line() {
        let response = "Tetralogy of Fallot\nTruncus Arteriosus";
        assert_eq!(
            parse_model_response(response),
            vec!["Tetralogy of Fallot", "Truncus Arteriosus"]
        );
    }

    #[test]
    fn test_parse_sentinel_only() {
        assert!(parse_model_response("No CHD identified").is_empty());
        assert!(parse_model_response("  no chd identified.  \n").is_empty());
        assert!(parse_model_response("Result: NO CHD IDENTIFIED in this report").is_empty());
    }

    #[test]
    fn test_parse_discards_blank_lines() {
        let response = "\n\n  \nTetralogy of Fallot\r\n\r\n";
        assert_eq!(parse_model_response(response), vec!["Tetralogy of Fallot"]);
    }

    #[test]
    fn test_parse_strips_list_markers() {
        let response = "- Tetralogy of Fallot\n* Truncus Arteriosus\n1. Ebstein anomaly\n2) Coarctation of the aorta";
        assert_eq!(
            parse_model_response(response),
            vec![
                "Tetralogy of Fallot",
                "Truncus Arteriosus",
                "Ebstein anomaly",
                "Coarctation of the aorta"
            ]
        );
    }

    #[test]
    fn test_parse_keeps_hyphenated_names() {
        let response = "Double-outlet right ventricle";
        assert_eq!(parse_model_response(response), vec!["Double-outlet right ventricle"]);
    }

    #[test]
    fn test_parse_dedups_case_insensitively() {
        let response = "Tetralogy of Fallot\ntetralogy of fallot\nTETRALOGY OF FALLOT";
        assert_eq!(parse_model_response(response), vec!["Tetralogy of Fallot"]);
    }

    #[test]
    fn test_parse_skips_code_fences() {
        let response = "```\nTruncus Arteriosus\n```";
        assert_eq!(parse_model_response(response), vec!["Truncus Arteriosus"]);
    }

    #[test]
    fn test_parse_skips_fence_with_language_tag() {
        let response = "```text\nTetralogy of Fallot\n```";
        assert_eq!(parse_model_response(response), vec!["Tetralogy of Fallot"]);
    }

    #[test]
    fn test_parse_keeps_label_after_fence_marker() {
        let response = "1. Truncus Arteriosus Type Z\n```Tetralogy of Fallot";
        assert_eq!(
            parse_model_response(response),
            vec!["Truncus Arteriosus Type Z", "Tetralogy of Fallot"]
        );
    }

    #[test]
    fn test_parse_keeps_unknown_labels() {
        let response = "Truncus Arteriosus Type Z";
        assert_eq!(parse_model_response(response), vec!["Truncus Arteriosus Type Z"]);
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(parse_model_response("").is_empty());
    }
}
