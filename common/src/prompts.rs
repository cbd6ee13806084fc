//! プロンプト生成モジュール
//!
//! 外部モデル戦略で使うプロンプト:
//! - SYSTEM_INSTRUCTION: システム指示
//! - build_chd_prompt: 参照語彙とレポートを埋め込んだ指示文

use crate::types::NO_CHD_IDENTIFIED;

/// システム指示
pub const SYSTEM_INSTRUCTION: &str = "You are a clinical reasoning assistant trained to extract Congenital Heart Disease (CHD) diagnoses from fetal ultrasound reports.";

/// CHD抽出プロンプト生成
///
/// # Arguments
/// * `report_text` - レポート本文
/// * `known_chds` - 参照語彙のCHD名（参照テーブルの表記）
///
/// # Returns
/// 参照語彙の名称のみを1行1件で返すよう制約したプロンプト文字列。
/// システム指示は含まない（呼び出し側で `SYSTEM_INSTRUCTION` と組にする）。
pub fn build_chd_prompt(report_text: &str, known_chds: &[&str]) -> String {
    let chd_list = known_chds
        .iter()
        .map(|name| format!("- {}", name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are given:
1. A list of known CHD types (based on an expert-verified reference).
2. A fetal ultrasound report written by a clinician.

Your task is to:
- Identify only CHD types that are clearly and explicitly stated in the report.
- Use only CHDs from the provided list.
- Do NOT guess or infer any diagnosis.
- Do NOT hallucinate or make assumptions beyond what is stated.
- Return only the CHD names that appear in the list below.

If no CHD is found in the report, return exactly:
{NO_CHD_IDENTIFIED}

### List of known CHDs:
{chd_list}

### Report:
"""{report_text}"""

### Output Format:
If CHDs are found, list one per line:
CHD Name 1
CHD Name 2
...

If no CHD is found, return:
{NO_CHD_IDENTIFIED}
"#
    )
}
