//! マッピングパイプライン
//!
//! LOAD_INPUTS → (レポートごとに MATCH → EXPAND → ACCUMULATE) → WRITE_OUTPUT
//!
//! - 入力の読み込み失敗はレポート処理前に中断（Err）
//! - レポート単位のマッチャー失敗はエラーマーカー行に置き換えて続行
//! - 書き込み失敗は結果を保持したまま `PipelineOutcome::write_error` で返す

use crate::config::Config;
use crate::error::{MapperError, Result};
use crate::export;
use crate::inference;
use crate::reports;
use chd_mapper_common::{
    error_record, expand, AssertionMatcher, ConfidenceClass, MatchStrategy, Matcher,
    ModelMatcher, OutputRecord, Report, SubstringMatcher, Vocabulary,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// 入出力ファイルのパス
#[derive(Debug, Clone)]
pub struct PipelinePaths {
    pub reports: PathBuf,
    pub reference: PathBuf,
    pub output: PathBuf,
}

/// 処理の統計情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// 処理したレポート数
    pub reports: usize,
    /// 本文が空だったレポート数
    pub blank_reports: usize,
    /// マッチなしのレポート数
    pub no_match_reports: usize,
    /// 解決済みマッチの行数
    pub matched_records: usize,
    /// 語彙で解決できなかったラベル数
    pub unresolved_labels: usize,
    /// マッチャーが失敗したレポート数
    pub failed_reports: usize,
}

/// パイプラインの結果
#[derive(Debug)]
pub struct PipelineOutcome {
    pub records: Vec<OutputRecord>,
    pub stats: PipelineStats,
    /// 出力の書き込みに失敗した場合のエラー（recordsは保持される）
    pub write_error: Option<MapperError>,
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        self.write_error.is_none()
    }
}

/// 設定の戦略に対応するマッチャーを構築
pub fn build_matcher(config: &Config, verbose: bool) -> Result<Box<dyn Matcher>> {
    let matcher: Box<dyn Matcher> = match config.strategy {
        MatchStrategy::Substring => Box::new(SubstringMatcher),
        MatchStrategy::Assertion => Box::new(AssertionMatcher),
        MatchStrategy::Model => {
            let client = inference::build_client(config, verbose)?;
            Box::new(ModelMatcher::new(client))
        }
    };
    Ok(matcher)
}

/// 入力を読み込み、全レポートを処理して出力を書き込む
pub fn run_pipeline(
    paths: &PipelinePaths,
    matcher: &dyn Matcher,
    verbose: bool,
) -> Result<PipelineOutcome> {
    let (reports, vocabulary) = load_inputs(&paths.reports, &paths.reference)?;

    if verbose {
        println!(
            "  レポート {}件 / 参照語彙 {}件 / 戦略: {}",
            reports.len(),
            vocabulary.len(),
            matcher.strategy()
        );
    }

    let progress = if verbose {
        ProgressBar::hidden()
    } else {
        create_progress_bar(reports.len())
    };

    let (records, stats) = map_reports(&reports, &vocabulary, matcher, &progress);
    progress.finish_and_clear();

    let write_error = export::export_records(&records, &paths.output).err();
    if let Some(e) = &write_error {
        log::error!("{}", e);
    }

    Ok(PipelineOutcome {
        records,
        stats,
        write_error,
    })
}

/// 両方の入力テーブルを読み込む（どちらかが失敗したら中断）
///
/// 読み込み失敗は入力の種類によらず `MapperError::Load` で返す。
pub fn load_inputs(reports_path: &Path, reference_path: &Path) -> Result<(Vec<Report>, Vocabulary)> {
    let vocabulary = Vocabulary::from_csv(reference_path).map_err(|e| match e {
        chd_mapper_common::Error::Load(msg) => MapperError::Load(msg),
        other => MapperError::Load(format!("{}: {}", reference_path.display(), other)),
    })?;
    let reports = reports::load_reports(reports_path).map_err(|e| match e {
        MapperError::Load(msg) => MapperError::Load(msg),
        other => MapperError::Load(format!("{}: {}", reports_path.display(), other)),
    })?;
    Ok((reports, vocabulary))
}

/// 全レポートをマッチ→展開する（入力順を保持）
pub fn map_reports(
    reports: &[Report],
    vocabulary: &Vocabulary,
    matcher: &dyn Matcher,
    progress: &ProgressBar,
) -> (Vec<OutputRecord>, PipelineStats) {
    let mut records = Vec::with_capacity(reports.len());
    let mut stats = PipelineStats::default();

    for report in reports {
        stats.reports += 1;

        // 照合中（マッチャー内のログ出力を含む）はバーの描画を止める
        let result = progress.suspend(|| {
            let result = matcher.match_report(&report.text, vocabulary);
            match &result {
                Ok(matches) => log::debug!("{}: {}件マッチ", report.scan_id, matches.len()),
                Err(e) => log::error!("{}: マッチング失敗: {}", report.scan_id, e),
            }
            result
        });

        match result {
            Ok(matches) => {
                if report.is_blank() {
                    stats.blank_reports += 1;
                } else if matches.is_empty() {
                    stats.no_match_reports += 1;
                }
                for m in &matches {
                    if m.confidence_class == ConfidenceClass::Unknown {
                        stats.unresolved_labels += 1;
                    } else {
                        stats.matched_records += 1;
                    }
                }

                records.extend(expand(report, &matches));
            }
            Err(e) => {
                stats.failed_reports += 1;
                records.push(error_record(report, &e.to_string()));
            }
        }

        progress.inc(1);
    }

    (records, stats)
}

fn create_progress_bar(len: usize) -> ProgressBar {
    let progress = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("  {bar:40} {pos}/{len} {msg}") {
        progress.set_style(style);
    }
    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use chd_mapper_common::{CompletionClient, InferenceError, ReferenceEntry};

    fn vocabulary() -> Vocabulary {
        Vocabulary::from_entries(vec![
            ReferenceEntry::new("Tetralogy of Fallot", "ICD11-XX"),
            ReferenceEntry::new("Truncus Arteriosus", "ICD11-YY"),
        ])
        .unwrap()
    }

    /// 本文に "fail" を含むと失敗するスタブ
    struct FlakyClient;

    impl CompletionClient for FlakyClient {
        fn complete(&self, _system: &str, user: &str) -> std::result::Result<String, InferenceError> {
            if user.contains("fail") {
                Err(InferenceError::Status { status: 500, body: "internal".into() })
            } else {
                Ok("Truncus Arteriosus\nTruncus Arteriosus Type Z".into())
            }
        }
    }

    #[test]
    fn test_map_reports_preserves_order_and_sentinels() {
        let reports = vec![
            Report::new(Some("A"), 0, "Fetal echo shows tetralogy of fallot with overriding aorta."),
            Report::new(Some("B"), 1, "No cardiac anomaly detected."),
            Report::new(Some("C"), 2, "   "),
        ];

        let (records, stats) =
            map_reports(&reports, &vocabulary(), &SubstringMatcher, &ProgressBar::hidden());

        let names: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.scan_id.as_str(), r.chd_name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("A", "Tetralogy of Fallot"),
                ("B", "No CHD identified"),
                ("C", "No report provided"),
            ]
        );
        assert_eq!(records[0].icd11_code.as_deref(), Some("ICD11-XX"));
        assert_eq!(stats.reports, 3);
        assert_eq!(stats.matched_records, 1);
        assert_eq!(stats.no_match_reports, 1);
        assert_eq!(stats.blank_reports, 1);
    }

    #[test]
    fn test_map_reports_recovers_from_inference_error() {
        let matcher = ModelMatcher::new(Box::new(FlakyClient));
        let reports = vec![
            Report::new(Some("A"), 0, "please fail"),
            Report::new(Some("B"), 1, "common arterial trunk"),
        ];

        let progress = ProgressBar::hidden();
        let (records, stats) = map_reports(&reports, &vocabulary(), &matcher, &progress);

        // 失敗したレポートも進捗に数える
        assert_eq!(progress.position(), 2);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].scan_id, "A");
        assert!(records[0].chd_name.starts_with("Error: "));
        assert!(records[0].chd_name.contains("500"));
        assert_eq!(records[1].chd_name, "Truncus Arteriosus");
        assert_eq!(records[1].icd11_code.as_deref(), Some("ICD11-YY"));
        assert_eq!(records[2].chd_name, "Not found in reference: Truncus Arteriosus Type Z");
        assert!(records[2].icd11_code.is_none());

        assert_eq!(stats.failed_reports, 1);
        assert_eq!(stats.unresolved_labels, 1);
        assert_eq!(stats.matched_records, 1);
    }

    #[test]
    fn test_map_reports_advances_progress_per_report() {
        let reports: Vec<Report> = (0..5)
            .map(|i| Report::new(None, i, "tetralogy of fallot"))
            .collect();
        let progress = ProgressBar::new(reports.len() as u64);
        progress.set_draw_target(indicatif::ProgressDrawTarget::hidden());

        let (records, _) = map_reports(&reports, &vocabulary(), &SubstringMatcher, &progress);

        assert_eq!(records.len(), 5);
        assert_eq!(progress.position(), 5);
        assert!(!progress.is_finished());
    }

    #[test]
    fn test_build_matcher_for_local_strategies() {
        let config = Config { strategy: MatchStrategy::Assertion, ..Default::default() };
        let matcher = build_matcher(&config, false).unwrap();
        assert_eq!(matcher.strategy(), MatchStrategy::Assertion);

        let config = Config::default();
        let matcher = build_matcher(&config, false).unwrap();
        assert_eq!(matcher.strategy(), MatchStrategy::Substring);
    }

    #[test]
    fn test_build_matcher_model_with_cli_provider() {
        let config = Config {
            strategy: MatchStrategy::Model,
            provider: crate::ai_provider::AiProvider::Claude,
            ..Default::default()
        };
        let matcher = build_matcher(&config, false).unwrap();
        assert_eq!(matcher.strategy(), MatchStrategy::Model);
    }
}
