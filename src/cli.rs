use crate::ai_provider::AiProvider;
use chd_mapper_common::MatchStrategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_REPORTS: &str = "data/input/fetal_reports.csv";
pub const DEFAULT_REFERENCE: &str = "data/input/chd_reference.csv";
pub const DEFAULT_OUTPUT: &str = "data/output/chd_mapped_output.csv";

#[derive(Parser)]
#[command(name = "chd-mapper")]
#[command(about = "胎児超音波レポートをCHD語彙・ICD-11コードへ対応付けるツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// レポートCSVと参照CSVから対応付け結果CSVを出力
    Map {
        /// レポートCSV（scan_id, report/reports列）
        #[arg(default_value = DEFAULT_REPORTS)]
        reports: PathBuf,

        /// CHD参照CSV（chd_name, icd11_code, reference_number列）
        #[arg(default_value = DEFAULT_REFERENCE)]
        reference: PathBuf,

        /// 出力CSV
        #[arg(default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// モデル名を設定
        #[arg(long)]
        set_model: Option<String>,

        /// サンプリング温度を設定 (0.0-2.0)
        #[arg(long)]
        set_temperature: Option<f32>,

        /// マッチング戦略を設定 (substring/assertion/model)
        #[arg(long)]
        set_strategy: Option<MatchStrategy>,

        /// 推論バックエンドを設定 (openai/claude)
        #[arg(long)]
        set_provider: Option<AiProvider>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
