use anyhow::Context;
use chd_mapper::{cli, config, pipeline};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use pipeline::PipelinePaths;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = Config::load().context("設定ファイルの読み込みに失敗")?;

    match cli.command {
        Commands::Map { reports, reference, output } => {
            println!("🫀 chd-mapper - CHD対応付け\n");

            // 1. マッチャー準備
            println!("[1/3] マッチャーを準備中... (戦略: {})", config.strategy);
            let matcher = pipeline::build_matcher(&config, cli.verbose)?;
            println!("✔ 準備完了\n");

            // 2. 読み込み・マッチング・保存（書き込みは run_pipeline 内で行う）
            println!("[2/3] レポートを照合して結果を保存中...");
            let paths = PipelinePaths { reports, reference, output };
            let outcome = pipeline::run_pipeline(&paths, matcher.as_ref(), cli.verbose)?;
            if let Some(e) = outcome.write_error {
                return Err(e).context(format!(
                    "{}行の結果を保存できませんでした: {}",
                    outcome.records.len(),
                    paths.output.display()
                ));
            }
            println!("✔ 結果を保存: {}\n", paths.output.display());

            // 3. 集計
            println!("[3/3] 集計");
            let stats = &outcome.stats;
            println!("✔ {}件のレポートを照合 → {}行", stats.reports, outcome.records.len());
            println!("  マッチ: {}件 / 該当なし: {}件 / 本文なし: {}件", stats.matched_records, stats.no_match_reports, stats.blank_reports);
            if stats.unresolved_labels > 0 {
                println!("⚠ 参照語彙に無いラベル: {}件", stats.unresolved_labels);
            }
            if stats.failed_reports > 0 {
                println!("⚠ 照合に失敗したレポート: {}件", stats.failed_reports);
            }

            println!("\n✅ 完了");
        }

        Commands::Config { set_api_key, set_model, set_temperature, set_strategy, set_provider, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(key) = set_api_key {
                config.api_key = Some(key);
                changed = true;
                println!("✔ APIキーを設定しました");
            }
            if let Some(model) = set_model {
                println!("✔ モデルを設定しました: {}", model);
                config.model = model;
                changed = true;
            }
            if let Some(temperature) = set_temperature {
                config.set_temperature(temperature)?;
                changed = true;
                println!("✔ 温度を設定しました: {}", temperature);
            }
            if let Some(strategy) = set_strategy {
                config.strategy = strategy;
                changed = true;
                println!("✔ 戦略を設定しました: {}", strategy);
            }
            if let Some(provider) = set_provider {
                config.provider = provider;
                changed = true;
                println!("✔ 推論バックエンドを設定しました: {}", provider);
            }

            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定:");
                println!("  戦略: {}", config.strategy);
                println!("  推論バックエンド: {}", config.provider);
                println!("  モデル: {}", config.model);
                println!("  温度: {}", config.temperature);
                println!("  APIエンドポイント: {}", config.api_base_url);
                let key_status = if !config.provider.requires_api_key() {
                    "不要"
                } else if config.has_api_key() {
                    "設定済み"
                } else {
                    "未設定"
                };
                println!("  APIキー: {}", key_status);
            }
        }
    }

    Ok(())
}
