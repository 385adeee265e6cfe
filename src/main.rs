use anyhow::Context;
use clap::Parser;
use pantry_scan::classifier::{self, CacheFile, Classifier, CommandClassifier, SidecarClassifier};
use pantry_scan::detections::{self, DetectionRecord};
use pantry_scan::{cli, config, curate, error, export, scanner, session};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use pantry_scan_common::ProductCatalog;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn classify_with<C: Classifier>(
    classifier: &C,
    images: &[scanner::ImageRef],
    folder: &Path,
    use_cache: bool,
    catalog: &ProductCatalog,
) -> Result<Vec<DetectionRecord>> {
    let mut cache = use_cache.then(|| CacheFile::load(folder));

    let classified = classifier::classify_images(classifier, images, cache.as_mut(), true).await;

    if let Some(cache) = &cache {
        cache.save(folder)?;
    }

    Ok(classified
        .into_iter()
        .map(|c| DetectionRecord::from_classified(c, catalog))
        .collect())
}

async fn classify_folder(
    folder: &Path,
    config: &Config,
    catalog: &ProductCatalog,
    sidecar: bool,
    use_cache: bool,
    recursive: bool,
) -> Result<Vec<DetectionRecord>> {
    println!("[1/2] 写真をスキャン中...");
    let images = scanner::scan_folder(folder, recursive)?;
    if images.is_empty() {
        return Err(error::PantryScanError::NoImagesFound(folder.display().to_string()));
    }
    println!("✔ {}枚の写真を検出\n", images.len());

    println!("[2/2] 分類中...{}", if use_cache { " (キャッシュ有効)" } else { "" });
    let records = if sidecar {
        classify_with(&SidecarClassifier, &images, folder, use_cache, catalog).await?
    } else {
        let classifier = CommandClassifier::new(
            config.classifier_command()?,
            config.classifier_args.clone(),
            Duration::from_secs(config.timeout_seconds),
        );
        classify_with(&classifier, &images, folder, use_cache, catalog).await?
    };

    let failed = records.iter().filter(|r| r.error.is_some()).count();
    let candidates: usize = records.iter().map(|r| r.candidates.len()).sum();
    println!("✔ 分類完了: 候補{}件", candidates);
    if failed > 0 {
        println!("⚠ {}枚の分類に失敗しました（確認時に手入力できます）", failed);
    }

    Ok(records)
}

fn curate_and_save(
    records: &[DetectionRecord],
    catalog: ProductCatalog,
    format: &cli::ExportFormat,
    output: &Path,
    title: &str,
) -> Result<()> {
    let mut session = session::CaptureSession::new(catalog);
    curate::run_interactive_curation(records, &mut session)?;

    let snapshot = session.handoff();
    if snapshot.is_empty() {
        println!("確定したアイテムがないため保存しません");
        return Ok(());
    }
    export::export_snapshot(&snapshot, format, output, title)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load().context("設定の読み込みに失敗しました")?;

    match cli.command {
        Commands::Classify { folder, output, sidecar, use_cache, recursive } => {
            println!("🔍 pantry-scan - 分類\n");

            if !folder.is_dir() {
                return Err(error::PantryScanError::FolderNotFound(folder.display().to_string()).into());
            }

            let catalog = config.catalog()?;
            let records = classify_folder(&folder, &config, &catalog, sidecar, use_cache, recursive).await?;

            let output = output.unwrap_or_else(|| folder.join("detections.json"));
            detections::save_detections(&records, &output)?;
            println!("✔ 結果を保存: {}", output.display());
        }

        Commands::Curate { input, output, format, title } => {
            println!("🧺 pantry-scan - 確認\n");

            let records = detections::load_detections(&input)?;
            let output = output.unwrap_or_else(|| config.default_output.clone());
            curate_and_save(&records, config.catalog()?, &format, &output, &title)?;
        }

        Commands::Run { folder, output, format, title, sidecar, use_cache, recursive } => {
            println!("🚀 pantry-scan - 一括処理\n");

            if !folder.is_dir() {
                return Err(error::PantryScanError::FolderNotFound(folder.display().to_string()).into());
            }

            let catalog = config.catalog()?;
            let records = classify_folder(&folder, &config, &catalog, sidecar, use_cache, recursive).await?;

            let output = output.unwrap_or_else(|| folder.join(&config.default_output));
            curate_and_save(&records, catalog, &format, &output, &title)?;

            println!("\n✅ 完了");
        }

        Commands::Export { input, format, output, title } => {
            println!("📄 pantry-scan - エクスポート\n");

            let listing = export::load_listing(&input)?;
            println!("- {}品目 / 合計{}個", listing.items.len(), listing.total_quantity);

            let output = output.unwrap_or_else(|| {
                input.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
            });
            export::export_listing(&listing, &format, &output, &title)?;

            println!("\n✅ エクスポート完了");
        }

        Commands::Config { set_classifier, classifier_args, set_catalog, show } => {
            let mut config = config;

            if let Some(command) = set_classifier {
                config.set_classifier(command, classifier_args)?;
                println!("✔ 分類器を設定しました");
            }

            if let Some(path) = set_catalog {
                config.set_catalog_path(path)?;
                println!("✔ 追加カタログを設定しました");
            }

            if show {
                println!("設定:");
                match config.classifier_command() {
                    Ok(command) => println!("  分類器: {} {}", command, config.classifier_args.join(" ")),
                    Err(_) => println!("  分類器: 未設定"),
                }
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!(
                    "  追加カタログ: {}",
                    config
                        .catalog_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "なし".to_string())
                );
                println!("  出力先: {}", config.default_output.display());
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = CacheFile::cache_path(&target);

            if info || !clear {
                if cache_path.exists() {
                    let cache = CacheFile::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match CacheFile::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}
