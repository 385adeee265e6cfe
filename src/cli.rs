use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pantry-scan")]
#[command(about = "食品写真の検出結果を確認してパントリーリストを作るツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真フォルダを分類して候補リストJSONを出力
    Classify {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力JSONファイル（デフォルト: 入力フォルダ/detections.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 分類済みサイドカー（<画像>.labels.json）を使う
        #[arg(long)]
        sidecar: bool,

        /// キャッシュを使用（再分類をスキップ）
        #[arg(long)]
        use_cache: bool,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// 候補リストを対話的に確認してパントリーリストを作成
    Curate {
        /// classify の出力JSON
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ファイル（デフォルト: 設定の default_output）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// ドキュメントタイトル
        #[arg(short, long, default_value = "パントリーリスト")]
        title: String,
    },

    /// 分類から確認・保存まで一括実行
    Run {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力ファイル
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// ドキュメントタイトル
        #[arg(short, long, default_value = "パントリーリスト")]
        title: String,

        /// 分類済みサイドカー（<画像>.labels.json）を使う
        #[arg(long)]
        sidecar: bool,

        /// キャッシュを使用（再分類をスキップ）
        #[arg(long)]
        use_cache: bool,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// 保存済みパントリーリストを別形式で出力
    Export {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "excel")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ドキュメントタイトル
        #[arg(short, long, default_value = "パントリーリスト")]
        title: String,
    },

    /// 設定を表示/編集
    Config {
        /// 分類器コマンドを設定
        #[arg(long)]
        set_classifier: Option<String>,

        /// 分類器コマンドの追加引数（画像パスの前に渡す）
        #[arg(long, requires = "set_classifier", num_args = 1.., allow_hyphen_values = true)]
        classifier_args: Vec<String>,

        /// 追加カタログJSONを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Excel,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use json, excel, or both", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("JSON".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert_eq!("xlsx".parse::<ExportFormat>(), Ok(ExportFormat::Excel));
        assert_eq!("both".parse::<ExportFormat>(), Ok(ExportFormat::Both));
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_parse_curate_command() {
        let cli = Cli::parse_from(["pantry-scan", "curate", "detections.json", "-f", "both", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Curate { input, format, .. } => {
                assert_eq!(input, PathBuf::from("detections.json"));
                assert_eq!(format, ExportFormat::Both);
            }
            _ => panic!("expected curate"),
        }
    }
}
