use pantry_scan_common::CurationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PantryScanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("分類器が設定されていません。`pantry-scan config --set-classifier COMMAND` で設定してください")]
    MissingClassifier,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("分類器エラー: {0}")]
    Classifier(String),

    #[error("分類器レスポンスのパースに失敗: {0}")]
    ClassifierParse(String),

    #[error("分類器がタイムアウトしました ({0}秒)")]
    ClassifierTimeout(u64),

    #[error("保存エラー: {0}")]
    Persistence(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error("入力エラー: {0}")]
    Curation(#[from] CurationError),

    #[error("カタログエラー: {0}")]
    Catalog(#[from] pantry_scan_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl PantryScanError {
    /// 分類器・保存先など外部要因の失敗か
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            PantryScanError::Classifier(_)
                | PantryScanError::ClassifierParse(_)
                | PantryScanError::ClassifierTimeout(_)
                | PantryScanError::Persistence(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PantryScanError>;
