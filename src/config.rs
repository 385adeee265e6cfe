use crate::error::{PantryScanError, Result};
use pantry_scan_common::ProductCatalog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 分類器コマンドを上書きする環境変数
pub const CLASSIFIER_ENV: &str = "PANTRY_SCAN_CLASSIFIER";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 画像パスを最後の引数として受け取り、ラベルJSONを標準出力に返すコマンド
    pub classifier_command: Option<String>,
    pub classifier_args: Vec<String>,
    pub timeout_seconds: u64,
    /// 組み込みカタログにマージする追加カタログ（JSON）
    pub catalog_path: Option<PathBuf>,
    pub default_output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier_command: None,
            classifier_args: Vec::new(),
            timeout_seconds: 60,
            catalog_path: None,
            default_output: PathBuf::from("pantry.json"),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PantryScanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("pantry-scan").join("config.json"))
    }

    pub fn classifier_command(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(command) = std::env::var(CLASSIFIER_ENV) {
            if !command.trim().is_empty() {
                return Ok(command);
            }
        }

        self.classifier_command
            .clone()
            .ok_or(PantryScanError::MissingClassifier)
    }

    pub fn set_classifier(&mut self, command: String, args: Vec<String>) -> Result<()> {
        self.classifier_command = Some(command);
        self.classifier_args = args;
        self.save()
    }

    pub fn set_catalog_path(&mut self, path: PathBuf) -> Result<()> {
        if !path.exists() {
            return Err(PantryScanError::FileNotFound(path.display().to_string()));
        }
        self.catalog_path = Some(path);
        self.save()
    }

    /// 組み込みカタログに追加カタログをマージして返す
    pub fn catalog(&self) -> Result<ProductCatalog> {
        let mut catalog = ProductCatalog::builtin();
        if let Some(path) = &self.catalog_path {
            if !path.exists() {
                return Err(PantryScanError::FileNotFound(path.display().to_string()));
            }
            let custom = ProductCatalog::from_file(path)?;
            tracing::debug!(path = %path.display(), products = custom.len(), "custom catalog merged");
            catalog.merge(&custom);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timeout_seconds, 60);
        assert!(config.classifier_command.is_none());
        assert_eq!(config.default_output, PathBuf::from("pantry.json"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            classifier_command: Some("label-detect".into()),
            classifier_args: vec!["--ocr".into()],
            timeout_seconds: 10,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.classifier_command.as_deref(), Some("label-detect"));
        assert_eq!(loaded.classifier_args, vec!["--ocr".to_string()]);
        assert_eq!(loaded.timeout_seconds, 10);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeout_seconds": 30}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timeout_seconds, 30);
        assert_eq!(loaded.default_output, PathBuf::from("pantry.json"));
    }

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert!(loaded.catalog_path.is_none());
    }

    #[test]
    fn test_catalog_merges_custom_file() {
        let dir = tempdir().unwrap();
        let catalog_path = dir.path().join("catalog.json");
        std::fs::write(
            &catalog_path,
            r#"{"products": [{"name": "Kimchi", "category": "vegetable"}]}"#,
        )
        .unwrap();

        let config = Config {
            catalog_path: Some(catalog_path),
            ..Default::default()
        };
        let catalog = config.catalog().unwrap();
        assert!(catalog.find_by_name("kimchi").is_some());
        assert!(catalog.find_by_name("tomato").is_some());
    }

    #[test]
    fn test_catalog_missing_file_is_error() {
        let config = Config {
            catalog_path: Some(PathBuf::from("/nonexistent/catalog.json")),
            ..Default::default()
        };
        assert!(matches!(config.catalog(), Err(PantryScanError::FileNotFound(_))));
    }
}
