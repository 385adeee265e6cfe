//! サイドカー分類器
//!
//! 画像の隣に置いた `<画像ファイル名>.labels.json` を分類結果として読む。
//! 事前に分類済みのデータを使う場合やオフライン確認用。

use super::parser::parse_response;
use super::{Classifier, ClassifierOutput};
use crate::error::{PantryScanError, Result};
use crate::scanner::ImageRef;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct SidecarClassifier;

impl SidecarClassifier {
    pub fn sidecar_path(image: &Path) -> PathBuf {
        let mut name = image
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".labels.json");
        image.with_file_name(name)
    }
}

impl Classifier for SidecarClassifier {
    async fn classify(&self, image: &ImageRef) -> Result<ClassifierOutput> {
        let path = Self::sidecar_path(&image.path);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PantryScanError::Classifier(format!("{}: {}", path.display(), e)))?;
        parse_response(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            SidecarClassifier::sidecar_path(Path::new("/photos/shelf.jpg")),
            PathBuf::from("/photos/shelf.jpg.labels.json")
        );
    }

    #[tokio::test]
    async fn test_reads_sidecar_file() {
        let dir = tempdir().unwrap();
        let image_path = dir.path().join("shelf.jpg");
        std::fs::write(
            dir.path().join("shelf.jpg.labels.json"),
            r#"{"labels": [{"label": "Milk", "confidence": 0.88}], "text": "2% milk"}"#,
        )
        .unwrap();

        let image = ImageRef {
            path: image_path,
            file_name: "shelf.jpg".into(),
            reference: "file:///shelf.jpg".into(),
            date: None,
            dimensions: None,
        };
        let output = SidecarClassifier.classify(&image).await.unwrap();
        assert_eq!(output.labels[0].label, "Milk");
        assert_eq!(output.text.as_deref(), Some("2% milk"));
    }

    #[tokio::test]
    async fn test_missing_sidecar_is_classifier_error() {
        let image = ImageRef {
            path: PathBuf::from("/nonexistent/none.jpg"),
            file_name: "none.jpg".into(),
            reference: "file:///none.jpg".into(),
            date: None,
            dimensions: None,
        };
        assert!(matches!(
            SidecarClassifier.classify(&image).await,
            Err(PantryScanError::Classifier(_))
        ));
    }
}
