//! 外部コマンド分類器
//!
//! `<command> <args..> <画像パス>` を実行し、標準出力のJSONをパースする

use super::parser::parse_response;
use super::{Classifier, ClassifierOutput};
use crate::error::{PantryScanError, Result};
use crate::scanner::ImageRef;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandClassifier {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

impl Classifier for CommandClassifier {
    async fn classify(&self, image: &ImageRef) -> Result<ClassifierOutput> {
        debug!(program = %self.program, file = %image.file_name, "invoking classifier");

        let run = Command::new(&self.program)
            .args(&self.args)
            .arg(&image.path)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| PantryScanError::ClassifierTimeout(self.timeout.as_secs()))?
            .map_err(|e| PantryScanError::Classifier(format!("{} の実行に失敗: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PantryScanError::Classifier(format!(
                "{} failed (code {:?}): {}",
                self.program,
                output.status.code(),
                stderr.trim()
            )));
        }

        let response = String::from_utf8_lossy(&output.stdout);
        debug!(bytes = response.len(), "classifier responded");
        parse_response(&response)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dummy_image() -> ImageRef {
        ImageRef {
            path: PathBuf::from("photo.jpg"),
            file_name: "photo.jpg".into(),
            reference: "file:///photo.jpg".into(),
            date: None,
            dimensions: None,
        }
    }

    #[tokio::test]
    async fn test_command_output_is_parsed() {
        let classifier = CommandClassifier::new(
            "sh",
            vec![
                "-c".into(),
                r#"echo '[{"label": "Tomato", "confidence": 0.9}]'"#.into(),
            ],
            Duration::from_secs(5),
        );
        let output = classifier.classify(&dummy_image()).await.unwrap();
        assert_eq!(output.labels.len(), 1);
        assert_eq!(output.labels[0].label, "Tomato");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_classifier_error() {
        let classifier = CommandClassifier::new(
            "sh",
            vec!["-c".into(), "echo boom >&2; exit 3".into()],
            Duration::from_secs(5),
        );
        let err = classifier.classify(&dummy_image()).await.unwrap_err();
        assert!(matches!(err, PantryScanError::Classifier(ref msg) if msg.contains("boom")));
    }

    #[tokio::test]
    async fn test_timeout() {
        let classifier = CommandClassifier::new(
            "sh",
            vec!["-c".into(), "sleep 5".into()],
            Duration::from_millis(100),
        );
        let err = classifier.classify(&dummy_image()).await.unwrap_err();
        assert!(matches!(err, PantryScanError::ClassifierTimeout(_)));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let classifier = CommandClassifier::new(
            "definitely-not-a-classifier-binary",
            Vec::new(),
            Duration::from_secs(1),
        );
        assert!(classifier.classify(&dummy_image()).await.is_err());
    }
}
