//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// キュー操作の入力拒否
///
/// どれも致命的ではなく、呼び出し側は再入力を促すだけでよい。
/// エラーを返した操作は状態を一切変更しない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurationError {
    #[error("no candidates selected")]
    EmptySelection,

    #[error("item name must not be empty")]
    EmptyName,

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("no item is waiting for confirmation")]
    NothingPending,

    #[error("candidate index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("candidate not found: {0}")]
    CandidateNotFound(String),

    #[error("candidate already approved: {0}")]
    CandidateApproved(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = Error::Json(json_error);
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_display_config() {
        let error = Error::Config("catalog file is empty".to_string());
        assert_eq!(format!("{}", error), "Config error: catalog file is empty");
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
    }

    #[test]
    fn test_curation_error_display() {
        let error = CurationError::IndexOutOfRange { index: 5, len: 2 };
        assert_eq!(format!("{}", error), "candidate index 5 out of range (len 2)");
        assert_eq!(
            format!("{}", CurationError::CandidateNotFound("Sky".into())),
            "candidate not found: Sky"
        );
    }
}
