//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use pantry_scan::classifier::parser::parse_response;
use pantry_scan::error::PantryScanError;
use pantry_scan::scanner;
use pantry_scan_common::CurationError;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), false);
    assert!(matches!(result, Err(PantryScanError::FolderNotFound(_))));
}

/// 空のフォルダをスキャンした場合
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::scan_folder(dir.path(), false);

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.expect("scan").is_empty());
}

/// 画像として読めないファイルはスキップ
#[test]
fn test_scan_skips_undecodable_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("fake.jpg"), "not an image").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    let images = scanner::scan_folder(dir.path(), false).expect("scan");
    assert!(images.is_empty());
}

/// 単一画像の読み込み失敗は ImageLoad
#[test]
fn test_image_ref_undecodable_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("fake.png");
    std::fs::write(&path, "not an image").unwrap();

    assert!(matches!(scanner::image_ref(&path), Err(PantryScanError::ImageLoad(_))));
}

/// 分類器の不正な出力
#[test]
fn test_parse_garbage_response() {
    assert!(matches!(
        parse_response("classifier crashed"),
        Err(PantryScanError::ClassifierParse(_))
    ));
}

/// 入力エラーは変換され、外部要因ではない
#[test]
fn test_curation_error_is_not_external() {
    let err: PantryScanError = CurationError::EmptySelection.into();
    assert!(matches!(err, PantryScanError::Curation(CurationError::EmptySelection)));
    assert!(!err.is_external());

    assert!(PantryScanError::ClassifierTimeout(30).is_external());
    assert!(PantryScanError::Persistence("disk full".into()).is_external());
}

/// エラーメッセージ
#[test]
fn test_error_messages() {
    let err = PantryScanError::ClassifierTimeout(45);
    assert!(err.to_string().contains("45"));

    let err = PantryScanError::NoImagesFound("/photos".into());
    assert!(err.to_string().contains("/photos"));
}
