//! キャッシュ機能テスト
//!
//! 分類結果キャッシュの保存・読み込みと、classify_images でのヒットを検証

use pantry_scan::classifier::{self, compute_file_hash, CacheFile, Classifier, ClassifierOutput};
use pantry_scan::error::{PantryScanError, Result};
use pantry_scan::scanner::ImageRef;
use pantry_scan_common::RawLabel;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;

/// 呼び出し回数を数える分類器
#[derive(Default)]
struct CountingClassifier {
    calls: AtomicUsize,
}

impl Classifier for CountingClassifier {
    async fn classify(&self, image: &ImageRef) -> Result<ClassifierOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if image.file_name.starts_with("broken") {
            return Err(PantryScanError::Classifier("unreadable".into()));
        }
        Ok(ClassifierOutput {
            labels: vec![RawLabel::new("Apple", 0.9)],
            text: None,
        })
    }
}

fn write_image(dir: &Path, name: &str, content: &[u8]) -> ImageRef {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write image");
    ImageRef {
        reference: format!("file://{}", path.display()),
        path,
        file_name: name.to_string(),
        date: None,
        dimensions: None,
    }
}

/// 空のキャッシュファイル
#[test]
fn test_cache_file_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cache = CacheFile::load(dir.path());

    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
}

/// キャッシュの保存と読み込み
#[test]
fn test_cache_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    cache.insert(
        "abc123".to_string(),
        "test.jpg".to_string(),
        1024,
        ClassifierOutput {
            labels: vec![RawLabel::new("Milk", 0.8)],
            text: Some("whole milk".into()),
        },
    );
    cache.save(dir.path()).expect("キャッシュ保存失敗");

    let loaded = CacheFile::load(dir.path());
    assert_eq!(loaded.len(), 1);

    let cached = loaded.get("abc123").expect("キャッシュが見つからない");
    assert_eq!(cached.labels[0].label, "Milk");
    assert_eq!(cached.text.as_deref(), Some("whole milk"));
}

/// 壊れたキャッシュは空として扱う
#[test]
fn test_corrupt_cache_starts_fresh() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(CacheFile::cache_path(dir.path()), "{not json").unwrap();

    assert!(CacheFile::load(dir.path()).is_empty());
}

/// キャッシュ削除
#[test]
fn test_cache_clear() {
    let dir = tempdir().expect("Failed to create temp dir");
    assert!(!CacheFile::clear(dir.path()).unwrap());

    CacheFile::default().save(dir.path()).unwrap();
    assert!(CacheFile::clear(dir.path()).unwrap());
    assert!(!CacheFile::cache_path(dir.path()).exists());
}

/// 同じ内容のファイルは同じハッシュ
#[test]
fn test_file_hash_depends_on_content() {
    let dir = tempdir().expect("Failed to create temp dir");
    let a = write_image(dir.path(), "a.jpg", b"same bytes");
    let b = write_image(dir.path(), "b.jpg", b"same bytes");
    let c = write_image(dir.path(), "c.jpg", b"other bytes");

    let hash_a = compute_file_hash(&a.path).unwrap();
    assert_eq!(hash_a.len(), 64);
    assert_eq!(hash_a, compute_file_hash(&b.path).unwrap());
    assert_ne!(hash_a, compute_file_hash(&c.path).unwrap());
}

/// 2回目はキャッシュから返し、分類器を呼ばない
#[tokio::test]
async fn test_classify_images_uses_cache() {
    let dir = tempdir().expect("Failed to create temp dir");
    let images = vec![
        write_image(dir.path(), "one.jpg", b"image one"),
        write_image(dir.path(), "two.jpg", b"image two"),
    ];
    let classifier = CountingClassifier::default();
    let mut cache = CacheFile::load(dir.path());

    let first = classifier::classify_images(&classifier, &images, Some(&mut cache), false).await;
    assert_eq!(first.len(), 2);
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 2);

    let second = classifier::classify_images(&classifier, &images, Some(&mut cache), false).await;
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);
    assert!(second.iter().all(|c| c.output.is_ok()));
}

/// 1枚の失敗でバッチを止めない。失敗はキャッシュしない
#[tokio::test]
async fn test_single_failure_does_not_abort_batch() {
    let dir = tempdir().expect("Failed to create temp dir");
    let images = vec![
        write_image(dir.path(), "broken.jpg", b"broken"),
        write_image(dir.path(), "fine.jpg", b"fine"),
    ];
    let classifier = CountingClassifier::default();
    let mut cache = CacheFile::default();

    let results = classifier::classify_images(&classifier, &images, Some(&mut cache), false).await;

    assert!(results[0].output.is_err());
    assert!(results[1].output.is_ok());
    assert_eq!(cache.len(), 1);
}
