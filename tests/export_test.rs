//! JSON/Excel出力の統合テスト

use pantry_scan::cli::ExportFormat;
use pantry_scan::export::{self, load_listing, ExcelPantryFile, JsonPantryFile, PantryBackend};
use pantry_scan::error::PantryScanError;
use pantry_scan_common::{Category, ConfirmedItem, PantrySnapshot};
use std::collections::BTreeMap;
use tempfile::tempdir;

fn create_snapshot() -> PantrySnapshot {
    let items = vec![
        ConfirmedItem {
            name: "Tomato".into(),
            confidence: 0.95,
            quantity: 5,
            category: Category::Vegetable,
            source_image_ref: Some("file:///photos/shelf.jpg".into()),
        },
        ConfirmedItem {
            name: "Milk".into(),
            confidence: 1.0,
            quantity: 2,
            category: Category::Dairy,
            source_image_ref: None,
        },
    ];
    let mut image_refs = BTreeMap::new();
    image_refs.insert("Tomato".to_string(), "file:///photos/shelf.jpg".to_string());
    PantrySnapshot { items, image_refs }
}

#[test]
fn test_json_persist_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("pantry.json");

    let written = JsonPantryFile::new(&path)
        .persist(&create_snapshot())
        .expect("JSON保存失敗");
    assert_eq!(written, path);

    let listing = load_listing(&path).expect("読み込み失敗");
    assert_eq!(listing.total_quantity, 7);
    assert_eq!(listing.items.len(), 2);
    assert!(!listing.created_at.is_empty());
    assert_eq!(listing.snapshot(), create_snapshot());
}

#[test]
fn test_excel_persist() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("pantry.xlsx");

    ExcelPantryFile::new(&path, "テスト")
        .persist(&create_snapshot())
        .expect("Excel生成失敗");

    let bytes = std::fs::read(&path).expect("read xlsx");
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_export_both_into_directory() {
    let dir = tempdir().expect("Failed to create temp dir");

    let written = export::export_snapshot(&create_snapshot(), &ExportFormat::Both, dir.path(), "pantry")
        .expect("export");

    assert_eq!(written, vec![dir.path().join("pantry.json"), dir.path().join("pantry.xlsx")]);
    assert!(written.iter().all(|p| p.exists()));
}

#[test]
fn test_load_missing_listing() {
    assert!(matches!(
        load_listing(std::path::Path::new("/nonexistent/pantry.json")),
        Err(PantryScanError::FileNotFound(_))
    ));
}
