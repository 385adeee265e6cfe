//! 画像ソース
//!
//! 画像ファイルを列挙し、画像対応表で使う安定した参照（`file://` URI）を付ける。
//! 画像の中身は保持しない（ヘッダを読んで寸法を確認するだけ）。

mod exif;

use crate::error::{PantryScanError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub path: PathBuf,
    pub file_name: String,
    /// 画像対応表のキーに使う参照
    pub reference: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub dimensions: Option<(u32, u32)>,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

fn reference_for(path: &Path) -> String {
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display().to_string().replace('\\', "/"))
}

/// 単一の画像ファイルから参照を作る
pub fn image_ref(path: &Path) -> Result<ImageRef> {
    if !path.is_file() {
        return Err(PantryScanError::FileNotFound(path.display().to_string()));
    }

    let dimensions = image::image_dimensions(path)
        .map_err(|e| PantryScanError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(ImageRef {
        path: path.to_path_buf(),
        file_name,
        reference: reference_for(path),
        date: exif::extract_date(path).ok(),
        dimensions: Some(dimensions),
    })
}

/// フォルダ内の画像を列挙（ファイル名順）
///
/// 読めない画像は警告を出してスキップする。
pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<ImageRef>> {
    if !folder.is_dir() {
        return Err(PantryScanError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(ext) = path.extension() else {
            continue;
        };
        if !is_image_extension(&ext.to_string_lossy()) {
            continue;
        }

        match image_ref(path) {
            Ok(image) => images.push(image),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable image"),
        }
    }

    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    debug!(folder = %folder.display(), count = images.len(), "folder scanned");

    Ok(images)
}
