pub mod excel;
pub mod json;

pub use excel::ExcelPantryFile;
pub use json::{load_listing, JsonPantryFile, PantryListing};

use crate::cli::ExportFormat;
use crate::error::Result;
use pantry_scan_common::PantrySnapshot;
use std::path::{Path, PathBuf};

/// 確定アイテムの保存先
pub trait PantryBackend {
    /// スナップショットを書き出し、書き出したパスを返す
    fn persist(&self, snapshot: &PantrySnapshot) -> Result<PathBuf>;
}

/// 出力先のパスを決める。拡張子が形式と違えば付け替える
fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    match output.extension() {
        _ if output.is_dir() => output.join(format!("{}.{}", title, extension)),
        None => output.join(format!("{}.{}", title, extension)),
        Some(ext) if ext.eq_ignore_ascii_case(extension) => output.to_path_buf(),
        Some(_) => output.with_extension(extension),
    }
}

fn output_paths_for_both(output: &Path, title: &str) -> (PathBuf, PathBuf) {
    if output.is_dir() || output.extension().is_none() {
        (
            output.join(format!("{}.json", title)),
            output.join(format!("{}.xlsx", title)),
        )
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(title);
        (
            parent.join(format!("{}.json", stem)),
            parent.join(format!("{}.xlsx", stem)),
        )
    }
}

/// 指定形式で書き出す
pub fn export_snapshot(
    snapshot: &PantrySnapshot,
    format: &ExportFormat,
    output: &Path,
    title: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    match format {
        ExportFormat::Json => {
            let path = output_path_for_format(output, title, "json");
            written.push(JsonPantryFile::new(path).persist(snapshot)?);
        }
        ExportFormat::Excel => {
            let path = output_path_for_format(output, title, "xlsx");
            println!("- Excelを生成中...");
            written.push(ExcelPantryFile::new(path, title).persist(snapshot)?);
        }
        ExportFormat::Both => {
            let (json_path, excel_path) = output_paths_for_both(output, title);
            written.push(JsonPantryFile::new(json_path).persist(snapshot)?);
            println!("- Excelを生成中...");
            written.push(ExcelPantryFile::new(excel_path, title).persist(snapshot)?);
        }
    }

    for path in &written {
        println!("✔ 出力: {}", path.display());
    }

    Ok(written)
}

/// 保存済みリストを指定形式で書き出し直す
pub fn export_listing(
    listing: &PantryListing,
    format: &ExportFormat,
    output: &Path,
    title: &str,
) -> Result<Vec<PathBuf>> {
    export_snapshot(&listing.snapshot(), format, output, title)
}
