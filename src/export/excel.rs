//! Excel保存（CLI版）

use super::PantryBackend;
use crate::error::{PantryScanError, Result};
use pantry_scan_common::export::excel_core::generate_pantry_excel_buffer;
use pantry_scan_common::PantrySnapshot;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ExcelPantryFile {
    path: PathBuf,
    title: String,
}

impl ExcelPantryFile {
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
        }
    }
}

impl PantryBackend for ExcelPantryFile {
    fn persist(&self, snapshot: &PantrySnapshot) -> Result<PathBuf> {
        let buffer = generate_pantry_excel_buffer(snapshot, &self.title)
            .map_err(PantryScanError::ExcelGeneration)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| PantryScanError::Persistence(format!("{}: {}", parent.display(), e)))?;
        }
        std::fs::write(&self.path, buffer)
            .map_err(|e| PantryScanError::Persistence(format!("{}: {}", self.path.display(), e)))?;

        Ok(self.path.clone())
    }
}
