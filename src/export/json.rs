//! JSON保存

use super::PantryBackend;
use crate::error::{PantryScanError, Result};
use chrono::Local;
use pantry_scan_common::{ConfirmedItem, PantrySnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 保存するパントリーリスト
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryListing {
    pub created_at: String,
    pub total_quantity: u32,
    pub items: Vec<ConfirmedItem>,
    #[serde(default)]
    pub image_refs: BTreeMap<String, String>,
}

impl PantryListing {
    pub fn from_snapshot(snapshot: &PantrySnapshot) -> Self {
        Self {
            created_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            total_quantity: snapshot.total_quantity(),
            items: snapshot.items.clone(),
            image_refs: snapshot.image_refs.clone(),
        }
    }

    pub fn snapshot(&self) -> PantrySnapshot {
        PantrySnapshot {
            items: self.items.clone(),
            image_refs: self.image_refs.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonPantryFile {
    path: PathBuf,
}

impl JsonPantryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PantryBackend for JsonPantryFile {
    fn persist(&self, snapshot: &PantrySnapshot) -> Result<PathBuf> {
        let listing = PantryListing::from_snapshot(snapshot);
        let json = serde_json::to_string_pretty(&listing)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| PantryScanError::Persistence(format!("{}: {}", parent.display(), e)))?;
        }
        std::fs::write(&self.path, json)
            .map_err(|e| PantryScanError::Persistence(format!("{}: {}", self.path.display(), e)))?;

        tracing::info!(path = %self.path.display(), items = listing.items.len(), "pantry listing saved");
        Ok(self.path.clone())
    }
}

/// 保存済みのリストを読み込む
pub fn load_listing(path: &Path) -> Result<PantryListing> {
    if !path.exists() {
        return Err(PantryScanError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
