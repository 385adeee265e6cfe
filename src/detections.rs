//! 候補リストファイル（classify の出力 / curate の入力）

use crate::classifier::{Classified, ClassifierOutput};
use crate::error::{PantryScanError, Result};
use crate::scanner::ImageRef;
use pantry_scan_common::{CandidateItem, DetectionNormalizer, ProductCatalog};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 1画像分の検出記録
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRecord {
    pub image: ImageRef,
    /// 分類器の生出力（失敗時は None）
    #[serde(default)]
    pub output: Option<ClassifierOutput>,
    /// 正規化後の候補（確認用）
    #[serde(default)]
    pub candidates: Vec<CandidateItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionRecord {
    pub fn from_classified(classified: Classified, catalog: &ProductCatalog) -> Self {
        match classified.output {
            Ok(output) => {
                let candidates = DetectionNormalizer::new(catalog)
                    .normalize(&output.labels, output.text.as_deref());
                Self {
                    image: classified.image,
                    output: Some(output),
                    candidates,
                    error: None,
                }
            }
            Err(e) => Self {
                image: classified.image,
                output: None,
                candidates: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

pub fn save_detections(records: &[DetectionRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)
        .map_err(|e| PantryScanError::Persistence(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

pub fn load_detections(path: &Path) -> Result<Vec<DetectionRecord>> {
    if !path.exists() {
        return Err(PantryScanError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
