//! 検出・確定アイテムの型定義
//!
//! CLIと他のフロントエンドで共有される型:
//! - RawLabel: 分類器の生出力（ラベル + 信頼度）
//! - CandidateItem: 1回の検出で得られた未確定アイテム
//! - ConfirmedItem: ユーザーが承認したアイテム（画像をまたいで蓄積）

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 分類器が返す1件のラベル
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLabel {
    #[serde(alias = "name", alias = "description")]
    pub label: String,
    #[serde(default, alias = "score")]
    pub confidence: f32,
}

impl RawLabel {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// 食品カテゴリ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Dairy,
    Meat,
    Fruit,
    Vegetable,
    Grain,
    Beverage,
    CannedGoods,
    #[default]
    Other,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Dairy => write!(f, "Dairy"),
            Category::Meat => write!(f, "Meat"),
            Category::Fruit => write!(f, "Fruit"),
            Category::Vegetable => write!(f, "Vegetable"),
            Category::Grain => write!(f, "Grain"),
            Category::Beverage => write!(f, "Beverage"),
            Category::CannedGoods => write!(f, "Canned Goods"),
            Category::Other => write!(f, "Other"),
        }
    }
}

/// 検出候補（未確定）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateItem {
    pub name: String,
    pub confidence: f32,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub approved: bool,
}

impl CandidateItem {
    pub fn new(name: impl Into<String>, confidence: f32, category: Category) -> Self {
        Self {
            name: name.into(),
            confidence,
            quantity: 1,
            category,
            approved: false,
        }
    }
}

fn default_quantity() -> u32 {
    1
}

/// 確定アイテム
///
/// キーは正規化した品名（[`normalize_name`]）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedItem {
    pub name: String,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image_ref: Option<String>,
}

impl ConfirmedItem {
    /// 正規化キー
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }
}

/// 永続化に渡す読み取り専用コピー
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantrySnapshot {
    pub items: Vec<ConfirmedItem>,
    /// 品名 → 画像参照
    #[serde(default)]
    pub image_refs: BTreeMap<String, String>,
}

impl PantrySnapshot {
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |total, i| total.saturating_add(i.quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 品名を比較用キーに正規化する
///
/// 前後の空白除去、連続空白の単一化、小文字化。
pub fn normalize_name(name: &str) -> String {
    lazy_static::lazy_static! {
        static ref SPACES: regex::Regex = regex::Regex::new(r"\s+").unwrap();
    }
    SPACES.replace_all(name.trim(), " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Tomato"), "tomato");
        assert_eq!(normalize_name("  Green   Apple "), "green apple");
        assert_eq!(normalize_name("\tMILK\n"), "milk");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_candidate_defaults() {
        let item = CandidateItem::new("Tomato", 0.9, Category::Vegetable);
        assert_eq!(item.quantity, 1);
        assert!(!item.approved);
    }

    #[test]
    fn test_raw_label_deserialize_aliases() {
        let label: RawLabel = serde_json::from_str(r#"{"name": "Apple", "score": 0.8}"#).unwrap();
        assert_eq!(label.label, "Apple");
        assert!((label.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_total_quantity() {
        let snapshot = PantrySnapshot {
            items: vec![
                ConfirmedItem { name: "Milk".into(), quantity: 2, ..Default::default() },
                ConfirmedItem { name: "Eggs".into(), quantity: 12, ..Default::default() },
            ],
            ..Default::default()
        };
        assert_eq!(snapshot.total_quantity(), 14);
    }

    #[test]
    fn test_category_serde_camel_case() {
        let json = serde_json::to_string(&Category::CannedGoods).unwrap();
        assert_eq!(json, "\"cannedGoods\"");
    }
}
