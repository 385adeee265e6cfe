//! 確定アイテムの蓄積
//!
//! 品名（正規化キー）ごとに1件だけ保持し、同名の再確定は数量を加算する。
//! 画像参照の対応表もここで保持する。

use crate::error::CurationError;
use crate::types::{normalize_name, ConfirmedItem, PantrySnapshot};
use std::collections::BTreeMap;
use tracing::debug;

/// 追加・更新の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// 新規追加
    Inserted,
    /// 既存エントリに数量を加算
    Merged { quantity: u32 },
    /// 既存エントリを置き換え
    Replaced { quantity: u32 },
}

/// 確定アイテムストア
#[derive(Debug, Clone, Default)]
pub struct ConfirmedItemStore {
    /// 追加順を保持
    items: Vec<ConfirmedItem>,
    /// 正規化キー → 画像参照
    image_refs: BTreeMap<String, String>,
}

impl ConfirmedItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = normalize_name(name);
        self.items.iter().position(|i| i.key() == key)
    }

    fn validate(item: &ConfirmedItem) -> Result<(), CurationError> {
        if item.name.trim().is_empty() {
            return Err(CurationError::EmptyName);
        }
        if item.quantity == 0 {
            return Err(CurationError::InvalidQuantity);
        }
        Ok(())
    }

    /// 追加する。同名（大文字小文字・空白の違いを無視）があれば数量を加算
    pub fn add_or_merge(&mut self, item: ConfirmedItem) -> Result<MergeOutcome, CurationError> {
        Self::validate(&item)?;

        if let Some(reference) = &item.source_image_ref {
            self.image_refs
                .entry(item.key())
                .or_insert_with(|| reference.clone());
        }

        match self.position(&item.name) {
            Some(idx) => {
                let existing = &mut self.items[idx];
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                existing.confidence = existing.confidence.max(item.confidence);
                if existing.source_image_ref.is_none() {
                    existing.source_image_ref = item.source_image_ref;
                }
                debug!(name = %existing.name, quantity = existing.quantity, "confirmed item merged");
                Ok(MergeOutcome::Merged {
                    quantity: existing.quantity,
                })
            }
            None => {
                debug!(name = %item.name, quantity = item.quantity, "confirmed item inserted");
                self.items.push(item);
                Ok(MergeOutcome::Inserted)
            }
        }
    }

    /// `original_name` のエントリを編集後の値で置き換える
    ///
    /// `accumulate` が真なら既存数量に加算、偽なら置き換え。
    /// 新しい名前が別の既存エントリと衝突する場合はそちらに統合して重複を作らない。
    /// 元のエントリがなければ `add_or_merge` と同じ。
    pub fn replace(
        &mut self,
        original_name: &str,
        item: ConfirmedItem,
        accumulate: bool,
    ) -> Result<MergeOutcome, CurationError> {
        Self::validate(&item)?;

        let Some(idx) = self.position(original_name) else {
            return self.add_or_merge(item);
        };

        let previous = &self.items[idx];
        let quantity = if accumulate {
            previous.quantity.saturating_add(item.quantity)
        } else {
            item.quantity
        };

        let new_key = item.key();
        let collision = self
            .items
            .iter()
            .enumerate()
            .position(|(i, existing)| i != idx && existing.key() == new_key);

        if let Some(other) = collision {
            let removed = self.items.remove(idx);
            let other = if other > idx { other - 1 } else { other };
            let target = &mut self.items[other];
            target.quantity = target.quantity.saturating_add(quantity);
            target.confidence = target.confidence.max(item.confidence);
            if target.source_image_ref.is_none() {
                target.source_image_ref = item.source_image_ref.or(removed.source_image_ref);
            }
            debug!(from = %removed.name, into = %target.name, "renamed item folded into existing entry");
            return Ok(MergeOutcome::Merged {
                quantity: target.quantity,
            });
        }

        let source_image_ref = item
            .source_image_ref
            .or_else(|| self.items[idx].source_image_ref.clone());
        self.items[idx] = ConfirmedItem {
            quantity,
            source_image_ref,
            ..item
        };
        debug!(
            original = original_name,
            name = %self.items[idx].name,
            quantity,
            "confirmed item replaced"
        );
        Ok(MergeOutcome::Replaced { quantity })
    }

    pub fn find(&self, name: &str) -> Option<&ConfirmedItem> {
        self.position(name).map(|idx| &self.items[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// 画像参照を関連付ける（既存の関連付けは上書き）
    pub fn associate_image(&mut self, name: &str, reference: impl Into<String>) {
        let reference = reference.into();
        if let Some(idx) = self.position(name) {
            self.items[idx].source_image_ref = Some(reference.clone());
        }
        self.image_refs.insert(normalize_name(name), reference);
    }

    /// 画像参照の関連付けを外す
    pub fn remove_image(&mut self, name: &str) -> Option<String> {
        self.image_refs.remove(&normalize_name(name))
    }

    pub fn image_for(&self, name: &str) -> Option<&str> {
        self.image_refs.get(&normalize_name(name)).map(String::as_str)
    }

    /// 全件削除
    pub fn remove_all(&mut self) {
        self.items.clear();
        self.image_refs.clear();
    }

    /// 永続化用の読み取り専用コピー
    ///
    /// 画像対応表のキーは確定アイテムの表示名。
    pub fn snapshot(&self) -> PantrySnapshot {
        let image_refs = self
            .image_refs
            .iter()
            .map(|(key, reference)| {
                let name = self
                    .items
                    .iter()
                    .find(|i| &i.key() == key)
                    .map(|i| i.name.clone())
                    .unwrap_or_else(|| key.clone());
                (name, reference.clone())
            })
            .collect();

        PantrySnapshot {
            items: self.items.clone(),
            image_refs,
        }
    }

    /// 数量の合計
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |total, i| total.saturating_add(i.quantity))
    }

    pub fn items(&self) -> &[ConfirmedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
