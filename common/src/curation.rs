//! 確認キュー
//!
//! 1回の撮影セッション分の候補リスト・選択状態・確認待ちキューを保持し、
//! ユーザーの編集結果を `ConfirmedItemStore` に反映する。
//!
//! 候補の状態遷移: 検出 → 選択 → {確定, 却下}
//! - 確定した候補はリストに残し `approved` を立てる（以後は選択不可）
//! - 却下した候補はリストから削除する
//!
//! 操作はすべて結果を値で返し、エラー時は状態を変更しない。

use crate::error::CurationError;
use crate::store::{ConfirmedItemStore, MergeOutcome};
use crate::types::{normalize_name, CandidateItem, ConfirmedItem};
use std::collections::VecDeque;
use tracing::{debug, info};

/// 確認待ちの1件
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    /// 候補リスト上の名前
    pub source: String,
    /// ストア照合に使う編集前の名前
    pub original_name: String,
    /// 編集フォームの初期値
    pub draft: CandidateItem,
    /// 「もう1つ追加」で積まれた継続エントリか
    pub continuation: bool,
}

/// ユーザーが確定した編集内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedItem {
    pub name: String,
    pub quantity: u32,
}

impl EditedItem {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// キューの次の状態
#[derive(Debug, Clone, PartialEq)]
pub enum QueueStep {
    /// 同じアイテムを続けて編集
    Continue(PendingEdit),
    /// 次のアイテムへ
    Next(PendingEdit),
    /// 確認待ちがなくなった
    BatchComplete,
}

/// `resolve_current_edit` の結果
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub merge: MergeOutcome,
    pub step: QueueStep,
}

/// キュー状態の読み取り専用コピー
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueSnapshot {
    pub candidates: Vec<CandidateItem>,
    pub selection: Vec<usize>,
    pub pending: Vec<PendingEdit>,
    pub image_ref: Option<String>,
}

/// 確認キュー
#[derive(Debug, Clone, Default)]
pub struct CurationQueue {
    candidates: Vec<CandidateItem>,
    /// 選択した順に保持
    selection: Vec<usize>,
    pending: VecDeque<PendingEdit>,
    image_ref: Option<String>,
}

impl CurationQueue {
    /// 候補リストからキューを作る（同名候補は数量を合算して1件にする）
    pub fn new(candidates: Vec<CandidateItem>, image_ref: Option<String>) -> Self {
        let mut unique: Vec<CandidateItem> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match unique.iter_mut().find(|c| c.name == candidate.name) {
                Some(existing) => existing.quantity += candidate.quantity,
                None => unique.push(candidate),
            }
        }

        Self {
            candidates: unique,
            selection: Vec::new(),
            pending: VecDeque::new(),
            image_ref,
        }
    }

    /// 新しい画像の候補で置き換える（選択・確認待ちは破棄）
    pub fn replace_candidates(&mut self, candidates: Vec<CandidateItem>, image_ref: Option<String>) {
        *self = Self::new(candidates, image_ref);
    }

    /// 未確定の状態をすべて破棄する
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn candidates(&self) -> &[CandidateItem] {
        &self.candidates
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }

    /// 現在編集中のアイテム
    pub fn current(&self) -> Option<&PendingEdit> {
        self.pending.front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// 未確定の候補数
    pub fn unapproved_count(&self) -> usize {
        self.candidates.iter().filter(|c| !c.approved).count()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            candidates: self.candidates.clone(),
            selection: self.selection.clone(),
            pending: self.pending.iter().cloned().collect(),
            image_ref: self.image_ref.clone(),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), CurationError> {
        if index >= self.candidates.len() {
            return Err(CurationError::IndexOutOfRange {
                index,
                len: self.candidates.len(),
            });
        }
        Ok(())
    }

    /// 選択を切り替える。確定済みの候補は何もしない
    ///
    /// 戻り値は切り替え後に選択されているか。
    pub fn toggle_select(&mut self, index: usize) -> Result<bool, CurationError> {
        self.check_index(index)?;

        if self.candidates[index].approved {
            return Ok(false);
        }

        match self.selection.iter().position(|&i| i == index) {
            Some(pos) => {
                self.selection.remove(pos);
                Ok(false)
            }
            None => {
                self.selection.push(index);
                Ok(true)
            }
        }
    }

    /// 現在の選択で一括確認を始める
    pub fn confirm_selection(&mut self) -> Result<PendingEdit, CurationError> {
        let selected = self.selection.clone();
        self.begin_bulk_confirm(&selected)
    }

    /// 指定した候補を選択順に確認待ちへ積み、先頭のアイテムを返す
    ///
    /// 確定済み・確認待ち済みの候補は積まない。積むものが1件もなければ `EmptySelection`。
    pub fn begin_bulk_confirm(&mut self, selected: &[usize]) -> Result<PendingEdit, CurationError> {
        for &index in selected {
            self.check_index(index)?;
        }

        let mut queued: Vec<PendingEdit> = Vec::new();
        for &index in selected {
            let candidate = &self.candidates[index];
            let already_pending = self.pending.iter().any(|p| p.source == candidate.name)
                || queued.iter().any(|p| p.source == candidate.name);
            if candidate.approved || already_pending {
                continue;
            }
            queued.push(PendingEdit {
                source: candidate.name.clone(),
                original_name: candidate.name.clone(),
                draft: candidate.clone(),
                continuation: false,
            });
        }

        if queued.is_empty() {
            return Err(CurationError::EmptySelection);
        }

        info!(count = queued.len(), "bulk confirmation started");
        self.pending.extend(queued);
        self.selection.clear();

        self.pending
            .front()
            .cloned()
            .ok_or(CurationError::NothingPending)
    }

    /// 先頭のアイテムを編集内容で確定する
    ///
    /// - 編集前の名前でストアを検索し、あれば置き換え、なければ追加
    /// - `add_another` または継続エントリの確定では数量を既存に加算する
    /// - 置き換えるのは同じ画像から確定したエントリだけ。別の画像（別バッチ）で
    ///   確定済みの同名アイテムには数量を加算する
    /// - 名前が変わった場合は画像対応表のキーも付け替える
    /// - `add_another` なら同じアイテムの継続エントリを先頭に積む
    pub fn resolve_current_edit(
        &mut self,
        store: &mut ConfirmedItemStore,
        edited: EditedItem,
        add_another: bool,
    ) -> Result<Resolution, CurationError> {
        let head = self
            .pending
            .front()
            .cloned()
            .ok_or(CurationError::NothingPending)?;

        let name = edited.name.trim();
        if name.is_empty() {
            return Err(CurationError::EmptyName);
        }
        if edited.quantity == 0 {
            return Err(CurationError::InvalidQuantity);
        }

        let same_batch = store.find(&head.original_name).is_some_and(|existing| {
            existing.source_image_ref.is_some() && existing.source_image_ref == self.image_ref
        });
        let accumulate = add_another || head.continuation || !same_batch;
        let confirmed = ConfirmedItem {
            name: name.to_string(),
            confidence: head.draft.confidence,
            quantity: edited.quantity,
            category: head.draft.category,
            source_image_ref: self.image_ref.clone(),
        };

        let merge = if store.contains(&head.original_name) {
            store.replace(&head.original_name, confirmed, accumulate)?
        } else {
            store.add_or_merge(confirmed)?
        };

        // 画像対応表: 旧名のキーを外し新しい名前で登録
        let renamed = normalize_name(name) != normalize_name(&head.original_name);
        let carried = if renamed {
            store.remove_image(&head.original_name)
        } else {
            None
        };
        if let Some(reference) = self.image_ref.clone().or(carried) {
            store.associate_image(name, reference);
        }

        if let Some(idx) = self.candidates.iter().position(|c| c.name == head.source) {
            self.candidates[idx].approved = true;
            self.selection.retain(|&i| i != idx);
        }

        if let Some(pos) = self
            .pending
            .iter()
            .position(|p| p.original_name == head.original_name)
        {
            self.pending.remove(pos);
        }

        debug!(
            original = %head.original_name,
            name,
            quantity = edited.quantity,
            add_another,
            ?merge,
            "pending item resolved"
        );

        if add_another {
            let continuation = PendingEdit {
                source: head.source.clone(),
                original_name: name.to_string(),
                draft: CandidateItem {
                    name: name.to_string(),
                    quantity: 1,
                    approved: false,
                    ..head.draft
                },
                continuation: true,
            };
            self.pending.push_front(continuation.clone());
            return Ok(Resolution {
                merge,
                step: QueueStep::Continue(continuation),
            });
        }

        Ok(Resolution {
            merge,
            step: self.next_step(),
        })
    }

    /// 先頭のアイテムを確定せずに外す
    pub fn skip_current(&mut self) -> Result<QueueStep, CurationError> {
        let skipped = self
            .pending
            .pop_front()
            .ok_or(CurationError::NothingPending)?;
        debug!(name = %skipped.original_name, "pending item skipped");
        Ok(self.next_step())
    }

    /// 候補を却下してリストから削除する
    ///
    /// 却下した候補が編集中だった場合はキューを進め、その結果を返す。
    /// 編集中でなければ `None`。
    pub fn reject_candidate(&mut self, name: &str) -> Result<Option<QueueStep>, CurationError> {
        let idx = self
            .candidates
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| CurationError::CandidateNotFound(name.to_string()))?;

        if self.candidates[idx].approved {
            return Err(CurationError::CandidateApproved(name.to_string()));
        }

        let was_current = self.pending.front().is_some_and(|p| p.source == name);

        self.candidates.remove(idx);
        self.selection.retain(|&i| i != idx);
        for i in self.selection.iter_mut() {
            if *i > idx {
                *i -= 1;
            }
        }
        self.pending.retain(|p| p.source != name);

        info!(name, "candidate rejected");

        if was_current {
            Ok(Some(self.next_step()))
        } else {
            Ok(None)
        }
    }

    fn next_step(&self) -> QueueStep {
        match self.pending.front() {
            Some(next) if next.continuation => QueueStep::Continue(next.clone()),
            Some(next) => QueueStep::Next(next.clone()),
            None => QueueStep::BatchComplete,
        }
    }
}
