//! キャプチャセッション
//!
//! 1つの画像バッチの候補（`CurationQueue`）と、バッチをまたいで蓄積する
//! 確定アイテム（`ConfirmedItemStore`）をまとめて持つ。
//!
//! ## 処理フロー
//! 1. `detect` / `ingest` で分類結果を正規化し、候補リストを差し替える
//! 2. 選択 → 一括確認 → 1件ずつ `resolve_current_edit`
//! 3. `handoff` で確定アイテムを永続化へ渡す

use crate::classifier::{Classifier, ClassifierOutput};
use crate::scanner::ImageRef;
use pantry_scan_common::detection::DroppedLabel;
use pantry_scan_common::matcher::infer_category;
use pantry_scan_common::{
    Category, ConfirmedItem, ConfirmedItemStore, CurationError, CurationQueue, DetectionNormalizer,
    EditedItem, MergeOutcome, PantrySnapshot, PendingEdit, ProductCatalog, QueueStep, Resolution,
};
use tracing::{info, warn};

/// 検出の結果
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    /// 候補あり（件数）
    Candidates(usize),
    /// 使える候補なし。手入力を促す
    NoCandidates,
    /// 分類器の失敗。セッションの状態は変わらない
    ClassifierFailed(String),
}

#[derive(Debug)]
pub struct CaptureSession {
    catalog: ProductCatalog,
    queue: CurationQueue,
    store: ConfirmedItemStore,
    dropped: Vec<DroppedLabel>,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new(ProductCatalog::builtin())
    }
}

impl CaptureSession {
    pub fn new(catalog: ProductCatalog) -> Self {
        Self {
            catalog,
            queue: CurationQueue::default(),
            store: ConfirmedItemStore::new(),
            dropped: Vec::new(),
        }
    }

    /// 画像を分類して候補リストを作る
    pub async fn detect<C: Classifier>(
        &mut self,
        classifier: &C,
        image: &ImageRef,
    ) -> DetectionOutcome {
        match classifier.classify(image).await {
            Ok(output) => self.ingest(&image.reference, &output),
            Err(e) => {
                warn!(file = %image.file_name, error = %e, "classifier failed, session unchanged");
                DetectionOutcome::ClassifierFailed(e.to_string())
            }
        }
    }

    /// 分類結果を取り込み、前のバッチの未確定状態を置き換える
    pub fn ingest(&mut self, image_reference: &str, output: &ClassifierOutput) -> DetectionOutcome {
        let report = DetectionNormalizer::new(&self.catalog)
            .normalize_with_report(&output.labels, output.text.as_deref());

        if self.queue.pending_len() > 0 {
            info!(
                pending = self.queue.pending_len(),
                "unfinished batch superseded by new image"
            );
        }

        let count = report.candidates.len();
        self.queue
            .replace_candidates(report.candidates, Some(image_reference.to_string()));
        self.dropped = report.dropped;

        if count == 0 {
            DetectionOutcome::NoCandidates
        } else {
            DetectionOutcome::Candidates(count)
        }
    }

    /// 手入力でアイテムを追加する（同名は数量を加算）
    pub fn add_manual_item(&mut self, name: &str, quantity: u32) -> Result<MergeOutcome, CurationError> {
        let name = name.trim();
        let category = self
            .catalog
            .find_by_name(name)
            .map(|p| p.category)
            .or_else(|| infer_category(name))
            .unwrap_or(Category::Other);

        let outcome = self.store.add_or_merge(ConfirmedItem {
            name: name.to_string(),
            confidence: 1.0,
            quantity,
            category,
            source_image_ref: self.queue.image_ref().map(str::to_string),
        })?;
        info!(name, quantity, "manual item added");
        Ok(outcome)
    }

    pub fn toggle_select(&mut self, index: usize) -> Result<bool, CurationError> {
        self.queue.toggle_select(index)
    }

    pub fn confirm_selection(&mut self) -> Result<PendingEdit, CurationError> {
        self.queue.confirm_selection()
    }

    pub fn begin_bulk_confirm(&mut self, selected: &[usize]) -> Result<PendingEdit, CurationError> {
        self.queue.begin_bulk_confirm(selected)
    }

    pub fn resolve_current_edit(
        &mut self,
        edited: EditedItem,
        add_another: bool,
    ) -> Result<Resolution, CurationError> {
        self.queue
            .resolve_current_edit(&mut self.store, edited, add_another)
    }

    pub fn skip_current(&mut self) -> Result<QueueStep, CurationError> {
        self.queue.skip_current()
    }

    pub fn reject_candidate(&mut self, name: &str) -> Result<Option<QueueStep>, CurationError> {
        self.queue.reject_candidate(name)
    }

    /// 未確定の候補・選択・確認待ちを破棄する。確定アイテムは残る
    pub fn abandon_batch(&mut self) {
        if self.queue.pending_len() > 0 || self.queue.unapproved_count() > 0 {
            info!(
                pending = self.queue.pending_len(),
                unapproved = self.queue.unapproved_count(),
                "batch abandoned"
            );
        }
        self.queue.clear();
        self.dropped.clear();
    }

    /// 確定アイテムのスナップショットを返し、ストアを空にする
    pub fn handoff(&mut self) -> PantrySnapshot {
        let snapshot = self.store.snapshot();
        self.store.remove_all();
        info!(
            items = snapshot.items.len(),
            total = snapshot.total_quantity(),
            "confirmed items handed off"
        );
        snapshot
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn queue(&self) -> &CurationQueue {
        &self.queue
    }

    pub fn store(&self) -> &ConfirmedItemStore {
        &self.store
    }

    /// 直近の取り込みで除外したラベル
    pub fn dropped_labels(&self) -> &[DroppedLabel] {
        &self.dropped
    }
}
