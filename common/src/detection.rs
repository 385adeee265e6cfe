//! 検出結果の正規化
//!
//! 1回の分類器呼び出しの (ラベル, 信頼度) 一覧から候補リストを作る。
//!
//! ## 処理フロー
//! 1. 信頼度が閾値未満のラベルを除外
//! 2. 除外キーワードに当たるラベルを除外（照合より優先）
//! 3. `LabelMatcher` で表示名・カテゴリを解決、解決できなければ除外
//! 4. 表示名の完全一致で重複を統合（先に出た候補の数量を加算）

use crate::catalog::ProductCatalog;
use crate::matcher::{is_excluded, LabelMatcher};
use crate::types::{CandidateItem, RawLabel};
use std::collections::HashMap;
use tracing::debug;

/// 採用する最低信頼度
pub const ACCEPTANCE_THRESHOLD: f32 = 0.6;

/// ラベルを除外した理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    LowConfidence,
    Excluded,
    Irrelevant,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::LowConfidence => write!(f, "信頼度不足"),
            DropReason::Excluded => write!(f, "除外キーワード"),
            DropReason::Irrelevant => write!(f, "食品以外"),
        }
    }
}

/// 除外したラベル
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedLabel {
    pub label: String,
    pub confidence: f32,
    pub reason: DropReason,
}

/// 正規化結果
#[derive(Debug, Clone, Default)]
pub struct NormalizationReport {
    /// 候補リスト（名前の重複なし）
    pub candidates: Vec<CandidateItem>,
    /// 除外したラベル
    pub dropped: Vec<DroppedLabel>,
}

/// 検出結果の正規化器
#[derive(Debug, Clone, Copy)]
pub struct DetectionNormalizer<'c> {
    matcher: LabelMatcher<'c>,
}

impl<'c> DetectionNormalizer<'c> {
    pub fn new(catalog: &'c ProductCatalog) -> Self {
        Self {
            matcher: LabelMatcher::new(catalog),
        }
    }

    /// 候補リストのみを返す
    pub fn normalize(&self, labels: &[RawLabel], ocr_text: Option<&str>) -> Vec<CandidateItem> {
        self.normalize_with_report(labels, ocr_text).candidates
    }

    /// 除外理由つきで正規化する
    pub fn normalize_with_report(
        &self,
        labels: &[RawLabel],
        ocr_text: Option<&str>,
    ) -> NormalizationReport {
        let mut report = NormalizationReport::default();
        // 表示名 → candidates内の位置
        let mut positions: HashMap<String, usize> = HashMap::new();

        for raw in labels {
            // NaN もここで落とす
            if !(raw.confidence >= ACCEPTANCE_THRESHOLD) {
                report.dropped.push(dropped_label(raw, DropReason::LowConfidence));
                continue;
            }

            if is_excluded(&raw.label) {
                report.dropped.push(dropped_label(raw, DropReason::Excluded));
                continue;
            }

            let Some(matched) = self.matcher.resolve(&raw.label, ocr_text) else {
                report.dropped.push(dropped_label(raw, DropReason::Irrelevant));
                continue;
            };

            match positions.get(&matched.name) {
                Some(&idx) => report.candidates[idx].quantity += 1,
                None => {
                    positions.insert(matched.name.clone(), report.candidates.len());
                    report.candidates.push(CandidateItem::new(
                        matched.name,
                        raw.confidence.min(1.0),
                        matched.category,
                    ));
                }
            }
        }

        debug!(
            accepted = report.candidates.len(),
            dropped = report.dropped.len(),
            "detection batch normalized"
        );

        report
    }
}

fn dropped_label(raw: &RawLabel, reason: DropReason) -> DroppedLabel {
    debug!(label = %raw.label, confidence = raw.confidence, %reason, "label dropped");
    DroppedLabel {
        label: raw.label.clone(),
        confidence: raw.confidence,
        reason,
    }
}

/// 組み込みカタログで正規化する
pub fn normalize(labels: &[RawLabel], ocr_text: Option<&str>) -> Vec<CandidateItem> {
    lazy_static::lazy_static! {
        static ref BUILTIN: ProductCatalog = ProductCatalog::builtin();
    }
    DetectionNormalizer::new(&BUILTIN).normalize(labels, ocr_text)
}
