//! 分類器（外部コラボレータ）
//!
//! 画像 → (ラベル, 信頼度) の一覧 + OCRテキスト。
//! パイプラインは分類器の中身・タイムアウト方針に依存しない。

pub mod cache;
mod command;
pub mod parser;
mod sidecar;

pub use cache::{compute_file_hash, CacheFile};
pub use command::CommandClassifier;
pub use sidecar::SidecarClassifier;

use crate::error::Result;
use crate::scanner::ImageRef;
use indicatif::{ProgressBar, ProgressStyle};
use pantry_scan_common::RawLabel;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, warn};

/// 1画像分の分類結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierOutput {
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    /// OCRテキスト
    #[serde(default, alias = "ocr", alias = "ocrText")]
    pub text: Option<String>,
}

pub trait Classifier {
    fn classify(&self, image: &ImageRef) -> impl Future<Output = Result<ClassifierOutput>> + Send;
}

/// 画像ごとの分類結果
#[derive(Debug)]
pub struct Classified {
    pub image: ImageRef,
    pub output: Result<ClassifierOutput>,
}

/// 画像を順に分類する
///
/// - 1枚の失敗でバッチを止めない（結果に `Err` を残す）
/// - キャッシュがあればヒットした画像は分類器を呼ばない
pub async fn classify_images<C: Classifier>(
    classifier: &C,
    images: &[ImageRef],
    mut cache: Option<&mut CacheFile>,
    show_progress: bool,
) -> Vec<Classified> {
    let progress = if show_progress {
        let bar = ProgressBar::new(images.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut results = Vec::with_capacity(images.len());

    for image in images {
        progress.set_message(image.file_name.clone());

        let hash = match cache.as_deref() {
            Some(_) => compute_file_hash(&image.path)
                .map_err(|e| warn!(file = %image.file_name, error = %e, "hash failed, bypassing cache"))
                .ok(),
            None => None,
        };

        let cached = match (cache.as_deref(), hash.as_deref()) {
            (Some(c), Some(h)) => c.get(h).cloned(),
            _ => None,
        };

        let output = match cached {
            Some(output) => {
                debug!(file = %image.file_name, "classifier cache hit");
                Ok(output)
            }
            None => {
                let output = classifier.classify(image).await;
                if let (Some(c), Some(h), Ok(o)) = (cache.as_deref_mut(), hash, &output) {
                    let size = std::fs::metadata(&image.path).map(|m| m.len()).unwrap_or(0);
                    c.insert(h, image.file_name.clone(), size, o.clone());
                }
                output
            }
        };

        if let Err(e) = &output {
            warn!(file = %image.file_name, error = %e, "classification failed");
        }

        results.push(Classified {
            image: image.clone(),
            output,
        });
        progress.inc(1);
    }

    progress.finish_and_clear();
    results
}
