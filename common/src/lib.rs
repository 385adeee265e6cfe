//! Pantry Scan Common Library
//!
//! 検出アイテム確認パイプラインの純粋ロジック（I/Oなし）
//!
//! 分類器の生ラベル → `detection`（正規化）→ 候補リスト →
//! `curation`（ユーザー操作）→ `store`（確定アイテム）→ 永続化

pub mod types;
pub mod catalog;
pub mod matcher;
pub mod detection;
pub mod store;
pub mod curation;
pub mod error;
pub mod export;

pub use types::{normalize_name, CandidateItem, Category, ConfirmedItem, PantrySnapshot, RawLabel};
pub use catalog::{BrandKeyword, CatalogProduct, ProductCatalog};
pub use matcher::{LabelMatch, LabelMatcher, MatchKind};
pub use detection::{normalize, DetectionNormalizer, NormalizationReport, ACCEPTANCE_THRESHOLD};
pub use store::{ConfirmedItemStore, MergeOutcome};
pub use curation::{CurationQueue, EditedItem, PendingEdit, QueueSnapshot, QueueStep, Resolution};
pub use error::{CurationError, Error, Result};
