//! pantry-scan
//!
//! 食品写真の分類結果を候補リストに正規化し、ユーザーの確認を経て
//! パントリーリスト（確定アイテム）を作る。
//! 純粋ロジックは `pantry_scan_common`、I/O と外部コラボレータはこのクレート。

pub mod classifier;
pub mod cli;
pub mod config;
pub mod curate;
pub mod detections;
pub mod error;
pub mod export;
pub mod scanner;
pub mod session;
