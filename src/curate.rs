//! 対話式の確認モジュール
//!
//! 画像ごとに候補を選択 → 1件ずつ品名・数量を確認して確定する。
//! 候補がない画像（または分類失敗）は手入力にフォールバックする。

use crate::detections::DetectionRecord;
use crate::error::{PantryScanError, Result};
use crate::session::{CaptureSession, DetectionOutcome};
use dialoguer::{Input, MultiSelect, Select};
use pantry_scan_common::{CurationError, EditedItem, MergeOutcome, PendingEdit, QueueStep};

/// 確認中のアイテムに対する操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    /// 保存して次へ
    Save,
    /// 保存して同じアイテムをもう1つ追加
    SaveAndAddAnother,
    /// 確定せずに次へ
    Skip,
    /// 候補を却下
    Reject,
}

impl EditAction {
    pub fn label(&self, continuation: bool) -> &'static str {
        match self {
            EditAction::Save => "保存",
            EditAction::SaveAndAddAnother => "保存してもう1つ追加",
            EditAction::Skip if continuation => "追加を終了",
            EditAction::Skip => "スキップ",
            EditAction::Reject => "却下",
        }
    }
}

/// 表示する操作の一覧
///
/// 継続エントリの候補は確定済みなので却下できない。
pub fn edit_actions(continuation: bool) -> Vec<EditAction> {
    let mut actions = vec![
        EditAction::Save,
        EditAction::SaveAndAddAnother,
        EditAction::Skip,
    ];
    if !continuation {
        actions.push(EditAction::Reject);
    }
    actions
}

fn cli_error(e: dialoguer::Error) -> PantryScanError {
    PantryScanError::CliExecution(e.to_string())
}

fn describe_merge(merge: &MergeOutcome) -> String {
    match merge {
        MergeOutcome::Inserted => "追加".to_string(),
        MergeOutcome::Merged { quantity } => format!("合算 (計{})", quantity),
        MergeOutcome::Replaced { quantity } => format!("更新 (計{})", quantity),
    }
}

/// 検出記録を順に確認する
pub fn run_interactive_curation(records: &[DetectionRecord], session: &mut CaptureSession) -> Result<()> {
    if records.is_empty() {
        println!("⚠ 確認する画像がありません");
        return Ok(());
    }

    for (count, record) in records.iter().enumerate() {
        println!("\n[{}/{}] {}", count + 1, records.len(), record.image.file_name);

        let outcome = match &record.output {
            Some(output) => session.ingest(&record.image.reference, output),
            None => DetectionOutcome::ClassifierFailed(
                record.error.clone().unwrap_or_else(|| "不明なエラー".to_string()),
            ),
        };

        match outcome {
            DetectionOutcome::Candidates(n) => {
                println!("  候補: {}件", n);
                curate_batch(session)?;
            }
            DetectionOutcome::NoCandidates => {
                println!("  食品が検出されませんでした");
                manual_entry(session)?;
            }
            DetectionOutcome::ClassifierFailed(message) => {
                println!("  ⚠ 分類に失敗しました: {}", message);
                manual_entry(session)?;
            }
        }

        session.abandon_batch();
    }

    println!(
        "\n✔ 確定: {}品目 / 合計{}個",
        session.store().len(),
        session.store().total_quantity()
    );
    Ok(())
}

/// 現在の候補リストを確認する
fn curate_batch(session: &mut CaptureSession) -> Result<()> {
    loop {
        // 未確定の候補だけを表示
        let open: Vec<(usize, String)> = session
            .queue()
            .candidates()
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.approved)
            .map(|(i, c)| {
                (
                    i,
                    format!("{} ×{} ({}, {:.0}%)", c.name, c.quantity, c.category, c.confidence * 100.0),
                )
            })
            .collect();

        if open.is_empty() {
            return Ok(());
        }

        let labels: Vec<&str> = open.iter().map(|(_, l)| l.as_str()).collect();
        let chosen = MultiSelect::new()
            .with_prompt("確認する候補を選択（Spaceで選択、Enterで確定。未選択で次の画像へ）")
            .items(&labels)
            .interact()
            .map_err(cli_error)?;

        if chosen.is_empty() {
            return Ok(());
        }

        let indices: Vec<usize> = chosen.iter().map(|&pos| open[pos].0).collect();
        let head = match session.begin_bulk_confirm(&indices) {
            Ok(head) => head,
            Err(e) => {
                println!("  ⚠ {}", e);
                continue;
            }
        };

        edit_pending(session, head)?;
    }
}

/// 確認待ちを先頭から処理する
fn edit_pending(session: &mut CaptureSession, mut head: PendingEdit) -> Result<()> {
    loop {
        let marker = if head.continuation { "（追加分）" } else { "" };
        println!("  ▶ {}{}", head.draft.name, marker);

        let name: String = Input::new()
            .with_prompt("  品名")
            .default(head.draft.name.clone())
            .interact_text()
            .map_err(cli_error)?;

        let quantity: u32 = Input::new()
            .with_prompt("  数量")
            .default(head.draft.quantity)
            .interact_text()
            .map_err(cli_error)?;

        let actions = edit_actions(head.continuation);
        let items: Vec<&str> = actions.iter().map(|a| a.label(head.continuation)).collect();
        let choice = Select::new()
            .with_prompt("  操作")
            .items(&items)
            .default(0)
            .interact()
            .map_err(cli_error)?;

        let step = match actions[choice] {
            EditAction::Save | EditAction::SaveAndAddAnother => {
                let add_another = actions[choice] == EditAction::SaveAndAddAnother;
                match session.resolve_current_edit(EditedItem::new(name, quantity), add_another) {
                    Ok(resolution) => {
                        println!("  ✔ {}", describe_merge(&resolution.merge));
                        resolution.step
                    }
                    Err(e) => {
                        // 入力エラーはその場で再入力
                        println!("  ⚠ {}", e);
                        continue;
                    }
                }
            }
            EditAction::Skip => session.skip_current()?,
            EditAction::Reject => match session.reject_candidate(&head.source) {
                Ok(Some(step)) => step,
                Ok(None) => session.skip_current()?,
                Err(e) => {
                    println!("  ⚠ {}", e);
                    continue;
                }
            },
        };

        match step {
            QueueStep::Continue(next) | QueueStep::Next(next) => head = next,
            QueueStep::BatchComplete => return Ok(()),
        }
    }
}

/// 手入力で追加する（空の品名で終了）
pub fn manual_entry(session: &mut CaptureSession) -> Result<()> {
    println!("  手入力で追加できます（空のまま Enter で終了）");

    loop {
        let name: String = Input::new()
            .with_prompt("  品名")
            .allow_empty(true)
            .interact_text()
            .map_err(cli_error)?;

        if name.trim().is_empty() {
            return Ok(());
        }

        let quantity: u32 = Input::new()
            .with_prompt("  数量")
            .default(1)
            .interact_text()
            .map_err(cli_error)?;

        match session.add_manual_item(&name, quantity) {
            Ok(merge) => println!("  ✔ {}", describe_merge(&merge)),
            Err(CurationError::InvalidQuantity) => println!("  ⚠ 数量は1以上を入力してください"),
            Err(e) => println!("  ⚠ {}", e),
        }
    }
}
