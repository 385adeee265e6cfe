//! Excel生成（共通ライブラリ）
//!
//! 確定アイテムの一覧をパントリー表として1シートに書き出す

use crate::types::{ConfirmedItem, PantrySnapshot};
use rust_xlsxwriter::*;

/// 列定義（見出し, 列幅）
const COLUMNS: &[(&str, f64)] = &[
    ("品名", 28.0),
    ("カテゴリ", 16.0),
    ("数量", 8.0),
    ("信頼度", 10.0),
    ("画像", 48.0),
];

/// セル値を取得
fn image_for<'a>(snapshot: &'a PantrySnapshot, item: &'a ConfirmedItem) -> &'a str {
    snapshot
        .image_refs
        .get(&item.name)
        .or(item.source_image_ref.as_ref())
        .map(String::as_str)
        .unwrap_or("-")
}

/// パントリー表をバッファに生成
///
/// # Arguments
/// * `snapshot` - 確定アイテムのスナップショット
/// * `title` - シート先頭のタイトル
pub fn generate_pantry_excel_buffer(snapshot: &PantrySnapshot, title: &str) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let title_format = Format::new().set_bold().set_font_size(14.0);

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x555555))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_align(FormatAlign::Left)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let number_format = Format::new()
        .set_align(FormatAlign::Right)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Pantry")
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    worksheet
        .write_string_with_format(0, 0, title, &title_format)
        .map_err(|e| format!("タイトル書き込みエラー: {}", e))?;

    for (col, (label, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet
            .set_column_width(col, *width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
        worksheet
            .write_string_with_format(2, col, *label, &header_format)
            .map_err(|e| format!("見出し書き込みエラー: {}", e))?;
    }

    let mut row: u32 = 3;
    for item in &snapshot.items {
        worksheet
            .write_string_with_format(row, 0, &item.name, &value_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet
            .write_string_with_format(row, 1, item.category.to_string(), &value_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet
            .write_number_with_format(row, 2, item.quantity, &number_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet
            .write_number_with_format(row, 3, (item.confidence as f64 * 100.0).round() / 100.0, &number_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        worksheet
            .write_string_with_format(row, 4, image_for(snapshot, item), &value_format)
            .map_err(|e| format!("値書き込みエラー: {}", e))?;
        row += 1;
    }

    // 合計行
    worksheet
        .write_string_with_format(row, 1, "合計", &header_format)
        .map_err(|e| format!("合計書き込みエラー: {}", e))?;
    worksheet
        .write_number_with_format(row, 2, snapshot.total_quantity(), &number_format)
        .map_err(|e| format!("合計書き込みエラー: {}", e))?;

    // バッファに書き出し
    workbook.save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
