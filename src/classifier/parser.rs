//! 分類器レスポンスパーサー
//!
//! 分類器の標準出力からJSONを抽出し、ラベル一覧とOCRテキストを取り出す

use super::ClassifierOutput;
use crate::error::{PantryScanError, Result};
use pantry_scan_common::RawLabel;

/// レスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...} または [...]（先に現れた方）
pub fn extract_json(response: &str) -> Option<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            return Some(response[start..start + end_offset].trim());
        }
    }

    let start = response.find(['{', '['])?;
    let close = if response[start..].starts_with('{') { '}' } else { ']' };
    let end = response.rfind(close)?;
    (end >= start).then(|| &response[start..=end])
}

/// レスポンスをパース
///
/// 空のレスポンスはラベルなしとして扱う。
///
/// # Examples
/// ```
/// use pantry_scan::classifier::parser::parse_response;
///
/// let output = parse_response(r#"[{"label": "Tomato", "confidence": 0.95}]"#).unwrap();
/// assert_eq!(output.labels[0].label, "Tomato");
/// ```
pub fn parse_response(response: &str) -> Result<ClassifierOutput> {
    if response.trim().is_empty() {
        return Ok(ClassifierOutput::default());
    }

    let json = extract_json(response)
        .ok_or_else(|| PantryScanError::ClassifierParse("JSONが見つかりません".into()))?;

    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| PantryScanError::ClassifierParse(format!("JSONパースエラー: {}", e)))?;

    if value.is_array() {
        let labels: Vec<RawLabel> = serde_json::from_value(value)
            .map_err(|e| PantryScanError::ClassifierParse(format!("ラベル配列が不正: {}", e)))?;
        return Ok(ClassifierOutput { labels, text: None });
    }

    serde_json::from_value(value)
        .map_err(|e| PantryScanError::ClassifierParse(format!("レスポンス形式が不正: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_with_text() {
        let response = r#"{"labels": [{"label": "Bottle", "confidence": 0.91}], "text": "HEINZ"}"#;
        let output = parse_response(response).unwrap();
        assert_eq!(output.labels.len(), 1);
        assert_eq!(output.text.as_deref(), Some("HEINZ"));
    }

    #[test]
    fn test_parse_fenced_block() {
        let response = r#"Detected labels:
```json
[
  {"label": "Tomato", "confidence": 0.95},
  {"name": "Apple", "score": 0.8}
]
```
"#;
        let output = parse_response(response).unwrap();
        assert_eq!(output.labels.len(), 2);
        assert_eq!(output.labels[1].label, "Apple");
        assert!(output.text.is_none());
    }

    #[test]
    fn test_parse_ocr_alias() {
        let response = r#"{"labels": [], "ocrText": "Barilla n.5"}"#;
        let output = parse_response(response).unwrap();
        assert!(output.labels.is_empty());
        assert_eq!(output.text.as_deref(), Some("Barilla n.5"));
    }

    #[test]
    fn test_empty_response_is_no_labels() {
        let output = parse_response("  \n").unwrap();
        assert!(output.labels.is_empty());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            parse_response("classifier crashed"),
            Err(PantryScanError::ClassifierParse(_))
        ));
        assert!(matches!(
            parse_response("[{\"label\": }]"),
            Err(PantryScanError::ClassifierParse(_))
        ));
    }

    #[test]
    fn test_extract_json_prefers_first_bracket() {
        let response = r#"result: {"labels": [{"label": "Milk", "confidence": 0.7}]} done"#;
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }
}
