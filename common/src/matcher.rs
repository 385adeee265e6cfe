//! ラベル照合
//!
//! 分類器の生ラベル（＋OCRテキスト）をカタログ商品またはカテゴリ推定に解決する。
//!
//! 優先順位（最初に一致したものを採用）:
//! 1. カタログ商品名との完全一致
//! 2. OCRテキスト中のブランドキーワード → ブランドの代表商品
//! 3. 食品キーワードによるゆるい一致 → カテゴリ推定

use crate::catalog::ProductCatalog;
use crate::types::Category;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 一致の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    Catalog,
    Brand,
    Heuristic,
}

impl MatchKind {
    /// 一致の強さ（表示用。採否の判定には使わない）
    pub fn weight(&self) -> f32 {
        match self {
            MatchKind::Catalog => 0.9,
            MatchKind::Brand => 0.85,
            MatchKind::Heuristic => 0.7,
        }
    }
}

/// 照合結果
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMatch {
    pub name: String,
    pub category: Category,
    pub kind: MatchKind,
    pub brand: Option<String>,
}

impl LabelMatch {
    pub fn confidence_weight(&self) -> f32 {
        self.kind.weight()
    }
}

/// カテゴリ推定ルール（上から順に評価）
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Dairy,
        &["milk", "cheese", "yogurt", "yoghurt", "butter", "cream", "dairy", "egg"],
    ),
    (
        Category::Meat,
        &[
            "meat", "chicken", "beef", "pork", "bacon", "sausage", "ham", "turkey", "lamb",
            "steak", "fish", "salmon", "tuna", "shrimp", "seafood",
        ],
    ),
    (
        Category::Fruit,
        &[
            "fruit", "apple", "banana", "orange", "lemon", "lime", "berry", "grape", "melon",
            "peach", "pear", "mango", "cherry", "plum", "kiwi", "avocado", "citrus",
        ],
    ),
    (
        Category::Vegetable,
        &[
            "vegetable", "veggie", "produce", "tomato", "potato", "carrot", "onion", "garlic",
            "broccoli", "cucumber", "lettuce", "cabbage", "pepper", "spinach", "mushroom",
            "zucchini", "squash", "bean", "pea", "corn", "celery", "eggplant",
        ],
    ),
    (
        Category::Grain,
        &[
            "grain", "bread", "rice", "pasta", "noodle", "cereal", "flour", "oat", "wheat",
            "bagel", "baguette", "cracker", "spaghetti", "tortilla",
        ],
    ),
    (
        Category::Beverage,
        &["beverage", "drink", "juice", "water", "soda", "coffee", "tea", "beer", "wine"],
    ),
    (Category::CannedGoods, &["can", "canned", "tin", "soup"]),
];

/// カテゴリは決まらないが食品として扱う語
const GENERIC_KEYWORDS: &[&str] = &[
    "food", "grocery", "snack", "ingredient", "condiment", "sauce", "spice", "jar", "bottle",
    "package", "cookie", "chocolate", "candy", "nut",
];

/// 食品でないことが明らかな語（体の部位・家具・屋外など）
const EXCLUDED_KEYWORDS: &[&str] = &[
    // 体
    "hand", "finger", "thumb", "nail", "arm", "face", "head", "eye", "hair", "skin", "leg",
    "foot", "person", "people", "human",
    // 家具・室内
    "table", "chair", "furniture", "couch", "sofa", "shelf", "desk", "countertop", "cabinet",
    "drawer", "bed", "floor", "wall", "ceiling", "room", "window", "door",
    // 屋外
    "sky", "cloud", "tree", "grass", "building", "road", "street", "outdoor", "landscape",
    // その他
    "font", "rectangle", "pattern", "tableware", "cutlery",
];

/// 小文字化した英数字トークンに分割
fn tokenize(text: &str) -> Vec<String> {
    lazy_static::lazy_static! {
        static ref TOKEN_RE: Regex = Regex::new(r"[a-z0-9]+").unwrap();
    }
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 単数・複数形を許容した語形
fn word_forms(keyword: &str) -> Vec<String> {
    let mut forms = vec![
        keyword.to_string(),
        format!("{}s", keyword),
        format!("{}es", keyword),
    ];
    if let Some(stem) = keyword.strip_suffix('y') {
        forms.push(format!("{}ies", stem));
    }
    forms
}

/// 厳密な語一致（複数形のみ許容）
fn token_equals(token: &str, keyword: &str) -> bool {
    word_forms(keyword).iter().any(|f| f == token)
}

/// ゆるい語一致: 複数形に加え、4文字以上のキーワードは語尾一致も許容
/// （"strawberries" は "berry" に一致する）
fn token_loosely_matches(token: &str, keyword: &str) -> bool {
    word_forms(keyword)
        .iter()
        .any(|f| f == token || (keyword.len() >= 4 && token.ends_with(f.as_str())))
}

/// 除外キーワードを含むか
pub fn is_excluded(label: &str) -> bool {
    tokenize(label)
        .iter()
        .any(|t| EXCLUDED_KEYWORDS.iter().any(|k| token_equals(t, k)))
}

/// キーワードからカテゴリを推定する
///
/// 食品キーワードに一致しなければ `None`、一致してもカテゴリ規則に当たらなければ `Other`。
pub fn infer_category(label: &str) -> Option<Category> {
    let tokens = tokenize(label);
    if tokens.is_empty() {
        return None;
    }

    for (category, keywords) in CATEGORY_RULES {
        if tokens
            .iter()
            .any(|t| keywords.iter().any(|k| token_loosely_matches(t, k)))
        {
            return Some(*category);
        }
    }

    if tokens
        .iter()
        .any(|t| GENERIC_KEYWORDS.iter().any(|k| token_loosely_matches(t, k)))
    {
        return Some(Category::Other);
    }

    None
}

/// ラベル照合器（カタログを参照するだけで状態を持たない）
#[derive(Debug, Clone, Copy)]
pub struct LabelMatcher<'c> {
    catalog: &'c ProductCatalog,
}

impl<'c> LabelMatcher<'c> {
    pub fn new(catalog: &'c ProductCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c ProductCatalog {
        self.catalog
    }

    /// ラベルを解決する。どの規則にも当たらなければ `None`
    pub fn resolve(&self, label: &str, ocr_text: Option<&str>) -> Option<LabelMatch> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        // 1. カタログ完全一致
        if let Some(product) = self.catalog.find_by_name(label) {
            return Some(LabelMatch {
                name: product.name.clone(),
                category: product.category,
                kind: MatchKind::Catalog,
                brand: product.brand.clone(),
            });
        }

        // 2. OCRテキストのブランド
        if let Some(text) = ocr_text {
            if let Some(brand) = self.catalog.detect_brand(text) {
                if let Some(product) = self.catalog.find_by_brand(brand) {
                    return Some(LabelMatch {
                        name: product.name.clone(),
                        category: product.category,
                        kind: MatchKind::Brand,
                        brand: Some(brand.to_string()),
                    });
                }
            }
        }

        // 3. キーワード推定
        infer_category(label).map(|category| LabelMatch {
            name: label.to_string(),
            category,
            kind: MatchKind::Heuristic,
            brand: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_match_wins() {
        let catalog = ProductCatalog::builtin();
        let matcher = LabelMatcher::new(&catalog);
        let m = matcher.resolve("tomato", Some("heinz")).unwrap();
        assert_eq!(m.name, "Tomato");
        assert_eq!(m.kind, MatchKind::Catalog);
        assert!((m.confidence_weight() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_brand_match_from_ocr() {
        let catalog = ProductCatalog::builtin();
        let matcher = LabelMatcher::new(&catalog);
        let m = matcher.resolve("Bottle", Some("HEINZ 57 varieties")).unwrap();
        assert_eq!(m.name, "Tomato Ketchup");
        assert_eq!(m.kind, MatchKind::Brand);
        assert_eq!(m.brand.as_deref(), Some("Heinz"));
    }

    #[test]
    fn test_heuristic_category_order() {
        let catalog = ProductCatalog::builtin();
        let matcher = LabelMatcher::new(&catalog);

        let m = matcher.resolve("Strawberries", None).unwrap();
        assert_eq!(m.kind, MatchKind::Heuristic);
        assert_eq!(m.category, Category::Fruit);
        assert_eq!(m.name, "Strawberries");

        // 乳製品は果物より先に評価される
        assert_eq!(infer_category("Strawberry yogurt"), Some(Category::Dairy));
        assert_eq!(infer_category("Tomato soup can"), Some(Category::Vegetable));
        assert_eq!(infer_category("Canned food"), Some(Category::CannedGoods));
        assert_eq!(infer_category("Chocolate"), Some(Category::Other));
    }

    #[test]
    fn test_unrelated_label_has_no_match() {
        let catalog = ProductCatalog::builtin();
        let matcher = LabelMatcher::new(&catalog);
        assert!(matcher.resolve("Sky", None).is_none());
        assert!(matcher.resolve("Automotive design", None).is_none());
        assert!(matcher.resolve("   ", None).is_none());
    }

    #[test]
    fn test_short_keywords_do_not_match_inside_words() {
        assert_eq!(infer_category("Pecan"), None);
        assert_eq!(infer_category("Cans"), Some(Category::CannedGoods));
    }

    #[test]
    fn test_is_excluded() {
        assert!(is_excluded("Sky"));
        assert!(is_excluded("Human hand"));
        assert!(is_excluded("Kitchen table"));
        assert!(is_excluded("Fingers"));
        assert!(!is_excluded("Eggplant"));
        assert!(!is_excluded("Tomato"));
    }
}
