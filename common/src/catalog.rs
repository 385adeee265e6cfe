//! 商品カタログ
//!
//! 既知の商品名 → カテゴリ/ブランドの参照テーブル。
//! 状態を持たないデータのみで、照合ロジックは `matcher` 側にある。

use crate::error::Result;
use crate::types::{normalize_name, Category};
use serde::{Deserialize, Serialize};

/// カタログ上の1商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub name: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

/// OCRテキスト中のキーワード → 正式ブランド名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandKeyword {
    pub keyword: String,
    pub brand: String,
}

/// 商品カタログ
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    products: Vec<CatalogProduct>,
    /// 先頭から順に評価される
    #[serde(default)]
    brands: Vec<BrandKeyword>,
}

impl ProductCatalog {
    pub fn new(products: Vec<CatalogProduct>, brands: Vec<BrandKeyword>) -> Self {
        Self { products, brands }
    }

    /// 組み込みカタログ
    pub fn builtin() -> Self {
        use Category::*;

        let plain: &[(&str, Category)] = &[
            // 野菜
            ("Tomato", Vegetable),
            ("Potato", Vegetable),
            ("Carrot", Vegetable),
            ("Onion", Vegetable),
            ("Garlic", Vegetable),
            ("Broccoli", Vegetable),
            ("Cucumber", Vegetable),
            ("Lettuce", Vegetable),
            ("Cabbage", Vegetable),
            ("Bell Pepper", Vegetable),
            ("Mushroom", Vegetable),
            // 果物
            ("Apple", Fruit),
            ("Banana", Fruit),
            ("Orange", Fruit),
            ("Lemon", Fruit),
            ("Strawberry", Fruit),
            ("Grape", Fruit),
            ("Avocado", Fruit),
            ("Pineapple", Fruit),
            // 乳製品
            ("Milk", Dairy),
            ("Cheese", Dairy),
            ("Yogurt", Dairy),
            ("Butter", Dairy),
            ("Egg", Dairy),
            // 肉・魚
            ("Chicken", Meat),
            ("Beef", Meat),
            ("Pork", Meat),
            ("Bacon", Meat),
            ("Sausage", Meat),
            ("Salmon", Meat),
            // 穀物
            ("Bread", Grain),
            ("Rice", Grain),
            ("Pasta", Grain),
            ("Cereal", Grain),
            ("Flour", Grain),
            ("Oats", Grain),
            // 飲料
            ("Water", Beverage),
            ("Orange Juice", Beverage),
            ("Coffee", Beverage),
            ("Tea", Beverage),
            ("Beer", Beverage),
            ("Wine", Beverage),
            // 缶詰
            ("Canned Beans", CannedGoods),
            ("Canned Tuna", CannedGoods),
            ("Canned Corn", CannedGoods),
        ];

        let branded: &[(&str, Category, &str)] = &[
            ("Tomato Ketchup", Other, "Heinz"),
            ("Corn Flakes", Grain, "Kellogg's"),
            ("Coca-Cola", Beverage, "Coca-Cola"),
            ("Spaghetti", Grain, "Barilla"),
            ("Tomato Soup", CannedGoods, "Campbell's"),
            ("Nutella", Other, "Ferrero"),
            ("Activia Yogurt", Dairy, "Danone"),
            ("Nescafe Classic", Beverage, "Nestle"),
        ];

        let mut products: Vec<CatalogProduct> = plain
            .iter()
            .map(|(name, category)| CatalogProduct {
                name: (*name).into(),
                category: *category,
                brand: None,
            })
            .collect();
        products.extend(branded.iter().map(|(name, category, brand)| CatalogProduct {
            name: (*name).into(),
            category: *category,
            brand: Some((*brand).into()),
        }));

        let brands = [
            ("heinz", "Heinz"),
            ("kellogg", "Kellogg's"),
            ("coca-cola", "Coca-Cola"),
            ("coca cola", "Coca-Cola"),
            ("barilla", "Barilla"),
            ("campbell", "Campbell's"),
            ("nutella", "Ferrero"),
            ("ferrero", "Ferrero"),
            ("danone", "Danone"),
            ("activia", "Danone"),
            ("nescafe", "Nestle"),
            ("nestle", "Nestle"),
        ]
        .iter()
        .map(|(keyword, brand)| BrandKeyword {
            keyword: (*keyword).into(),
            brand: (*brand).into(),
        })
        .collect();

        Self { products, brands }
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        Ok(catalog)
    }

    /// 別カタログをマージ（同名商品・同キーワードは後から追加した方が優先）
    pub fn merge(&mut self, other: &ProductCatalog) {
        for product in &other.products {
            let key = normalize_name(&product.name);
            match self.products.iter_mut().find(|p| normalize_name(&p.name) == key) {
                Some(existing) => *existing = product.clone(),
                None => self.products.push(product.clone()),
            }
        }

        for brand in &other.brands {
            let keyword = brand.keyword.to_lowercase();
            match self
                .brands
                .iter_mut()
                .find(|b| b.keyword.to_lowercase() == keyword)
            {
                Some(existing) => *existing = brand.clone(),
                None => self.brands.push(brand.clone()),
            }
        }
    }

    /// 商品名で検索（正規化後の完全一致）
    pub fn find_by_name(&self, name: &str) -> Option<&CatalogProduct> {
        let key = normalize_name(name);
        if key.is_empty() {
            return None;
        }
        self.products.iter().find(|p| normalize_name(&p.name) == key)
    }

    /// ブランドの代表商品を検索
    pub fn find_by_brand(&self, brand: &str) -> Option<&CatalogProduct> {
        self.products.iter().find(|p| {
            p.brand
                .as_deref()
                .is_some_and(|b| b.eq_ignore_ascii_case(brand))
        })
    }

    /// テキスト中のブランドキーワードを検出（大文字小文字を区別しない部分一致）
    pub fn detect_brand(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        if lowered.trim().is_empty() {
            return None;
        }
        self.brands
            .iter()
            .find(|b| !b.keyword.is_empty() && lowered.contains(&b.keyword.to_lowercase()))
            .map(|b| b.brand.as_str())
    }

    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    pub fn brands(&self) -> &[BrandKeyword] {
        &self.brands
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
