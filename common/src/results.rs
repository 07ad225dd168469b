//! 検索結果コントローラ
//!
//! 最新の検索結果（権威データ）、フィルタ条件、現在ページを保持し、
//! 表示中のページ範囲を導出する。導出は純粋関数で、同じ入力からは常に同じ結果になる。

use crate::types::Product;
use std::ops::{Range, RangeInclusive};

/// 1ページあたりの表示件数
pub const PAGE_SIZE: usize = 5;

/// フィルタ条件
///
/// 空文字列・未設定・0 は「制約なし」。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub company: String,
    pub product_type: String,
    pub min_score: Option<f64>,
}

impl FilterCriteria {
    pub fn new(company: &str, product_type: &str, min_score: Option<f64>) -> Self {
        Self {
            company: company.trim().to_lowercase(),
            product_type: product_type.trim().to_lowercase(),
            min_score,
        }
    }

    /// フォーム入力値から作る。数値として読めないスコアは未設定扱い。
    pub fn from_inputs(company: &str, product_type: &str, min_score: &str) -> Self {
        Self::new(company, product_type, parse_score(min_score))
    }

    fn threshold(&self) -> Option<f64> {
        self.min_score.filter(|s| *s != 0.0 && !s.is_nan())
    }

    /// 会社名・種別の部分一致（大文字小文字無視）とスコア下限のAND
    pub fn matches(&self, product: &Product) -> bool {
        contains_ignore_case(product.company.as_deref(), &self.company)
            && contains_ignore_case(product.product_type.as_deref(), &self.product_type)
            && self
                .threshold()
                .map_or(true, |min| product.match_score.unwrap_or(0.0) >= min)
    }
}

fn parse_score(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|s| s.is_finite())
}

fn contains_ignore_case(value: Option<&str>, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    value
        .unwrap_or_default()
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

/// 条件に合う製品を元の順序で返す
pub fn filter_products(products: &[Product], criteria: &FilterCriteria) -> Vec<Product> {
    products
        .iter()
        .filter(|p| criteria.matches(p))
        .cloned()
        .collect()
}

/// 総ページ数（ceil(len / page_size)）
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size)
}

/// ページの添字範囲（範囲外のページは空）
pub fn page_bounds(len: usize, page: usize, page_size: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// 検索結果・フィルタ・ページの状態
#[derive(Debug, Clone)]
pub struct ResultSetController {
    result: Option<Vec<Product>>,
    criteria: FilterCriteria,
    filtered: Vec<Product>,
    current_page: usize,
}

impl Default for ResultSetController {
    fn default() -> Self {
        Self {
            result: None,
            criteria: FilterCriteria::default(),
            filtered: Vec::new(),
            current_page: 1,
        }
    }
}

impl ResultSetController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 検索結果を丸ごと置き換える（マージしない）
    pub fn set_result(&mut self, products: Vec<Product>) {
        self.filtered = filter_products(&products, &self.criteria);
        self.result = Some(products);
        self.current_page = 1;
    }

    pub fn set_filter(&mut self, criteria: FilterCriteria) {
        self.filtered = filter_products(self.result(), &criteria);
        self.criteria = criteria;
        self.current_page = 1;
    }

    /// ページ番号を設定する（再計算なし）
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// ログアウト時に結果とフィルタ条件を破棄する
    pub fn clear(&mut self) {
        self.result = None;
        self.criteria = FilterCriteria::default();
        self.filtered.clear();
        self.current_page = 1;
    }

    /// 一度でも結果を受け取ったか
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> &[Product] {
        self.result.as_deref().unwrap_or_default()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn filtered(&self) -> &[Product] {
        &self.filtered
    }

    /// フィルタ後が0件
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), PAGE_SIZE)
    }

    /// ページボタンとして提示できる番号
    pub fn page_numbers(&self) -> RangeInclusive<usize> {
        1..=self.total_pages()
    }

    pub fn visible_slice(&self) -> &[Product] {
        &self.filtered[page_bounds(self.filtered.len(), self.current_page, PAGE_SIZE)]
    }
}
