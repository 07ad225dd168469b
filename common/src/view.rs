//! 画面への射影
//!
//! セッション状態と検索結果コントローラから、描画に必要な値だけを導出する。
//! 状態は持たない。

use crate::error::{AuthError, GatewayError};
use crate::results::ResultSetController;
use crate::types::{Product, ProductId, NOT_AVAILABLE};
use std::fmt;

/// 結果0件時の表示文言
pub const EMPTY_RESULTS_MESSAGE: &str =
    "No products found. Try adding a product or uploading a datasheet.";

/// 仕様欄のプレビュー文字数
pub const SPECS_PREVIEW_CHARS: usize = 100;

/// ユーザー操作（= バックエンド呼び出し）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Login,
    Search,
    SaveProduct,
    UploadDatasheet,
    DownloadDatasheet,
    ListProducts,
}

impl Action {
    /// 待機中でないときのボタン表記
    pub fn idle_label(&self) -> &'static str {
        match self {
            Action::Login => "Login",
            Action::Search => "Search",
            Action::SaveProduct => "Save Product",
            Action::UploadDatasheet => "Upload Datasheet",
            Action::DownloadDatasheet => "Download Datasheet",
            Action::ListProducts => "Show All Products",
        }
    }

    /// 実行中のボタン表記
    pub fn busy_label(&self) -> &'static str {
        match self {
            Action::Login => "Logging in...",
            Action::Search => "Searching...",
            Action::SaveProduct => "Saving...",
            Action::UploadDatasheet => "Uploading...",
            Action::DownloadDatasheet => "Downloading...",
            Action::ListProducts => "Loading...",
        }
    }

    fn failure_prefix(&self) -> &'static str {
        match self {
            Action::Login => "Login failed",
            Action::Search => "Error searching products",
            Action::SaveProduct => "Error saving product",
            Action::UploadDatasheet => "Error uploading datasheet",
            Action::DownloadDatasheet => "Error downloading datasheet",
            Action::ListProducts => "Error loading products",
        }
    }

    /// 認証が必要な操作か
    pub fn requires_credential(&self) -> bool {
        !matches!(self, Action::Login)
    }
}

/// ユーザーへの通知
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// 認証切れ。ログアウト済み。
    SessionExpired,
    /// サーバー応答または入力検証のエラー。セッションは維持。
    Failed { action: Action, message: String },
    /// 通信エラー。セッションは維持。
    Connectivity { action: Action, detail: String },
    Info(String),
}

impl Notice {
    /// 失敗分類から通知を作る
    ///
    /// ログイン拒否はセッション切れではなく通常の失敗として扱う。
    pub fn from_error(action: Action, error: &GatewayError) -> Self {
        match error {
            GatewayError::Auth(AuthError::LoginRejected(message)) => Notice::Failed {
                action,
                message: message.clone(),
            },
            GatewayError::Auth(_) if action.requires_credential() => Notice::SessionExpired,
            GatewayError::Auth(error) => Notice::Failed {
                action,
                message: error.to_string(),
            },
            GatewayError::Request { message, .. } => Notice::Failed {
                action,
                message: message.clone(),
            },
            GatewayError::Transport(detail) => Notice::Connectivity {
                action,
                detail: detail.clone(),
            },
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, Notice::SessionExpired)
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Info(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SessionExpired => {
                write!(f, "{}", AuthError::Unauthorized)
            }
            Notice::Failed { action, message } => {
                write!(f, "{}: {}", action.failure_prefix(), message)
            }
            Notice::Connectivity { action, detail } => write!(
                f,
                "{}: could not reach the server ({}). Please check your connection and try again.",
                action.failure_prefix(),
                detail
            ),
            Notice::Info(message) => f.write_str(message),
        }
    }
}

/// 画面全体
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    LoggedOut,
    Main(ResultsView),
}

/// 検索結果エリア
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    /// まだ検索していない
    NotSearched,
    /// フィルタ後0件（空テーブルではなく文言を出す）
    Empty { message: &'static str },
    Page {
        rows: Vec<ProductRow>,
        pages: Vec<PageButton>,
        current_page: usize,
        total: usize,
    },
}

/// テーブル1行分の表示値
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub id: Option<ProductId>,
    pub company: String,
    pub name: String,
    pub product_type: String,
    pub match_score: String,
    pub directory: String,
    pub datasheet_path: String,
    pub specs: String,
    pub download: Option<DownloadTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub product_id: ProductId,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageButton {
    pub number: usize,
    pub active: bool,
}

fn or_not_available(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) if s != 0.0 && !s.is_nan() => format!("{}%", s),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn preview_specs(specs: Option<&str>) -> String {
    match specs {
        Some(s) if !s.is_empty() => {
            let mut preview: String = s.chars().take(SPECS_PREVIEW_CHARS).collect();
            if s.chars().count() > SPECS_PREVIEW_CHARS {
                preview.push_str("...");
            }
            preview
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        let download = match (product.id, product.has_datasheet()) {
            (Some(product_id), true) => Some(DownloadTarget {
                product_id,
                file_name: product.datasheet_file_name().unwrap_or_default(),
            }),
            _ => None,
        };

        Self {
            id: product.id,
            company: or_not_available(product.company.as_deref()),
            name: or_not_available(product.name.as_deref()),
            product_type: or_not_available(product.product_type.as_deref()),
            match_score: format_score(product.match_score),
            directory: or_not_available(product.directory.as_deref()),
            datasheet_path: or_not_available(product.datasheet_path.as_deref()),
            specs: preview_specs(product.specs.as_deref()),
            download,
        }
    }
}

/// 検索結果エリアの射影
pub fn results_view(results: &ResultSetController) -> ResultsView {
    if !results.has_result() {
        return ResultsView::NotSearched;
    }
    if results.is_empty() {
        return ResultsView::Empty {
            message: EMPTY_RESULTS_MESSAGE,
        };
    }

    let current_page = results.current_page();
    ResultsView::Page {
        rows: results.visible_slice().iter().map(ProductRow::from).collect(),
        pages: results
            .page_numbers()
            .map(|number| PageButton {
                number,
                active: number == current_page,
            })
            .collect(),
        current_page,
        total: results.filtered().len(),
    }
}

/// 画面全体の射影
pub fn project(authenticated: bool, results: &ResultSetController) -> Screen {
    if authenticated {
        Screen::Main(results_view(results))
    } else {
        Screen::LoggedOut
    }
}
