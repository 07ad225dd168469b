//! 製品カタログの型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - Product: サーバーが返す製品レコード（検索結果のみ match_score を持つ）
//! - ProductDraft: 新規登録フォームの入力
//! - SaveAck / UploadAck: 登録・アップロードの応答
//! - DatasheetFile: アップロードするデータシート

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};

/// サーバー採番の製品ID
pub type ProductId = i64;

/// データシートパス未設定を表すサーバー側の値
pub const NOT_AVAILABLE: &str = "N/A";

/// 製品レコード
///
/// サーバー所有。クライアントは読み取り専用のコピーとして保持する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "product_id", alias = "id", default)]
    pub id: Option<ProductId>,

    #[serde(default)]
    pub company: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub product_type: Option<String>,

    #[serde(default)]
    pub datasheet_path: Option<String>,

    #[serde(default)]
    pub directory: Option<String>,

    #[serde(default)]
    pub specs: Option<String>,

    /// 0〜100の関連度（検索結果のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
}

impl Product {
    /// ダウンロード可能なデータシートがあるか
    pub fn has_datasheet(&self) -> bool {
        self.id.is_some() && is_known_path(self.datasheet_path.as_deref())
    }

    /// ダウンロード時の保存ファイル名
    pub fn datasheet_file_name(&self) -> Option<String> {
        self.id
            .map(|id| datasheet_file_name(id, self.datasheet_path.as_deref()))
    }
}

fn is_known_path(path: Option<&str>) -> bool {
    matches!(path.map(str::trim), Some(p) if !p.is_empty() && p != NOT_AVAILABLE)
}

/// データシートの保存ファイル名を決める
///
/// パスの最終要素（`/` と `\` の両方を区切りとして扱う）。
/// パス不明なら `datasheet_{id}.pdf`。
pub fn datasheet_file_name(product_id: ProductId, datasheet_path: Option<&str>) -> String {
    datasheet_path
        .filter(|p| is_known_path(Some(*p)))
        .and_then(|p| p.trim().rsplit(['/', '\\']).next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("datasheet_{}.pdf", product_id))
}

/// 新規登録フォームの入力
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub company_name: String,
    pub product_name: String,
    pub product_type: String,
    pub datasheet_path: String,
    pub specs: String,
}

impl ProductDraft {
    /// 前後空白を除去し、空のデータシートパスを "N/A" にする
    pub fn normalized(&self) -> Self {
        let datasheet_path = self.datasheet_path.trim();
        Self {
            company_name: self.company_name.trim().to_string(),
            product_name: self.product_name.trim().to_string(),
            product_type: self.product_type.trim().to_string(),
            datasheet_path: if datasheet_path.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                datasheet_path.to_string()
            },
            specs: self.specs.trim().to_string(),
        }
    }

    /// 未入力の必須項目（表示ラベル）
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("Company Name", &self.company_name),
            ("Product Name", &self.product_name),
            ("Product Type", &self.product_type),
            ("Specifications", &self.specs),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }

    /// 送信可能な形に正規化する。必須項目が欠けていれば送信しない。
    pub fn validate(&self) -> Result<ProductDraft, GatewayError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(GatewayError::validation(format!(
                "Please fill in all required fields ({}).",
                missing.join(", ")
            )));
        }
        Ok(self.normalized())
    }
}

/// POST /api/products の応答
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAck {
    pub product_id: ProductId,
}

/// POST /api/upload の応答
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAck {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub datasheet_path: Option<String>,
}

/// アップロードするデータシート（multipart の `file` パート）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasheetFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DatasheetFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.file_name.trim().is_empty() {
            return Err(GatewayError::validation("Please select a PDF file to upload."));
        }
        Ok(())
    }
}
