//! バックエンドAPIの契約
//!
//! HTTP実装（CLIの reqwest 版、ブラウザの fetch 版）が共有する:
//! - エンドポイントのパス
//! - リクエスト/レスポンスのペイロード
//! - ステータスコードから失敗分類への変換
//! - `CatalogGateway` トレイト

use crate::error::{AuthError, GatewayError};
use crate::session::Credential;
use crate::types::{
    datasheet_file_name, DatasheetFile, Product, ProductDraft, ProductId, SaveAck, UploadAck,
};
use crate::view::Action;
use serde::{Deserialize, Serialize};

pub const TOKEN_PATH: &str = "/token";
pub const SEARCH_PATH: &str = "/api/semantic_search";
pub const PRODUCTS_PATH: &str = "/api/products";
pub const UPLOAD_PATH: &str = "/api/upload";
pub const HEALTH_PATH: &str = "/health";

/// multipart のファイルパート名
pub const UPLOAD_FIELD: &str = "file";

pub fn datasheet_endpoint(product_id: ProductId) -> String {
    format!("/api/datasheet/{}", product_id)
}

/// POST /api/semantic_search
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub requirements: &'a str,
}

/// POST /token
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// 製品一覧レスポンス（検索・全件取得）
#[derive(Debug, Default, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Option<Vec<Product>>,
}

impl ProductsResponse {
    pub fn into_products(self) -> Vec<Product> {
        self.products.unwrap_or_default()
    }
}

/// GET /health
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// 2xx以外の応答を失敗分類に変換する
///
/// - ログイン: すべて `LoginRejected`（本文をそのまま）
/// - 認証付き操作: 401 は `Unauthorized`、それ以外は本文付きの `Request`
pub fn classify_failure(action: Action, status: u16, body: String) -> GatewayError {
    match (action, status) {
        (Action::Login, _) => AuthError::LoginRejected(body).into(),
        (_, 401) => AuthError::Unauthorized.into(),
        _ => GatewayError::Request {
            status: Some(status),
            message: body,
        },
    }
}

/// ログイン応答からトークンを取り出す
pub fn credential_from(response: TokenResponse) -> Result<Credential, GatewayError> {
    if response.access_token.trim().is_empty() {
        return Err(GatewayError::malformed("empty access_token"));
    }
    Ok(Credential::new(response.access_token))
}

/// Content-Disposition ヘッダーから filename を取り出す
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .map(|name| name.trim().trim_matches('"'))
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
}

/// 保存ファイル名を決める
///
/// 製品行のデータシートパス → サーバーの Content-Disposition → `datasheet_{id}.pdf` の順。
pub fn resolve_download_name(
    product_id: ProductId,
    datasheet_path: Option<&str>,
    content_disposition: Option<&str>,
) -> String {
    let from_path = datasheet_file_name(product_id, datasheet_path);
    if from_path != datasheet_file_name(product_id, None) {
        return from_path;
    }
    content_disposition
        .and_then(filename_from_content_disposition)
        .unwrap_or(from_path)
}

/// バックエンドへの唯一の窓口
///
/// 認証付きの呼び出しは必ず `Credential` を受け取り、Bearer ヘッダーとして付与する。
/// ブラウザではFutureが `Send` にならないため `Send` 境界は課さない。
#[allow(async_fn_in_trait)]
pub trait CatalogGateway {
    /// ダウンロードしたデータシートの表現（ストリーム、Blob など）
    type Datasheet;

    async fn authenticate(&self, username: &str, password: &str)
        -> Result<Credential, GatewayError>;

    async fn search(
        &self,
        requirements: &str,
        credential: &Credential,
    ) -> Result<Vec<Product>, GatewayError>;

    async fn list_products(&self, credential: &Credential) -> Result<Vec<Product>, GatewayError>;

    async fn save_product(
        &self,
        draft: &ProductDraft,
        credential: &Credential,
    ) -> Result<SaveAck, GatewayError>;

    async fn upload_datasheet(
        &self,
        file: &DatasheetFile,
        credential: &Credential,
    ) -> Result<UploadAck, GatewayError>;

    async fn download_datasheet(
        &self,
        product_id: ProductId,
        credential: &Credential,
    ) -> Result<Self::Datasheet, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failure_is_always_rejection() {
        for status in [400, 401, 500] {
            let err = classify_failure(Action::Login, status, "Incorrect username or password".into());
            assert_eq!(
                err,
                GatewayError::Auth(AuthError::LoginRejected(
                    "Incorrect username or password".into()
                ))
            );
        }
    }

    #[test]
    fn test_unauthorized_for_every_authenticated_action() {
        for action in [
            Action::Search,
            Action::SaveProduct,
            Action::UploadDatasheet,
            Action::DownloadDatasheet,
            Action::ListProducts,
        ] {
            let err = classify_failure(action, 401, "Invalid token".into());
            assert_eq!(err, GatewayError::Auth(AuthError::Unauthorized));
        }
    }

    #[test]
    fn test_other_status_keeps_body() {
        let err = classify_failure(Action::DownloadDatasheet, 404, "{\"detail\":\"Datasheet not found\"}".into());
        assert_eq!(
            err,
            GatewayError::Request {
                status: Some(404),
                message: "{\"detail\":\"Datasheet not found\"}".into()
            }
        );
    }

    #[test]
    fn test_search_request_shape() {
        let json = serde_json::to_string(&SearchRequest {
            requirements: "10A motor driver",
        })
        .unwrap();
        assert_eq!(json, r#"{"requirements":"10A motor driver"}"#);
    }

    #[test]
    fn test_products_response_tolerates_null() {
        let response: ProductsResponse = serde_json::from_str(r#"{"products": null}"#).unwrap();
        assert!(response.into_products().is_empty());

        let response: ProductsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_products().is_empty());
    }

    #[test]
    fn test_products_response_keeps_order() {
        let json = r#"{"products": [
            {"product_id": 1, "company": "Acme", "product_type": "driver", "match_score": 92},
            {"product_id": 2, "company": "Acme", "product_type": "sensor", "match_score": 40}
        ]}"#;
        let products = serde_json::from_str::<ProductsResponse>(json)
            .unwrap()
            .into_products();
        let ids: Vec<_> = products.iter().filter_map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(products[0].match_score, Some(92.0));
    }

    #[test]
    fn test_credential_from_token_response() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc123","token_type":"bearer"}"#).unwrap();
        let credential = credential_from(response).unwrap();
        assert_eq!(credential.as_str(), "abc123");

        let empty = TokenResponse {
            access_token: String::new(),
            token_type: None,
        };
        assert!(matches!(credential_from(empty), Err(GatewayError::Transport(_))));
    }

    #[test]
    fn test_filename_from_content_disposition() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="md10.pdf""#).as_deref(),
            Some("md10.pdf")
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename=sensor.pdf").as_deref(),
            Some("sensor.pdf")
        );
        assert_eq!(filename_from_content_disposition("inline"), None);
        assert_eq!(filename_from_content_disposition(r#"attachment; filename="..""#), None);
    }

    #[test]
    fn test_resolve_download_name_order() {
        let header = Some(r#"attachment; filename="server.pdf""#);
        assert_eq!(resolve_download_name(3, Some("a/b/row.pdf"), header), "row.pdf");
        assert_eq!(resolve_download_name(3, None, header), "server.pdf");
        assert_eq!(resolve_download_name(3, Some("N/A"), None), "datasheet_3.pdf");
    }

    #[test]
    fn test_status_helpers() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(401));
        assert_eq!(datasheet_endpoint(42), "/api/datasheet/42");
    }
}
