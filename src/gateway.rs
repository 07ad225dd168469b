//! reqwest によるゲートウェイ実装

use crate::config::Config;
use crate::error::Result;
use catalog_common::gateway::{
    self, classify_failure, credential_from, is_success, HealthResponse, ProductsResponse,
    SearchRequest, TokenResponse, HEALTH_PATH, PRODUCTS_PATH, SEARCH_PATH, TOKEN_PATH,
    UPLOAD_FIELD, UPLOAD_PATH,
};
use catalog_common::{
    Action, CatalogGateway, Credential, DatasheetFile, GatewayError, Product, ProductDraft,
    ProductId, SaveAck, UploadAck,
};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

type Reply<T> = std::result::Result<T, GatewayError>;

pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request.header(AUTHORIZATION, credential.bearer())
    }

    /// 送信して2xx以外を失敗分類に変換する
    async fn send(&self, action: Action, request: RequestBuilder) -> Reply<Response> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        debug!("{:?} -> {}", action, status);

        if is_success(status) {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(action, status, body))
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Reply<T> {
        response.json().await.map_err(GatewayError::malformed)
    }

    /// バックエンドの死活確認（認証不要）
    pub async fn health(&self) -> Reply<String> {
        let response = self
            .client
            .get(self.url(HEALTH_PATH))
            .send()
            .await
            .map_err(transport)?;
        let status = response.status().as_u16();
        if !is_success(status) {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Request {
                status: Some(status),
                message: body,
            });
        }
        let health: HealthResponse = Self::json(response).await?;
        Ok(health.status)
    }
}

fn transport(error: reqwest::Error) -> GatewayError {
    GatewayError::Transport(error.to_string())
}

/// 拡張子からContent-Typeを決める
pub fn content_type_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

impl CatalogGateway for HttpGateway {
    /// 本文未読のレスポンス（チャンク単位で保存する）
    type Datasheet = Response;

    async fn authenticate(&self, username: &str, password: &str) -> Reply<Credential> {
        let request = self
            .client
            .post(self.url(TOKEN_PATH))
            .form(&[("username", username), ("password", password)]);
        let response = self.send(Action::Login, request).await?;
        let token: TokenResponse = Self::json(response).await?;
        credential_from(token)
    }

    async fn search(&self, requirements: &str, credential: &Credential) -> Reply<Vec<Product>> {
        let request = self
            .client
            .post(self.url(SEARCH_PATH))
            .json(&SearchRequest { requirements });
        let response = self
            .send(Action::Search, self.authorized(request, credential))
            .await?;
        let products: ProductsResponse = Self::json(response).await?;
        Ok(products.into_products())
    }

    async fn list_products(&self, credential: &Credential) -> Reply<Vec<Product>> {
        let request = self.client.get(self.url(PRODUCTS_PATH));
        let response = self
            .send(Action::ListProducts, self.authorized(request, credential))
            .await?;
        let products: ProductsResponse = Self::json(response).await?;
        Ok(products.into_products())
    }

    async fn save_product(&self, draft: &ProductDraft, credential: &Credential) -> Reply<SaveAck> {
        let request = self.client.post(self.url(PRODUCTS_PATH)).json(draft);
        let response = self
            .send(Action::SaveProduct, self.authorized(request, credential))
            .await?;
        Self::json(response).await
    }

    async fn upload_datasheet(&self, file: &DatasheetFile, credential: &Credential) -> Reply<UploadAck> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(content_type_for(&file.file_name))
            .map_err(transport)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let request = self.client.post(self.url(UPLOAD_PATH)).multipart(form);
        let response = self
            .send(Action::UploadDatasheet, self.authorized(request, credential))
            .await?;
        Self::json(response).await
    }

    async fn download_datasheet(&self, product_id: ProductId, credential: &Credential) -> Reply<Response> {
        let request = self.client.get(self.url(&gateway::datasheet_endpoint(product_id)));
        self.send(Action::DownloadDatasheet, self.authorized(request, credential))
            .await
    }
}
