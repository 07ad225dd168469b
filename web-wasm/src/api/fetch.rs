//! fetch API によるゲートウェイ実装
//!
//! 同一オリジンの相対パスで呼び出す。Bearer トークンは認証付き操作にだけ付ける。

use catalog_common::gateway::{
    classify_failure, credential_from, datasheet_endpoint, is_success, ProductsResponse,
    SearchRequest, TokenResponse, PRODUCTS_PATH, SEARCH_PATH, TOKEN_PATH, UPLOAD_FIELD,
    UPLOAD_PATH,
};
use catalog_common::{
    Action, CatalogGateway, Credential, DatasheetFile, GatewayError, Product, ProductDraft,
    ProductId, SaveAck, UploadAck,
};
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Request, RequestInit, RequestMode, Response, UrlSearchParams};

type Reply<T> = Result<T, GatewayError>;

/// ダウンロードしたデータシート
pub struct DatasheetBlob {
    pub blob: Blob,
    /// サーバーが付けた Content-Disposition（あれば）
    pub content_disposition: Option<String>,
}

/// リクエスト本文
enum Body<'a> {
    Json(String),
    Form(&'a UrlSearchParams),
    Multipart(&'a FormData),
}

#[derive(Debug, Clone, Default)]
pub struct FetchGateway {
    base_url: String,
}

impl FetchGateway {
    /// ページと同じオリジンのAPIを使う
    pub fn same_origin() -> Self {
        Self::default()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 送信して2xx以外を失敗分類に変換する
    async fn send(
        &self,
        action: Action,
        method: &str,
        path: &str,
        body: Option<Body<'_>>,
        credential: Option<&Credential>,
    ) -> Reply<Response> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::SameOrigin);

        let content_type = match &body {
            Some(Body::Json(json)) => {
                opts.set_body(&JsValue::from_str(json));
                Some("application/json")
            }
            Some(Body::Form(params)) => {
                opts.set_body(params.as_ref());
                Some("application/x-www-form-urlencoded")
            }
            // multipart の境界はブラウザが付ける
            Some(Body::Multipart(form)) => {
                opts.set_body(form.as_ref());
                None
            }
            None => None,
        };

        let request = Request::new_with_str_and_init(&self.url(path), &opts).map_err(transport)?;
        let headers = request.headers();
        if let Some(content_type) = content_type {
            headers.set("Content-Type", content_type).map_err(transport)?;
        }
        if let Some(credential) = credential {
            headers
                .set("Authorization", &credential.bearer())
                .map_err(transport)?;
        }

        let window = web_sys::window().ok_or_else(|| GatewayError::Transport("no window".into()))?;
        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(transport)?;
        let response: Response = value.dyn_into().map_err(transport)?;

        let status = response.status();
        gloo::console::debug!(format!("{:?} -> {}", action, status));
        if is_success(status) {
            return Ok(response);
        }
        let body = text(&response).await.unwrap_or_default();
        Err(classify_failure(action, status, body))
    }
}

async fn text(response: &Response) -> Reply<String> {
    let promise = response.text().map_err(transport)?;
    let value = JsFuture::from(promise).await.map_err(transport)?;
    Ok(value.as_string().unwrap_or_default())
}

async fn json<T: DeserializeOwned>(response: &Response) -> Reply<T> {
    let promise = response.json().map_err(transport)?;
    let value = JsFuture::from(promise)
        .await
        .map_err(|e| GatewayError::malformed(js_message(&e)))?;
    serde_wasm_bindgen::from_value(value).map_err(GatewayError::malformed)
}

fn transport(value: JsValue) -> GatewayError {
    GatewayError::Transport(js_message(&value))
}

/// JSの例外値を文字列にする
pub fn js_message(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(error) => String::from(error.message()),
        None => format!("{:?}", value),
    }
}

/// アップロード用のBlobを作る
fn to_blob(file: &DatasheetFile) -> Reply<Blob> {
    let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
    let parts = js_sys::Array::of1(&bytes);
    let options = BlobPropertyBag::new();
    options.set_type(content_type_for(&file.file_name));
    Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(transport)
}

/// 拡張子からContent-Typeを決める
pub fn content_type_for(file_name: &str) -> &'static str {
    if file_name.to_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

impl CatalogGateway for FetchGateway {
    type Datasheet = DatasheetBlob;

    async fn authenticate(&self, username: &str, password: &str) -> Reply<Credential> {
        let params = UrlSearchParams::new().map_err(transport)?;
        params.append("username", username);
        params.append("password", password);

        let response = self
            .send(Action::Login, "POST", TOKEN_PATH, Some(Body::Form(&params)), None)
            .await?;
        let token: TokenResponse = json(&response).await?;
        credential_from(token)
    }

    async fn search(&self, requirements: &str, credential: &Credential) -> Reply<Vec<Product>> {
        let body = serde_json::to_string(&SearchRequest { requirements })
            .map_err(GatewayError::malformed)?;
        let response = self
            .send(Action::Search, "POST", SEARCH_PATH, Some(Body::Json(body)), Some(credential))
            .await?;
        let products: ProductsResponse = json(&response).await?;
        Ok(products.into_products())
    }

    async fn list_products(&self, credential: &Credential) -> Reply<Vec<Product>> {
        let response = self
            .send(Action::ListProducts, "GET", PRODUCTS_PATH, None, Some(credential))
            .await?;
        let products: ProductsResponse = json(&response).await?;
        Ok(products.into_products())
    }

    async fn save_product(&self, draft: &ProductDraft, credential: &Credential) -> Reply<SaveAck> {
        let body = serde_json::to_string(draft).map_err(GatewayError::malformed)?;
        let response = self
            .send(Action::SaveProduct, "POST", PRODUCTS_PATH, Some(Body::Json(body)), Some(credential))
            .await?;
        json(&response).await
    }

    async fn upload_datasheet(&self, file: &DatasheetFile, credential: &Credential) -> Reply<UploadAck> {
        let form = FormData::new().map_err(transport)?;
        form.append_with_blob_and_filename(UPLOAD_FIELD, &to_blob(file)?, &file.file_name)
            .map_err(transport)?;

        let response = self
            .send(Action::UploadDatasheet, "POST", UPLOAD_PATH, Some(Body::Multipart(&form)), Some(credential))
            .await?;
        json(&response).await
    }

    async fn download_datasheet(&self, product_id: ProductId, credential: &Credential) -> Reply<DatasheetBlob> {
        let path = datasheet_endpoint(product_id);
        let response = self
            .send(Action::DownloadDatasheet, "GET", &path, None, Some(credential))
            .await?;

        let content_disposition = response
            .headers()
            .get("Content-Disposition")
            .ok()
            .flatten();
        let promise = response.blob().map_err(transport)?;
        let blob = JsFuture::from(promise)
            .await
            .map_err(transport)?
            .dyn_into::<Blob>()
            .map_err(transport)?;

        Ok(DatasheetBlob {
            blob,
            content_disposition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("MD10.PDF"), "application/pdf");
        assert_eq!(content_type_for("notes.txt"), "application/octet-stream");
    }

    #[test]
    fn test_same_origin_paths_are_relative() {
        let gateway = FetchGateway::same_origin();
        assert_eq!(gateway.url(SEARCH_PATH), "/api/semantic_search");
        assert_eq!(gateway.url(&datasheet_endpoint(3)), "/api/datasheet/3");
    }
}
