//! ファイルの受け渡し（選択ファイルの読み込み、Blobの保存）

use catalog_common::gateway::resolve_download_name;
use catalog_common::{DatasheetFile, ProductId};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, File, HtmlAnchorElement, Url};

/// 選択されたファイルをアップロード用に読み込む
pub async fn read_file(file: &File) -> Result<DatasheetFile, JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok(DatasheetFile::new(file.name(), bytes))
}

/// 保存ファイル名（行のファイル名 → Content-Disposition → `datasheet_{id}.pdf`）
pub fn file_name_for(product_id: ProductId, row_file_name: &str, content_disposition: Option<&str>) -> String {
    resolve_download_name(product_id, Some(row_file_name), content_disposition)
}

/// 一時リンクを作ってクリックし、ブラウザに保存させる
pub fn save_blob(blob: &Blob, file_name: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;

    let url = Url::create_object_url_with_blob(blob)?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into().map_err(JsValue::from)?;
    anchor.set_href(&url);
    anchor.set_download(file_name);

    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();
    Url::revoke_object_url(&url)
}
