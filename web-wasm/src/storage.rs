//! localStorage によるセッション・テーマの永続化

use crate::api::js_message;
use catalog_common::{Error, KeyValueStorage};
use web_sys::Storage;

/// ブラウザの `window.localStorage`
///
/// 使えない環境（プライベートモード等）では読み出しは常に空、書き込みはエラー。
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn raw() -> catalog_common::Result<Storage> {
        web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .ok_or_else(|| Error::Storage("localStorage is not available".into()))
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::raw().ok()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> catalog_common::Result<()> {
        Self::raw()?
            .set_item(key, value)
            .map_err(|e| Error::Storage(js_message(&e)))
    }

    fn remove(&self, key: &str) -> catalog_common::Result<()> {
        Self::raw()?
            .remove_item(key)
            .map_err(|e| Error::Storage(js_message(&e)))
    }
}
