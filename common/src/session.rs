//! セッションストア
//!
//! 認証トークンを1つだけ保持する。書き込み経路は `login` / `logout` のみで、
//! どちらも永続ストレージとメモリ上の状態を同時に更新する。

use crate::error::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// トークンの永続化キー
pub const TOKEN_KEY: &str = "token";

/// 永続キーバリューストレージ（ブラウザの localStorage 相当）
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// メモリ上のストレージ
///
/// クローンは同じ領域を共有する。
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// 不透明なBearerトークン
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Authorization ヘッダー値
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// トークン本体はログに出さない
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// セッションストア
#[derive(Debug)]
pub struct SessionStore<S> {
    storage: S,
    token: Option<Credential>,
}

impl<S: KeyValueStorage> SessionStore<S> {
    /// 永続ストレージから前回のトークンを復元
    pub fn restore(storage: S) -> Self {
        let token = storage
            .get(TOKEN_KEY)
            .filter(|t| !t.trim().is_empty())
            .map(Credential::new);
        Self { storage, token }
    }

    /// トークンを保存してログイン状態にする
    ///
    /// 永続化に失敗した場合はログイン状態にしない。
    pub fn login(&mut self, token: Credential) -> Result<()> {
        self.storage.set(TOKEN_KEY, token.as_str())?;
        self.token = Some(token);
        Ok(())
    }

    /// トークンを破棄する
    ///
    /// メモリ上のトークンは永続ストレージの削除結果に関わらず破棄される。
    pub fn logout(&mut self) -> Result<()> {
        self.token = None;
        self.storage.remove(TOKEN_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&Credential> {
        self.token.as_ref()
    }

    /// 指定トークンが現在有効なトークンか
    pub fn holds(&self, credential: &Credential) -> bool {
        self.token.as_ref() == Some(credential)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct ReadOnlyStorage;

    impl KeyValueStorage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Option<String> {
            Some("stale".to_string())
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("quota exceeded".into()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage("read only".into()))
        }
    }

    #[test]
    fn test_restore_without_token_is_logged_out() {
        let session = SessionStore::restore(MemoryStorage::new());
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_restore_picks_up_persisted_token() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "abc123").unwrap();

        let session = SessionStore::restore(storage);
        assert!(session.is_authenticated());
        assert_eq!(session.token().map(Credential::as_str), Some("abc123"));
    }

    #[test]
    fn test_restore_ignores_blank_token() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "  ").unwrap();
        assert!(!SessionStore::restore(storage).is_authenticated());
    }

    #[test]
    fn test_login_persists_and_logout_clears() {
        let storage = MemoryStorage::new();
        let mut session = SessionStore::restore(storage.clone());

        session.login(Credential::new("abc123")).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("abc123"));

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[test]
    fn test_login_replaces_previous_token() {
        let mut session = SessionStore::restore(MemoryStorage::new());
        session.login(Credential::new("first")).unwrap();
        session.login(Credential::new("second")).unwrap();

        assert!(session.holds(&Credential::new("second")));
        assert!(!session.holds(&Credential::new("first")));
    }

    #[test]
    fn test_failed_persist_does_not_log_in() {
        let mut session = SessionStore {
            storage: ReadOnlyStorage,
            token: None,
        };
        assert!(session.login(Credential::new("abc")).is_err());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_logout_clears_memory_even_if_storage_fails() {
        let mut session = SessionStore::restore(ReadOnlyStorage);
        assert!(session.is_authenticated());

        assert!(session.logout().is_err());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_credential_debug_hides_token() {
        let credential = Credential::new("secret-token");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
        assert_eq!(credential.bearer(), "Bearer secret-token");
    }
}
