//! カタログクライアント（セッション失効コーディネータ）
//!
//! すべてのゲートウェイ呼び出しをここで包む。
//!
//! - 認証失敗（トークン無し / 401）: ログアウト → ログアウト画面へ → 「セッション切れ」通知
//! - それ以外の失敗: セッションは維持し、サーバーの文言をそのまま通知
//!
//! 状態は `RefCell` に置き、`await` をまたいで借用しない。
//! そのため同じクライアントで複数の呼び出しを同時に待てる。
//! 検索結果は後から届いた応答が上書きする（発行順ではない）。

use crate::error::{AuthError, GatewayError};
use crate::gateway::CatalogGateway;
use crate::results::{FilterCriteria, ResultSetController};
use crate::session::{Credential, KeyValueStorage, SessionStore};
use crate::types::{DatasheetFile, Product, ProductDraft, ProductId, SaveAck, UploadAck};
use crate::view::{self, Action, Notice, Screen};
use std::cell::RefCell;
use tracing::{debug, info, warn};

/// 検索・一覧取得の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// 結果を反映した
    Applied { total: usize, visible: usize },
    /// 応答到着前にセッションが変わったため破棄した
    Discarded,
}

pub struct CatalogClient<G, S> {
    gateway: G,
    session: RefCell<SessionStore<S>>,
    results: RefCell<ResultSetController>,
    last_query: RefCell<Option<String>>,
}

impl<G, S> CatalogClient<G, S>
where
    G: CatalogGateway,
    S: KeyValueStorage,
{
    /// 永続ストレージからセッションを復元して作る
    pub fn new(gateway: G, storage: S) -> Self {
        Self {
            gateway,
            session: RefCell::new(SessionStore::restore(storage)),
            results: RefCell::new(ResultSetController::new()),
            last_query: RefCell::new(None),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_authenticated()
    }

    pub fn token(&self) -> Option<Credential> {
        self.session.borrow().token().cloned()
    }

    /// ストレージを参照する（テーマ設定など）
    pub fn with_storage<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(self.session.borrow().storage())
    }

    pub fn with_results<R>(&self, f: impl FnOnce(&ResultSetController) -> R) -> R {
        f(&self.results.borrow())
    }

    pub fn screen(&self) -> Screen {
        view::project(self.is_authenticated(), &self.results.borrow())
    }

    /// 直近に発行した検索語
    pub fn last_query(&self) -> Option<String> {
        self.last_query.borrow().clone()
    }

    pub fn set_filter(&self, criteria: FilterCriteria) {
        self.results.borrow_mut().set_filter(criteria);
    }

    pub fn set_page(&self, page: usize) {
        self.results.borrow_mut().set_page(page);
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), Notice> {
        let (username, password) = (username.trim(), password.trim());
        if username.is_empty() || password.is_empty() {
            return Err(self.reject(
                Action::Login,
                GatewayError::validation("Please enter both username and password."),
            ));
        }

        let outcome = self.gateway.authenticate(username, password).await;
        let credential = self.settle(Action::Login, outcome)?;

        self.session
            .borrow_mut()
            .login(credential)
            .map_err(|e| Notice::Failed {
                action: Action::Login,
                message: e.to_string(),
            })?;
        info!("logged in as {}", username);
        Ok(())
    }

    /// 明示的なログアウト
    pub fn logout(&self) {
        self.end_session();
        info!("logged out");
    }

    pub async fn search(&self, requirements: &str) -> Result<SearchOutcome, Notice> {
        let requirements = requirements.trim();
        if requirements.is_empty() {
            return Err(self.reject(
                Action::Search,
                GatewayError::validation("Please enter requirements to search."),
            ));
        }
        let credential = self.credential(Action::Search)?;
        *self.last_query.borrow_mut() = Some(requirements.to_string());

        debug!("search issued: {:?}", requirements);
        let outcome = self.gateway.search(requirements, &credential).await;
        let products = self.settle(Action::Search, outcome)?;
        Ok(self.apply_result(&credential, products))
    }

    /// 全製品を検索結果として読み込む
    pub async fn list_products(&self) -> Result<SearchOutcome, Notice> {
        let credential = self.credential(Action::ListProducts)?;
        let outcome = self.gateway.list_products(&credential).await;
        let products = self.settle(Action::ListProducts, outcome)?;
        Ok(self.apply_result(&credential, products))
    }

    /// 直近の検索語で再検索する（検索履歴が無ければ何もしない）
    pub async fn refresh(&self) -> Option<Result<SearchOutcome, Notice>> {
        let query = self.last_query()?;
        Some(self.search(&query).await)
    }

    pub async fn save_product(&self, draft: &ProductDraft) -> Result<SaveAck, Notice> {
        let draft = draft
            .validate()
            .map_err(|e| self.reject(Action::SaveProduct, e))?;
        let credential = self.credential(Action::SaveProduct)?;

        let outcome = self.gateway.save_product(&draft, &credential).await;
        let ack = self.settle(Action::SaveProduct, outcome)?;
        info!("product {} saved as id {}", draft.product_name, ack.product_id);
        Ok(ack)
    }

    pub async fn upload_datasheet(&self, file: &DatasheetFile) -> Result<UploadAck, Notice> {
        file.validate()
            .map_err(|e| self.reject(Action::UploadDatasheet, e))?;
        let credential = self.credential(Action::UploadDatasheet)?;

        let outcome = self.gateway.upload_datasheet(file, &credential).await;
        let ack = self.settle(Action::UploadDatasheet, outcome)?;
        info!("datasheet {} uploaded", file.file_name);
        Ok(ack)
    }

    pub async fn download_datasheet(&self, product_id: ProductId) -> Result<G::Datasheet, Notice> {
        let credential = self.credential(Action::DownloadDatasheet)?;
        let outcome = self.gateway.download_datasheet(product_id, &credential).await;
        self.settle(Action::DownloadDatasheet, outcome)
    }

    /// 現在のトークン。無ければ通信せずに失効処理へ。
    fn credential(&self, action: Action) -> Result<Credential, Notice> {
        let token = self.token();
        token.ok_or_else(|| self.reject(action, AuthError::MissingCredential.into()))
    }

    fn settle<T>(&self, action: Action, outcome: Result<T, GatewayError>) -> Result<T, Notice> {
        outcome.map_err(|e| self.reject(action, e))
    }

    /// 失敗を通知に変換する。認証失敗ならセッションを破棄する。
    fn reject(&self, action: Action, error: GatewayError) -> Notice {
        let notice = Notice::from_error(action, &error);
        if notice.is_session_expired() {
            warn!("{:?} failed with auth error, clearing session: {}", action, error);
            self.end_session();
        } else {
            debug!("{:?} failed: {}", action, error);
        }
        notice
    }

    fn end_session(&self) {
        if let Err(e) = self.session.borrow_mut().logout() {
            warn!("failed to clear persisted token: {}", e);
        }
        self.results.borrow_mut().clear();
        *self.last_query.borrow_mut() = None;
    }

    fn apply_result(&self, credential: &Credential, products: Vec<Product>) -> SearchOutcome {
        if !self.session.borrow().holds(credential) {
            warn!("discarding {} products that arrived after the session changed", products.len());
            return SearchOutcome::Discarded;
        }

        let mut results = self.results.borrow_mut();
        results.set_result(products);
        debug!("result applied: {} products, {} after filter", results.result().len(), results.filtered().len());
        SearchOutcome::Applied {
            total: results.filtered().len(),
            visible: results.visible_slice().len(),
        }
    }
}
