//! メインアプリケーションコンポーネント
//!
//! 状態はすべて `CatalogClient` が持つ。画面は操作のたびに `screen` シグナルへ射影し直す。

use crate::api::FetchGateway;
use crate::components::{
    header::{AboutPopup, Header},
    login_form::LoginForm,
    product_form::ProductForm,
    product_table::ProductTable,
    search_panel::SearchPanel,
    upload_area::UploadArea,
};
use crate::storage::BrowserStorage;
use catalog_common::{Action, CatalogClient, Notice, Screen, Theme};
use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos::task::spawn_local;
use std::future::Future;
use std::rc::Rc;

pub type Client = CatalogClient<FetchGateway, BrowserStorage>;

/// コンポーネント間で共有するハンドル
#[derive(Clone, Copy)]
pub struct AppContext {
    client: StoredValue<Rc<Client>, LocalStorage>,
    pub screen: RwSignal<Screen>,
    pub theme: RwSignal<Theme>,
    pub about_open: RwSignal<bool>,
    busy: RwSignal<Vec<Action>>,
}

impl AppContext {
    fn new() -> Self {
        let client = Rc::new(CatalogClient::new(FetchGateway::same_origin(), BrowserStorage));
        let screen = RwSignal::new(client.screen());
        Self {
            client: StoredValue::new_local(client),
            screen,
            theme: RwSignal::new(Theme::load(&BrowserStorage)),
            about_open: RwSignal::new(false),
            busy: RwSignal::new(Vec::new()),
        }
    }

    pub fn client(&self) -> Rc<Client> {
        self.client.get_value()
    }

    /// クライアントの状態を画面に反映する
    pub fn sync(&self) {
        self.screen.set(self.client().screen());
    }

    pub fn is_busy(&self, action: Action) -> bool {
        self.busy.with(|busy| busy.contains(&action))
    }

    pub fn label(&self, action: Action) -> &'static str {
        button_label(action, self.is_busy(action))
    }

    pub fn notify(&self, notice: &Notice) {
        let text = notice.to_string();
        if notice.is_error() {
            gloo::console::error!(text.clone());
        } else {
            gloo::console::log!(text.clone());
        }
        gloo::dialogs::alert(&text);
    }

    pub fn logout(&self) {
        self.client().logout();
        self.sync();
    }

    pub fn toggle_theme(&self) {
        match Theme::toggle(&BrowserStorage) {
            Ok(theme) => self.theme.set(theme),
            Err(e) => gloo::console::error!(format!("failed to save theme: {}", e)),
        }
    }

    /// 非同期操作を実行する
    ///
    /// 実行中は `action` のボタンを待機表示にし、結果に関わらず元に戻す。
    /// 失敗は通知する（認証切れならこの時点でログイン画面に戻っている）。
    pub fn perform<T, Fut>(
        &self,
        action: Action,
        task: impl FnOnce(Rc<Client>) -> Fut + 'static,
        on_success: impl FnOnce(T) + 'static,
    ) where
        T: 'static,
        Fut: Future<Output = Result<T, Notice>> + 'static,
    {
        let ctx = *self;
        let client = self.client();
        ctx.busy.update(|busy| busy.push(action));

        spawn_local(async move {
            let outcome = task(client).await;

            ctx.busy.update(|busy| {
                if let Some(index) = busy.iter().position(|a| *a == action) {
                    busy.remove(index);
                }
            });
            ctx.sync();

            match outcome {
                Ok(value) => on_success(value),
                Err(notice) => ctx.notify(&notice),
            }
        });
    }
}

pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}

pub fn button_label(action: Action, busy: bool) -> &'static str {
    if busy {
        action.busy_label()
    } else {
        action.idle_label()
    }
}

/// `<body>` の `dark` クラスでテーマを切り替える
fn apply_theme(theme: Theme) {
    let body = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body());
    if let Some(body) = body {
        let _ = body
            .class_list()
            .toggle_with_force("dark", theme == Theme::Dark);
    }
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new();
    provide_context(ctx);

    Effect::new(move |_| apply_theme(ctx.theme.get()));

    let logged_in = move || ctx.screen.with(|screen| matches!(screen, Screen::Main(_)));

    view! {
        <div class="container">
            <Header />

            <Show
                when=logged_in
                fallback=|| view! { <LoginForm /> }
            >
                <main class="main-content">
                    <SearchPanel />
                    <ProductTable />
                    <div class="side-by-side">
                        <ProductForm />
                        <UploadArea />
                    </div>
                </main>
            </Show>

            <AboutPopup />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_label() {
        assert_eq!(button_label(Action::Search, false), "Search");
        assert_eq!(button_label(Action::Search, true), "Searching...");
        assert_eq!(button_label(Action::DownloadDatasheet, true), "Downloading...");
    }
}
