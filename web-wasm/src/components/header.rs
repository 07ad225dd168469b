//! ヘッダーコンポーネント（テーマ切替・ログアウト・About）

use crate::app::use_app;
use catalog_common::{Screen, Theme};
use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    let ctx = use_app();
    let logged_in = move || ctx.screen.with(|screen| matches!(screen, Screen::Main(_)));

    view! {
        <header class="header">
            <h1>"Product Catalog"</h1>
            <nav class="header-nav">
                <a href="/" class="nav-link">"Home"</a>
                <a
                    href="#"
                    class="nav-link"
                    on:click=move |ev| {
                        ev.prevent_default();
                        ctx.about_open.set(true);
                    }
                >
                    "About"
                </a>
                <button
                    class="btn btn-icon"
                    title="Toggle theme"
                    on:click=move |_| ctx.toggle_theme()
                >
                    {move || if ctx.theme.get() == Theme::Dark { "🌙" } else { "☀" }}
                </button>
                <Show when=logged_in>
                    <button class="btn btn-secondary" on:click=move |_| ctx.logout()>
                        "Logout"
                    </button>
                </Show>
            </nav>
        </header>
    }
}

#[component]
pub fn AboutPopup() -> impl IntoView {
    let ctx = use_app();

    view! {
        <Show when=move || ctx.about_open.get()>
            <div class="popup-overlay" on:click=move |_| ctx.about_open.set(false)>
                <div class="popup" on:click=|ev| ev.stop_propagation()>
                    <h2>"About"</h2>
                    <p>
                        "Describe what you need in plain words and the catalog ranks matching "
                        "products by relevance. Add products by hand or upload a PDF datasheet "
                        "to have it processed into the catalog."
                    </p>
                    <button class="btn btn-primary" on:click=move |_| ctx.about_open.set(false)>
                        "Close"
                    </button>
                </div>
            </div>
        </Show>
    }
}
