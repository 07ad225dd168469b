//! ログインフォーム

use crate::app::use_app;
use catalog_common::Action;
use leptos::prelude::*;

#[component]
pub fn LoginForm() -> impl IntoView {
    let ctx = use_app();
    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());

    let on_login = move || {
        if ctx.is_busy(Action::Login) {
            return;
        }
        let (username, password) = (username.get_untracked(), password.get_untracked());
        ctx.perform(
            Action::Login,
            move |client| async move { client.login(&username, &password).await },
            move |_| set_password.set(String::new()),
        );
    };

    view! {
        <section class="login-section">
            <h2>"Login"</h2>
            <div class="form-group">
                <label for="username">"Username"</label>
                <input
                    type="text"
                    id="username"
                    prop:value=move || username.get()
                    on:input=move |ev| set_username.set(event_target_value(&ev))
                />
            </div>
            <div class="form-group">
                <label for="password">"Password"</label>
                <input
                    type="password"
                    id="password"
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                    on:keydown=move |ev| {
                        if ev.key() == "Enter" {
                            on_login();
                        }
                    }
                />
            </div>
            <button
                class="btn btn-primary"
                disabled=move || ctx.is_busy(Action::Login)
                on:click=move |_| on_login()
            >
                {move || ctx.label(Action::Login)}
            </button>
        </section>
    }
}
