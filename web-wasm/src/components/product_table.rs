//! 検索結果テーブルとページ送り

use crate::api::js_message;
use crate::app::{button_label, use_app};
use crate::download::{file_name_for, save_blob};
use catalog_common::types::NOT_AVAILABLE;
use catalog_common::view::{DownloadTarget, PageButton};
use catalog_common::{Action, Notice, ProductRow, ResultsView, Screen};
use leptos::prelude::*;
use leptos::task::spawn_local;

const COLUMNS: [&str; 8] = [
    "Company",
    "Name",
    "Type",
    "Match Score",
    "Directory",
    "Datasheet Path",
    "Specs",
    "Datasheet",
];

#[component]
pub fn ProductTable() -> impl IntoView {
    let ctx = use_app();
    let results = move || match ctx.screen.get() {
        Screen::Main(view) => view,
        Screen::LoggedOut => ResultsView::NotSearched,
    };

    view! {
        <section class="results">
            <h2>"Results"</h2>
            {move || match results() {
                ResultsView::NotSearched => view! {
                    <p class="text-muted">"Search by requirements or show all products."</p>
                }
                .into_any(),
                ResultsView::Empty { message } => view! {
                    <table class="products-table">
                        <TableHead />
                        <tbody>
                            <tr>
                                <td colspan="8" class="empty-row">{message}</td>
                            </tr>
                        </tbody>
                    </table>
                }
                .into_any(),
                ResultsView::Page { rows, pages, current_page, total } => view! {
                    <table class="products-table">
                        <TableHead />
                        <tbody>
                            {rows
                                .into_iter()
                                .map(|row| view! { <ProductRowView row=row /> })
                                .collect_view()}
                        </tbody>
                    </table>
                    <p class="text-muted">
                        {format!("Page {} of {} ({} products)", current_page, pages.len(), total)}
                    </p>
                    <Pagination pages=pages />
                }
                .into_any(),
            }}
        </section>
    }
}

#[component]
fn TableHead() -> impl IntoView {
    view! {
        <thead>
            <tr>
                {COLUMNS.iter().map(|c| view! { <th>{*c}</th> }).collect_view()}
            </tr>
        </thead>
    }
}

#[component]
fn ProductRowView(row: ProductRow) -> impl IntoView {
    let datasheet = match row.download {
        Some(target) => view! { <DownloadButton target=target /> }.into_any(),
        None => view! { <span>{NOT_AVAILABLE}</span> }.into_any(),
    };

    view! {
        <tr>
            <td>{row.company}</td>
            <td>{row.name}</td>
            <td>{row.product_type}</td>
            <td>{row.match_score}</td>
            <td>{row.directory}</td>
            <td>{row.datasheet_path}</td>
            <td class="specs">{row.specs}</td>
            <td>{datasheet}</td>
        </tr>
    }
}

/// 行ごとのダウンロードボタン（押したボタンだけ待機表示になる）
#[component]
fn DownloadButton(target: DownloadTarget) -> impl IntoView {
    let ctx = use_app();
    let busy = RwSignal::new(false);

    let on_click = move |_| {
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        let client = ctx.client();
        let target = target.clone();

        spawn_local(async move {
            let outcome = client.download_datasheet(target.product_id).await;
            busy.set(false);

            match outcome {
                Ok(file) => {
                    let name = file_name_for(
                        target.product_id,
                        &target.file_name,
                        file.content_disposition.as_deref(),
                    );
                    if let Err(e) = save_blob(&file.blob, &name) {
                        ctx.notify(&Notice::Failed {
                            action: Action::DownloadDatasheet,
                            message: js_message(&e),
                        });
                    }
                }
                Err(notice) => {
                    ctx.sync();
                    ctx.notify(&notice);
                }
            }
        });
    };

    view! {
        <button
            class="btn btn-link"
            disabled=move || busy.get()
            on:click=on_click
        >
            {move || button_label(Action::DownloadDatasheet, busy.get())}
        </button>
    }
}

#[component]
fn Pagination(pages: Vec<PageButton>) -> impl IntoView {
    let ctx = use_app();

    view! {
        <div class="pagination">
            {pages
                .into_iter()
                .map(|page| {
                    let number = page.number;
                    view! {
                        <button
                            class=if page.active { "page-btn active" } else { "page-btn" }
                            on:click=move |_| {
                                ctx.client().set_page(number);
                                ctx.sync();
                            }
                        >
                            {number}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}
