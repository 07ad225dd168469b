//! データシートアップロードエリア

use crate::api::js_message;
use crate::app::use_app;
use crate::download::read_file;
use catalog_common::{Action, DatasheetFile, Notice};
use leptos::html;
use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use web_sys::{DragEvent, File};

#[component]
pub fn UploadArea() -> impl IntoView {
    let ctx = use_app();
    let input_ref: NodeRef<html::Input> = NodeRef::new();
    let dropped: StoredValue<Option<File>, LocalStorage> = StoredValue::new_local(None);
    let (selected_name, set_selected_name) = signal(None::<String>);
    let (is_dragover, set_is_dragover) = signal(false);

    let clear_selection = move || {
        dropped.set_value(None);
        set_selected_name.set(None);
        if let Some(input) = input_ref.get_untracked() {
            input.set_value("");
        }
    };

    // ドロップされたファイルを優先し、無ければファイル選択欄
    let selected_file = move || {
        dropped.get_value().or_else(|| {
            input_ref
                .get_untracked()
                .and_then(|input| input.files())
                .and_then(|files| files.get(0))
        })
    };

    let on_upload = move |_| {
        if ctx.is_busy(Action::UploadDatasheet) {
            return;
        }
        let file = selected_file();

        ctx.perform(
            Action::UploadDatasheet,
            move |client| async move {
                let datasheet = match file {
                    Some(file) => read_file(&file).await.map_err(|e| Notice::Failed {
                        action: Action::UploadDatasheet,
                        message: js_message(&e),
                    })?,
                    // 未選択は送信前の検証で弾かれる
                    None => DatasheetFile::default(),
                };
                client.upload_datasheet(&datasheet).await?;
                // 直近の検索があればやり直して新しいデータシートを結果に含める
                let refreshed = client.refresh().await;
                Ok::<_, Notice>((datasheet.file_name, refreshed))
            },
            move |(file_name, refreshed)| {
                clear_selection();
                gloo::dialogs::alert(&format!(
                    "Datasheet \"{}\" uploaded and processed successfully!",
                    file_name
                ));
                if let Some(Err(notice)) = refreshed {
                    ctx.notify(&notice);
                }
            },
        );
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(false);
        let file = ev
            .data_transfer()
            .and_then(|dt| dt.files())
            .and_then(|files| files.get(0));
        if let Some(file) = file {
            set_selected_name.set(Some(file.name()));
            dropped.set_value(Some(file));
        }
    };

    view! {
        <section class="upload-section">
            <h2>"Upload Datasheet"</h2>
            <div
                class=move || if is_dragover.get() { "upload-area dragover" } else { "upload-area" }
                on:drop=on_drop
                on:dragover=move |ev: DragEvent| {
                    ev.prevent_default();
                    set_is_dragover.set(true);
                }
                on:dragleave=move |_: DragEvent| set_is_dragover.set(false)
            >
                <div class="upload-icon">"📄"</div>
                <p>"Drop a PDF datasheet here or choose a file"</p>
                <input
                    type="file"
                    id="datasheet-upload"
                    accept=".pdf,application/pdf"
                    node_ref=input_ref
                    on:change=move |_| {
                        dropped.set_value(None);
                        let name = input_ref
                            .get_untracked()
                            .and_then(|input| input.files())
                            .and_then(|files| files.get(0))
                            .map(|file| file.name());
                        set_selected_name.set(name);
                    }
                />
                <p class="text-muted">
                    {move || selected_name.get().unwrap_or_else(|| "No file selected".to_string())}
                </p>
            </div>
            <button
                class="btn btn-primary"
                disabled=move || ctx.is_busy(Action::UploadDatasheet)
                on:click=on_upload
            >
                {move || ctx.label(Action::UploadDatasheet)}
            </button>
        </section>
    }
}
