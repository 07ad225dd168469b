//! 製品登録フォーム

use crate::app::use_app;
use catalog_common::{Action, ProductDraft};
use leptos::prelude::*;

#[component]
pub fn ProductForm() -> impl IntoView {
    let ctx = use_app();
    let company_name = RwSignal::new(String::new());
    let product_name = RwSignal::new(String::new());
    let product_type = RwSignal::new(String::new());
    let datasheet_path = RwSignal::new(String::new());
    let specs = RwSignal::new(String::new());
    let fields = [company_name, product_name, product_type, datasheet_path, specs];

    let on_save = move |_| {
        if ctx.is_busy(Action::SaveProduct) {
            return;
        }
        let draft = ProductDraft {
            company_name: company_name.get_untracked(),
            product_name: product_name.get_untracked(),
            product_type: product_type.get_untracked(),
            datasheet_path: datasheet_path.get_untracked(),
            specs: specs.get_untracked(),
        };
        let name = draft.product_name.trim().to_string();

        ctx.perform(
            Action::SaveProduct,
            move |client| async move { client.save_product(&draft).await },
            move |_| {
                for field in fields {
                    field.set(String::new());
                }
                gloo::dialogs::alert(&format!("Product \"{}\" saved successfully!", name));
            },
        );
    };

    let text_input = move |id: &'static str, label: &'static str, placeholder: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-group">
                <label for=id>{label}</label>
                <input
                    type="text"
                    id=id
                    placeholder=placeholder
                    prop:value=move || value.get()
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </div>
        }
    };

    view! {
        <section class="product-form">
            <h2>"Add Product"</h2>
            {text_input("company-name", "Company Name *", "", company_name)}
            {text_input("product-name", "Product Name *", "", product_name)}
            {text_input("product-type", "Product Type *", "", product_type)}
            {text_input("datasheet-path", "Datasheet Path", "N/A", datasheet_path)}
            <div class="form-group">
                <label for="specs">"Specifications *"</label>
                <textarea
                    id="specs"
                    rows="4"
                    prop:value=move || specs.get()
                    on:input=move |ev| specs.set(event_target_value(&ev))
                />
            </div>
            <button
                class="btn btn-primary"
                disabled=move || ctx.is_busy(Action::SaveProduct)
                on:click=on_save
            >
                {move || ctx.label(Action::SaveProduct)}
            </button>
        </section>
    }
}
