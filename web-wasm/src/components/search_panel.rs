//! 検索パネル（要件入力・全件表示・絞り込み）

use crate::app::use_app;
use catalog_common::{Action, FilterCriteria};
use leptos::prelude::*;

#[component]
pub fn SearchPanel() -> impl IntoView {
    let ctx = use_app();
    let requirements = RwSignal::new(String::new());
    let company = RwSignal::new(String::new());
    let product_type = RwSignal::new(String::new());
    let min_score = RwSignal::new(String::new());

    let on_search = move |_| {
        if ctx.is_busy(Action::Search) {
            return;
        }
        let requirements = requirements.get_untracked();
        ctx.perform(
            Action::Search,
            move |client| async move { client.search(&requirements).await },
            |_| {},
        );
    };

    let on_list = move |_| {
        if ctx.is_busy(Action::ListProducts) {
            return;
        }
        ctx.perform(
            Action::ListProducts,
            move |client| async move { client.list_products().await },
            |_| {},
        );
    };

    // 絞り込みは手元の結果だけで再計算する（通信なし）
    let refilter = move || {
        let criteria = FilterCriteria::from_inputs(
            &company.get_untracked(),
            &product_type.get_untracked(),
            &min_score.get_untracked(),
        );
        ctx.client().set_filter(criteria);
        ctx.sync();
    };

    let filter_input = move |id: &'static str, label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-group">
                <label for=id>{label}</label>
                <input
                    type=kind
                    id=id
                    prop:value=move || value.get()
                    on:input=move |ev| {
                        value.set(event_target_value(&ev));
                        refilter();
                    }
                />
            </div>
        }
    };

    view! {
        <section class="search-panel">
            <h2>"Find Products"</h2>
            <div class="form-group">
                <label for="requirements-text">"Requirements"</label>
                <textarea
                    id="requirements-text"
                    rows="3"
                    placeholder="e.g. 10A brushed DC motor driver with PWM input"
                    prop:value=move || requirements.get()
                    on:input=move |ev| requirements.set(event_target_value(&ev))
                />
            </div>
            <div class="button-row">
                <button
                    class="btn btn-primary"
                    disabled=move || ctx.is_busy(Action::Search)
                    on:click=on_search
                >
                    {move || ctx.label(Action::Search)}
                </button>
                <button
                    class="btn btn-secondary"
                    disabled=move || ctx.is_busy(Action::ListProducts)
                    on:click=on_list
                >
                    {move || ctx.label(Action::ListProducts)}
                </button>
            </div>
            <div class="filters">
                {filter_input("filter-company", "Company", "text", company)}
                {filter_input("filter-type", "Product Type", "text", product_type)}
                {filter_input("filter-score", "Min. Match Score (%)", "number", min_score)}
            </div>
        </section>
    }
}
