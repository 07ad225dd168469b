//! 端末への描画
//!
//! 画面の射影（`Screen` / `ResultsView`）をテキストにする。状態は持たない。

use catalog_common::view::{PageButton, ProductRow};
use catalog_common::{ResultsView, Screen};

const HEADERS: [&str; 8] = [
    "ID", "Company", "Name", "Type", "Match", "Directory", "Datasheet", "Specs",
];

fn cells(row: &ProductRow) -> [String; 8] {
    [
        row.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
        row.company.clone(),
        row.name.clone(),
        row.product_type.clone(),
        row.match_score.clone(),
        row.directory.clone(),
        row.datasheet_path.clone(),
        row.specs.clone(),
    ]
}

fn render_line(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// 列幅を揃えた表
pub fn render_table(rows: &[ProductRow]) -> String {
    let body: Vec<[String; 8]> = rows.iter().map(cells).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = vec![
        render_line(&HEADERS, &widths),
        render_line(&rule.iter().map(String::as_str).collect::<Vec<_>>(), &widths),
    ];
    for row in &body {
        out.push(render_line(&row.each_ref().map(String::as_str), &widths));
    }
    out.join("\n")
}

/// ページ番号の並び。現在ページは角括弧で囲む。
pub fn render_pages(pages: &[PageButton]) -> String {
    pages
        .iter()
        .map(|p| {
            if p.active {
                format!("[{}]", p.number)
            } else {
                p.number.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_results(view: &ResultsView) -> String {
    match view {
        ResultsView::NotSearched => "No search yet. Use `search <requirements>`.".to_string(),
        ResultsView::Empty { message } => message.to_string(),
        ResultsView::Page {
            rows,
            pages,
            current_page,
            total,
        } => format!(
            "{}\n\nPage {} of {} ({} products)  {}",
            render_table(rows),
            current_page,
            pages.len(),
            total,
            render_pages(pages)
        ),
    }
}

pub fn render_screen(screen: &Screen) -> String {
    match screen {
        Screen::LoggedOut => "Not logged in. Run `catalog login` first.".to_string(),
        Screen::Main(view) => render_results(view),
    }
}
