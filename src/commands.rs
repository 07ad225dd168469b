//! 各コマンドの処理（ワンショット実行と対話モードで共用）

use crate::cli::FilterArgs;
use crate::config::Config;
use crate::datasheet::save_datasheet;
use crate::error::{ClientError, Result};
use crate::gateway::HttpGateway;
use crate::progress::with_busy;
use crate::render;
use crate::storage::FileStorage;
use catalog_common::{
    Action, CatalogClient, DatasheetFile, Notice, ProductDraft, ProductId, SaveAck, SearchOutcome,
    Theme, UploadAck,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub type Client = CatalogClient<HttpGateway, FileStorage>;

/// 設定と永続ストレージからクライアントを組み立てる
pub fn connect(config: &Config) -> Result<Client> {
    let gateway = HttpGateway::new(config)?;
    let storage = FileStorage::open(Config::storage_path()?);
    debug!("storage: {}", storage.path().display());
    Ok(CatalogClient::new(gateway, storage))
}

pub async fn login(client: &Client, username: &str, password: &str) -> Result<()> {
    with_busy(Action::Login, client.login(username, password)).await?;
    Ok(())
}

pub async fn search(client: &Client, requirements: &str) -> Result<SearchOutcome> {
    Ok(with_busy(Action::Search, client.search(requirements)).await?)
}

pub async fn list(client: &Client) -> Result<SearchOutcome> {
    Ok(with_busy(Action::ListProducts, client.list_products()).await?)
}

/// 絞り込みとページを適用する。存在しないページはエラー。
pub fn apply_view(client: &Client, filter: &FilterArgs) -> Result<()> {
    client.set_filter(filter.criteria());
    goto_page(client, filter.page)
}

pub fn goto_page(client: &Client, page: usize) -> Result<()> {
    let total = client.with_results(|r| r.total_pages());
    if page == 0 || page > total.max(1) {
        return Err(ClientError::PageOutOfRange { page, total });
    }
    client.set_page(page);
    Ok(())
}

/// 現在の画面を出力する（`json` なら表示中ページの製品をJSONで）
pub fn print_results(client: &Client, json: bool) -> Result<()> {
    if json {
        let visible = client.with_results(|r| r.visible_slice().to_vec());
        println!("{}", serde_json::to_string_pretty(&visible)?);
    } else {
        println!("{}", render::render_screen(&client.screen()));
    }
    Ok(())
}

pub async fn save(client: &Client, draft: &ProductDraft) -> Result<SaveAck> {
    let ack = with_busy(Action::SaveProduct, client.save_product(draft)).await?;
    Ok(ack)
}

/// ファイルを読み込んでアップロードする
pub async fn upload(client: &Client, file: &Path) -> Result<UploadAck> {
    if !file.is_file() {
        return Err(ClientError::FileNotFound(file.display().to_string()));
    }
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let bytes = tokio::fs::read(file).await?;
    info!("uploading {} ({} bytes)", file_name, bytes.len());

    let datasheet = DatasheetFile::new(file_name, bytes);
    let ack = with_busy(Action::UploadDatasheet, client.upload_datasheet(&datasheet)).await?;
    Ok(ack)
}

/// データシートを `out` に保存する
///
/// `datasheet_path` が無ければ現在の結果から同じIDの製品を探して使う。
pub async fn download(
    client: &Client,
    product_id: ProductId,
    datasheet_path: Option<&str>,
    out: &Path,
) -> Result<PathBuf> {
    let known_path = match datasheet_path {
        Some(path) => Some(path.to_string()),
        None => client.with_results(|r| {
            r.result()
                .iter()
                .find(|p| p.id == Some(product_id))
                .and_then(|p| p.datasheet_path.clone())
        }),
    };

    let saved = with_busy(Action::DownloadDatasheet, async {
        let response = client.download_datasheet(product_id).await?;
        save_datasheet(response, product_id, known_path.as_deref(), out).await
    })
    .await?;
    Ok(saved)
}

/// アップロード成功時のメッセージ
pub fn upload_message(ack: &UploadAck) -> String {
    match (ack.product_id, ack.datasheet_path.as_deref()) {
        (Some(id), Some(path)) => format!("Datasheet uploaded (product {id}, {path})"),
        (Some(id), None) => format!("Datasheet uploaded (product {id})"),
        _ => "Datasheet uploaded".to_string(),
    }
}

pub fn theme(client: &Client, toggle: bool) -> Result<Theme> {
    client.with_storage(|storage| {
        if toggle {
            Ok(Theme::toggle(storage)?)
        } else {
            Ok(Theme::load(storage))
        }
    })
}

/// 検索結果の件数表示
pub fn outcome_message(outcome: SearchOutcome) -> Notice {
    match outcome {
        SearchOutcome::Applied { total, .. } => Notice::Info(format!("{total} products")),
        SearchOutcome::Discarded => Notice::Info("Result discarded (session changed)".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_message() {
        let ack = UploadAck {
            product_id: Some(4),
            datasheet_path: Some("uploads/md10.pdf".into()),
        };
        assert_eq!(upload_message(&ack), "Datasheet uploaded (product 4, uploads/md10.pdf)");
        assert_eq!(upload_message(&UploadAck::default()), "Datasheet uploaded");
    }

    #[test]
    fn test_outcome_message() {
        let notice = outcome_message(SearchOutcome::Applied { total: 7, visible: 5 });
        assert_eq!(notice.to_string(), "7 products");
        assert!(!outcome_message(SearchOutcome::Discarded).is_error());
    }
}
