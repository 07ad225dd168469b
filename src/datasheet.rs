//! データシートのダウンロード保存

use crate::error::Result;
use catalog_common::gateway::resolve_download_name;
use catalog_common::{Action, Notice, ProductId};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Response;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// レスポンス本文をチャンク単位で `dir` に書き出し、保存先を返す
///
/// 途中で通信が切れた・書き込めなかった場合は書きかけのファイルを消す。
pub async fn save_datasheet(
    mut response: Response,
    product_id: ProductId,
    datasheet_path: Option<&str>,
    dir: &Path,
) -> Result<PathBuf> {
    let disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let file_name = resolve_download_name(product_id, datasheet_path, disposition.as_deref());

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&file_name);
    let file = tokio::fs::File::create(&path).await?;

    match write_body(&mut response, file).await {
        Ok(written) => {
            debug!("wrote {} bytes to {}", written, path.display());
            Ok(path)
        }
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                warn!("failed to remove partial download {}: {}", path.display(), remove_err);
            }
            Err(e)
        }
    }
}

/// 本文を最後まで書き込み、書いたバイト数を返す
async fn write_body(response: &mut Response, mut file: tokio::fs::File) -> Result<usize> {
    let mut written = 0usize;
    while let Some(chunk) = response.chunk().await.map_err(|e| Notice::Connectivity {
        action: Action::DownloadDatasheet,
        detail: e.to_string(),
    })? {
        file.write_all(&chunk).await?;
        written += chunk.len();
    }
    file.flush().await?;
    Ok(written)
}
