//! 対話モード
//!
//! 検索結果をメモリに保持したまま、絞り込み・ページ移動・ダウンロードを続けて行う。
//! 認証切れになった時点でログアウト画面に戻り、ループを抜ける。

use crate::commands::{self, Client};
use crate::error::{ClientError, Result};
use catalog_common::{FilterCriteria, Notice, ProductId};
use dialoguer::Input;
use std::path::{Path, PathBuf};

/// 対話コマンド
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// 要件で検索
    Search(String),
    /// 全製品を読み込む
    List,
    /// 絞り込み条件を置き換える
    Filter(FilterCriteria),
    /// ページ移動
    Page(usize),
    Next,
    Prev,
    /// データシート保存
    Download(ProductId),
    /// アップロード（成功したら直近の検索をやり直す）
    Upload(PathBuf),
    /// 現在の画面を再表示
    Show,
    Help,
    Logout,
    Quit,
    /// 解釈できない入力
    Unknown(String),
}

const HELP: &str = "\
commands:
  search <requirements>              semantic search
  list                               load every product
  filter [company=..] [type=..] [min=..]  replace filters (no args clears)
  page <n> | next | prev             move between pages
  download <product id>              save the datasheet
  upload <file>                      upload a datasheet, then search again
  show | help | logout | quit";

/// 1行を解釈する
pub fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_lowercase().as_str() {
        "search" | "s" => ShellCommand::Search(rest.to_string()),
        "list" | "ls" => ShellCommand::List,
        "filter" | "f" => ShellCommand::Filter(parse_filter(rest)),
        "page" | "p" => match rest.parse() {
            Ok(page) => ShellCommand::Page(page),
            Err(_) => ShellCommand::Unknown(line.to_string()),
        },
        "next" | "n" => ShellCommand::Next,
        "prev" => ShellCommand::Prev,
        "download" | "d" => match rest.parse() {
            Ok(id) => ShellCommand::Download(id),
            Err(_) => ShellCommand::Unknown(line.to_string()),
        },
        "upload" | "u" if !rest.is_empty() => ShellCommand::Upload(PathBuf::from(rest)),
        "" | "show" => ShellCommand::Show,
        "help" | "?" => ShellCommand::Help,
        "logout" => ShellCommand::Logout,
        "quit" | "q" | "exit" => ShellCommand::Quit,
        _ => ShellCommand::Unknown(line.to_string()),
    }
}

/// `company=acme type=driver min=50` 形式
fn parse_filter(args: &str) -> FilterCriteria {
    let (mut company, mut product_type, mut min_score) = ("", "", "");
    for pair in args.split_whitespace() {
        match pair.split_once('=') {
            Some(("company", value)) => company = value,
            Some(("type", value)) => product_type = value,
            Some(("min", value)) | Some(("min_score", value)) => min_score = value,
            _ => {}
        }
    }
    FilterCriteria::from_inputs(company, product_type, min_score)
}

/// 対話ループ
pub async fn run_shell(client: &Client, download_dir: &Path) -> Result<()> {
    println!("🔎 catalog shell ('help' for commands)\n");
    println!("{}", crate::render::render_screen(&client.screen()));

    loop {
        let input: String = Input::new()
            .with_prompt("catalog")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ClientError::Prompt(e.to_string()))?;

        let command = parse_command(&input);
        if command == ShellCommand::Quit {
            break;
        }

        match execute(client, command, download_dir).await {
            Ok(Some(message)) => println!("{}", message),
            Ok(None) => {}
            Err(e) => eprintln!("✗ {}", e),
        }

        if !client.is_authenticated() {
            println!("{}", crate::render::render_screen(&client.screen()));
            break;
        }
    }

    Ok(())
}

async fn execute(client: &Client, command: ShellCommand, download_dir: &Path) -> Result<Option<String>> {
    let message = match command {
        ShellCommand::Search(requirements) => {
            let outcome = commands::search(client, &requirements).await?;
            show(client, commands::outcome_message(outcome))
        }
        ShellCommand::List => {
            let outcome = commands::list(client).await?;
            show(client, commands::outcome_message(outcome))
        }
        ShellCommand::Filter(criteria) => {
            client.set_filter(criteria);
            render(client)
        }
        ShellCommand::Page(page) => {
            commands::goto_page(client, page)?;
            render(client)
        }
        ShellCommand::Next => {
            let current = client.with_results(|r| r.current_page());
            commands::goto_page(client, current + 1)?;
            render(client)
        }
        ShellCommand::Prev => {
            let current = client.with_results(|r| r.current_page());
            commands::goto_page(client, current.saturating_sub(1))?;
            render(client)
        }
        ShellCommand::Download(id) => {
            let saved = commands::download(client, id, None, download_dir).await?;
            format!("✔ saved {}", saved.display())
        }
        ShellCommand::Upload(file) => {
            let ack = commands::upload(client, &file).await?;
            let uploaded = format!("✔ {}", commands::upload_message(&ack));
            let refreshed = client.refresh().await.map(|result| {
                result
                    .map(|outcome| show(client, commands::outcome_message(outcome)))
                    .map_err(ClientError::from)
            });
            upload_report(uploaded, refreshed)
        }
        ShellCommand::Show => render(client),
        ShellCommand::Help => HELP.to_string(),
        ShellCommand::Logout => {
            client.logout();
            "✔ logged out".to_string()
        }
        ShellCommand::Quit => return Ok(None),
        ShellCommand::Unknown(line) => {
            return Err(Notice::Info(format!("unknown command: {line} ('help' for commands)")).into())
        }
    };
    Ok(Some(message))
}

/// 再検索に失敗してもアップロード成功の表示は残す
fn upload_report(uploaded: String, refreshed: Option<Result<String>>) -> String {
    match refreshed {
        None => uploaded,
        Some(Ok(summary)) => format!("{uploaded}\n{summary}"),
        Some(Err(e)) => format!("{uploaded}\n✗ {e}"),
    }
}

fn render(client: &Client) -> String {
    crate::render::render_screen(&client.screen())
}

fn show(client: &Client, summary: Notice) -> String {
    format!("{}\n{}", summary, render(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_report_keeps_confirmation_when_refresh_fails() {
        let uploaded = "✔ Datasheet uploaded".to_string();
        let failed = Some(Err(ClientError::from(Notice::SessionExpired)));

        let report = upload_report(uploaded.clone(), failed);
        assert!(report.starts_with("✔ Datasheet uploaded\n✗ "));
        assert!(report.contains("log in again"));

        assert_eq!(upload_report(uploaded.clone(), None), uploaded);
        assert_eq!(
            upload_report(uploaded, Some(Ok("1 product".into()))),
            "✔ Datasheet uploaded\n1 product"
        );
    }

    #[test]
    fn test_parse_search_keeps_text() {
        assert_eq!(
            parse_command("search  10A motor driver "),
            ShellCommand::Search("10A motor driver".into())
        );
        assert_eq!(parse_command("search"), ShellCommand::Search(String::new()));
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_command("filter company=Acme min=50"),
            ShellCommand::Filter(FilterCriteria::new("acme", "", Some(50.0)))
        );
        assert_eq!(parse_command("filter"), ShellCommand::Filter(FilterCriteria::default()));
    }

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_command("page 3"), ShellCommand::Page(3));
        assert_eq!(parse_command("n"), ShellCommand::Next);
        assert!(matches!(parse_command("page x"), ShellCommand::Unknown(_)));
    }

    #[test]
    fn test_parse_download_and_upload() {
        assert_eq!(parse_command("download 12"), ShellCommand::Download(12));
        assert_eq!(
            parse_command("upload ./md10.pdf"),
            ShellCommand::Upload(PathBuf::from("./md10.pdf"))
        );
        assert!(matches!(parse_command("upload"), ShellCommand::Unknown(_)));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_command(""), ShellCommand::Show);
        assert_eq!(parse_command("QUIT"), ShellCommand::Quit);
        assert_eq!(parse_command("logout"), ShellCommand::Logout);
        assert!(matches!(parse_command("frobnicate"), ShellCommand::Unknown(_)));
    }
}
