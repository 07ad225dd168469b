use clap::{Args, Parser, Subcommand};
use catalog_common::FilterCriteria;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "製品カタログ検索・データシート管理クライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// 検索結果の絞り込み条件
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// 会社名（部分一致、大文字小文字無視）
    #[arg(long)]
    pub company: Option<String>,

    /// 製品種別（部分一致、大文字小文字無視）
    #[arg(long = "type")]
    pub product_type: Option<String>,

    /// 一致度の下限（0〜100、0は制約なし）
    #[arg(long)]
    pub min_score: Option<f64>,

    /// 表示ページ
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// 表示中のページをJSONで出力
    #[arg(long)]
    pub json: bool,
}

impl FilterArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new(
            self.company.as_deref().unwrap_or_default(),
            self.product_type.as_deref().unwrap_or_default(),
            self.min_score,
        )
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// ログインしてトークンを保存
    Login {
        /// ユーザー名（省略時は対話入力）
        #[arg(short, long)]
        username: Option<String>,

        /// パスワード（省略時は対話入力）
        #[arg(short, long)]
        password: Option<String>,
    },

    /// 保存済みトークンを破棄
    Logout,

    /// ログイン状態と接続先を表示
    Status,

    /// 要件テキストで製品を検索
    Search {
        /// 要件（例: "10A motor driver"）
        #[arg(required = true)]
        requirements: String,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// 全製品を一覧
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// 製品を登録
    Save {
        #[arg(long)]
        company: String,

        #[arg(long)]
        name: String,

        #[arg(long = "type")]
        product_type: String,

        /// 仕様テキスト
        #[arg(long)]
        specs: String,

        /// サーバー上のデータシートパス
        #[arg(long)]
        datasheet_path: Option<String>,
    },

    /// データシートPDFをアップロード
    Upload {
        #[arg(required = true)]
        file: PathBuf,

        /// アップロード後にこの要件で再検索
        #[arg(long)]
        search: Option<String>,
    },

    /// データシートをダウンロード
    Download {
        /// 製品ID
        #[arg(required = true)]
        id: i64,

        /// 製品のデータシートパス（保存ファイル名に使う）
        #[arg(long)]
        path: Option<String>,

        /// 保存先ディレクトリ
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// 表示テーマ
    Theme {
        /// dark/light を切り替える
        #[arg(long)]
        toggle: bool,
    },

    /// 設定
    Config {
        /// 接続先URLを設定
        #[arg(long)]
        set_base_url: Option<String>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 対話モード（検索結果を保持したまま絞り込み・ページ移動）
    Shell,
}
