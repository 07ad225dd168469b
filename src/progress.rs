//! 実行中表示（スピナー）
//!
//! ガードが破棄されると必ず消える。成功・失敗・途中終了のどれでも待機表示は残らない。

use catalog_common::Action;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

pub struct BusyIndicator {
    bar: ProgressBar,
}

impl BusyIndicator {
    pub fn start(action: Action) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(action.busy_label());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// 非表示（テスト・パイプ出力用）
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Drop for BusyIndicator {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// スピナーを出しながら待つ
pub async fn with_busy<F: Future>(action: Action, future: F) -> F::Output {
    let _busy = BusyIndicator::start(action);
    future.await
}
