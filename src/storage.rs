//! 永続キーバリューストレージ（JSONファイル）
//!
//! ブラウザの localStorage と同じ役割。変更のたびにファイル全体を書き直す。

use catalog_common::{Error, KeyValueStorage};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl FileStorage {
    /// ファイルを開く。無い・壊れている場合は空として扱う。
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::read(&path).unwrap_or_default();
        Self {
            path,
            entries: RefCell::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Option<BTreeMap<String, String>> {
        if !path.exists() {
            return None;
        }
        let file = File::open(path).ok()?;
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!("ignoring unreadable storage file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn flush(&self) -> catalog_common::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &*self.entries.borrow())?;
        writer.flush()?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> catalog_common::Result<()> {
        if key.is_empty() {
            return Err(Error::Storage("empty key".into()));
        }
        let previous = self
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.flush().inspect_err(|_| {
            // 書けなかったらメモリ上も元に戻す
            let mut entries = self.entries.borrow_mut();
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
        })
    }

    fn remove(&self, key: &str) -> catalog_common::Result<()> {
        let removed = self.entries.borrow_mut().remove(key);
        if let Some(value) = removed {
            self.flush().inspect_err(|_| {
                self.entries.borrow_mut().insert(key.to_string(), value);
            })?;
        }
        Ok(())
    }
}
