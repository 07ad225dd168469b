//! 表示テーマ設定（"dark" / "light"、未設定時は dark）

use crate::error::Result;
use crate::session::KeyValueStorage;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// 保存値を読む。空・未保存なら dark、"dark" 以外の値は light。
    pub fn load<S: KeyValueStorage>(storage: &S) -> Self {
        match storage.get(THEME_KEY).as_deref() {
            None | Some("") | Some("dark") => Theme::Dark,
            Some(_) => Theme::Light,
        }
    }

    pub fn save<S: KeyValueStorage>(self, storage: &S) -> Result<()> {
        storage.set(THEME_KEY, self.as_str())
    }

    /// 切り替えて保存し、新しいテーマを返す
    pub fn toggle<S: KeyValueStorage>(storage: &S) -> Result<Self> {
        let next = Self::load(storage).toggled();
        next.save(storage)?;
        Ok(next)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;

    #[test]
    fn test_default_is_dark() {
        assert_eq!(Theme::load(&MemoryStorage::new()), Theme::Dark);
    }

    #[test]
    fn test_toggle_persists() {
        let storage = MemoryStorage::new();
        assert_eq!(Theme::toggle(&storage).unwrap(), Theme::Light);
        assert_eq!(storage.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(Theme::toggle(&storage).unwrap(), Theme::Dark);
        assert_eq!(Theme::load(&storage), Theme::Dark);
    }

    #[test]
    fn test_unknown_value_is_light() {
        let storage = MemoryStorage::new();
        storage.set(THEME_KEY, "solarized").unwrap();
        assert_eq!(Theme::load(&storage), Theme::Light);
    }
}
