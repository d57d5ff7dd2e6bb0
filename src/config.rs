//! 設定
//!
//! 辞書の場所と確認ダイアログの表示設定

use crate::buffer::PromptOptions;
use crate::correction::{DictionaryStore, WordPattern};
use crate::error::{ConfigError, Result};
use crate::host::ViewAnchor;
use std::path::{Path, PathBuf};

/// 辞書パスを指定する環境変数
pub const DICTIONARY_ENV: &str = "YOFIX_DICT";

/// 既定の辞書ファイル名（拡張子なし）
const DEFAULT_DICTIONARY: &str = "yo_dict";

/// 設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 辞書のパス（拡張子なし）
    pub dictionary: PathBuf,
    /// ハイライトと表示位置
    pub prompt: PromptOptions,
    /// 修正対象の文字
    pub target_chars: String,
}

impl Config {
    pub fn new(dictionary: impl Into<PathBuf>) -> Self {
        Self {
            dictionary: dictionary.into(),
            prompt: PromptOptions::default(),
            target_chars: "еЕ".to_string(),
        }
    }

    /// 設定値の文字列から作る
    ///
    /// `~` と環境変数を展開し、拡張子があれば取り除く
    pub fn from_setting(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingSetting {
                key: DICTIONARY_ENV.to_string(),
            }
            .into());
        }

        let expanded = shellexpand::full(raw).map_err(|e| ConfigError::PathExpansion {
            message: e.to_string(),
        })?;
        Ok(Self::new(strip_extension(Path::new(expanded.as_ref()))))
    }

    /// 環境変数から作る。未設定なら設定ディレクトリ内の既定の辞書
    pub fn from_env() -> Result<Self> {
        match std::env::var(DICTIONARY_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Self::from_setting(&raw),
            _ => dirs::config_dir()
                .map(|dir| Self::new(dir.join("yofix").join(DEFAULT_DICTIONARY)))
                .ok_or_else(|| {
                    ConfigError::MissingSetting {
                        key: DICTIONARY_ENV.to_string(),
                    }
                    .into()
                }),
        }
    }

    /// 表示位置の寄せ方を文字列で指定（`top` / `bot`）
    pub fn with_anchor(mut self, anchor: &str) -> Result<Self> {
        self.prompt.anchor = anchor.parse::<ViewAnchor>().map_err(|_| ConfigError::InvalidValue {
            key: "anchor".to_string(),
            value: anchor.to_string(),
        })?;
        Ok(self)
    }

    pub fn with_gap(mut self, gap: usize) -> Self {
        self.prompt.gap = gap;
        self
    }

    pub fn with_highlight_group(mut self, group: impl Into<String>) -> Self {
        self.prompt.highlight_group = group.into();
        self
    }

    /// 修正対象の文字（空は不可）
    pub fn with_target_chars(mut self, chars: &str) -> Result<Self> {
        if chars.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "target_chars".to_string(),
                value: String::new(),
            }
            .into());
        }
        self.target_chars = chars.to_string();
        Ok(self)
    }

    pub fn store(&self) -> DictionaryStore {
        DictionaryStore::new(self.dictionary.clone())
    }

    pub fn word_pattern(&self) -> WordPattern {
        WordPattern::new(&self.target_chars)
    }
}

fn strip_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}
