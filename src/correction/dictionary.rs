//! ё辞書
//!
//! テキスト辞書 `<base>.txt` をJSONキャッシュ `<base>.json` へコンパイルして読み込む

use crate::error::{DictionaryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// 任意修正の行頭記号
const OPTIONAL_MARKER: char = '*';

/// 辞書キーの正規化（小文字化、ё→е、前後の空白除去）
pub fn normalize_key(word: &str) -> String {
    word.trim().to_lowercase().replace('ё', "е")
}

/// 修正辞書
///
/// キーは `normalize_key` 済みの語形、値は ё で書かれた正しい語形
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    /// 必ず修正する語
    pub necessary: BTreeMap<String, String>,
    /// 修正してもよい語
    pub optional: BTreeMap<String, String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// テキスト辞書を解析
    ///
    /// `*` で始まる行は任意修正、それ以外は必須修正。空行は無視する
    pub fn parse(content: &str) -> Self {
        let mut dictionary = Self::new();
        for line in content.lines() {
            let (entries, word) = match line.strip_prefix(OPTIONAL_MARKER) {
                Some(rest) => (&mut dictionary.optional, rest.trim()),
                None => (&mut dictionary.necessary, line.trim()),
            };
            if word.is_empty() {
                continue;
            }
            entries.insert(normalize_key(word), word.to_string());
        }
        dictionary
    }

    /// 必須修正の語を追加
    pub fn insert_necessary(&mut self, word: &str) {
        self.necessary.insert(normalize_key(word), word.trim().to_string());
    }

    /// 任意修正の語を追加
    pub fn insert_optional(&mut self, word: &str) {
        self.optional.insert(normalize_key(word), word.trim().to_string());
    }

    /// 登録語数
    pub fn len(&self) -> usize {
        self.necessary.len() + self.optional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.necessary.is_empty() && self.optional.is_empty()
    }
}

/// 辞書ファイルの置き場所
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryStore {
    /// 拡張子を除いたパス
    base: PathBuf,
}

impl DictionaryStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// テキスト辞書のパス
    pub fn txt_path(&self) -> PathBuf {
        self.with_suffix(".txt")
    }

    /// キャッシュのパス
    pub fn cache_path(&self) -> PathBuf {
        self.with_suffix(".json")
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut path: OsString = self.base.clone().into_os_string();
        path.push(suffix);
        PathBuf::from(path)
    }

    /// テキスト辞書からキャッシュを作り直す
    pub fn refresh(&self) -> Result<Dictionary> {
        let txt_path = self.txt_path();
        log::info!("Refreshing dictionary from {}", txt_path.display());

        let content = fs::read_to_string(&txt_path).map_err(|e| io_error(&txt_path, e))?;
        let dictionary = Dictionary::parse(&content);

        let cache_path = self.cache_path();
        let serialized = serde_json::to_string(&dictionary).map_err(|e| DictionaryError::Io {
            path: cache_path.display().to_string(),
            message: e.to_string(),
        })?;

        // 一時ファイルに書き込んでから置き換え
        let mut temp_path = cache_path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);
        fs::write(&temp_path, serialized).map_err(|e| io_error(&temp_path, e))?;
        fs::rename(&temp_path, &cache_path).map_err(|e| io_error(&cache_path, e))?;

        log::debug!(
            "dictionary cached: {} necessary, {} optional",
            dictionary.necessary.len(),
            dictionary.optional.len()
        );
        Ok(dictionary)
    }

    /// キャッシュを読み込む（無ければエラー）
    pub fn load(&self) -> Result<Dictionary> {
        let cache_path = self.cache_path();
        let content = fs::read_to_string(&cache_path).map_err(|e| io_error(&cache_path, e))?;
        let dictionary = serde_json::from_str(&content).map_err(|e| DictionaryError::Corrupt {
            path: cache_path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(dictionary)
    }

    /// テキスト辞書の方が新しいか、キャッシュが無ければ作り直してから読み込む
    pub fn load_or_refresh(&self) -> Result<Dictionary> {
        let txt_modified = modified(&self.txt_path());
        let cache_modified = modified(&self.cache_path());

        match (txt_modified, cache_modified) {
            (Some(txt), Some(cache)) if txt > cache => self.refresh(),
            (Some(_), None) => self.refresh(),
            _ => self.load(),
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

fn io_error(path: &Path, error: io::Error) -> DictionaryError {
    let path = path.display().to_string();
    if error.kind() == io::ErrorKind::NotFound {
        DictionaryError::Missing { path }
    } else {
        DictionaryError::Io {
            path,
            message: error.to_string(),
        }
    }
}
