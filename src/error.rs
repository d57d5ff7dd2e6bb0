//! エラーハンドリングシステム
//!
//! yofix 全体で使用される統一されたエラー型とユーティリティを定義
//! バッファ変更は「完全に適用」か「変更前に中断」のどちらかで、途中状態は残さない

use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug, Clone)]
pub enum YoError {
    /// エンコーディング関連エラー
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// バッファ操作エラー
    #[error("Buffer operation failed: {0}")]
    Buffer(#[from] BufferError),

    /// 正規表現のコンパイルエラー（エンジンのメッセージをそのまま伝播）
    #[error(transparent)]
    Pattern(#[from] regex::Error),

    /// 修正セッションエラー
    #[error("Correction session error: {0}")]
    Session(#[from] SessionError),

    /// 辞書エラー
    #[error("Dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// エンコーディング固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// ホストの 'encoding' に対応するコーデックもエイリアスも無い
    #[error("This module is not provided with {name} codec")]
    Unsupported { name: String },

    /// バイト列が指定エンコーディングとして復号できない
    #[error("byte sequence is not valid {encoding} (fileencoding: {file_encoding})")]
    InvalidEncoding {
        encoding: String,
        file_encoding: String,
    },

    /// テキストがバッファのエンコーディングで表現できない
    #[error("text cannot be represented in {encoding} (fileencoding: {file_encoding})")]
    Mismatch {
        encoding: String,
        file_encoding: String,
    },

    /// バイト列のパターンが渡された（復号に使うコーデックが推測できない）
    #[error(
        "pattern was given as raw bytes; it must be decoded first, but the codec cannot be \
         guessed. It may be the buffer encoding ({encoding}) or the file encoding ({file_encoding})"
    )]
    EncodingRequired {
        encoding: String,
        file_encoding: String,
    },
}

/// バッファ操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Index {index} is out of range (length {len})")]
    OutOfRange { index: isize, len: usize },

    #[error("Invalid argument: {arg}")]
    InvalidArgument { arg: String },

    #[error("Substring not found: {needle}")]
    NotFound { needle: String },

    #[error("Confirmation dialogs are not available")]
    DialogUnavailable,
}

/// 修正セッション固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// 記録済みの範囲がスキャン後に書き換えられている
    #[error("Match '{word}' at {start} no longer matches the buffer")]
    StaleMatch { word: String, start: usize },

    #[error("Session has not been scanned yet")]
    NotScanned,
}

/// 辞書固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    #[error("Dictionary not found: {path}")]
    Missing { path: String },

    #[error("Dictionary IO error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Dictionary cache is corrupt ({path}): {message}")]
    Corrupt { path: String, message: String },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting: {key}")]
    MissingSetting { key: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Path expansion failed: {message}")]
    PathExpansion { message: String },
}

impl YoError {
    /// バッファ構築を継続できない致命的エラーか
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            YoError::Encoding(EncodingError::Unsupported { .. })
                | YoError::Dictionary(DictionaryError::Missing { .. })
                | YoError::Config(ConfigError::MissingSetting { .. })
        )
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, YoError>;

/// 各モジュール固有のResult型
pub mod buffer {
    pub type Result<T> = std::result::Result<T, super::BufferError>;
}

pub mod encoding {
    pub type Result<T> = std::result::Result<T, super::EncodingError>;
}

/// パニックハンドラの設定
///
/// ロガー経由で出力してから即座に終了する
pub fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s
        } else {
            "Unknown panic payload"
        };

        log::error!("PANIC at {}: {}", location, message);
        eprintln!("PANIC at {}: {}", location, message);
        eprintln!("Stack trace: {}", std::backtrace::Backtrace::capture());
        std::process::exit(1);
    }));
}
