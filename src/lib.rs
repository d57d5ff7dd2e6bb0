//! yofix - エディタバッファのエンコーディング対応アダプタと ё 修正
//!
//! モジュール構成

// コアモジュール
pub mod error;
pub mod logging;
pub mod config;

// 変換層
pub mod codec;
pub mod text;

// ホスト
pub mod host;

// データ層
pub mod buffer;

// ロジック層
pub mod search;
pub mod correction;

// 公開API
pub use buffer::{LineRange, Piece, ReverseMode, TextBuffer};
pub use codec::Codec;
pub use config::Config;
pub use correction::{
    CorrectionMode, CorrectionReport, CorrectionSession, CorrectionSummary, Corrector, Dictionary,
    DictionaryStore,
};
pub use error::{Result, YoError};
pub use host::{
    Document, LineEnding, MemoryDocument, Position, Prompt, ScriptedPrompt, TerminalPrompt,
};
pub use search::{MatchAdapter, Pattern, PatternEngine, PatternFlags, SearchWindow};
