//! バッファアダプタ
//!
//! ホスト文書の復号済みテキストと格納バイト列を同期させ、
//! 文字列・シーケンス・ファイルとして扱う操作を提供する

mod edit;
mod file;
mod interactive;
mod lines;
mod piece;
mod query;

pub use edit::ReverseMode;
pub use interactive::{InteractiveRequest, PromptOptions};
pub use lines::LineRange;
pub use piece::Piece;

use crate::codec::{self, Codec};
use crate::error::{buffer, EncodingError, Result};
use crate::host::{Document, LineEnding, Position};
use std::borrow::Cow;
use std::fmt;
use std::ops::{Bound, RangeBounds};

/// ホスト文書に結び付いたテキストバッファ
///
/// `text` が正であり、変更のたびに行単位でホストへ書き戻す
pub struct TextBuffer<D: Document> {
    /// ホスト文書
    document: D,
    /// 復号済みテキスト（行を改行コードで連結したもの）
    text: String,
    /// 格納エンコーディング
    codec: Codec,
    /// ホストの 'encoding' 設定値（エラー表示用）
    encoding: String,
    /// 改行コード
    line_ending: LineEnding,
}

impl<D: Document> TextBuffer<D> {
    /// ホスト文書からバッファを構築
    pub fn new(document: D) -> Result<Self> {
        let mut buffer = Self {
            document,
            text: String::new(),
            codec: Codec::utf8(),
            encoding: String::new(),
            line_ending: LineEnding::default(),
        };
        buffer.sync_from_host()?;
        Ok(buffer)
    }

    /// ホストの行・設定からテキストを再構築
    pub fn sync_from_host(&mut self) -> Result<()> {
        let encoding = self.document.encoding();
        let locale = self.document.locale_encoding();
        self.codec = Codec::resolve(&encoding, locale.as_deref())?;
        self.encoding = encoding;
        self.line_ending = self.document.line_ending();
        self.text = self.document.lines().join(self.line_ending.as_str());
        log::debug!(
            "synced {} chars from host ({}, {})",
            self.text.chars().count(),
            self.codec.name(),
            self.line_ending
        );
        Ok(())
    }

    /// テキストを行に分割してホストの全行を置き換え
    pub fn sync_to_host(&mut self) {
        let lines = self
            .text
            .split(self.line_ending.as_str())
            .map(String::from)
            .collect();
        self.document.replace_lines(lines);
    }

    /// 復号済みテキスト
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 文字数
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// ホストの 'encoding' 設定値
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// ホストの 'fileencoding' 設定値
    pub fn file_encoding(&self) -> String {
        self.document.file_encoding()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// ホスト文書への可変参照
    ///
    /// 直接編集した後は `sync_from_host` を呼ぶこと
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_inner(self) -> D {
        self.document
    }

    /// 格納バイトオフセット → (行, 列)
    pub fn offset_to_line_column(&self, offset: usize) -> buffer::Result<Position> {
        codec::offset_to_line_column(&self.document, offset)
    }

    /// (行, 列) → 格納バイトオフセット
    pub fn line_column_to_offset(&self, position: Position) -> buffer::Result<usize> {
        codec::line_column_to_offset(&self.document, position)
    }

    /// テキストを格納エンコーディングで表したバイト列
    pub(crate) fn storage_bytes(&self) -> Result<Cow<'_, [u8]>> {
        self.codec
            .encode(&self.text)
            .ok_or_else(|| self.mismatch().into())
    }

    /// テキストを格納バイト長で数える
    pub(crate) fn storage_len(&self) -> usize {
        self.codec.encoded_len(&self.text)
    }

    /// テキストの置き換え（ホストへの書き戻し込み）
    pub(crate) fn replace_text(&mut self, text: String) {
        self.text = text;
        self.sync_to_host();
    }

    pub(crate) fn mismatch(&self) -> EncodingError {
        EncodingError::Mismatch {
            encoding: self.encoding.clone(),
            file_encoding: self.document.file_encoding(),
        }
    }

    pub(crate) fn invalid_encoding(&self) -> EncodingError {
        EncodingError::InvalidEncoding {
            encoding: self.encoding.clone(),
            file_encoding: self.document.file_encoding(),
        }
    }

    /// 文字インデックスの範囲をシーケンスと同じ規則で解決（負数は末尾から）
    pub(crate) fn char_range(&self, range: impl RangeBounds<isize>) -> (usize, usize) {
        resolve_range(range, self.len())
    }
}

impl<D: Document> fmt::Display for TextBuffer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl<D: Document + fmt::Debug> fmt::Debug for TextBuffer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("document", &self.document)
            .field("text", &self.text)
            .field("encoding", &self.encoding)
            .field("line_ending", &self.line_ending)
            .finish()
    }
}

/// 負数を末尾からの位置として解決し、`[0, len]` に収める
pub(crate) fn resolve_index(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        (index as usize).min(len)
    }
}

pub(crate) fn resolve_range(range: impl RangeBounds<isize>, len: usize) -> (usize, usize) {
    let start = match range.start_bound() {
        Bound::Included(&start) => resolve_index(start, len),
        Bound::Excluded(&start) => resolve_index(start.saturating_add(1), len),
        Bound::Unbounded => 0,
    };
    let stop = match range.end_bound() {
        Bound::Included(&stop) if stop == -1 => len,
        Bound::Included(&stop) => resolve_index(stop.saturating_add(1), len),
        Bound::Excluded(&stop) => resolve_index(stop, len),
        Bound::Unbounded => len,
    };
    (start, stop.max(start))
}

/// 文字インデックス → UTF-8位置（末尾を超えれば末尾）
pub(crate) fn utf8_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}
