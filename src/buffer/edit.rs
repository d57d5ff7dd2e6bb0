//! スライス編集とシーケンス操作
//!
//! 編集は格納バイト列上で連結してから復号し直す。
//! 復号できない結果になる場合はテキストを変更せずにエラーを返す。

use super::{utf8_index, Piece, TextBuffer};
use crate::codec::{advance_to_char, Anchor};
use crate::error::{buffer, BufferError, Result};
use crate::host::Document;
use std::borrow::Cow;
use std::ops::RangeBounds;
use std::str::FromStr;

/// 反転の単位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverseMode {
    /// 行の順序を反転
    Lines,
    /// 文字の順序を反転
    Letters,
}

impl FromStr for ReverseMode {
    type Err = BufferError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "strings" | "lines" => Ok(ReverseMode::Lines),
            "letters" => Ok(ReverseMode::Letters),
            other => Err(BufferError::InvalidArgument {
                arg: format!("reverse mode '{}'", other),
            }),
        }
    }
}

impl<D: Document> TextBuffer<D> {
    /// 文字範囲のテキスト
    pub fn get_slice(&self, range: impl RangeBounds<isize>) -> String {
        let (start, stop) = self.char_range(range);
        self.text.chars().skip(start).take(stop - start).collect()
    }

    /// 1文字取得（範囲外はエラー）
    pub fn char_at(&self, index: isize) -> buffer::Result<char> {
        let len = self.len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index as usize)
        };
        resolved
            .and_then(|idx| self.text.chars().nth(idx))
            .ok_or(BufferError::OutOfRange { index, len })
    }

    /// 文字範囲を置き換える
    ///
    /// テキストの値は改行コードをバッファの設定に揃えてから格納エンコーディングへ変換し、
    /// 生バイト列はそのまま連結する
    pub fn set_slice<'a>(
        &mut self,
        range: impl RangeBounds<isize>,
        value: impl Into<Piece<'a>>,
    ) -> Result<()> {
        let (start, stop) = self.char_range(range);
        self.splice(start, stop, value.into())
    }

    /// 指定した間隔で値の文字を間引いてから範囲を置き換える
    ///
    /// 負の間隔は末尾から数える。0はエラー
    pub fn set_slice_step(
        &mut self,
        range: impl RangeBounds<isize>,
        value: &str,
        step: isize,
    ) -> Result<()> {
        if step == 0 {
            return Err(BufferError::InvalidArgument {
                arg: "slice step cannot be zero".to_string(),
            }
            .into());
        }

        let unified = value.replace("\r\n", "\n");
        let stride = step.unsigned_abs();
        let picked: String = if step > 0 {
            unified.chars().step_by(stride).collect()
        } else {
            unified.chars().rev().step_by(stride).collect()
        };
        self.set_slice(range, picked.as_str())
    }

    /// 文字範囲を削除
    pub fn delete_slice(&mut self, range: impl RangeBounds<isize>) -> Result<()> {
        let (start, stop) = self.char_range(range);
        self.splice(start, stop, Piece::Text(""))
    }

    /// 末尾に追加
    pub fn append<'a>(&mut self, value: impl Into<Piece<'a>>) -> Result<()> {
        let len = self.len();
        self.splice(len, len, value.into())
    }

    /// 複数の値を連結して末尾に追加
    pub fn extend<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: String = values.into_iter().map(|value| value.as_ref().to_string()).collect();
        self.append(joined.as_str())
    }

    /// 文字位置に挿入
    pub fn insert<'a>(&mut self, index: isize, value: impl Into<Piece<'a>>) -> Result<()> {
        self.set_slice(index..index, value)
    }

    /// 最初に現れる `needle` を削除
    pub fn remove(&mut self, needle: &str) -> Result<()> {
        let utf8 = self.text.find(needle).ok_or_else(|| BufferError::NotFound {
            needle: needle.to_string(),
        })?;
        let start = self.text[..utf8].chars().count();
        self.splice(start, start + needle.chars().count(), Piece::Text(""))
    }

    /// 内容を `count` 回繰り返す（0は全削除）
    pub fn repeat(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            let len = self.len();
            return self.splice(0, len, Piece::Text(""));
        }
        let copies = self.text.repeat(count - 1);
        self.append(copies.as_str())
    }

    /// 行または文字の順序を反転
    pub fn reverse(&mut self, mode: ReverseMode) -> Result<()> {
        let eol = self.line_ending.as_str();
        let reversed = match mode {
            ReverseMode::Lines => {
                let mut lines: Vec<&str> = self.text.split(eol).collect();
                lines.reverse();
                lines.join(eol)
            }
            ReverseMode::Letters => {
                let unified = self.text.replace("\r\n", "\n").replace('\r', "\n");
                let letters: String = unified.chars().rev().collect();
                letters.replace('\n', eol)
            }
        };
        let len = self.len();
        self.splice(0, len, Piece::Text(&reversed))
    }

    /// 文字範囲 `[start, stop)` を格納バイト列上で置き換える
    pub(crate) fn splice(&mut self, start: usize, stop: usize, value: Piece<'_>) -> Result<()> {
        let replacement: Cow<'_, [u8]> = match value {
            Piece::Text(text) => {
                let normalized = self.line_ending.normalize(text);
                if normalized != text {
                    log::warn!(
                        "line endings in inserted text normalized to {}",
                        self.line_ending
                    );
                }
                let encoded = self.codec.encode(&normalized).ok_or_else(|| self.mismatch())?;
                Cow::Owned(encoded.into_owned())
            }
            Piece::Raw(bytes) => Cow::Borrowed(bytes),
        };

        let text = {
            let start_anchor = advance_to_char(&self.text, start, &self.codec, Anchor::ORIGIN);
            let stop_anchor = advance_to_char(&self.text, stop, &self.codec, start_anchor);
            let storage = self.storage_bytes()?;

            let mut bytes = Vec::with_capacity(storage.len() + replacement.len());
            bytes.extend_from_slice(&storage[..start_anchor.byte_index()]);
            bytes.extend_from_slice(&replacement);
            bytes.extend_from_slice(&storage[stop_anchor.byte_index()..]);

            self.codec
                .decode(&bytes)
                .ok_or_else(|| self.invalid_encoding())?
                .into_owned()
        };

        log::debug!(
            "splice [{}, {}) with {} storage bytes",
            start,
            stop,
            replacement.len()
        );
        self.replace_text(text);
        Ok(())
    }

    /// 文字インデックスのUTF-8位置
    pub(crate) fn utf8_index(&self, char_index: usize) -> usize {
        utf8_index(&self.text, char_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EncodingError, YoError};
    use crate::host::{LineEnding, MemoryDocument};

    fn buffer(lines: &[&str]) -> TextBuffer<MemoryDocument> {
        TextBuffer::new(MemoryDocument::new(lines.iter().copied(), LineEnding::Lf)).unwrap()
    }

    #[test]
    fn set_slice_replaces_characters() {
        let mut buffer = buffer(&["на елке"]);
        buffer.set_slice(3..4, "ё").unwrap();
        assert_eq!(buffer.text(), "на ёлке");
        assert_eq!(buffer.document().lines(), vec!["на ёлке"]);
    }

    #[test]
    fn negative_indices_count_from_end() {
        let mut buffer = buffer(&["abcdef"]);
        assert_eq!(buffer.get_slice(-3..), "def");
        buffer.delete_slice(-3..-1).unwrap();
        assert_eq!(buffer.text(), "abcf");
        assert_eq!(buffer.char_at(-1).unwrap(), 'f');
    }

    #[test]
    fn char_at_out_of_range() {
        let buffer = buffer(&["ab"]);
        assert_eq!(
            buffer.char_at(5).unwrap_err(),
            BufferError::OutOfRange { index: 5, len: 2 }
        );
        assert!(buffer.char_at(-3).is_err());
    }

    #[test]
    fn inserted_newlines_split_host_lines() {
        let mut buffer = buffer(&["ab"]);
        buffer.insert(1, "\r\nx\r\n").unwrap();
        assert_eq!(buffer.document().lines(), vec!["a", "x", "b"]);
        assert_eq!(buffer.text(), "a\nx\nb");
    }

    #[test]
    fn raw_bytes_splitting_a_character_are_rejected() {
        let mut buffer = buffer(&["ёж"]);
        let error = buffer.set_slice(0..0, &[0xd1u8][..]).unwrap_err();
        assert!(matches!(
            error,
            YoError::Encoding(EncodingError::InvalidEncoding { .. })
        ));
        assert_eq!(buffer.text(), "ёж");
    }

    #[test]
    fn raw_bytes_in_storage_encoding() {
        let document = MemoryDocument::new(["на елке"], LineEnding::Lf).with_encoding("cp1251");
        let mut buffer = TextBuffer::new(document).unwrap();
        buffer.set_slice(3..4, &[0xb8u8]).unwrap();
        assert_eq!(buffer.text(), "на ёлке");
    }

    #[test]
    fn unrepresentable_text_names_both_encodings() {
        let document = MemoryDocument::new(["ёж"], LineEnding::Lf)
            .with_encoding("cp1251")
            .with_file_encoding("koi8-r");
        let mut buffer = TextBuffer::new(document).unwrap();
        let message = buffer.append("日本").unwrap_err().to_string();
        assert!(message.contains("cp1251"));
        assert!(message.contains("koi8-r"));
        assert_eq!(buffer.text(), "ёж");
    }

    #[test]
    fn stepped_slice_takes_every_nth_char() {
        let mut buffer = buffer(&["xy"]);
        buffer.set_slice_step(1..1, "abcdef", 2).unwrap();
        assert_eq!(buffer.text(), "xacey");
        buffer.set_slice_step(.., "abc", -1).unwrap();
        assert_eq!(buffer.text(), "cba");
        assert!(buffer.set_slice_step(.., "abc", 0).is_err());
    }

    #[test]
    fn sequence_operations() {
        let mut buffer = buffer(&["еж"]);
        buffer.append(" и").unwrap();
        buffer.extend([" ещё", " еж"]).unwrap();
        assert_eq!(buffer.text(), "еж и ещё еж");
        buffer.remove(" ещё").unwrap();
        assert_eq!(buffer.text(), "еж и еж");
        assert!(matches!(
            buffer.remove("ёж").unwrap_err(),
            YoError::Buffer(BufferError::NotFound { .. })
        ));
    }

    #[test]
    fn repeat_duplicates_or_clears() {
        let mut buffer = buffer(&["ab"]);
        buffer.repeat(3).unwrap();
        assert_eq!(buffer.text(), "ababab");
        buffer.repeat(1).unwrap();
        assert_eq!(buffer.text(), "ababab");
        buffer.repeat(0).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.document().lines(), vec![""]);
    }

    #[test]
    fn reverse_lines_and_letters() {
        let mut buffer = buffer(&["ab", "cd"]);
        buffer.reverse(ReverseMode::Lines).unwrap();
        assert_eq!(buffer.document().lines(), vec!["cd", "ab"]);
        buffer.reverse(ReverseMode::Letters).unwrap();
        assert_eq!(buffer.document().lines(), vec!["ba", "dc"]);
        assert!("sideways".parse::<ReverseMode>().is_err());
    }
}
