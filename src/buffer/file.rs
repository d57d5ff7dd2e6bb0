//! ファイルとしての操作
//!
//! 位置はホストのカーソルから求める格納バイトオフセット。
//! 読み出しは文字の途中で切らない。

use super::{Piece, TextBuffer};
use crate::codec::{advance_to_utf8, anchor_at_byte, Anchor};
use crate::error::{BufferError, Result};
use crate::host::Document;

impl<D: Document> TextBuffer<D> {
    pub fn is_atty(&self) -> bool {
        false
    }

    pub fn close(&mut self) {}

    pub fn flush(&mut self) {}

    /// ファイルモード
    pub fn mode(&self) -> &'static str {
        "rb+"
    }

    /// 現在位置（格納バイトオフセット）
    pub fn tell(&self) -> Result<usize> {
        Ok(self.line_column_to_offset(self.document.cursor())?)
    }

    /// 位置を移動して新しい位置を返す
    ///
    /// `whence`: 0 = 先頭から, 1 = 現在位置から, 2 = 末尾から
    pub fn seek(&mut self, offset: isize, whence: u8) -> Result<usize> {
        let base = match whence {
            0 => 0,
            1 => self.tell()?,
            2 => self.storage_len(),
            other => {
                return Err(BufferError::InvalidArgument {
                    arg: format!("seek whence must be 0, 1 or 2, got {}", other),
                }
                .into())
            }
        };

        let target = base
            .checked_add_signed(offset)
            .ok_or(BufferError::OutOfRange {
                index: offset,
                len: self.storage_len(),
            })?;
        self.move_to(target)?;
        Ok(target)
    }

    /// 指定位置（既定は現在位置）以降を削除
    pub fn truncate(&mut self, size: Option<usize>) -> Result<()> {
        let position = self.tell()?;
        let size = size.unwrap_or(position);
        if size >= self.storage_len() {
            return Ok(());
        }

        let anchor = self.anchor_at(size)?;
        let len = self.len();
        self.splice(anchor.char_index(), len, Piece::Text(""))?;
        if position > size {
            self.move_to(size)?;
        }
        Ok(())
    }

    /// 最大 `size` バイト（未指定なら末尾まで）読み出す
    ///
    /// 境界で文字が切れる場合はその手前まで。ただし1文字も読めない場合は1文字読む
    pub fn read(&mut self, size: Option<usize>) -> Result<String> {
        let start = self.anchor_at(self.tell()?)?;
        let limit = size.map(|size| start.byte_index() + size);
        let end = self.advance_within(start, self.text.len(), limit);
        self.consume(start, end)
    }

    /// 1行（改行込み）を読み出す
    pub fn readline(&mut self, size: Option<usize>) -> Result<String> {
        let start = self.anchor_at(self.tell()?)?;
        let eol = self.line_ending.as_str();
        let line_end = self.text[start.text_index()..]
            .find(eol)
            .map(|idx| start.text_index() + idx + eol.len())
            .unwrap_or(self.text.len());
        let limit = size.map(|size| start.byte_index() + size);
        let end = self.advance_within(start, line_end, limit);
        self.consume(start, end)
    }

    /// 末尾まで行単位で読み出す（`size_hint` バイトを超えたら止める）
    pub fn readlines(&mut self, size_hint: usize) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        let mut total = 0usize;
        loop {
            let line = self.readline(None)?;
            if line.is_empty() {
                break;
            }
            total += self.codec.encoded_len(&line);
            lines.push(line);
            if size_hint > 0 && total >= size_hint {
                break;
            }
        }
        Ok(lines)
    }

    /// 現在位置に書き込み、書いた分だけ位置を進める
    ///
    /// 改行コードはバッファの設定に揃える
    pub fn write<'a>(&mut self, value: impl Into<Piece<'a>>) -> Result<()> {
        let decoded = match value.into() {
            Piece::Text(text) => text.to_string(),
            Piece::Raw(bytes) => self
                .codec
                .decode(bytes)
                .ok_or_else(|| self.invalid_encoding())?
                .into_owned(),
        };
        let text = self.line_ending.normalize(&decoded);

        let position = self.tell()?;
        let anchor = self.anchor_at(position)?;
        self.splice(anchor.char_index(), anchor.char_index(), Piece::Text(&text))?;
        self.move_to(position + self.codec.encoded_len(&text))
    }

    /// 改行コードで連結して書き込む
    pub fn writelines<I, S>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = lines
            .into_iter()
            .map(|line| line.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(self.line_ending.as_str());
        self.write(joined.as_str())
    }

    /// 格納バイトオフセットにカーソルを置く
    fn move_to(&mut self, offset: usize) -> Result<()> {
        let position = self.offset_to_line_column(offset)?;
        self.document.set_cursor(position);
        Ok(())
    }

    /// 格納バイトオフセットの対応点（文字の途中ならエラー）
    fn anchor_at(&self, offset: usize) -> Result<Anchor> {
        if offset >= self.storage_len() {
            return Ok(advance_to_utf8(
                &self.text,
                self.text.len(),
                &self.codec,
                Anchor::ORIGIN,
            ));
        }
        anchor_at_byte(&self.text, offset, &self.codec).ok_or_else(|| {
            BufferError::InvalidArgument {
                arg: format!("offset {} splits a character", offset),
            }
            .into()
        })
    }

    /// `start` から `stop`（UTF-8位置）まで、格納バイト上限 `limit` を超えない範囲で進める
    fn advance_within(&self, start: Anchor, stop: usize, limit: Option<usize>) -> Anchor {
        let Some(limit) = limit else {
            return advance_to_utf8(&self.text, stop, &self.codec, start);
        };
        if limit <= start.byte_index() {
            return start;
        }

        let mut end = start;
        for (idx, ch) in self.text[start.text_index()..stop].char_indices() {
            let next_utf8 = start.text_index() + idx + ch.len_utf8();
            let next = advance_to_utf8(&self.text, next_utf8, &self.codec, end);
            if next.byte_index() > limit && end != start {
                break;
            }
            end = next;
            if next.byte_index() >= limit {
                break;
            }
        }
        end
    }

    fn consume(&mut self, start: Anchor, end: Anchor) -> Result<String> {
        let chunk = self.text[start.text_index()..end.text_index()].to_string();
        self.move_to(end.byte_index())?;
        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LineEnding, MemoryDocument, Position};

    fn buffer(lines: &[&str], line_ending: LineEnding) -> TextBuffer<MemoryDocument> {
        TextBuffer::new(MemoryDocument::new(lines.iter().copied(), line_ending)).unwrap()
    }

    #[test]
    fn tell_follows_cursor() {
        let mut buffer = buffer(&["ab", "cd"], LineEnding::Lf);
        assert_eq!(buffer.tell().unwrap(), 0);
        buffer.document_mut().set_cursor(Position::new(2, 2));
        assert_eq!(buffer.tell().unwrap(), 4);
    }

    #[test]
    fn seek_whence_variants() {
        let mut buffer = buffer(&["ab", "cd"], LineEnding::Lf);
        assert_eq!(buffer.seek(3, 0).unwrap(), 3);
        assert_eq!(buffer.document().cursor(), Position::new(2, 1));
        assert_eq!(buffer.seek(1, 1).unwrap(), 4);
        assert_eq!(buffer.seek(-1, 2).unwrap(), 4);
        assert_eq!(buffer.seek(0, 2).unwrap(), 5);
        assert!(buffer.seek(-10, 1).is_err());
        assert!(matches!(
            buffer.seek(0, 3).unwrap_err(),
            crate::error::YoError::Buffer(BufferError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn read_never_splits_characters() {
        let mut buffer = buffer(&["ёжик"], LineEnding::Lf);
        assert_eq!(buffer.read(Some(3)).unwrap(), "ё");
        assert_eq!(buffer.tell().unwrap(), 2);
        assert_eq!(buffer.read(Some(1)).unwrap(), "ж");
        assert_eq!(buffer.read(None).unwrap(), "ик");
        assert_eq!(buffer.read(None).unwrap(), "");
    }

    #[test]
    fn readline_keeps_line_ending() {
        let mut buffer = buffer(&["ab", "cd"], LineEnding::CrLf);
        assert_eq!(buffer.readline(None).unwrap(), "ab\r\n");
        assert_eq!(buffer.tell().unwrap(), 4);
        assert_eq!(buffer.readline(None).unwrap(), "cd");
        assert_eq!(buffer.readline(None).unwrap(), "");
    }

    #[test]
    fn readlines_until_end_or_hint() {
        let mut buffer = buffer(&["a", "b", "c"], LineEnding::Lf);
        assert_eq!(buffer.readlines(0).unwrap(), vec!["a\n", "b\n", "c"]);
        buffer.seek(0, 0).unwrap();
        assert_eq!(buffer.readlines(3).unwrap(), vec!["a\n", "b\n"]);
    }

    #[test]
    fn write_inserts_and_advances() {
        let mut buffer = buffer(&["ad"], LineEnding::CrLf);
        buffer.seek(1, 0).unwrap();
        buffer.write("b\nc").unwrap();
        assert_eq!(buffer.document().lines(), vec!["ab", "cd"]);
        assert_eq!(buffer.tell().unwrap(), 5);
        buffer.writelines(["x", "y"]).unwrap();
        assert_eq!(buffer.text(), "ab\r\ncx\r\nyd");
    }

    #[test]
    fn truncate_at_position() {
        let mut buffer = buffer(&["ёжик"], LineEnding::Lf);
        buffer.seek(4, 0).unwrap();
        buffer.truncate(None).unwrap();
        assert_eq!(buffer.text(), "ёж");
        assert!(buffer.truncate(Some(1)).is_err());
        buffer.truncate(Some(2)).unwrap();
        assert_eq!(buffer.text(), "ё");
        assert_eq!(buffer.tell().unwrap(), 2);
    }

    #[test]
    fn file_mode_flags() {
        let buffer = buffer(&[""], LineEnding::Lf);
        assert!(!buffer.is_atty());
        assert_eq!(buffer.mode(), "rb+");
    }
}
