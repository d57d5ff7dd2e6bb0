//! 文字列としての問い合わせ
//!
//! テキストを渡せば文字インデックス、生バイト列を渡せば格納バイトオフセットで答える

use super::{resolve_range, utf8_index, Piece, TextBuffer};
use crate::codec::Codec;
use crate::error::{BufferError, EncodingError, Result};
use crate::host::Document;
use crate::text;
use std::borrow::Cow;
use std::ops::RangeBounds;

/// 検索対象の窓
struct Scope<'t> {
    haystack: Cow<'t, [u8]>,
    /// 文字インデックスで答える場合の元テキスト
    text: Option<&'t str>,
    lo: usize,
    hi: usize,
}

impl Scope<'_> {
    fn window(&self) -> &[u8] {
        &self.haystack[self.lo..self.hi]
    }

    /// 窓内のバイト位置を呼び出し側の単位へ
    fn units(&self, offset: usize) -> usize {
        let absolute = self.lo + offset;
        match self.text {
            Some(text) => text[..absolute].chars().count(),
            None => absolute,
        }
    }

    fn width(&self) -> usize {
        match self.text {
            Some(text) => text[self.lo..self.hi].chars().count(),
            None => self.hi - self.lo,
        }
    }

    /// 窓の先頭からの最初の出現位置（バイト）
    fn find(&self, needle: &Piece<'_>) -> Option<usize> {
        match (self.text, *needle) {
            (Some(text), Piece::Text(needle)) => text[self.lo..self.hi].find(needle),
            _ => find_bytes(self.window(), needle_bytes(needle)),
        }
    }

    fn rfind(&self, needle: &Piece<'_>) -> Option<usize> {
        match (self.text, *needle) {
            (Some(text), Piece::Text(needle)) => text[self.lo..self.hi].rfind(needle),
            _ => rfind_bytes(self.window(), needle_bytes(needle)),
        }
    }

    /// 重ならない出現回数（空でない針に限る）
    fn count(&self, needle: &Piece<'_>) -> usize {
        if let (Some(text), Piece::Text(needle)) = (self.text, *needle) {
            return text[self.lo..self.hi].matches(needle).count();
        }
        let pattern = needle_bytes(needle);
        let mut window = self.window();
        let mut count = 0;
        while let Some(idx) = find_bytes(window, pattern) {
            count += 1;
            window = &window[idx + pattern.len()..];
        }
        count
    }
}

fn needle_bytes<'p>(needle: &Piece<'p>) -> &'p [u8] {
    match *needle {
        Piece::Text(text) => text.as_bytes(),
        Piece::Raw(bytes) => bytes,
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn rfind_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(haystack.len());
    }
    haystack
        .windows(needle.len())
        .rposition(|window| window == needle)
}

impl<D: Document> TextBuffer<D> {
    fn scope(&self, needle: &Piece<'_>, range: impl RangeBounds<isize>) -> Result<Scope<'_>> {
        match needle {
            Piece::Text(_) => {
                let (start, stop) = self.char_range(range);
                Ok(Scope {
                    haystack: Cow::Borrowed(self.text.as_bytes()),
                    text: Some(&self.text),
                    lo: utf8_index(&self.text, start),
                    hi: utf8_index(&self.text, stop),
                })
            }
            Piece::Raw(_) => {
                let storage = self.storage_bytes()?;
                let (lo, hi) = resolve_range(range, storage.len());
                Ok(Scope {
                    haystack: storage,
                    text: None,
                    lo,
                    hi,
                })
            }
        }
    }

    /// 重ならない出現回数
    pub fn count<'a>(
        &self,
        needle: impl Into<Piece<'a>>,
        range: impl RangeBounds<isize>,
    ) -> Result<usize> {
        let needle = needle.into();
        let scope = self.scope(&needle, range)?;
        if needle_bytes(&needle).is_empty() {
            return Ok(scope.width() + 1);
        }
        Ok(scope.count(&needle))
    }

    /// 最初の出現位置
    pub fn find<'a>(
        &self,
        needle: impl Into<Piece<'a>>,
        range: impl RangeBounds<isize>,
    ) -> Result<Option<usize>> {
        let needle = needle.into();
        let scope = self.scope(&needle, range)?;
        Ok(scope.find(&needle).map(|idx| scope.units(idx)))
    }

    /// 最後の出現位置
    pub fn rfind<'a>(
        &self,
        needle: impl Into<Piece<'a>>,
        range: impl RangeBounds<isize>,
    ) -> Result<Option<usize>> {
        let needle = needle.into();
        let scope = self.scope(&needle, range)?;
        Ok(scope.rfind(&needle).map(|idx| scope.units(idx)))
    }

    /// `find` と同じだが見つからなければエラー
    pub fn index<'a>(
        &self,
        needle: impl Into<Piece<'a>>,
        range: impl RangeBounds<isize>,
    ) -> Result<usize> {
        let needle = needle.into();
        self.find(needle, range)?.ok_or_else(|| not_found(&needle))
    }

    /// `rfind` と同じだが見つからなければエラー
    pub fn rindex<'a>(
        &self,
        needle: impl Into<Piece<'a>>,
        range: impl RangeBounds<isize>,
    ) -> Result<usize> {
        let needle = needle.into();
        self.rfind(needle, range)?.ok_or_else(|| not_found(&needle))
    }

    pub fn starts_with<'a>(
        &self,
        prefix: impl Into<Piece<'a>>,
        range: impl RangeBounds<isize>,
    ) -> Result<bool> {
        let prefix = prefix.into();
        let scope = self.scope(&prefix, range)?;
        Ok(scope.window().starts_with(needle_bytes(&prefix)))
    }

    pub fn ends_with<'a>(
        &self,
        suffix: impl Into<Piece<'a>>,
        range: impl RangeBounds<isize>,
    ) -> Result<bool> {
        let suffix = suffix.into();
        let scope = self.scope(&suffix, range)?;
        Ok(scope.window().ends_with(needle_bytes(&suffix)))
    }

    /// 部分文字列を含むか
    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    pub fn is_alnum(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_alphanumeric)
    }

    pub fn is_alpha(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_alphabetic)
    }

    pub fn is_digit(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(|ch| ch.is_ascii_digit())
    }

    pub fn is_space(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_whitespace)
    }

    pub fn is_lower(&self) -> bool {
        text::is_lower(&self.text)
    }

    pub fn is_upper(&self) -> bool {
        text::is_upper(&self.text)
    }

    pub fn is_title(&self) -> bool {
        text::is_title(&self.text)
    }

    /// 語に分割（区切り未指定なら連続する空白で区切る）
    pub fn split_words(&self, separator: Option<&str>) -> Result<Vec<String>> {
        match separator {
            None => Ok(self.text.split_whitespace().map(String::from).collect()),
            Some("") => Err(BufferError::InvalidArgument {
                arg: "empty separator".to_string(),
            }
            .into()),
            Some(separator) => Ok(self.text.split(separator).map(String::from).collect()),
        }
    }

    /// 行に分割（`\n`, `\r\n`, `\r` のいずれも改行とみなす）
    pub fn split_lines(&self, keep_ends: bool) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = self.text.as_str();
        while !rest.is_empty() {
            let (line, next) = match rest.find(['\r', '\n']) {
                Some(idx) => {
                    let eol = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                    let cut = if keep_ends { idx + eol } else { idx };
                    (&rest[..cut], &rest[idx + eol..])
                }
                None => (rest, ""),
            };
            lines.push(line.to_string());
            rest = next;
        }
        lines
    }

    /// 任意のエンコーディングで符号化したバイト列
    pub fn encode(&self, label: &str) -> Result<Vec<u8>> {
        let codec = Codec::resolve(label, self.document.locale_encoding().as_deref())?;
        codec
            .encode(&self.text)
            .map(|bytes| bytes.into_owned())
            .ok_or_else(|| {
                EncodingError::Mismatch {
                    encoding: label.to_string(),
                    file_encoding: self.document.file_encoding(),
                }
                .into()
            })
    }

    /// 復号済みテキスト
    pub fn decode(&self) -> &str {
        &self.text
    }
}

fn not_found(needle: &Piece<'_>) -> crate::error::YoError {
    BufferError::NotFound {
        needle: needle.to_string(),
    }
    .into()
}
