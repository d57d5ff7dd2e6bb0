//! バッファへ渡す値（復号済みテキストまたは格納バイト列）

use std::borrow::Cow;
use std::fmt;

/// テキストか生バイト列か
///
/// 生バイト列はバッファの格納エンコーディングで解釈される
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Text(&'a str),
    Raw(&'a [u8]),
}

impl<'a> Piece<'a> {
    pub fn is_raw(&self) -> bool {
        matches!(self, Piece::Raw(_))
    }

    /// 表示用の文字列（生バイト列は不正部分を置換）
    pub fn to_display(&self) -> Cow<'a, str> {
        match *self {
            Piece::Text(text) => Cow::Borrowed(text),
            Piece::Raw(bytes) => String::from_utf8_lossy(bytes),
        }
    }
}

impl fmt::Display for Piece<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display())
    }
}

impl<'a> From<&'a str> for Piece<'a> {
    fn from(text: &'a str) -> Self {
        Piece::Text(text)
    }
}

impl<'a> From<&'a String> for Piece<'a> {
    fn from(text: &'a String) -> Self {
        Piece::Text(text.as_str())
    }
}

impl<'a> From<&'a [u8]> for Piece<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Piece::Raw(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Piece<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Piece::Raw(bytes.as_slice())
    }
}

impl<'a> From<&'a Vec<u8>> for Piece<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Piece::Raw(bytes.as_slice())
    }
}
