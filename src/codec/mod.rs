//! エンコーディングとオフセット変換
//!
//! 復号済みテキスト（文字インデックス）とホストの格納エンコーディング
//! （バイトオフセット）の対応を扱う。状態を持たない関数群。

mod offset;
mod position;

pub use offset::{
    advance_to_char, advance_to_utf8, anchor_at_byte, byte_to_char_offset, char_to_byte_offset,
    Anchor,
};
pub use position::{document_byte_len, line_column_to_offset, offset_to_line_column};

use crate::error::{encoding, EncodingError};
use encoding_rs::{Encoding, ISO_2022_JP, UTF_8};
use std::borrow::Cow;

/// ホストが内部的にUTF-8として扱う名前と、WHATWGラベルに無い別名
const ENCODING_ALIASES: &[(&str, &str)] = &[
    ("ucs-2", "utf-8"),
    ("ucs-2le", "utf-8"),
    ("ucs-4", "utf-8"),
    ("ucs-4le", "utf-8"),
    ("utf-16", "utf-8"),
    ("utf-16le", "utf-8"),
    ("utf-32", "utf-8"),
    ("utf-32le", "utf-8"),
    ("cp932", "shift_jis"),
    ("cp936", "gbk"),
    ("cp949", "euc-kr"),
    ("cp950", "big5"),
    ("euc-cn", "gb2312"),
    ("japan", "euc-jp"),
    ("korea", "euc-kr"),
    ("prc", "gbk"),
    ("chinese", "gb2312"),
    ("taiwan", "big5"),
];

/// 格納エンコーディングのコーデック
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    encoding: &'static Encoding,
}

impl Codec {
    pub fn utf8() -> Self {
        Self { encoding: UTF_8 }
    }

    /// WHATWGラベルから直接解決
    ///
    /// 往復変換できないもの、エスケープシーケンスで状態を持つもの（ISO-2022-JP）は除外する。
    /// 後者は区間ごとの長さの和が全体の長さにならず、オフセットを区切って数えられない
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .filter(|encoding| encoding.output_encoding() == *encoding)
            .filter(|encoding| *encoding != ISO_2022_JP)
            .map(|encoding| Self { encoding })
    }

    /// ホストの 'encoding' 設定値を解決
    ///
    /// `8bit-` / `2byte-` 接頭辞を除去し、既知の別名を正規化する。
    /// `default` はロケールのエンコーディング（無ければUTF-8）になる。
    pub fn resolve(raw: &str, locale: Option<&str>) -> encoding::Result<Self> {
        let label = normalize_label(raw);
        let label = if label.is_empty() || label == "default" {
            locale.map(normalize_label).unwrap_or_else(|| "utf-8".to_string())
        } else {
            label
        };

        if let Some(codec) = Self::for_label(&label) {
            return Ok(codec);
        }

        ENCODING_ALIASES
            .iter()
            .find(|(alias, _)| *alias == label)
            .and_then(|(_, target)| Self::for_label(target))
            .ok_or(EncodingError::Unsupported { name: label })
    }

    /// 正規名（WHATWG名）
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn is_utf8(&self) -> bool {
        self.encoding == UTF_8
    }

    /// テキストを格納バイト列へ変換（表現できない文字があれば `None`）
    pub fn encode<'a>(&self, text: &'a str) -> Option<Cow<'a, [u8]>> {
        if self.is_utf8() {
            return Some(Cow::Borrowed(text.as_bytes()));
        }
        let (bytes, _, had_errors) = self.encoding.encode(text);
        if had_errors {
            None
        } else {
            Some(bytes)
        }
    }

    /// 表現できない文字を数値文字参照に置き換えて変換
    pub fn encode_lossy<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        if self.is_utf8() {
            return Cow::Borrowed(text.as_bytes());
        }
        self.encoding.encode(text).0
    }

    /// 格納バイト列での長さ
    ///
    /// バッファ内のテキストは常に表現可能であることが前提
    pub fn encoded_len(&self, text: &str) -> usize {
        if self.is_utf8() {
            text.len()
        } else if self.encoding.is_single_byte() {
            text.chars().count()
        } else {
            self.encoding.encode(text).0.len()
        }
    }

    /// 格納バイト列を復号（不正なバイト列なら `None`）
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        self.encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::utf8()
    }
}

fn normalize_label(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered
        .strip_prefix("8bit-")
        .or_else(|| lowered.strip_prefix("2byte-"))
        .unwrap_or(lowered.as_str())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_whatwg_labels() {
        assert_eq!(Codec::resolve("utf-8", None).unwrap().name(), "UTF-8");
        assert_eq!(Codec::resolve("cp1251", None).unwrap().name(), "windows-1251");
        assert_eq!(Codec::resolve("KOI8-R", None).unwrap().name(), "KOI8-R");
    }

    #[test]
    fn strips_host_prefixes_and_aliases() {
        assert_eq!(
            Codec::resolve("8bit-cp1251", None).unwrap().name(),
            "windows-1251"
        );
        assert_eq!(Codec::resolve("2byte-cp932", None).unwrap().name(), "Shift_JIS");
        assert!(Codec::resolve("ucs-2", None).unwrap().is_utf8());
    }

    #[test]
    fn default_uses_locale() {
        let codec = Codec::resolve("default", Some("koi8-r")).unwrap();
        assert_eq!(codec.name(), "KOI8-R");
        assert!(Codec::resolve("", None).unwrap().is_utf8());
    }

    #[test]
    fn rejects_unknown_encoding() {
        let error = Codec::resolve("klingon", None).unwrap_err();
        assert_eq!(
            error,
            EncodingError::Unsupported {
                name: "klingon".to_string()
            }
        );
    }

    #[test]
    fn rejects_stateful_encoding() {
        assert!(Codec::for_label("iso-2022-jp").is_none());
        assert!(matches!(
            Codec::resolve("iso-2022-jp", None),
            Err(EncodingError::Unsupported { .. })
        ));
    }

    #[test]
    fn encode_reports_unmappable_text() {
        let codec = Codec::resolve("cp1251", None).unwrap();
        assert_eq!(codec.encode("ёж").unwrap().len(), 2);
        assert!(codec.encode("日本").is_none());
    }

    #[test]
    fn decode_rejects_invalid_bytes() {
        assert!(Codec::utf8().decode(&[0xd1]).is_none());
        assert_eq!(Codec::utf8().decode("ёж".as_bytes()).unwrap(), "ёж");
    }

    #[test]
    fn encoded_len_per_codec() {
        let cp1251 = Codec::resolve("cp1251", None).unwrap();
        assert_eq!(cp1251.encoded_len("ёлка"), 4);
        assert_eq!(Codec::utf8().encoded_len("ёлка"), 8);
        let sjis = Codec::resolve("sjis", None).unwrap();
        assert_eq!(sjis.encoded_len("aあ"), 3);
    }
}
