//! 文字インデックスと格納バイトオフセットの変換
//!
//! 左から右へ順に変換する場合は直前の結果を `Anchor` として渡すことで
//! 先頭からの再エンコードを避け、全体で線形時間に収める。

use super::Codec;

/// 既知の対応点（文字インデックス, 格納バイトオフセット）
///
/// `text_index` は復号済みテキスト（UTF-8）上の位置で、同じ文字位置を指す
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anchor {
    char_index: usize,
    byte_index: usize,
    text_index: usize,
}

impl Anchor {
    /// テキスト先頭
    pub const ORIGIN: Anchor = Anchor {
        char_index: 0,
        byte_index: 0,
        text_index: 0,
    };

    /// 文字インデックス
    pub fn char_index(&self) -> usize {
        self.char_index
    }

    /// 格納エンコーディングでのバイトオフセット
    pub fn byte_index(&self) -> usize {
        self.byte_index
    }

    /// 復号済みテキスト（UTF-8）でのバイト位置
    pub fn text_index(&self) -> usize {
        self.text_index
    }
}

/// UTF-8位置 `utf8_index` まで対応点を進める
///
/// 対応点が目標より後ろにある場合は先頭からやり直す
pub fn advance_to_utf8(text: &str, utf8_index: usize, codec: &Codec, anchor: Anchor) -> Anchor {
    let target = floor_char_boundary(text, utf8_index);
    let anchor = if anchor.text_index > target || anchor.text_index > text.len() {
        Anchor::ORIGIN
    } else {
        anchor
    };

    let segment = &text[anchor.text_index..target];
    Anchor {
        char_index: anchor.char_index + segment.chars().count(),
        byte_index: anchor.byte_index + codec.encoded_len(segment),
        text_index: target,
    }
}

/// 文字インデックス `char_index` まで対応点を進める（末尾を超える場合は末尾）
pub fn advance_to_char(text: &str, char_index: usize, codec: &Codec, anchor: Anchor) -> Anchor {
    let anchor = if anchor.char_index > char_index || anchor.text_index > text.len() {
        Anchor::ORIGIN
    } else {
        anchor
    };

    let target = text[anchor.text_index..]
        .char_indices()
        .nth(char_index - anchor.char_index)
        .map(|(idx, _)| anchor.text_index + idx)
        .unwrap_or(text.len());
    advance_to_utf8(text, target, codec, anchor)
}

/// `text[anchor.char_index..char_index]` の格納バイト長 + `anchor.byte_index`
pub fn char_to_byte_offset(text: &str, char_index: usize, codec: &Codec, anchor: Anchor) -> usize {
    advance_to_char(text, char_index, codec, anchor).byte_index
}

/// 格納バイトオフセットに対応する対応点
///
/// オフセットが文字の途中、または末尾を超える場合は `None`
pub fn anchor_at_byte(text: &str, byte_index: usize, codec: &Codec) -> Option<Anchor> {
    if codec.is_utf8() {
        if byte_index > text.len() || !text.is_char_boundary(byte_index) {
            return None;
        }
        return Some(Anchor {
            char_index: text[..byte_index].chars().count(),
            byte_index,
            text_index: byte_index,
        });
    }

    let mut anchor = Anchor::ORIGIN;
    let mut scratch = [0u8; 4];
    for (idx, ch) in text.char_indices() {
        if anchor.byte_index >= byte_index {
            break;
        }
        anchor = Anchor {
            char_index: anchor.char_index + 1,
            byte_index: anchor.byte_index + codec.encoded_len(ch.encode_utf8(&mut scratch)),
            text_index: idx + ch.len_utf8(),
        };
    }

    (anchor.byte_index == byte_index).then_some(anchor)
}

/// 格納バイトオフセットを文字インデックスへ変換
pub fn byte_to_char_offset(text: &str, byte_index: usize, codec: &Codec) -> Option<usize> {
    anchor_at_byte(text, byte_index, codec).map(|anchor| anchor.char_index)
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut index = index;
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
