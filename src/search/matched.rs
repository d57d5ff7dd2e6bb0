//! 一致結果
//!
//! 復号済みテキスト上の一致を、格納エンコーディングのバイト列とオフセットで見せる。
//! 直前の一致を渡すと、その終端からオフセット計算を再開する。

use super::template::{RegexError, ReplacementTemplate};
use super::Pattern;
use crate::codec::{advance_to_utf8, Anchor, Codec};
use regex::Captures;
use std::collections::BTreeMap;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupSpan {
    /// 復号済みテキスト
    text: String,
    /// 格納エンコーディングでのバイト列
    bytes: Vec<u8>,
    /// 文字インデックスの範囲
    chars: Range<usize>,
    /// 格納バイトオフセットの範囲
    storage: Range<usize>,
}

/// 1回の一致（生成後は不変）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchAdapter {
    pattern: Pattern,
    codec: Codec,
    groups: Vec<Option<GroupSpan>>,
    names: Vec<Option<String>>,
    /// 探索窓（格納バイトオフセット）
    pos: usize,
    endpos: usize,
    last_index: Option<usize>,
    /// 全体一致の終端
    end_anchor: Anchor,
}

impl MatchAdapter {
    /// 一致を包む
    ///
    /// `window` は探索窓のUTF-8位置。`previous` があればその終端を起点にオフセットを数え、
    /// 探索窓も引き継ぐ
    pub(crate) fn new(
        text: &str,
        captures: &Captures<'_>,
        pattern: &Pattern,
        codec: Codec,
        window: (usize, usize),
        previous: Option<&MatchAdapter>,
    ) -> Self {
        let base = previous
            .map(|previous| previous.end_anchor)
            .unwrap_or(Anchor::ORIGIN);
        let match_start = captures
            .get(0)
            .map(|whole| advance_to_utf8(text, whole.start(), &codec, base))
            .unwrap_or(base);

        let mut end_anchor = match_start;
        let groups: Vec<Option<GroupSpan>> = captures
            .iter()
            .enumerate()
            .map(|(index, group)| {
                group.map(|m| {
                    let start = advance_to_utf8(text, m.start(), &codec, match_start);
                    let end = advance_to_utf8(text, m.end(), &codec, start);
                    if index == 0 {
                        end_anchor = end;
                    }
                    GroupSpan {
                        text: m.as_str().to_string(),
                        bytes: codec.encode_lossy(m.as_str()).into_owned(),
                        chars: start.char_index()..end.char_index(),
                        storage: start.byte_index()..end.byte_index(),
                    }
                })
            })
            .collect();

        let (pos, endpos) = match previous {
            Some(previous) => (previous.pos, previous.endpos),
            None => {
                let pos = advance_to_utf8(text, window.0, &codec, Anchor::ORIGIN);
                let endpos = advance_to_utf8(text, window.1, &codec, pos);
                (pos.byte_index(), endpos.byte_index())
            }
        };

        let last_index = groups
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(index, group)| {
                group
                    .as_ref()
                    .map(|span| (span.chars.end, pattern.closing_rank(index), index))
            })
            .max_by_key(|&(end, rank, _)| (end, rank))
            .map(|(_, _, index)| index);

        Self {
            pattern: pattern.clone(),
            codec,
            groups,
            names: pattern.group_names(),
            pos,
            endpos,
            last_index,
            end_anchor,
        }
    }

    fn span_of(&self, index: usize) -> Option<&GroupSpan> {
        self.groups.get(index).and_then(Option::as_ref)
    }

    /// グループのバイト列（0は全体）
    pub fn group(&self, index: usize) -> Option<&[u8]> {
        self.span_of(index).map(|span| span.bytes.as_slice())
    }

    /// 名前付きグループのバイト列
    pub fn named(&self, name: &str) -> Option<&[u8]> {
        self.pattern
            .group_index(name)
            .and_then(|index| self.group(index))
    }

    /// 全体を除くすべてのグループ
    pub fn groups(&self) -> Vec<Option<&[u8]>> {
        (1..self.groups.len()).map(|index| self.group(index)).collect()
    }

    /// 名前 → バイト列
    pub fn groupdict(&self) -> BTreeMap<String, Option<Vec<u8>>> {
        self.names
            .iter()
            .enumerate()
            .filter_map(|(index, name)| {
                name.as_ref()
                    .map(|name| (name.clone(), self.group(index).map(<[u8]>::to_vec)))
            })
            .collect()
    }

    /// テンプレートを展開して格納エンコーディングで返す
    pub fn expand(&self, template: &str) -> Result<Vec<u8>, RegexError> {
        let template = ReplacementTemplate::parse(template, &self.pattern)?;
        let rendered = template.render(|index| self.text(index));
        Ok(self.codec.encode_lossy(&rendered).into_owned())
    }

    /// グループの開始（格納バイトオフセット）
    pub fn start(&self, index: usize) -> Option<usize> {
        self.span_of(index).map(|span| span.storage.start)
    }

    /// グループの終了（格納バイトオフセット）
    pub fn end(&self, index: usize) -> Option<usize> {
        self.span_of(index).map(|span| span.storage.end)
    }

    pub fn span(&self, index: usize) -> Option<(usize, usize)> {
        self.span_of(index)
            .map(|span| (span.storage.start, span.storage.end))
    }

    /// 探索窓の開始（格納バイトオフセット）
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// 探索窓の終了（格納バイトオフセット）
    pub fn endpos(&self) -> usize {
        self.endpos
    }

    /// 最後に閉じたグループの番号
    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// 最後に閉じたグループの名前
    pub fn last_group(&self) -> Option<&str> {
        self.last_index
            .and_then(|index| self.names.get(index))
            .and_then(|name| name.as_deref())
    }

    /// グループの復号済みテキスト
    pub fn text(&self, index: usize) -> Option<&str> {
        self.span_of(index).map(|span| span.text.as_str())
    }

    /// 全体一致の復号済みテキスト
    pub fn as_str(&self) -> &str {
        self.text(0).unwrap_or_default()
    }

    /// 全体一致の文字インデックス範囲
    pub fn char_range(&self) -> Range<usize> {
        self.span_of(0)
            .map(|span| span.chars.clone())
            .unwrap_or(0..0)
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}
