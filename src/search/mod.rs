//! 正規表現アダプタ
//!
//! バッファの復号済みテキストに対して照合し、結果を格納エンコーディングで返す

mod matched;
mod pattern;
mod template;

pub use matched::MatchAdapter;
pub use pattern::{Pattern, PatternFlags, PatternInput};
pub use template::ReplacementTemplate;

use crate::buffer::{utf8_index, TextBuffer};
use crate::codec::Codec;
use crate::error::{EncodingError, Result};
use crate::host::Document;
use regex::Captures;

/// 探索窓（文字インデックス、`endpos` は排他的）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchWindow {
    pub pos: usize,
    pub endpos: Option<usize>,
}

impl SearchWindow {
    pub fn starting_at(pos: usize) -> Self {
        Self { pos, endpos: None }
    }

    pub fn between(pos: usize, endpos: usize) -> Self {
        Self {
            pos,
            endpos: Some(endpos),
        }
    }

    /// UTF-8位置へ変換（`endpos` が `pos` より前なら `pos` に揃える）
    fn resolve(&self, text: &str) -> (usize, usize) {
        let pos = utf8_index(text, self.pos);
        let endpos = self
            .endpos
            .map(|endpos| utf8_index(text, endpos))
            .unwrap_or(text.len());
        (pos, endpos.max(pos))
    }
}

/// 重ならない一致を左から順に列挙する
///
/// 直前の一致の終端と同じ位置で終わる空一致は飛ばす
struct CaptureIter<'s> {
    haystack: &'s str,
    pattern: &'s Pattern,
    cursor: usize,
    last_end: Option<usize>,
}

impl<'s> CaptureIter<'s> {
    fn new(haystack: &'s str, pattern: &'s Pattern, start: usize) -> Self {
        Self {
            haystack,
            pattern,
            cursor: start,
            last_end: None,
        }
    }

    fn step_past(&self, index: usize) -> usize {
        self.haystack[index..]
            .chars()
            .next()
            .map(|ch| index + ch.len_utf8())
            .unwrap_or(self.haystack.len() + 1)
    }
}

impl<'s> Iterator for CaptureIter<'s> {
    type Item = Captures<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cursor > self.haystack.len() {
                return None;
            }
            let captures = self.pattern.regex().captures_at(self.haystack, self.cursor)?;
            let whole = captures.get(0)?;
            let empty = whole.start() == whole.end();

            if empty && self.last_end == Some(whole.end()) {
                self.cursor = self.step_past(whole.end());
                continue;
            }

            self.cursor = if empty {
                self.step_past(whole.end())
            } else {
                whole.end()
            };
            self.last_end = Some(whole.end());
            return Some(captures);
        }
    }
}

/// `finditer` の結果
///
/// 各一致は直前の一致を起点にオフセットを計算する
pub struct Matches<'s> {
    text: &'s str,
    captures: CaptureIter<'s>,
    pattern: &'s Pattern,
    codec: Codec,
    window: (usize, usize),
    previous: Option<MatchAdapter>,
}

impl Iterator for Matches<'_> {
    type Item = MatchAdapter;

    fn next(&mut self) -> Option<Self::Item> {
        let captures = self.captures.next()?;
        let matched = MatchAdapter::new(
            self.text,
            &captures,
            self.pattern,
            self.codec,
            self.window,
            self.previous.as_ref(),
        );
        self.previous = Some(matched.clone());
        Some(matched)
    }
}

/// バッファに対する正規表現操作
pub struct PatternEngine<'b, D: Document> {
    buffer: &'b mut TextBuffer<D>,
}

impl<D: Document> TextBuffer<D> {
    /// 正規表現操作
    pub fn re(&mut self) -> PatternEngine<'_, D> {
        PatternEngine { buffer: self }
    }
}

impl<'b, D: Document> PatternEngine<'b, D> {
    /// パターンをコンパイル
    ///
    /// バイト列のパターンは受け付けない。コンパイル済みパターンはUnicodeモードでなければ
    /// `flags` を加えてコンパイルし直す
    pub fn compile<'p>(
        &self,
        input: impl Into<PatternInput<'p>>,
        flags: PatternFlags,
    ) -> Result<Pattern> {
        match input.into() {
            PatternInput::Text(source) => Ok(Pattern::new(source, flags | PatternFlags::UNICODE)?),
            PatternInput::Raw(_) => Err(EncodingError::EncodingRequired {
                encoding: self.buffer.encoding().to_string(),
                file_encoding: self.buffer.file_encoding(),
            }
            .into()),
            PatternInput::Compiled(pattern) if pattern.flags().unicode => Ok(pattern.clone()),
            PatternInput::Compiled(pattern) => Ok(Pattern::new(
                pattern.as_str(),
                pattern.flags() | flags | PatternFlags::UNICODE,
            )?),
        }
    }

    fn iter_from<'s>(&'s self, pattern: &'s Pattern, window: SearchWindow) -> Matches<'s> {
        let text = self.buffer.text();
        let window = window.resolve(text);
        Matches {
            text,
            captures: CaptureIter::new(&text[..window.1], pattern, window.0),
            pattern,
            codec: self.buffer.codec(),
            window,
            previous: None,
        }
    }

    /// 窓内の最初の一致
    pub fn search(&self, pattern: &Pattern, window: SearchWindow) -> Option<MatchAdapter> {
        self.iter_from(pattern, window).next()
    }

    /// 窓の先頭での一致
    pub fn match_at(&self, pattern: &Pattern, window: SearchWindow) -> Option<MatchAdapter> {
        let (pos, _) = window.resolve(self.buffer.text());
        self.search(pattern, window)
            .filter(|matched| utf8_index(self.buffer.text(), matched.char_range().start) == pos)
    }

    /// すべての一致
    pub fn finditer<'s>(&'s self, pattern: &'s Pattern) -> Matches<'s> {
        self.iter_from(pattern, SearchWindow::default())
    }

    fn captures<'s>(&'s self, pattern: &'s Pattern) -> CaptureIter<'s> {
        CaptureIter::new(self.buffer.text(), pattern, 0)
    }

    /// 一致した文字列（グループが1つならそのグループ）
    pub fn findall(&self, pattern: &Pattern) -> Vec<String> {
        let index = usize::from(pattern.group_count() == 1);
        self.captures(pattern)
            .map(|captures| group_text(&captures, index))
            .collect()
    }

    /// 一致ごとのすべてのグループ（一致しなかったグループは空文字列）
    pub fn findall_groups(&self, pattern: &Pattern) -> Vec<Vec<String>> {
        self.captures(pattern)
            .map(|captures| {
                (1..captures.len())
                    .map(|index| group_text(&captures, index))
                    .collect()
            })
            .collect()
    }

    /// 一致位置で分割（グループの内容も結果に含む、`max_split` が0なら無制限）
    pub fn split(&self, pattern: &Pattern, max_split: usize) -> Vec<String> {
        let text = self.buffer.text();
        let mut pieces = Vec::new();
        let mut last = 0;
        for (count, captures) in self.captures(pattern).enumerate() {
            if max_split > 0 && count >= max_split {
                break;
            }
            let Some(whole) = captures.get(0) else {
                continue;
            };
            pieces.push(text[last..whole.start()].to_string());
            pieces.extend((1..captures.len()).map(|index| group_text(&captures, index)));
            last = whole.end();
        }
        pieces.push(text[last..].to_string());
        pieces
    }

    /// 一致の数
    pub fn count(&self, pattern: &Pattern) -> usize {
        self.captures(pattern).count()
    }

    /// テンプレートで置換（`count` が0ならすべて）
    pub fn sub(&mut self, pattern: &Pattern, template: &str, count: usize) -> Result<()> {
        self.subn(pattern, template, count).map(|_| ())
    }

    /// `sub` と同じで、置換した数を返す
    pub fn subn(&mut self, pattern: &Pattern, template: &str, count: usize) -> Result<usize> {
        let template = ReplacementTemplate::parse(template, pattern)?;
        let (result, replaced) = {
            let text = self.buffer.text();
            let mut result = String::with_capacity(text.len());
            let mut last = 0;
            let mut replaced = 0;
            for captures in self.captures(pattern) {
                if count > 0 && replaced >= count {
                    break;
                }
                let Some(whole) = captures.get(0) else {
                    continue;
                };
                result.push_str(&text[last..whole.start()]);
                let rendered = template.render(|index| captures.get(index).map(|m| m.as_str()));
                result.push_str(&self.buffer.line_ending().normalize(&rendered));
                last = whole.end();
                replaced += 1;
            }
            result.push_str(&text[last..]);
            (result, replaced)
        };
        self.commit(result, replaced)
    }

    /// 一致ごとに関数で置換文字列を作る
    pub fn sub_with<F>(&mut self, pattern: &Pattern, count: usize, mut replacer: F) -> Result<usize>
    where
        F: FnMut(&MatchAdapter) -> String,
    {
        let (result, replaced) = {
            let text = self.buffer.text();
            let mut result = String::with_capacity(text.len());
            let mut last = 0;
            let mut replaced = 0;
            for matched in self.finditer(pattern) {
                if count > 0 && replaced >= count {
                    break;
                }
                let range = matched.char_range();
                let (start, end) = (
                    utf8_index(text, range.start),
                    utf8_index(text, range.end),
                );
                result.push_str(&text[last..start]);
                result.push_str(&self.buffer.line_ending().normalize(&replacer(&matched)));
                last = end;
                replaced += 1;
            }
            result.push_str(&text[last..]);
            (result, replaced)
        };
        self.commit(result, replaced)
    }

    /// 置換結果を格納エンコーディングで表せることを確かめてからバッファへ反映
    fn commit(&mut self, result: String, replaced: usize) -> Result<usize> {
        if self.buffer.codec().encode(&result).is_none() {
            return Err(self.buffer.mismatch().into());
        }
        log::debug!("substituted {} matches", replaced);
        self.buffer.replace_text(result);
        Ok(replaced)
    }
}

fn group_text(captures: &Captures<'_>, index: usize) -> String {
    captures
        .get(index)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
