//! 行単位の変換
//!
//! 各行をホストの行インターフェースで直接書き換え、最後にテキストを再構築する

use super::TextBuffer;
use crate::error::{BufferError, Result};
use crate::host::Document;
use crate::text;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

/// 対象行の範囲（0始まり、`stop` は排他的）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub stop: Option<usize>,
    pub step: usize,
}

impl LineRange {
    /// 全行
    pub fn all() -> Self {
        Self {
            start: 0,
            stop: None,
            step: 1,
        }
    }

    pub fn new(start: usize, stop: usize) -> Self {
        Self {
            start,
            stop: Some(stop),
            step: 1,
        }
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    fn indices(&self, line_count: usize) -> Result<impl Iterator<Item = usize>> {
        if self.step == 0 {
            return Err(BufferError::InvalidArgument {
                arg: "line step cannot be zero".to_string(),
            }
            .into());
        }
        let stop = self.stop.unwrap_or(line_count);
        Ok((self.start..stop).step_by(self.step))
    }
}

impl Default for LineRange {
    fn default() -> Self {
        Self::all()
    }
}

impl From<Range<usize>> for LineRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<RangeFrom<usize>> for LineRange {
    fn from(range: RangeFrom<usize>) -> Self {
        Self {
            start: range.start,
            ..Self::all()
        }
    }
}

impl From<RangeTo<usize>> for LineRange {
    fn from(range: RangeTo<usize>) -> Self {
        Self::new(0, range.end)
    }
}

impl From<RangeFull> for LineRange {
    fn from(_: RangeFull) -> Self {
        Self::all()
    }
}

impl<D: Document> TextBuffer<D> {
    /// 範囲内の各行に関数を適用
    ///
    /// 行数を超えた時点で止まる
    pub fn map<F>(&mut self, mut transform: F, lines: impl Into<LineRange>) -> Result<()>
    where
        F: FnMut(&str) -> String,
    {
        let range = lines.into();
        let mut changed = 0usize;
        for index in range.indices(self.document.line_count())? {
            let Some(line) = self.document.line(index) else {
                break;
            };
            if !self.document.set_line(index, transform(&line)) {
                break;
            }
            changed += 1;
        }
        log::debug!("transformed {} lines", changed);
        self.sync_from_host()
    }

    pub fn center(&mut self, width: usize, lines: impl Into<LineRange>) -> Result<()> {
        self.map(|line| text::center(line, width, ' '), lines)
    }

    pub fn rjust(&mut self, width: usize, lines: impl Into<LineRange>) -> Result<()> {
        self.map(|line| text::rjust(line, width, ' '), lines)
    }

    pub fn ljust(&mut self, width: usize, lines: impl Into<LineRange>) -> Result<()> {
        self.map(|line| text::ljust(line, width, ' '), lines)
    }

    pub fn zfill(&mut self, width: usize, lines: impl Into<LineRange>) -> Result<()> {
        self.map(|line| text::zfill(line, width), lines)
    }

    /// 両端から `chars`（既定は空白）を除去
    pub fn strip(&mut self, chars: Option<&str>, lines: impl Into<LineRange>) -> Result<()> {
        self.map(|line| text::strip(line, chars).to_string(), lines)
    }

    pub fn lstrip(&mut self, chars: Option<&str>, lines: impl Into<LineRange>) -> Result<()> {
        self.map(|line| text::lstrip(line, chars).to_string(), lines)
    }

    pub fn rstrip(&mut self, chars: Option<&str>, lines: impl Into<LineRange>) -> Result<()> {
        self.map(|line| text::rstrip(line, chars).to_string(), lines)
    }

    pub fn capitalize(&mut self, lines: impl Into<LineRange>) -> Result<()> {
        self.map(text::capitalize, lines)
    }

    pub fn lower(&mut self, lines: impl Into<LineRange>) -> Result<()> {
        self.map(str::to_lowercase, lines)
    }

    pub fn upper(&mut self, lines: impl Into<LineRange>) -> Result<()> {
        self.map(str::to_uppercase, lines)
    }

    pub fn swapcase(&mut self, lines: impl Into<LineRange>) -> Result<()> {
        self.map(text::swapcase, lines)
    }

    pub fn title(&mut self, lines: impl Into<LineRange>) -> Result<()> {
        self.map(text::to_title, lines)
    }

    /// 各行で `old` を `new` に置換（`count` は1行あたりの上限）
    pub fn replace(
        &mut self,
        old: &str,
        new: &str,
        count: Option<usize>,
        lines: impl Into<LineRange>,
    ) -> Result<()> {
        self.map(|line| text::replace(line, old, new, count), lines)
    }

    pub fn expand_tabs(&mut self, tab_size: usize, lines: impl Into<LineRange>) -> Result<()> {
        self.map(|line| text::expand_tabs(line, tab_size), lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LineEnding, MemoryDocument};

    fn buffer(lines: &[&str]) -> TextBuffer<MemoryDocument> {
        TextBuffer::new(MemoryDocument::new(lines.iter().copied(), LineEnding::Lf)).unwrap()
    }

    #[test]
    fn map_applies_to_range_and_resyncs() {
        let mut buffer = buffer(&["a", "b", "c"]);
        buffer.upper(1..3).unwrap();
        assert_eq!(buffer.text(), "a\nB\nC");
    }

    #[test]
    fn map_stops_past_last_line() {
        let mut buffer = buffer(&["a", "b"]);
        buffer.map(|line| format!("<{}>", line), 1..10).unwrap();
        assert_eq!(buffer.document().lines(), vec!["a", "<b>"]);
    }

    #[test]
    fn stepped_line_range() {
        let mut buffer = buffer(&["a", "b", "c", "d"]);
        buffer.upper(LineRange::all().with_step(2)).unwrap();
        assert_eq!(buffer.text(), "A\nb\nC\nd");
        assert!(buffer.upper(LineRange::all().with_step(0)).is_err());
    }

    #[test]
    fn alignment_and_strip() {
        let mut buffer = buffer(&["ёж", "  x  "]);
        buffer.strip(None, ..).unwrap();
        buffer.rjust(4, ..1).unwrap();
        assert_eq!(buffer.document().lines(), vec!["  ёж", "x"]);
        buffer.center(3, 1..).unwrap();
        assert_eq!(buffer.document().lines(), vec!["  ёж", " x "]);
    }

    #[test]
    fn replace_per_line() {
        let mut buffer = buffer(&["еж еж", "еж"]);
        buffer.replace("еж", "ёж", Some(1), ..).unwrap();
        assert_eq!(buffer.text(), "ёж еж\nёж");
    }

    #[test]
    fn case_transforms() {
        let mut buffer = buffer(&["hello world"]);
        buffer.title(..).unwrap();
        assert_eq!(buffer.text(), "Hello World");
        buffer.swapcase(..).unwrap();
        assert_eq!(buffer.text(), "hELLO wORLD");
        buffer.capitalize(..).unwrap();
        assert_eq!(buffer.text(), "Hello world");
        buffer.zfill(13, ..).unwrap();
        assert_eq!(buffer.text(), "00Hello world");
    }
}
