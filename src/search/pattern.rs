//! パターンのコンパイル

use regex::{Regex, RegexBuilder};
use std::ops::BitOr;

/// コンパイルフラグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternFlags {
    pub ignore_case: bool,
    /// `^` / `$` を行頭・行末にも一致させる
    pub multi_line: bool,
    /// `.` を改行にも一致させる
    pub dot_all: bool,
    /// 空白と `#` コメントを無視する
    pub verbose: bool,
    /// Unicode対応の文字クラス
    pub unicode: bool,
}

impl PatternFlags {
    pub const UNICODE: PatternFlags = PatternFlags {
        ignore_case: false,
        multi_line: false,
        dot_all: false,
        verbose: false,
        unicode: true,
    };

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn multi_line(mut self) -> Self {
        self.multi_line = true;
        self
    }

    pub fn dot_all(mut self) -> Self {
        self.dot_all = true;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl BitOr for PatternFlags {
    type Output = PatternFlags;

    fn bitor(self, other: PatternFlags) -> PatternFlags {
        PatternFlags {
            ignore_case: self.ignore_case || other.ignore_case,
            multi_line: self.multi_line || other.multi_line,
            dot_all: self.dot_all || other.dot_all,
            verbose: self.verbose || other.verbose,
            unicode: self.unicode || other.unicode,
        }
    }
}

/// コンパイル済みパターン
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    flags: PatternFlags,
    /// グループ番号ごとの、パターン中で閉じ括弧が現れる順位（1始まり）
    closing: Vec<usize>,
}

impl Pattern {
    /// フラグどおりにコンパイル（エンジンのエラーはそのまま返す）
    pub fn new(source: &str, flags: PatternFlags) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(flags.ignore_case)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .ignore_whitespace(flags.verbose)
            .unicode(flags.unicode)
            .build()?;
        let closing = closing_order(source, flags.verbose, regex.captures_len() - 1);
        Ok(Self {
            regex,
            flags,
            closing,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn flags(&self) -> PatternFlags {
        self.flags
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// グループ数（全体一致を除く）
    pub fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// 名前付きグループの番号
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.regex
            .capture_names()
            .position(|candidate| candidate == Some(name))
    }

    /// グループの閉じ括弧の順位
    ///
    /// 同じ位置で終わるグループのうち、順位が大きいものが後に閉じている
    pub(crate) fn closing_rank(&self, index: usize) -> usize {
        self.closing.get(index).copied().unwrap_or(index)
    }

    /// 番号ごとのグループ名
    pub fn group_names(&self) -> Vec<Option<String>> {
        self.regex
            .capture_names()
            .map(|name| name.map(String::from))
            .collect()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str() && self.flags == other.flags
    }
}

impl Eq for Pattern {}

/// パターン文字列を走査し、捕捉グループが閉じる順位を番号ごとに求める
///
/// 数えたグループ数がエンジンと食い違う場合は番号順とみなす
fn closing_order(source: &str, verbose: bool, group_count: usize) -> Vec<usize> {
    let mut order = vec![0; group_count + 1];
    let mut open: Vec<Option<usize>> = Vec::new();
    let mut next_group = 1;
    let mut closed = 0;
    let mut verbose = verbose;
    let mut class_depth = 0usize;
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '[' => {
                class_depth += 1;
                // 先頭の `]` は文字
                if chars.peek() == Some(&'^') {
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    chars.next();
                }
            }
            ']' if class_depth > 0 => class_depth -= 1,
            _ if class_depth > 0 => {}
            '#' if verbose => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
            }
            '(' => {
                if chars.peek() != Some(&'?') {
                    open.push(Some(next_group));
                    next_group += 1;
                    continue;
                }
                chars.next();
                if matches!(chars.peek(), Some('P') | Some('<')) {
                    open.push(Some(next_group));
                    next_group += 1;
                    continue;
                }

                // フラグ指定 `(?flags)` / `(?flags:...)`
                let mut negated = false;
                let mut scoped = false;
                for flag in chars.by_ref() {
                    match flag {
                        '-' => negated = true,
                        'x' => verbose = !negated,
                        ':' => {
                            scoped = true;
                            break;
                        }
                        ')' => break,
                        _ => {}
                    }
                }
                if scoped {
                    open.push(None);
                }
            }
            ')' => {
                if let Some(Some(index)) = open.pop() {
                    closed += 1;
                    if let Some(rank) = order.get_mut(index) {
                        *rank = closed;
                    }
                }
            }
            _ => {}
        }
    }

    if next_group - 1 == group_count {
        order
    } else {
        (0..=group_count).collect()
    }
}

/// コンパイル対象
#[derive(Debug, Clone, Copy)]
pub enum PatternInput<'a> {
    /// パターン文字列
    Text(&'a str),
    /// バイト列のパターン（復号方法が決められないため受け付けない）
    Raw(&'a [u8]),
    /// コンパイル済み
    Compiled(&'a Pattern),
}

impl<'a> From<&'a str> for PatternInput<'a> {
    fn from(source: &'a str) -> Self {
        PatternInput::Text(source)
    }
}

impl<'a> From<&'a String> for PatternInput<'a> {
    fn from(source: &'a String) -> Self {
        PatternInput::Text(source.as_str())
    }
}

impl<'a> From<&'a [u8]> for PatternInput<'a> {
    fn from(source: &'a [u8]) -> Self {
        PatternInput::Raw(source)
    }
}

impl<'a> From<&'a Pattern> for PatternInput<'a> {
    fn from(pattern: &'a Pattern) -> Self {
        PatternInput::Compiled(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_applied() {
        let pattern = Pattern::new("ЁЖ", PatternFlags::UNICODE.ignore_case()).unwrap();
        assert!(pattern.regex().is_match("ёж"));
        let verbose = Pattern::new("a b # comment", PatternFlags::UNICODE.verbose()).unwrap();
        assert!(verbose.regex().is_match("ab"));
    }

    #[test]
    fn group_metadata() {
        let pattern = Pattern::new(r"(?P<head>\w)(\w)", PatternFlags::UNICODE).unwrap();
        assert_eq!(pattern.group_count(), 2);
        assert_eq!(pattern.group_index("head"), Some(1));
        assert_eq!(pattern.group_index("tail"), None);
        assert_eq!(
            pattern.group_names(),
            vec![None, Some("head".to_string()), None]
        );
    }

    #[test]
    fn closing_order_follows_parentheses() {
        assert_eq!(closing_order("(a(b))", false, 2), vec![0, 2, 1]);
        assert_eq!(closing_order("(a)(b*)", false, 2), vec![0, 1, 2]);
        assert_eq!(
            closing_order(r"(?:x(?P<n>[(\]])\((y)\))", false, 2),
            vec![0, 1, 2]
        );
        assert_eq!(closing_order("(?x) (a) # (b)\n (c)", false, 2), vec![0, 1, 2]);
        assert_eq!(closing_order("(?i)(a)", false, 1), vec![0, 1]);
    }

    #[test]
    fn flag_union() {
        let merged = PatternFlags::default().ignore_case() | PatternFlags::UNICODE;
        assert!(merged.ignore_case && merged.unicode);
        assert!(!merged.dot_all);
    }

    #[test]
    fn malformed_pattern_error_is_engine_error() {
        assert!(Pattern::new("(", PatternFlags::UNICODE).is_err());
    }
}
