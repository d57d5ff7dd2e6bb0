//! 修正セッション
//!
//! 辞書に載っている語を探し、まとめて、または1語ずつ確認しながら ё に直す

use super::dictionary::Dictionary;
use crate::buffer::{InteractiveRequest, Piece, PromptOptions, TextBuffer};
use crate::codec::{char_to_byte_offset, Anchor};
use crate::error::{BufferError, Result, SessionError};
use crate::host::{Document, Prompt};
use crate::search::PatternFlags;
use crate::text::fix_case;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

const NECESSARY_EMPTY: &str = "No words, written without necessary YO were found!";
const OPTIONAL_EMPTY: &str = "No words, written without optional YO were found!";
const ACKNOWLEDGE: &[&str] = &["&Ok"];
const CONFIRM: &[&str] = &["&Yes", "&No"];
const REVIEW: &[&str] = &["&Correct", "&All", "&Backwards", "&Forward", "&Exit"];

/// 語の区切りとみなす文字
const SEPARATORS: &str = r#"\s.,"'\-:\\/<>;()!?_\[\]"#;

/// 修正の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionMode {
    /// 見つかった語をまとめて確認し、一括で直す
    Necessary,
    /// 1語ずつ確認する
    Optional,
}

impl CorrectionMode {
    /// 辞書の該当部分
    pub fn entries(self, dictionary: &Dictionary) -> &BTreeMap<String, String> {
        match self {
            CorrectionMode::Necessary => &dictionary.necessary,
            CorrectionMode::Optional => &dictionary.optional,
        }
    }
}

impl FromStr for CorrectionMode {
    type Err = BufferError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "necessary" => Ok(CorrectionMode::Necessary),
            "optional" => Ok(CorrectionMode::Optional),
            other => Err(BufferError::InvalidArgument {
                arg: format!("correction mode '{}'", other),
            }),
        }
    }
}

impl fmt::Display for CorrectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionMode::Necessary => f.write_str("necessary"),
            CorrectionMode::Optional => f.write_str("optional"),
        }
    }
}

/// セッションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Scanning,
    /// 該当語なし
    Empty,
    Reviewing,
    Resolving,
    Done,
}

/// 確認ダイアログでの選択
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewChoice {
    CorrectOne,
    CorrectAll,
    Previous,
    Next,
    Exit,
}

impl ReviewChoice {
    /// ダイアログの回答（1始まり）から変換。範囲外や中断は `Exit`
    pub fn from_answer(answer: usize) -> Self {
        match answer {
            1 => ReviewChoice::CorrectOne,
            2 => ReviewChoice::CorrectAll,
            3 => ReviewChoice::Previous,
            4 => ReviewChoice::Next,
            _ => ReviewChoice::Exit,
        }
    }
}

/// 未処理の該当語
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMatch {
    word: String,
    /// 大文字小文字を合わせた置換語（判定できなければ `None`）
    replacement: Option<String>,
    /// 現在の文字インデックス範囲
    chars: Range<usize>,
}

impl PendingMatch {
    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn replacement(&self) -> Option<&str> {
        self.replacement.as_deref()
    }

    pub fn char_range(&self) -> Range<usize> {
        self.chars.clone()
    }

    fn shift(&mut self, delta: isize) {
        let move_by = |index: usize| index.saturating_add_signed(delta);
        self.chars = move_by(self.chars.start)..move_by(self.chars.end);
    }
}

/// セッションの結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionSummary {
    /// 見つかった語数
    pub found: usize,
    /// 直した語数
    pub corrected: usize,
    /// 大文字小文字が判定できずに飛ばした語数
    pub skipped: usize,
    /// 未処理のまま終えた語数
    pub abandoned: usize,
    /// 利用者が中断したか
    pub cancelled: bool,
}

/// 候補語のパターン（区切り以外の連続、対象文字、区切り以外の連続）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPattern {
    source: String,
}

impl WordPattern {
    /// 対象文字から作る
    pub fn new(targets: &str) -> Self {
        let center: String = targets
            .chars()
            .map(|ch| regex::escape(ch.encode_utf8(&mut [0; 4])))
            .collect();
        let side = format!("[^{}]*", SEPARATORS);
        Self {
            source: format!("{side}[{center}]{side}"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for WordPattern {
    fn default() -> Self {
        Self::new("еЕ")
    }
}

/// 1種類の修正を行うセッション
pub struct CorrectionSession<'a, D: Document> {
    buffer: &'a mut TextBuffer<D>,
    entries: &'a BTreeMap<String, String>,
    mode: CorrectionMode,
    pattern: WordPattern,
    options: PromptOptions,
    state: SessionState,
    /// テキスト順
    pending: Vec<PendingMatch>,
    cursor: usize,
    summary: CorrectionSummary,
}

impl<'a, D: Document> CorrectionSession<'a, D> {
    pub fn new(buffer: &'a mut TextBuffer<D>, dictionary: &'a Dictionary, mode: CorrectionMode) -> Self {
        Self {
            buffer,
            entries: mode.entries(dictionary),
            mode,
            pattern: WordPattern::default(),
            options: PromptOptions::default(),
            state: SessionState::Idle,
            pending: Vec::new(),
            cursor: 0,
            summary: CorrectionSummary::default(),
        }
    }

    pub fn with_pattern(mut self, pattern: WordPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_options(mut self, options: PromptOptions) -> Self {
        self.options = options;
        self
    }

    pub fn mode(&self) -> CorrectionMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pending(&self) -> &[PendingMatch] {
        &self.pending
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// カーソル位置の語
    pub fn current(&self) -> Option<&PendingMatch> {
        self.pending.get(self.cursor)
    }

    pub fn summary(&self) -> CorrectionSummary {
        self.summary
    }

    pub fn buffer(&self) -> &TextBuffer<D> {
        self.buffer
    }

    /// バッファ全体から辞書に載っている語を探す
    pub fn scan(&mut self) -> Result<usize> {
        self.state = SessionState::Scanning;
        let entries = self.entries;

        let engine = self.buffer.re();
        let pattern = engine.compile(self.pattern.as_str(), PatternFlags::default())?;
        let pending: Vec<PendingMatch> = engine
            .finditer(&pattern)
            .filter_map(|matched| {
                // ё を含む語はキーにならないので、正しく書かれた語は拾わない
                let word = matched.as_str();
                let canonical = entries.get(&word.to_lowercase())?;
                Some(PendingMatch {
                    word: word.to_string(),
                    replacement: fix_case(word, canonical),
                    chars: matched.char_range(),
                })
            })
            .collect();

        log::debug!("{} scan found {} words", self.mode, pending.len());
        self.summary = CorrectionSummary {
            found: pending.len(),
            ..CorrectionSummary::default()
        };
        self.pending = pending;
        self.cursor = 0;
        self.state = if self.pending.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Reviewing
        };
        Ok(self.pending.len())
    }

    fn ensure_reviewing(&self) -> Result<()> {
        match self.state {
            SessionState::Idle | SessionState::Scanning => Err(SessionError::NotScanned.into()),
            _ => Ok(()),
        }
    }

    /// カーソル位置の語を直して一覧から外す。直せたら `true`
    pub fn fix_current(&mut self) -> Result<bool> {
        self.ensure_reviewing()?;
        if self.cursor >= self.pending.len() {
            return Ok(false);
        }

        self.state = SessionState::Resolving;
        let item = self.pending[self.cursor].clone();
        let delta = self.apply(&item)?;
        self.pending.remove(self.cursor);

        if let Some(delta) = delta {
            for later in self
                .pending
                .iter_mut()
                .filter(|later| later.chars.start >= item.chars.end)
            {
                later.shift(delta);
            }
        }

        if self.cursor >= self.pending.len() {
            self.cursor = 0;
        }
        self.state = if self.pending.is_empty() {
            SessionState::Done
        } else {
            SessionState::Reviewing
        };
        Ok(delta.is_some())
    }

    /// 残りの語をテキスト順にすべて直す。直した語数を返す
    pub fn fix_all(&mut self) -> Result<usize> {
        self.ensure_reviewing()?;
        self.state = SessionState::Resolving;

        let mut corrected = 0;
        let mut offset: isize = 0;
        let items = std::mem::take(&mut self.pending);
        for (index, mut item) in items.iter().cloned().enumerate() {
            item.shift(offset);
            match self.apply(&item) {
                Ok(Some(delta)) => {
                    offset += delta;
                    corrected += 1;
                }
                Ok(None) => {}
                Err(error) => {
                    self.pending = items[index..].to_vec();
                    self.pending.iter_mut().for_each(|rest| rest.shift(offset));
                    self.cursor = 0;
                    self.state = SessionState::Reviewing;
                    return Err(error);
                }
            }
        }

        self.cursor = 0;
        self.state = SessionState::Done;
        Ok(corrected)
    }

    /// 前の語へ（先頭からは末尾へ）
    pub fn previous(&mut self) -> Result<()> {
        self.ensure_reviewing()?;
        if !self.pending.is_empty() {
            self.cursor = self
                .cursor
                .checked_sub(1)
                .unwrap_or(self.pending.len() - 1);
        }
        Ok(())
    }

    /// 次の語へ（末尾からは先頭へ）
    pub fn next(&mut self) -> Result<()> {
        self.ensure_reviewing()?;
        if !self.pending.is_empty() {
            self.cursor = (self.cursor + 1) % self.pending.len();
        }
        Ok(())
    }

    /// 残りを未処理のまま終える
    pub fn cancel(&mut self) {
        self.abandon();
        self.summary.cancelled = true;
    }

    fn abandon(&mut self) {
        self.summary.abandoned += self.pending.len();
        self.pending.clear();
        self.cursor = 0;
        self.state = SessionState::Done;
    }

    /// カーソル位置の語の格納バイト範囲
    pub fn current_span(&self) -> Option<(usize, usize)> {
        let item = self.current()?;
        let text = self.buffer.text();
        let codec = self.buffer.codec();
        let start = char_to_byte_offset(text, item.chars.start, &codec, Anchor::ORIGIN);
        let end = start + codec.encoded_len(&item.word);
        Some((start, end))
    }

    /// 1語を置き換え、文字数の増減を返す
    ///
    /// 大文字小文字が判定できない語は置き換えずに `None`
    fn apply(&mut self, item: &PendingMatch) -> Result<Option<isize>> {
        let Some(replacement) = item.replacement.as_deref() else {
            log::warn!(
                "skipping '{}': cannot determine its letter case",
                item.word
            );
            self.summary.skipped += 1;
            return Ok(None);
        };

        let Range { start, end } = item.chars;
        let current = self.buffer.get_slice(start as isize..end as isize);
        if current != item.word {
            return Err(SessionError::StaleMatch {
                word: item.word.clone(),
                start,
            }
            .into());
        }

        self.buffer.splice(start, end, Piece::Text(replacement))?;
        self.summary.corrected += 1;
        log::debug!("corrected '{}' -> '{}' at {}", item.word, replacement, start);

        let delta = replacement.chars().count() as isize - item.word.chars().count() as isize;
        Ok(Some(delta))
    }

    /// 確認ダイアログを使ってセッションを最後まで進める
    pub fn run(&mut self, prompt: &mut impl Prompt) -> Result<CorrectionSummary> {
        if self.state == SessionState::Idle {
            self.scan()?;
        }

        match (self.state, self.mode) {
            (SessionState::Empty, mode) => {
                let message = match mode {
                    CorrectionMode::Necessary => NECESSARY_EMPTY,
                    CorrectionMode::Optional => OPTIONAL_EMPTY,
                };
                let request = InteractiveRequest::new(message, ACKNOWLEDGE)
                    .default_choice(0)
                    .options(self.options.clone());
                self.buffer.interactive(prompt, &request)?;
                self.state = SessionState::Done;
            }
            (SessionState::Reviewing, CorrectionMode::Necessary) => self.run_necessary(prompt)?,
            (SessionState::Reviewing, CorrectionMode::Optional) => self.run_optional(prompt)?,
            _ => {}
        }

        log::info!(
            "{} correction finished: {} found, {} corrected, {} skipped, {} abandoned",
            self.mode,
            self.summary.found,
            self.summary.corrected,
            self.summary.skipped,
            self.summary.abandoned
        );
        Ok(self.summary)
    }

    fn run_necessary(&mut self, prompt: &mut impl Prompt) -> Result<()> {
        let message = format!(
            "{} words, written without necessary YO were found! Do you want to correct them?",
            self.pending.len()
        );
        let request = InteractiveRequest::new(&message, CONFIRM)
            .default_choice(1)
            .options(self.options.clone());

        match self.buffer.interactive(prompt, &request)? {
            1 => {
                self.fix_all()?;
            }
            0 => self.cancel(),
            _ => self.abandon(),
        }
        Ok(())
    }

    fn run_optional(&mut self, prompt: &mut impl Prompt) -> Result<()> {
        while self.state == SessionState::Reviewing {
            let Some((start, end)) = self.current_span() else {
                break;
            };
            let message = format!(
                "{} words with optional YO were found! You can choose which words to correct, \
                 or to correct them all at once!",
                self.pending.len()
            );
            let request = InteractiveRequest::new(&message, REVIEW)
                .region(start, end)
                .default_choice(0)
                .options(self.options.clone());

            let answer = self.buffer.interactive(prompt, &request)?;
            match ReviewChoice::from_answer(answer) {
                ReviewChoice::CorrectOne => {
                    self.fix_current()?;
                }
                ReviewChoice::CorrectAll => {
                    self.fix_all()?;
                }
                ReviewChoice::Previous => self.previous()?,
                ReviewChoice::Next => self.next()?,
                ReviewChoice::Exit => self.cancel(),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LineEnding, MemoryDocument, PromptEvent, ScriptedPrompt};

    fn buffer(text: &str) -> TextBuffer<MemoryDocument> {
        TextBuffer::new(MemoryDocument::from_text(text, LineEnding::Lf)).unwrap()
    }

    fn optional(words: &[&str]) -> Dictionary {
        let mut dictionary = Dictionary::new();
        words.iter().for_each(|word| dictionary.insert_optional(word));
        dictionary
    }

    #[test]
    fn word_pattern_matches_words_around_target() {
        let pattern = regex::Regex::new(WordPattern::default().as_str()).unwrap();
        let words: Vec<_> = pattern
            .find_iter("Еж, (елке) и дом-еще")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(words, vec!["Еж", "елке", "еще"]);
        assert!(!pattern.is_match("|"));
    }

    #[test]
    fn scan_collects_dictionary_words_in_text_order() {
        let dictionary = optional(&["ёж", "ёлке"]);
        let mut buffer = buffer("Еж на елке, еще ЕЖ");
        let mut session = CorrectionSession::new(&mut buffer, &dictionary, CorrectionMode::Optional);
        assert_eq!(session.scan().unwrap(), 3);
        let words: Vec<_> = session.pending().iter().map(|p| p.word()).collect();
        assert_eq!(words, vec!["Еж", "елке", "ЕЖ"]);
        assert_eq!(session.pending()[0].replacement(), Some("Ёж"));
        assert_eq!(session.pending()[2].replacement(), Some("ЁЖ"));
        assert_eq!(session.state(), SessionState::Reviewing);
    }

    #[test]
    fn scan_skips_words_already_written_with_yo() {
        let dictionary = optional(&["ещё", "ёлке"]);
        let mut buffer = buffer("на ёлке ещё, на елке еще");
        let mut session = CorrectionSession::new(&mut buffer, &dictionary, CorrectionMode::Optional);
        assert_eq!(session.scan().unwrap(), 2);
        let words: Vec<_> = session.pending().iter().map(|p| p.word()).collect();
        assert_eq!(words, vec!["елке", "еще"]);
    }

    #[test]
    fn operations_require_scan() {
        let dictionary = optional(&["ёж"]);
        let mut buffer = buffer("еж");
        let mut session = CorrectionSession::new(&mut buffer, &dictionary, CorrectionMode::Optional);
        assert!(session.next().is_err());
        assert!(session.fix_current().is_err());
    }

    #[test]
    fn next_and_previous_wrap() {
        let dictionary = optional(&["ёж"]);
        let mut buffer = buffer("еж еж еж");
        let mut session = CorrectionSession::new(&mut buffer, &dictionary, CorrectionMode::Optional);
        session.scan().unwrap();
        session.previous().unwrap();
        assert_eq!(session.cursor(), 2);
        session.next().unwrap();
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn fix_current_shifts_later_matches() {
        let dictionary = optional(&["ёж", "всё"]);
        let mut buffer = buffer("все еж");
        let mut session = CorrectionSession::new(&mut buffer, &dictionary, CorrectionMode::Optional);
        session.scan().unwrap();
        assert!(session.fix_current().unwrap());
        assert_eq!(session.pending()[0].char_range(), 4..6);
        assert!(session.fix_current().unwrap());
        assert_eq!(session.state(), SessionState::Done);
        drop(session);
        assert_eq!(buffer.text(), "всё ёж");
    }

    #[test]
    fn mixed_case_word_is_skipped() {
        let dictionary = optional(&["ёж"]);
        let mut buffer = buffer("еЖ");
        let mut session = CorrectionSession::new(&mut buffer, &dictionary, CorrectionMode::Optional);
        session.scan().unwrap();
        assert!(!session.fix_current().unwrap());
        assert_eq!(session.summary().skipped, 1);
        assert_eq!(session.state(), SessionState::Done);
        drop(session);
        assert_eq!(buffer.text(), "еЖ");
    }

    #[test]
    fn stale_match_is_detected() {
        let dictionary = optional(&["ёж"]);
        let mut buffer = buffer("еж");
        let mut session = CorrectionSession::new(&mut buffer, &dictionary, CorrectionMode::Optional);
        session.scan().unwrap();
        session.buffer.set_slice(0..1, "x").unwrap();
        let error = session.fix_current().unwrap_err();
        assert!(matches!(
            error,
            crate::error::YoError::Session(SessionError::StaleMatch { .. })
        ));
    }

    #[test]
    fn optional_run_highlights_storage_span() {
        let dictionary = optional(&["ёж"]);
        let document = MemoryDocument::new(["на еж"], LineEnding::Lf).with_encoding("cp1251");
        let mut buffer = TextBuffer::new(document).unwrap();
        let mut prompt = ScriptedPrompt::new([1]);
        let summary = CorrectionSession::new(&mut buffer, &dictionary, CorrectionMode::Optional)
            .run(&mut prompt)
            .unwrap();
        assert_eq!(summary.corrected, 1);
        let highlight = prompt.highlights()[0].clone();
        assert_eq!((highlight.start.column, highlight.end.column), (4, 6));
        assert_eq!(buffer.text(), "на ёж");
    }

    #[test]
    fn exit_abandons_remaining() {
        let dictionary = optional(&["ёж"]);
        let mut buffer = buffer("еж еж");
        let mut prompt = ScriptedPrompt::new([4, 5]);
        let summary = CorrectionSession::new(&mut buffer, &dictionary, CorrectionMode::Optional)
            .run(&mut prompt)
            .unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.abandoned, 2);
        assert_eq!(buffer.text(), "еж еж");
        let confirms = prompt
            .events()
            .iter()
            .filter(|event| matches!(event, PromptEvent::Confirm { .. }))
            .count();
        assert_eq!(confirms, 2);
    }

    #[test]
    fn necessary_decline_leaves_text() {
        let mut dictionary = Dictionary::new();
        dictionary.insert_necessary("ёлке");
        let mut buffer = buffer("на елке");
        let mut prompt = ScriptedPrompt::new([2]);
        let summary = CorrectionSession::new(&mut buffer, &dictionary, CorrectionMode::Necessary)
            .run(&mut prompt)
            .unwrap();
        assert_eq!(summary.abandoned, 1);
        assert!(!summary.cancelled);
        assert_eq!(buffer.text(), "на елке");
    }

    #[test]
    fn review_choice_mapping() {
        assert_eq!(ReviewChoice::from_answer(2), ReviewChoice::CorrectAll);
        assert_eq!(ReviewChoice::from_answer(0), ReviewChoice::Exit);
        assert_eq!(ReviewChoice::from_answer(9), ReviewChoice::Exit);
    }
}
