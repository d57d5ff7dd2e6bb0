//! メモリ上のホスト実装
//!
//! テストとCLIで使用する文書と、応答を事前に仕込める確認ダイアログ

use super::{Document, Highlight, LineEnding, Position, Prompt, ViewAnchor};
use crate::codec::Codec;
use crate::error::{EncodingError, Result};
use std::collections::VecDeque;

/// メモリ上の文書
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDocument {
    lines: Vec<String>,
    line_ending: LineEnding,
    encoding: String,
    file_encoding: String,
    locale: Option<String>,
    cursor: Position,
}

impl MemoryDocument {
    /// 行の並びから作成（エンコーディングはUTF-8）
    pub fn new<I, S>(lines: I, line_ending: LineEnding) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut document = Self {
            lines: Vec::new(),
            line_ending,
            encoding: "utf-8".to_string(),
            file_encoding: String::new(),
            locale: None,
            cursor: Position::default(),
        };
        document.replace_lines(lines.into_iter().map(Into::into).collect());
        document
    }

    /// 改行コードで区切られたテキストから作成
    pub fn from_text(text: &str, line_ending: LineEnding) -> Self {
        Self::new(text.split(line_ending.as_str()), line_ending)
    }

    /// ファイル内容のバイト列から作成
    ///
    /// 改行コードが指定されなければ内容から推定し、末尾の改行は行として数えない
    pub fn from_bytes(
        bytes: &[u8],
        file_encoding: &str,
        line_ending: Option<LineEnding>,
    ) -> Result<Self> {
        let codec = Codec::resolve(file_encoding, None)?;
        let content = codec
            .decode(bytes)
            .ok_or_else(|| EncodingError::InvalidEncoding {
                encoding: codec.name().to_string(),
                file_encoding: file_encoding.to_string(),
            })?;

        let line_ending = line_ending.unwrap_or_else(|| LineEnding::detect(&content));
        let body = content
            .strip_suffix(line_ending.as_str())
            .unwrap_or(&content);

        log::debug!(
            "loaded {} bytes as {} ({})",
            bytes.len(),
            codec.name(),
            line_ending
        );

        Ok(Self::from_text(body, line_ending)
            .with_encoding(file_encoding)
            .with_file_encoding(file_encoding))
    }

    /// ファイルへ書き出すバイト列（末尾改行付き）
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let label = if self.file_encoding.is_empty() {
            &self.encoding
        } else {
            &self.file_encoding
        };
        let codec = Codec::resolve(label, self.locale.as_deref())?;
        let mut content = self.text();
        content.push_str(self.line_ending.as_str());

        codec
            .encode(&content)
            .map(|bytes| bytes.into_owned())
            .ok_or_else(|| {
                EncodingError::Mismatch {
                    encoding: self.encoding.clone(),
                    file_encoding: label.clone(),
                }
                .into()
            })
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_file_encoding(mut self, file_encoding: impl Into<String>) -> Self {
        self.file_encoding = file_encoding.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// 改行コード設定を変更
    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    /// 全行を改行コードで連結したテキスト
    pub fn text(&self) -> String {
        self.lines.join(self.line_ending.as_str())
    }

    fn codec(&self) -> Codec {
        Codec::resolve(&self.encoding, self.locale.as_deref()).unwrap_or_default()
    }

    /// 各行の（改行込み）格納バイト長
    fn line_spans(&self) -> impl Iterator<Item = usize> + '_ {
        let codec = self.codec();
        let eol = self.line_ending.as_str().len();
        self.lines
            .iter()
            .map(move |line| codec.encoded_len(line) + eol)
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new([""], LineEnding::Lf)
    }
}

impl Document for MemoryDocument {
    fn lines(&self) -> Vec<String> {
        self.lines.clone()
    }

    fn replace_lines(&mut self, lines: Vec<String>) {
        self.lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, index: usize) -> Option<String> {
        self.lines.get(index).cloned()
    }

    fn set_line(&mut self, index: usize, text: String) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                *line = text;
                true
            }
            None => false,
        }
    }

    fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    fn encoding(&self) -> String {
        self.encoding.clone()
    }

    fn file_encoding(&self) -> String {
        self.file_encoding.clone()
    }

    fn locale_encoding(&self) -> Option<String> {
        self.locale.clone()
    }

    fn byte_to_line(&self, byte: usize) -> Option<usize> {
        if byte == 0 {
            return None;
        }
        let mut start = 1usize;
        for (idx, span) in self.line_spans().enumerate() {
            if byte < start + span {
                return Some(idx + 1);
            }
            start += span;
        }
        None
    }

    fn line_to_byte(&self, line: usize) -> Option<usize> {
        if line == 0 || line > self.lines.len() + 1 {
            return None;
        }
        Some(1 + self.line_spans().take(line - 1).sum::<usize>())
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn set_cursor(&mut self, position: Position) {
        self.cursor = position;
    }
}

/// 記録されるダイアログ操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    Scroll { line: usize, anchor: ViewAnchor },
    Highlight(Highlight),
    ClearHighlight(Highlight),
    Redraw,
    Confirm {
        message: String,
        choices: Vec<String>,
        default: usize,
    },
}

/// 応答を事前に仕込める確認ダイアログ
///
/// 応答が尽きた場合は中断（0）を返す
#[derive(Debug, Clone)]
pub struct ScriptedPrompt {
    answers: VecDeque<usize>,
    dialogs: bool,
    events: Vec<PromptEvent>,
}

impl ScriptedPrompt {
    pub fn new<I: IntoIterator<Item = usize>>(answers: I) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            dialogs: true,
            events: Vec::new(),
        }
    }

    /// ダイアログ非対応のホストを模擬
    pub fn without_dialogs(mut self) -> Self {
        self.dialogs = false;
        self
    }

    pub fn events(&self) -> &[PromptEvent] {
        &self.events
    }

    /// 表示された確認メッセージ
    pub fn messages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                PromptEvent::Confirm { message, .. } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    /// ハイライトされた領域
    pub fn highlights(&self) -> Vec<&Highlight> {
        self.events
            .iter()
            .filter_map(|event| match event {
                PromptEvent::Highlight(region) => Some(region),
                _ => None,
            })
            .collect()
    }

    pub fn remaining_answers(&self) -> usize {
        self.answers.len()
    }
}

impl Default for ScriptedPrompt {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Prompt for ScriptedPrompt {
    fn dialog_available(&self) -> bool {
        self.dialogs
    }

    fn scroll_to(&mut self, line: usize, anchor: ViewAnchor) {
        self.events.push(PromptEvent::Scroll { line, anchor });
    }

    fn highlight(&mut self, _document: &dyn Document, region: &Highlight) {
        self.events.push(PromptEvent::Highlight(region.clone()));
    }

    fn clear_highlight(&mut self, region: &Highlight) {
        self.events.push(PromptEvent::ClearHighlight(region.clone()));
    }

    fn redraw(&mut self) {
        self.events.push(PromptEvent::Redraw);
    }

    fn confirm(&mut self, message: &str, choices: &[&str], default: usize) -> usize {
        self.events.push(PromptEvent::Confirm {
            message: message.to_string(),
            choices: choices.iter().map(|choice| choice.to_string()).collect(),
            default,
        });
        self.answers.pop_front().unwrap_or(0)
    }
}
