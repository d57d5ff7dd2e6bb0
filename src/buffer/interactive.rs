//! 対話的な確認
//!
//! 領域へカーソルを移してハイライトし、確認ダイアログの回答を返す

use super::TextBuffer;
use crate::error::{BufferError, Result};
use crate::host::{Document, Highlight, Prompt, ViewAnchor};

/// ハイライトと表示位置の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOptions {
    /// ハイライトグループ名
    pub highlight_group: String,
    /// 表示位置の寄せ方
    pub anchor: ViewAnchor,
    /// 領域と画面端の間に空ける行数
    pub gap: usize,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            highlight_group: "IncSearch".to_string(),
            anchor: ViewAnchor::Bottom,
            gap: 3,
        }
    }
}

/// 確認ダイアログの要求
#[derive(Debug, Clone)]
pub struct InteractiveRequest<'a> {
    /// 領域の開始（格納バイトオフセット、未指定なら現在位置）
    pub start: Option<usize>,
    /// 領域の終了（排他的）
    pub end: Option<usize>,
    pub message: &'a str,
    pub choices: &'a [&'a str],
    /// 既定の選択肢（1始まり、0は既定なし）
    pub default: usize,
    pub options: PromptOptions,
}

impl<'a> InteractiveRequest<'a> {
    pub fn new(message: &'a str, choices: &'a [&'a str]) -> Self {
        Self {
            start: None,
            end: None,
            message,
            choices,
            default: 1,
            options: PromptOptions::default(),
        }
    }

    /// ハイライトする領域
    pub fn region(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn default_choice(mut self, default: usize) -> Self {
        self.default = default;
        self
    }

    pub fn options(mut self, options: PromptOptions) -> Self {
        self.options = options;
        self
    }
}

impl<D: Document> TextBuffer<D> {
    /// ホストが確認ダイアログに対応しているか
    pub fn dialog_available(&self, prompt: &impl Prompt) -> bool {
        prompt.dialog_available()
    }

    /// 領域を示して確認ダイアログを表示し、選択肢番号（1始まり、0は中断）を返す
    ///
    /// ダイアログが使えない場合は何もせずにエラーを返す
    pub fn interactive(
        &mut self,
        prompt: &mut impl Prompt,
        request: &InteractiveRequest<'_>,
    ) -> Result<usize> {
        if !prompt.dialog_available() {
            return Err(BufferError::DialogUnavailable.into());
        }

        let start = match request.start {
            Some(start) => start,
            None => self.tell()?,
        };
        let end = match request.end {
            Some(end) => end,
            None => start,
        };
        let start_position = self.offset_to_line_column(start)?;
        let end_position = self.offset_to_line_column(end.max(start))?;

        self.document.set_cursor(start_position);

        let options = &request.options;
        let line = match options.anchor {
            ViewAnchor::Top => start_position.line.saturating_sub(options.gap).max(1),
            ViewAnchor::Bottom => (end_position.line + options.gap).min(self.document.line_count()),
        };
        prompt.scroll_to(line, options.anchor);

        let region = Highlight {
            group: options.highlight_group.clone(),
            start: start_position,
            end: end_position,
        };
        prompt.highlight(&self.document, &region);
        prompt.redraw();

        let answer = prompt.confirm(request.message, request.choices, request.default);
        prompt.clear_highlight(&region);
        log::debug!("prompt '{}' answered {}", request.message, answer);
        Ok(answer)
    }
}
