//! ホストエディタとのインターフェース
//!
//! コアはこのトレイト経由でのみホストの文書・カーソル・ダイアログに触れる

pub mod memory;
pub mod terminal;

pub use memory::{MemoryDocument, PromptEvent, ScriptedPrompt};
pub use terminal::TerminalPrompt;

use crate::error::BufferError;
use std::fmt;
use std::str::FromStr;

/// 改行コード（ホストの 'fileformat' に対応）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// \n (unix)
    #[default]
    Lf,
    /// \r\n (dos)
    CrLf,
    /// \r (mac)
    Cr,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }

    /// ホストの 'fileformat' 名
    pub fn file_format(self) -> &'static str {
        match self {
            LineEnding::Lf => "unix",
            LineEnding::CrLf => "dos",
            LineEnding::Cr => "mac",
        }
    }

    /// 内容から改行コードを推定（最初に現れた改行を採用）
    pub fn detect(content: &str) -> Self {
        match content.find(['\r', '\n']) {
            Some(idx) if content[idx..].starts_with("\r\n") => LineEnding::CrLf,
            Some(idx) if content[idx..].starts_with('\r') => LineEnding::Cr,
            _ => LineEnding::Lf,
        }
    }

    /// すべての改行スタイルをこの改行コードに統一
    pub fn normalize(self, content: &str) -> String {
        let unified = content.replace("\r\n", "\n").replace('\r', "\n");
        match self {
            LineEnding::Lf => unified,
            other => unified.replace('\n', other.as_str()),
        }
    }
}

impl FromStr for LineEnding {
    type Err = BufferError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "unix" => Ok(LineEnding::Lf),
            "dos" => Ok(LineEnding::CrLf),
            "mac" => Ok(LineEnding::Cr),
            other => Err(BufferError::InvalidArgument {
                arg: format!("fileformat '{}'", other),
            }),
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_format())
    }
}

/// ホスト上の位置（行・列とも1始まり、列はバイト単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

/// ハイライト時に表示位置をどちらに寄せるか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewAnchor {
    Top,
    #[default]
    Bottom,
}

impl FromStr for ViewAnchor {
    type Err = BufferError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "top" => Ok(ViewAnchor::Top),
            "bot" | "bottom" => Ok(ViewAnchor::Bottom),
            other => Err(BufferError::InvalidArgument {
                arg: format!("vpos '{}'", other),
            }),
        }
    }
}

/// ハイライト領域（終端は排他的）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub group: String,
    pub start: Position,
    pub end: Position,
}

/// ホストの文書
///
/// 行番号・バイト位置の規約はホストに合わせて1始まり
pub trait Document {
    /// 全行を取得
    fn lines(&self) -> Vec<String>;

    /// 全行を置き換え
    fn replace_lines(&mut self, lines: Vec<String>);

    /// 行数
    fn line_count(&self) -> usize;

    /// 指定行（0始まり）を取得
    fn line(&self, index: usize) -> Option<String>;

    /// 指定行（0始まり）を置き換え、範囲外なら `false`
    fn set_line(&mut self, index: usize, text: String) -> bool;

    /// 改行コード設定
    fn line_ending(&self) -> LineEnding;

    /// 内部エンコーディング設定（'encoding'）
    fn encoding(&self) -> String;

    /// ファイルエンコーディング設定（'fileencoding'）
    fn file_encoding(&self) -> String;

    /// ロケールのエンコーディング
    fn locale_encoding(&self) -> Option<String>;

    /// バイト位置（1始まり）を含む行番号、範囲外なら `None`
    fn byte_to_line(&self, byte: usize) -> Option<usize>;

    /// 行（1始まり）の先頭バイト位置、`line_count() + 1` は末尾の次を返す
    fn line_to_byte(&self, line: usize) -> Option<usize>;

    /// カーソル位置
    fn cursor(&self) -> Position;

    /// カーソル移動
    fn set_cursor(&mut self, position: Position);
}

/// 確認ダイアログ・ハイライト・表示位置の制御
pub trait Prompt {
    /// ダイアログが使えるか
    fn dialog_available(&self) -> bool;

    /// 指定行が表示範囲の上端/下端に来るようにスクロール
    fn scroll_to(&mut self, line: usize, anchor: ViewAnchor);

    /// 領域をハイライト
    fn highlight(&mut self, document: &dyn Document, region: &Highlight);

    /// ハイライトを解除
    fn clear_highlight(&mut self, region: &Highlight);

    /// 再描画
    fn redraw(&mut self);

    /// 確認ダイアログを表示し、選択肢の番号（1始まり、0は中断）を返す
    fn confirm(&mut self, message: &str, choices: &[&str], default: usize) -> usize;
}

impl<D: Document + ?Sized> Document for &mut D {
    fn lines(&self) -> Vec<String> {
        (**self).lines()
    }

    fn replace_lines(&mut self, lines: Vec<String>) {
        (**self).replace_lines(lines)
    }

    fn line_count(&self) -> usize {
        (**self).line_count()
    }

    fn line(&self, index: usize) -> Option<String> {
        (**self).line(index)
    }

    fn set_line(&mut self, index: usize, text: String) -> bool {
        (**self).set_line(index, text)
    }

    fn line_ending(&self) -> LineEnding {
        (**self).line_ending()
    }

    fn encoding(&self) -> String {
        (**self).encoding()
    }

    fn file_encoding(&self) -> String {
        (**self).file_encoding()
    }

    fn locale_encoding(&self) -> Option<String> {
        (**self).locale_encoding()
    }

    fn byte_to_line(&self, byte: usize) -> Option<usize> {
        (**self).byte_to_line(byte)
    }

    fn line_to_byte(&self, line: usize) -> Option<usize> {
        (**self).line_to_byte(line)
    }

    fn cursor(&self) -> Position {
        (**self).cursor()
    }

    fn set_cursor(&mut self, position: Position) {
        (**self).set_cursor(position)
    }
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn dialog_available(&self) -> bool {
        (**self).dialog_available()
    }

    fn scroll_to(&mut self, line: usize, anchor: ViewAnchor) {
        (**self).scroll_to(line, anchor)
    }

    fn highlight(&mut self, document: &dyn Document, region: &Highlight) {
        (**self).highlight(document, region)
    }

    fn clear_highlight(&mut self, region: &Highlight) {
        (**self).clear_highlight(region)
    }

    fn redraw(&mut self) {
        (**self).redraw()
    }

    fn confirm(&mut self, message: &str, choices: &[&str], default: usize) -> usize {
        (**self).confirm(message, choices, default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_ending_from_file_format() {
        assert_eq!("dos".parse::<LineEnding>().unwrap(), LineEnding::CrLf);
        assert_eq!("mac".parse::<LineEnding>().unwrap(), LineEnding::Cr);
        assert!("amiga".parse::<LineEnding>().is_err());
    }

    #[test]
    fn detects_first_line_ending() {
        assert_eq!(LineEnding::detect("a\r\nb\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\rb"), LineEnding::Cr);
        assert_eq!(LineEnding::detect("a\nb\r\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("single"), LineEnding::Lf);
    }

    #[test]
    fn normalizes_mixed_line_endings() {
        assert_eq!(LineEnding::CrLf.normalize("a\nb\rc\r\nd"), "a\r\nb\r\nc\r\nd");
        assert_eq!(LineEnding::Lf.normalize("a\r\nb\rc"), "a\nb\nc");
    }
}
