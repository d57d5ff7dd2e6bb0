//! 端末上の確認ダイアログ
//!
//! 標準入出力で選択肢を尋ね、対象行を反転表示とキャレットで示す

use super::{Document, Highlight, Prompt, ViewAnchor};
use crate::codec::{anchor_at_byte, Codec};
use crossterm::style::Stylize;
use std::io::{self, BufRead, BufReader, IsTerminal, Stdin, Stdout, Write};
use unicode_width::UnicodeWidthStr;

/// 端末プロンプト
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    dialogs: bool,
    styled: bool,
}

impl TerminalPrompt<BufReader<Stdin>, Stdout> {
    /// 標準入出力を使う
    pub fn stdio() -> Self {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let dialogs = stdin.is_terminal();
        let styled = stdout.is_terminal();
        Self {
            input: BufReader::new(stdin),
            output: stdout,
            dialogs,
            styled,
        }
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    /// 任意の入出力を使う（装飾なし、ダイアログ有効）
    pub fn with_io(input: R, output: W) -> Self {
        Self {
            input,
            output,
            dialogs: true,
            styled: false,
        }
    }

    /// 出力先を取り出す
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_answer(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn write_line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.output, "{}", text) {
            log::warn!("terminal prompt output failed: {}", err);
        }
    }
}

/// `&` の直後の文字をホットキーとする
fn hotkey(choice: &str) -> Option<char> {
    let idx = choice.find('&')?;
    choice[idx + 1..].chars().next().map(|c| c.to_ascii_lowercase())
}

/// 表示用ラベル（`&C` → `[C]`）
fn label(choice: &str) -> String {
    match choice.find('&') {
        Some(idx) => {
            let rest = &choice[idx + 1..];
            let mut chars = rest.chars();
            match chars.next() {
                Some(key) => format!("{}[{}]{}", &choice[..idx], key, chars.as_str()),
                None => choice.replace('&', ""),
            }
        }
        None => choice.to_string(),
    }
}

/// 回答を選択肢番号（1始まり）へ変換
fn parse_answer(answer: &str, choices: &[&str], default: usize) -> Option<usize> {
    if answer.is_empty() {
        return (default > 0).then_some(default);
    }
    if let Ok(number) = answer.parse::<usize>() {
        return (1..=choices.len()).contains(&number).then_some(number);
    }
    let mut chars = answer.chars();
    let key = chars.next()?.to_lowercase().next()?;
    if chars.next().is_some() {
        return None;
    }
    choices
        .iter()
        .position(|choice| hotkey(choice) == Some(key))
        .map(|idx| idx + 1)
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn dialog_available(&self) -> bool {
        self.dialogs
    }

    fn scroll_to(&mut self, line: usize, anchor: ViewAnchor) {
        log::debug!("scroll to line {} ({:?})", line, anchor);
    }

    fn highlight(&mut self, document: &dyn Document, region: &Highlight) {
        let Some(text) = document.line(region.start.line.saturating_sub(1)) else {
            return;
        };
        let codec = Codec::resolve(&document.encoding(), document.locale_encoding().as_deref())
            .unwrap_or_default();
        let column_to_index = |column: usize| {
            anchor_at_byte(&text, column.saturating_sub(1), &codec)
                .map(|anchor| anchor.text_index())
                .unwrap_or(text.len())
        };

        let start = column_to_index(region.start.column);
        let end = if region.end.line == region.start.line {
            column_to_index(region.end.column).max(start)
        } else {
            text.len()
        };

        let (before, target, after) = (&text[..start], &text[start..end], &text[end..]);
        let gutter = format!("{:>5} | ", region.start.line);
        let body = if self.styled {
            format!("{}{}{}", before, target.reverse(), after)
        } else {
            format!("{}{}{}", before, target, after)
        };
        let caret = format!(
            "{}{}",
            " ".repeat(gutter.width() + before.width()),
            "^".repeat(target.width().max(1))
        );

        self.write_line(&format!("{}{}", gutter, body));
        self.write_line(&caret);
    }

    fn clear_highlight(&mut self, _region: &Highlight) {}

    fn redraw(&mut self) {
        if let Err(err) = self.output.flush() {
            log::warn!("terminal prompt flush failed: {}", err);
        }
    }

    fn confirm(&mut self, message: &str, choices: &[&str], default: usize) -> usize {
        let options = choices
            .iter()
            .map(|choice| label(choice))
            .collect::<Vec<_>>()
            .join(" ");

        loop {
            self.write_line(message);
            if let Err(err) = write!(self.output, "{} > ", options).and_then(|_| self.output.flush())
            {
                log::warn!("terminal prompt output failed: {}", err);
            }

            let Some(answer) = self.read_answer() else {
                return 0;
            };
            if let Some(choice) = parse_answer(&answer, choices, default) {
                return choice;
            }
            self.write_line(&format!("Unknown choice '{}'", answer));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LineEnding, MemoryDocument, Position};
    use std::io::Cursor;

    const CHOICES: &[&str] = &["&Correct", "&All", "&Backwards", "&Forward", "&Exit"];

    fn prompt(input: &str) -> TerminalPrompt<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompt::with_io(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn answers_by_hotkey_number_or_default() {
        let mut terminal = prompt("a\n4\n\n");
        assert_eq!(terminal.confirm("fix?", CHOICES, 1), 2);
        assert_eq!(terminal.confirm("fix?", CHOICES, 1), 4);
        assert_eq!(terminal.confirm("fix?", CHOICES, 1), 1);
    }

    #[test]
    fn unknown_answer_asks_again() {
        let mut terminal = prompt("zz\n9\ne\n");
        assert_eq!(terminal.confirm("fix?", CHOICES, 1), 5);
        let output = String::from_utf8(terminal.into_output()).unwrap();
        assert_eq!(output.matches("fix?").count(), 3);
        assert!(output.contains("[C]orrect [A]ll [B]ackwards [F]orward [E]xit"));
    }

    #[test]
    fn end_of_input_dismisses() {
        let mut terminal = prompt("");
        assert_eq!(terminal.confirm("fix?", CHOICES, 1), 0);
    }

    #[test]
    fn highlight_marks_the_region() {
        let document = MemoryDocument::new(["на елке"], LineEnding::Lf);
        let mut terminal = prompt("");
        let region = Highlight {
            group: "IncSearch".to_string(),
            start: Position::new(1, 6),
            end: Position::new(1, 14),
        };
        terminal.highlight(&document, &region);
        let output = String::from_utf8(terminal.into_output()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "    1 | на елке");
        assert_eq!(lines[1], format!("{}^^^^", " ".repeat(11)));
    }
}
