//! 行単位の整形（寄せ・空白除去・置換・タブ展開）
//!
//! 幅は文字数で数える

fn padding(text: &str, width: usize) -> usize {
    width.saturating_sub(text.chars().count())
}

/// 中央寄せ（余りは奇数幅なら左側に寄る）
pub fn center(text: &str, width: usize, fill: char) -> String {
    let pad = padding(text, width);
    if pad == 0 {
        return text.to_string();
    }
    let left = pad / 2 + (pad & width & 1);
    let right = pad - left;
    let mut result = String::with_capacity(text.len() + pad);
    result.extend(std::iter::repeat(fill).take(left));
    result.push_str(text);
    result.extend(std::iter::repeat(fill).take(right));
    result
}

/// 左寄せ
pub fn ljust(text: &str, width: usize, fill: char) -> String {
    let mut result = text.to_string();
    result.extend(std::iter::repeat(fill).take(padding(text, width)));
    result
}

/// 右寄せ
pub fn rjust(text: &str, width: usize, fill: char) -> String {
    let mut result: String = std::iter::repeat(fill).take(padding(text, width)).collect();
    result.push_str(text);
    result
}

/// 符号を保ったまま左をゼロで埋める
pub fn zfill(text: &str, width: usize) -> String {
    let pad = padding(text, width);
    let zeros = "0".repeat(pad);
    match text.chars().next() {
        Some(sign @ ('+' | '-')) => format!("{}{}{}", sign, zeros, &text[1..]),
        _ => format!("{}{}", zeros, text),
    }
}

fn strip_set(chars: Option<&str>) -> impl Fn(char) -> bool + '_ {
    move |ch| match chars {
        Some(set) => set.contains(ch),
        None => ch.is_whitespace(),
    }
}

/// 両端から指定文字（既定は空白）を除去
pub fn strip<'a>(text: &'a str, chars: Option<&str>) -> &'a str {
    text.trim_matches(strip_set(chars))
}

pub fn lstrip<'a>(text: &'a str, chars: Option<&str>) -> &'a str {
    text.trim_start_matches(strip_set(chars))
}

pub fn rstrip<'a>(text: &'a str, chars: Option<&str>) -> &'a str {
    text.trim_end_matches(strip_set(chars))
}

/// 先頭から最大 `count` 個の `old` を `new` に置換
pub fn replace(text: &str, old: &str, new: &str, count: Option<usize>) -> String {
    match count {
        Some(count) => text.replacen(old, new, count),
        None => text.replace(old, new),
    }
}

/// タブを次のタブ位置までの空白に展開（`tab_size` が0ならタブを削除）
pub fn expand_tabs(text: &str, tab_size: usize) -> String {
    let mut result = String::with_capacity(text.len());
    let mut column = 0usize;
    for ch in text.chars() {
        match ch {
            '\t' => {
                if tab_size > 0 {
                    let spaces = tab_size - column % tab_size;
                    result.extend(std::iter::repeat(' ').take(spaces));
                    column += spaces;
                }
            }
            '\n' | '\r' => {
                result.push(ch);
                column = 0;
            }
            _ => {
                result.push(ch);
                column += 1;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_matches_python_rounding() {
        assert_eq!(center("ab", 5, '*'), "**ab*");
        assert_eq!(center("abc", 6, '*'), "*abc**");
        assert_eq!(center("ёж", 4, ' '), " ёж ");
        assert_eq!(center("long", 2, ' '), "long");
    }

    #[test]
    fn justification_counts_chars() {
        assert_eq!(ljust("ёж", 4, '.'), "ёж..");
        assert_eq!(rjust("ёж", 4, '.'), "..ёж");
    }

    #[test]
    fn zfill_keeps_sign() {
        assert_eq!(zfill("42", 5), "00042");
        assert_eq!(zfill("-42", 5), "-0042");
        assert_eq!(zfill("12345", 3), "12345");
    }

    #[test]
    fn strip_with_custom_set() {
        assert_eq!(strip("  ёж \t", None), "ёж");
        assert_eq!(strip("xxёжxy", Some("xy")), "ёж");
        assert_eq!(lstrip("--a--", Some("-")), "a--");
        assert_eq!(rstrip("--a--", Some("-")), "--a");
    }

    #[test]
    fn replace_with_limit() {
        assert_eq!(replace("еж еж еж", "еж", "ёж", Some(2)), "ёж ёж еж");
        assert_eq!(replace("еж еж", "еж", "ёж", None), "ёж ёж");
    }

    #[test]
    fn expand_tabs_to_stops() {
        assert_eq!(expand_tabs("a\tb", 4), "a   b");
        assert_eq!(expand_tabs("abcd\tb", 4), "abcd    b");
        assert_eq!(expand_tabs("a\tb", 0), "ab");
    }
}
