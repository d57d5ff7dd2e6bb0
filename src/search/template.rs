use super::Pattern;

pub type RegexError = regex::Error;

/// 置換テンプレート
///
/// `\1` `\g<1>` `\g<name>` `$1` `${name}` でグループを参照する。
/// `\n` `\t` `\\` `$$` はそれぞれの文字になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementTemplate {
    parts: Vec<TemplatePart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
    Literal(String),
    Group(usize),
}

impl ReplacementTemplate {
    /// パターンのグループに対して解析する
    pub fn parse(template: &str, pattern: &Pattern) -> Result<Self, RegexError> {
        let mut chars = template.chars().peekable();
        let mut parts = Vec::new();
        let mut literal = String::new();

        while let Some(ch) = chars.next() {
            match ch {
                '$' => match chars.peek().copied() {
                    Some('$') => {
                        literal.push('$');
                        chars.next();
                    }
                    Some('{') => {
                        chars.next();
                        let mut reference = String::new();
                        let mut closed = false;
                        for next in chars.by_ref() {
                            if next == '}' {
                                closed = true;
                                break;
                            }
                            reference.push(next);
                        }
                        if !closed {
                            return Err(invalid(format!(
                                "unterminated group reference ${{{}",
                                reference
                            )));
                        }
                        let index = resolve(&reference, pattern)?;
                        push_group(&mut parts, &mut literal, index);
                    }
                    Some(next) if next.is_ascii_digit() => {
                        let digits = take_digits(&mut chars);
                        let index = resolve(&digits, pattern)?;
                        push_group(&mut parts, &mut literal, index);
                    }
                    _ => literal.push('$'),
                },
                '\\' => match chars.next() {
                    Some('n') => literal.push('\n'),
                    Some('t') => literal.push('\t'),
                    Some('r') => literal.push('\r'),
                    Some('\\') => literal.push('\\'),
                    Some('g') => {
                        if chars.next() != Some('<') {
                            return Err(invalid("missing < after \\g".to_string()));
                        }
                        let mut reference = String::new();
                        let mut closed = false;
                        for next in chars.by_ref() {
                            if next == '>' {
                                closed = true;
                                break;
                            }
                            reference.push(next);
                        }
                        if !closed {
                            return Err(invalid(format!(
                                "unterminated group reference \\g<{}",
                                reference
                            )));
                        }
                        let index = resolve(&reference, pattern)?;
                        push_group(&mut parts, &mut literal, index);
                    }
                    Some(digit) if digit.is_ascii_digit() => {
                        let mut digits = digit.to_string();
                        if let Some(&second) = chars.peek() {
                            if second.is_ascii_digit() {
                                digits.push(second);
                                chars.next();
                            }
                        }
                        let index = resolve(&digits, pattern)?;
                        push_group(&mut parts, &mut literal, index);
                    }
                    Some(other) => {
                        literal.push('\\');
                        literal.push(other);
                    }
                    None => literal.push('\\'),
                },
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        Ok(Self { parts })
    }

    /// グループ参照を埋めて展開（一致しなかったグループは空文字列）
    pub fn render<'t, F>(&self, group: F) -> String
    where
        F: Fn(usize) -> Option<&'t str>,
    {
        let mut output = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => output.push_str(text),
                TemplatePart::Group(index) => {
                    if let Some(text) = group(*index) {
                        output.push_str(text);
                    }
                }
            }
        }
        output
    }
}

fn push_group(parts: &mut Vec<TemplatePart>, literal: &mut String, index: usize) {
    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(std::mem::take(literal)));
    }
    parts.push(TemplatePart::Group(index));
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(&digit) = chars.peek() {
        if digit.is_ascii_digit() {
            digits.push(digit);
            chars.next();
        } else {
            break;
        }
    }
    digits
}

/// 番号または名前をグループ番号へ
fn resolve(reference: &str, pattern: &Pattern) -> Result<usize, RegexError> {
    let index = match reference.parse::<usize>() {
        Ok(index) => index,
        Err(_) => pattern
            .group_index(reference)
            .ok_or_else(|| invalid(format!("unknown group name '{}'", reference)))?,
    };
    if index > pattern.group_count() {
        return Err(invalid(format!("invalid group reference {}", index)));
    }
    Ok(index)
}

fn invalid(message: String) -> RegexError {
    RegexError::Syntax(message)
}
