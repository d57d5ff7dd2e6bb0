//! 大文字・小文字の判定と変換

/// 大文字小文字の区別がある文字か
fn is_cased(ch: char) -> bool {
    ch.is_lowercase() || ch.is_uppercase()
}

/// 区別のある文字を含み、それがすべて小文字
pub fn is_lower(text: &str) -> bool {
    let mut cased = false;
    for ch in text.chars() {
        if ch.is_uppercase() {
            return false;
        }
        cased |= ch.is_lowercase();
    }
    cased
}

/// 区別のある文字を含み、それがすべて大文字
pub fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for ch in text.chars() {
        if ch.is_lowercase() {
            return false;
        }
        cased |= ch.is_uppercase();
    }
    cased
}

/// 各語が大文字1文字 + 小文字で構成されている
pub fn is_title(text: &str) -> bool {
    let mut cased = false;
    let mut previous_cased = false;
    for ch in text.chars() {
        if ch.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else if ch.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else {
            previous_cased = false;
        }
    }
    cased
}

/// 区別のある文字の連なりごとに先頭を大文字、残りを小文字にする
pub fn to_title(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_cased = false;
    for ch in text.chars() {
        if previous_cased {
            result.extend(ch.to_lowercase());
        } else {
            result.extend(ch.to_uppercase());
        }
        previous_cased = is_cased(ch);
    }
    result
}

/// 先頭文字のみ大文字、残りは小文字
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// 大文字と小文字を入れ替える
pub fn swapcase(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_uppercase() {
            result.extend(ch.to_lowercase());
        } else if ch.is_lowercase() {
            result.extend(ch.to_uppercase());
        } else {
            result.push(ch);
        }
    }
    result
}

/// 語の大文字小文字パターン
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStyle {
    Lower,
    Upper,
    Title,
}

impl CaseStyle {
    /// 語のパターンを判定（確信が持てなければ `None`）
    pub fn of(word: &str) -> Option<Self> {
        if is_lower(word) {
            Some(CaseStyle::Lower)
        } else if is_upper(word) {
            Some(CaseStyle::Upper)
        } else if is_title(word) {
            Some(CaseStyle::Title)
        } else {
            None
        }
    }

    pub fn apply(self, text: &str) -> String {
        match self {
            CaseStyle::Lower => text.to_lowercase(),
            CaseStyle::Upper => text.to_uppercase(),
            CaseStyle::Title => to_title(text),
        }
    }
}

/// `replacement` を `original` と同じ大文字小文字パターンにする
pub fn fix_case(original: &str, replacement: &str) -> Option<String> {
    CaseStyle::of(original).map(|style| style.apply(replacement))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_case_follows_original_word() {
        assert_eq!(fix_case("hello", "world").as_deref(), Some("world"));
        assert_eq!(fix_case("HELLO", "world").as_deref(), Some("WORLD"));
        assert_eq!(fix_case("Hello", "world").as_deref(), Some("World"));
        assert_eq!(fix_case("hELLO", "world"), None);
    }

    #[test]
    fn fix_case_on_cyrillic() {
        assert_eq!(fix_case("Елке", "ёлке").as_deref(), Some("Ёлке"));
        assert_eq!(fix_case("ЕЖ", "ёж").as_deref(), Some("ЁЖ"));
        assert_eq!(fix_case("еЖ", "ёж"), None);
    }

    #[test]
    fn uncased_text_has_no_style() {
        assert!(!is_lower("123"));
        assert!(!is_upper(""));
        assert_eq!(CaseStyle::of("42"), None);
    }

    #[test]
    fn title_detection_matches_words() {
        assert!(is_title("Hello World"));
        assert!(is_title("Ёлка-Палка"));
        assert!(!is_title("Hello world"));
        assert!(!is_title("HEllo"));
    }

    #[test]
    fn title_and_capitalize() {
        assert_eq!(to_title("hello wORLD"), "Hello World");
        assert_eq!(to_title("они's"), "Они'S");
        assert_eq!(capitalize("hELLO world"), "Hello world");
        assert_eq!(swapcase("ЁлКа"), "ёЛкА");
    }
}
