//! 文字列ユーティリティ
//!
//! バッファの行単位変換と語の大文字小文字合わせで使う

pub mod align;
pub mod case;

pub use align::{center, expand_tabs, ljust, lstrip, replace, rjust, rstrip, strip, zfill};
pub use case::{capitalize, fix_case, is_lower, is_title, is_upper, swapcase, to_title, CaseStyle};
