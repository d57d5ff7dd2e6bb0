//! 線形オフセットと行・列の変換
//!
//! オフセットは0始まり、行・列はホストの規約どおり1始まり

use crate::error::{buffer, BufferError};
use crate::host::{Document, Position};

/// 文書全体の格納バイト長（最終行の改行を含む）
pub fn document_byte_len(document: &dyn Document) -> usize {
    document
        .line_to_byte(document.line_count() + 1)
        .map(|byte| byte.saturating_sub(1))
        .unwrap_or(0)
}

/// オフセット → (行, 列)
pub fn offset_to_line_column(document: &dyn Document, offset: usize) -> buffer::Result<Position> {
    let out_of_range = || BufferError::OutOfRange {
        index: offset as isize,
        len: document_byte_len(document),
    };

    let line = document.byte_to_line(offset + 1).ok_or_else(out_of_range)?;
    let line_start = document.line_to_byte(line).ok_or_else(out_of_range)?;
    let column = (offset + 2).checked_sub(line_start).ok_or_else(out_of_range)?;
    Ok(Position::new(line, column))
}

/// (行, 列) → オフセット
pub fn line_column_to_offset(document: &dyn Document, position: Position) -> buffer::Result<usize> {
    let out_of_range = || BufferError::OutOfRange {
        index: position.line as isize,
        len: document.line_count(),
    };

    let line_start = document.line_to_byte(position.line).ok_or_else(out_of_range)?;
    (line_start + position.column)
        .checked_sub(2)
        .ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LineEnding, MemoryDocument};

    #[test]
    fn converts_offsets_across_lines() {
        let document = MemoryDocument::new(["ab", "cde"], LineEnding::Lf);
        assert_eq!(offset_to_line_column(&document, 0).unwrap(), Position::new(1, 1));
        assert_eq!(offset_to_line_column(&document, 3).unwrap(), Position::new(2, 1));
        assert_eq!(offset_to_line_column(&document, 5).unwrap(), Position::new(2, 3));
        assert_eq!(line_column_to_offset(&document, Position::new(2, 3)).unwrap(), 5);
    }

    #[test]
    fn crlf_lines_count_two_bytes() {
        let document = MemoryDocument::new(["ab", "cd"], LineEnding::CrLf);
        assert_eq!(offset_to_line_column(&document, 4).unwrap(), Position::new(2, 1));
        assert_eq!(line_column_to_offset(&document, Position::new(2, 1)).unwrap(), 4);
    }

    #[test]
    fn end_of_text_is_addressable() {
        let document = MemoryDocument::new(["ab", "cd"], LineEnding::Lf);
        assert_eq!(offset_to_line_column(&document, 5).unwrap(), Position::new(2, 3));
    }

    #[test]
    fn offset_beyond_document_fails() {
        let document = MemoryDocument::new(["ab"], LineEnding::Lf);
        let error = offset_to_line_column(&document, 10).unwrap_err();
        assert_eq!(error, BufferError::OutOfRange { index: 10, len: 3 });
        assert!(line_column_to_offset(&document, Position::new(5, 1)).is_err());
    }

    #[test]
    fn multibyte_columns_are_bytes() {
        let document = MemoryDocument::new(["ёж", "еж"], LineEnding::Lf);
        assert_eq!(offset_to_line_column(&document, 5).unwrap(), Position::new(2, 1));
        assert_eq!(offset_to_line_column(&document, 7).unwrap(), Position::new(2, 3));
    }
}
