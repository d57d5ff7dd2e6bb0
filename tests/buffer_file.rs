//! バッファの結合テスト（ファイル操作・スライス・正規表現）

use yofix::error::{BufferError, EncodingError, YoError};
use yofix::host::{Document, LineEnding, MemoryDocument, Position};
use yofix::{PatternFlags, Result, SearchWindow, TextBuffer};

fn cp1251(lines: &[&str]) -> TextBuffer<MemoryDocument> {
    let document = MemoryDocument::new(lines.iter().copied(), LineEnding::Lf)
        .with_encoding("cp1251")
        .with_file_encoding("cp1251");
    TextBuffer::new(document).unwrap()
}

#[test]
fn test_load_edit_and_save_round_trip() -> Result<()> {
    let bytes = b"\xe5\xe6 \xe8\r\n\xe4\xee\xec\r\n";
    let document = MemoryDocument::from_bytes(bytes, "cp1251", None)?;
    assert_eq!(document.line_ending(), LineEnding::CrLf);

    let mut buffer = TextBuffer::new(document)?;
    assert_eq!(buffer.text(), "еж и\r\nдом");
    buffer.set_slice(0..1, "ё")?;
    assert_eq!(buffer.get_slice(0..2), "ёж");

    let saved = buffer.into_inner().to_bytes()?;
    assert_eq!(saved, b"\xb8\xe6 \xe8\r\n\xe4\xee\xec\r\n".to_vec());
    Ok(())
}

#[test]
fn test_sequential_file_access() -> Result<()> {
    let mut buffer = TextBuffer::new(MemoryDocument::new(["ёж", "дом"], LineEnding::Lf))?;
    assert_eq!(buffer.readline(None)?, "ёж\n");
    assert_eq!(buffer.document().cursor(), Position::new(2, 1));
    assert_eq!(buffer.read(Some(2))?, "д");
    buffer.write("-")?;
    assert_eq!(buffer.text(), "ёж\nд-ом");

    buffer.seek(0, 2)?;
    buffer.write("\r\nконец")?;
    assert_eq!(buffer.document().lines(), vec!["ёж", "д-ом", "конец"]);
    Ok(())
}

#[test]
fn test_offsets_follow_storage_encoding() -> Result<()> {
    let buffer = cp1251(&["на елке", "еж"]);
    assert_eq!(buffer.offset_to_line_column(8)?, Position::new(2, 1));
    assert_eq!(buffer.line_column_to_offset(Position::new(1, 4))?, 3);
    assert!(buffer.offset_to_line_column(100).is_err());
    Ok(())
}

#[test]
fn test_unrepresentable_edit_is_rejected() {
    let mut buffer = cp1251(&["еж"]);
    let error = buffer.set_slice(0..0, "日本").unwrap_err();
    match error {
        YoError::Encoding(EncodingError::Mismatch {
            encoding,
            file_encoding,
        }) => {
            assert_eq!(encoding, "cp1251");
            assert_eq!(file_encoding, "cp1251");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(buffer.text(), "еж");
}

#[test]
fn test_raw_bytes_must_decode() {
    let mut buffer = TextBuffer::new(MemoryDocument::new(["ab"], LineEnding::Lf)).unwrap();
    let error = buffer.set_slice(1..1, &[0xd1u8][..]).unwrap_err();
    assert!(matches!(
        error,
        YoError::Encoding(EncodingError::InvalidEncoding { .. })
    ));
    assert_eq!(buffer.text(), "ab");
}

#[test]
fn test_pattern_spans_in_storage_bytes() -> Result<()> {
    let mut buffer = cp1251(&["еж и еж"]);
    let mut engine = buffer.re();
    let pattern = engine.compile(r"(?P<word>е)ж", PatternFlags::default())?;

    let spans: Vec<_> = engine.finditer(&pattern).map(|m| m.span(0)).collect();
    assert_eq!(spans, vec![Some((0, 2)), Some((5, 7))]);

    let second = engine
        .search(&pattern, SearchWindow::starting_at(1))
        .expect("second match");
    assert_eq!(second.named("word"), Some(&[0xe5u8][..]));
    assert_eq!(second.last_group(), Some("word"));

    assert!(engine.subn(&pattern, "ё$2", 0).is_err());
    assert_eq!(engine.subn(&pattern, "ёж", 0)?, 2);
    assert_eq!(buffer.text(), "ёж и ёж");
    Ok(())
}

#[test]
fn test_sequence_operations() -> Result<()> {
    let mut buffer = TextBuffer::new(MemoryDocument::new(["ab"], LineEnding::Lf))?;
    buffer.append("c")?;
    buffer.insert(0, "x")?;
    assert_eq!(buffer.text(), "xabc");
    assert_eq!(buffer.char_at(-1)?, 'c');
    assert!(matches!(
        buffer.char_at(9),
        Err(BufferError::OutOfRange { index: 9, len: 4 })
    ));
    buffer.remove("x")?;
    buffer.repeat(2)?;
    assert_eq!(buffer.text(), "abcabc");
    assert_eq!(buffer.count("bc", ..)?, 2);
    assert_eq!(buffer.rfind("a", ..)?, Some(3));
    assert!("middle".parse::<yofix::ReverseMode>().is_err());
    Ok(())
}
