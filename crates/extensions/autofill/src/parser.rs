//! UTF-8 plain-text document parser.

use pagehands_protocols::{DocumentParser, ParseError};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Accepts `text/plain` buffers and normalizes line endings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextParser;

impl PlainTextParser {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for PlainTextParser {
    fn media_types(&self) -> &[&'static str] {
        &["text/plain"]
    }

    fn parse(&self, bytes: &[u8]) -> Result<String, ParseError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text = std::str::from_utf8(bytes).map_err(|e| ParseError::Malformed(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(text.replace("\r\n", "\n").replace('\r', "\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let parser = PlainTextParser::new();
        assert_eq!(parser.parse(b"a\r\nb\rc").unwrap(), "a\nb\nc");
        assert_eq!(parser.media_types(), &["text/plain"]);
    }

    #[test]
    fn test_bom_stripped() {
        let parser = PlainTextParser::new();
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("姓名：张三".as_bytes());
        assert_eq!(parser.parse(&bytes).unwrap(), "姓名：张三");
    }

    #[test]
    fn test_empty_and_blank() {
        let parser = PlainTextParser::new();
        assert!(matches!(parser.parse(b""), Err(ParseError::Empty)));
        assert!(matches!(parser.parse(b"  \n\t"), Err(ParseError::Empty)));
    }

    #[test]
    fn test_invalid_utf8() {
        let parser = PlainTextParser::new();
        assert!(matches!(parser.parse(&[0xff, 0xfe, 0x00]), Err(ParseError::Malformed(_))));
    }
}
