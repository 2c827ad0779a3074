use crate::utils::error::Result;
use std::path::Path;

/// Encodings tried, in order, when loading user-edited text such as README templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Utf16,
    Utf16Le,
    Utf16Be,
    Cp1252,
    Utf8Lossy,
}

impl TextEncoding {
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf8Bom => "utf-8-sig",
            Self::Utf16 => "utf-16",
            Self::Utf16Le => "utf-16-le",
            Self::Utf16Be => "utf-16-be",
            Self::Cp1252 => "cp1252",
            Self::Utf8Lossy => "utf-8 with replacement chars",
        }
    }
}

pub fn read_text_flexible(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    let (text, encoding) = decode_flexible(&data);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    tracing::info!("Loaded {} using {}", name, encoding.label());
    Ok(text)
}

pub fn decode_flexible(data: &[u8]) -> (String, TextEncoding) {
    if let Some(rest) = data.strip_prefix(b"\xEF\xBB\xBF") {
        if let Ok(s) = std::str::from_utf8(rest) {
            return (s.to_string(), TextEncoding::Utf8Bom);
        }
    } else if let Ok(s) = std::str::from_utf8(data) {
        return (s.to_string(), TextEncoding::Utf8);
    }

    if let Some(rest) = data.strip_prefix(b"\xFF\xFE") {
        if let Some(s) = decode_utf16(rest, u16::from_le_bytes) {
            return (s, TextEncoding::Utf16);
        }
    } else if let Some(rest) = data.strip_prefix(b"\xFE\xFF") {
        if let Some(s) = decode_utf16(rest, u16::from_be_bytes) {
            return (s, TextEncoding::Utf16);
        }
    }

    if let Some(s) = decode_utf16(data, u16::from_le_bytes) {
        return (s, TextEncoding::Utf16Le);
    }
    if let Some(s) = decode_utf16(data, u16::from_be_bytes) {
        return (s, TextEncoding::Utf16Be);
    }

    if let Some(s) = decode_cp1252(data) {
        return (s, TextEncoding::Cp1252);
    }

    (String::from_utf8_lossy(data).into_owned(), TextEncoding::Utf8Lossy)
}

fn decode_utf16(data: &[u8], to_unit: fn([u8; 2]) -> u16) -> Option<String> {
    if data.len() % 2 != 0 {
        return None;
    }
    let units = data.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units).collect::<std::result::Result<String, _>>().ok()
}

// The five bytes left undefined by Windows-1252 make the decode fail.
#[rustfmt::skip]
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

fn decode_cp1252(data: &[u8]) -> Option<String> {
    data.iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)],
            _ => Some(char::from(b)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8() {
        let (text, enc) = decode_flexible("# Board ✅".as_bytes());
        assert_eq!(text, "# Board ✅");
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let (text, enc) = decode_flexible(b"\xEF\xBB\xBF# ${PROJECT_NAME}");
        assert_eq!(text, "# ${PROJECT_NAME}");
        assert_eq!(enc, TextEncoding::Utf8Bom);
    }

    #[test]
    fn test_utf16_with_bom() {
        let mut data = vec![0xFF, 0xFE];
        for unit in "Hi $X".encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        let (text, enc) = decode_flexible(&data);
        assert_eq!(text, "Hi $X");
        assert_eq!(enc, TextEncoding::Utf16);
    }

    #[test]
    fn test_cp1252_fallback() {
        // 0x93/0x94 are curly quotes, 0xE9 is e-acute; an odd length rules out UTF-16
        let (text, enc) = decode_flexible(b"\x93caf\xE9!\x94");
        assert_eq!(text, "\u{201C}caf\u{e9}!\u{201D}");
        assert_eq!(enc, TextEncoding::Cp1252);
    }
}
