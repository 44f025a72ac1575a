//! Program image formats.
//!
//! A program image is a flat sequence of 16-bit words loaded at address 0.
//! Two on-disk encodings are accepted:
//! - binary: big-endian word pairs, no header
//! - hex text (`.hex`, `.txt`): hex words separated by whitespace or
//!   commas, with an optional `0x` prefix; `;` starts a comment

use crate::cpu::Word;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Decode a binary image of big-endian words.
pub fn from_bytes(bytes: &[u8]) -> Result<Vec<Word>, ImageError> {
    if bytes.len() % 2 != 0 {
        return Err(ImageError::OddLength(bytes.len()));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| Word::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

/// Encode words as a binary image.
pub fn to_bytes(words: &[Word]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_be_bytes()).collect()
}

/// Parse a hex text image.
pub fn parse_hex(source: &str) -> Result<Vec<Word>, ImageError> {
    let mut words = Vec::new();

    for (line_num, line) in source.lines().enumerate() {
        // Strip comments
        let code = line.split(';').next().unwrap_or("");

        for token in code.split(|c: char| c.is_whitespace() || c == ',') {
            if token.is_empty() {
                continue;
            }
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            let word = Word::from_str_radix(digits, 16).map_err(|e| ImageError::ParseError {
                line: line_num + 1,
                message: format!("invalid word {:?}: {}", token, e),
            })?;
            words.push(word);
        }
    }

    Ok(words)
}

/// Load an image from disk, picking the format from the file extension.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Vec<Word>, ImageError> {
    let path = path.as_ref();
    let is_text = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("hex" | "txt")
    );

    let words = if is_text {
        parse_hex(&std::fs::read_to_string(path)?)?
    } else {
        from_bytes(&std::fs::read(path)?)?
    };

    debug!(path = %path.display(), words = words.len(), text = is_text, "loaded image");
    Ok(words)
}

/// Errors that can occur while reading a program image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("binary image has odd length {0}, expected whole 16-bit words")]
    OddLength(usize),

    #[error("parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },
}
