//! Post body representation: plain text or Base64 of UTF-8 text.
//!
//! A post stores its body either verbatim or Base64-encoded, with a boolean
//! flag saying which. The flag can drift from the actual content (bodies are
//! hand-edited and machine-generated), so [`classify`] decides what to show
//! by trying to decode rather than trusting the flag alone:
//!
//! 1. flag off, content non-empty: if the content decodes as Base64 of
//!    UTF-8, show the decoded text and correct the flag to on;
//! 2. flag on: decode for display, or show a diagnostic placeholder that
//!    keeps the raw content visible when decoding fails.
//!
//! A plain body that happens to be valid Base64 of UTF-8 (e.g. `"Test"`) is
//! classified as encoded. That false positive is accepted.
//!
//! [`store`] goes the other way: it turns edited text plus the encode toggle
//! into the `(content, encoding)` pair written back to the post.

use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::debug;

/// Why a stored body could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded bytes are not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A post body in one of its two representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostBody {
    PlainText(String),
    EncodedText(Vec<u8>),
}

impl PostBody {
    /// Decode a stored Base64 body. ASCII whitespace (line wrapping) is ignored.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD.decode(compact)?;
        // Validate now so `text` cannot fail later.
        String::from_utf8(bytes.clone())?;
        Ok(Self::EncodedText(bytes))
    }

    /// Body text with line endings normalized to LF.
    pub fn text(&self) -> String {
        match self {
            Self::PlainText(text) => text.clone(),
            Self::EncodedText(bytes) => String::from_utf8_lossy(bytes).replace("\r\n", "\n"),
        }
    }

    /// `(content, encoding)` as stored on the post.
    pub fn to_stored(&self) -> (String, bool) {
        match self {
            Self::PlainText(text) => (text.clone(), false),
            Self::EncodedText(bytes) => (STANDARD.encode(bytes), true),
        }
    }
}

/// What the editor shows for a stored body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayText {
    /// Stored text shown unchanged.
    Plain(String),
    /// Text decoded from Base64.
    Decoded(String),
    /// The body claims to be encoded but does not decode.
    Undecodable { error: String, raw: String },
}

impl DisplayText {
    /// Editable value for the body text box.
    pub fn text(&self) -> String {
        match self {
            Self::Plain(text) | Self::Decoded(text) => text.clone(),
            Self::Undecodable { error, raw } => format!("Error decoding: {error}\n\n{raw}"),
        }
    }
}

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub display: DisplayText,
    /// The `encoding` flag the post should carry from now on.
    pub encoded: bool,
}

impl Classification {
    /// Whether the stored flag was wrong and must be rewritten.
    pub fn corrects(&self, stored_flag: bool) -> bool {
        self.encoded != stored_flag
    }
}

/// Decide how to display a stored body and what its flag should be.
pub fn classify(raw: &str, stored_flag: bool) -> Classification {
    if stored_flag {
        let display = match PostBody::decode(raw) {
            Ok(body) => DisplayText::Decoded(body.text()),
            Err(e) => {
                debug!(error = %e, "body flagged as encoded does not decode");
                DisplayText::Undecodable {
                    error: e.to_string(),
                    raw: raw.to_string(),
                }
            }
        };
        return Classification {
            display,
            encoded: true,
        };
    }

    if raw.trim().is_empty() {
        return plain(raw);
    }

    match PostBody::decode(raw) {
        Ok(body) => {
            debug!("plain-flagged body decodes as base64, correcting flag");
            Classification {
                display: DisplayText::Decoded(body.text()),
                encoded: true,
            }
        }
        Err(_) => plain(raw),
    }
}

fn plain(raw: &str) -> Classification {
    Classification {
        display: DisplayText::Plain(raw.to_string()),
        encoded: false,
    }
}

/// State of a post's "encode content" toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeToggle {
    Encode,
    Plain,
}

impl From<bool> for EncodeToggle {
    fn from(encode: bool) -> Self {
        if encode { Self::Encode } else { Self::Plain }
    }
}

/// Body representation for edited `text` under `toggle`.
pub fn body_for(text: &str, toggle: EncodeToggle) -> PostBody {
    match toggle {
        EncodeToggle::Encode => PostBody::EncodedText(text.as_bytes().to_vec()),
        EncodeToggle::Plain => PostBody::PlainText(text.to_string()),
    }
}

/// `(content, encoding)` to store for edited `text` under `toggle`.
pub fn store(text: &str, toggle: EncodeToggle) -> (String, bool) {
    body_for(text, toggle).to_stored()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_flagged_base64_self_heals() {
        let result = classify("SGVsbG8=", false);
        assert_eq!(result.display, DisplayText::Decoded("Hello".into()));
        assert!(result.encoded);
        assert!(result.corrects(false));
    }

    #[test]
    fn ordinary_markdown_stays_plain() {
        let result = classify("# Title\n\nSome *markdown* body.", false);
        assert_eq!(result.display.text(), "# Title\n\nSome *markdown* body.");
        assert!(!result.encoded);
        assert!(!result.corrects(false));
    }

    #[test]
    fn empty_and_blank_bodies_stay_plain() {
        assert!(!classify("", false).encoded);
        assert!(!classify("  \n", false).encoded);
    }

    #[test]
    fn base64_of_invalid_utf8_stays_plain() {
        // "/w==" decodes to 0xFF, which is not UTF-8.
        let result = classify("/w==", false);
        assert_eq!(result.display, DisplayText::Plain("/w==".into()));
        assert!(!result.encoded);
    }

    #[test]
    fn known_false_positive_is_accepted() {
        // "Test" is valid base64 of valid UTF-8 ("M\u{eb}-").
        let result = classify("Test", false);
        assert!(result.encoded);
    }

    #[test]
    fn encoded_body_decodes_with_lf_line_endings() {
        let raw = STANDARD.encode("line one\r\nline two\r\n");
        let result = classify(&raw, true);
        assert_eq!(result.display.text(), "line one\nline two\n");
        assert!(!result.corrects(true));
    }

    #[test]
    fn wrapped_base64_is_accepted() {
        let raw = STANDARD.encode("a longer body that gets wrapped");
        let wrapped = format!("{}\n{}", &raw[..20], &raw[20..]);
        let result = classify(&wrapped, true);
        assert_eq!(result.display.text(), "a longer body that gets wrapped");
    }

    #[test]
    fn undecodable_encoded_body_keeps_raw_content() {
        let result = classify("not base64 at all!", true);
        assert!(result.encoded);
        let shown = result.display.text();
        assert!(shown.starts_with("Error decoding: invalid base64"));
        assert!(shown.ends_with("\n\nnot base64 at all!"));
    }

    #[test]
    fn store_encode_roundtrips_any_text() {
        for text in ["", "Hello", "مرحبا بالعالم", "tabs\tand\nnewlines\n", "emoji 🚀 ✓"] {
            let (content, flag) = store(text, EncodeToggle::Encode);
            assert!(flag);
            assert!(STANDARD.decode(&content).is_ok());
            assert_eq!(PostBody::decode(&content).unwrap().text(), text);
        }
    }

    #[test]
    fn store_plain_is_verbatim() {
        let (content, flag) = store("# Raw\r\nbody", EncodeToggle::Plain);
        assert_eq!(content, "# Raw\r\nbody");
        assert!(!flag);
    }

    #[test]
    fn toggle_from_bool() {
        assert_eq!(EncodeToggle::from(true), EncodeToggle::Encode);
        assert_eq!(EncodeToggle::from(false), EncodeToggle::Plain);
    }
}
