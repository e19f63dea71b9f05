//! Character set handling for entry names and comments.
//!
//! ZIP archives predate a mandatory text encoding: names and comments are
//! raw bytes, with general purpose flag bit 11 marking UTF-8. This module
//! wraps [`encoding_rs`] so archives can be produced with legacy code
//! pages (EUC-KR, GBK, Shift_JIS, ...) for tools that expect them.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};

use crate::{Error, Result};

/// The character set used to encode entry names and comments.
///
/// The default is UTF-8, which sets the language encoding flag (general
/// purpose bit 11) on every entry. Selecting a legacy charset clears that
/// flag and encodes names with the given code page.
///
/// # Example
///
/// ```rust
/// use splitzip::Charset;
///
/// let utf8 = Charset::utf8();
/// assert!(utf8.is_utf8());
///
/// let euc_kr = Charset::for_label("EUC-KR").unwrap();
/// assert!(!euc_kr.is_utf8());
/// let bytes = euc_kr.encode("가나다");
/// assert_eq!(euc_kr.decode(&bytes), "가나다");
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    encoding: &'static Encoding,
}

impl Charset {
    /// The UTF-8 charset.
    pub const fn utf8() -> Self {
        Self { encoding: UTF_8 }
    }

    /// Resolves a charset by its WHATWG label, e.g. `"EUC-KR"`, `"GBK"`,
    /// or `"Shift_JIS"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFeature`] if the label is unknown.
    pub fn for_label(label: &str) -> Result<Self> {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => Ok(Self { encoding }),
            None => Err(Error::UnsupportedFeature {
                feature: "unknown charset label",
            }),
        }
    }

    /// Returns `true` if this charset is UTF-8.
    ///
    /// Entries encoded while a UTF-8 charset is active carry the language
    /// encoding flag (general purpose bit 11).
    pub fn is_utf8(&self) -> bool {
        self.encoding == UTF_8
    }

    /// Returns the canonical name of the charset.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Encodes a string to bytes in this charset.
    ///
    /// Characters not representable in the charset are replaced with the
    /// encoder's substitution sequence (numeric character references for
    /// legacy encodings), matching how archive tools degrade.
    pub fn encode<'a>(&self, s: &'a str) -> Cow<'a, [u8]> {
        let (bytes, _, _) = self.encoding.encode(s);
        bytes
    }

    /// Decodes bytes from this charset to a string.
    ///
    /// Malformed sequences are replaced with U+FFFD.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (s, _, _) = self.encoding.decode(bytes);
        s
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::utf8()
    }
}

impl std::fmt::Debug for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Charset").field(&self.name()).finish()
    }
}
