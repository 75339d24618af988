//! `Accept` header parsing (RFC 7231 §5.3.2).
//!
//! ```text
//! Accept = #( media-range [ accept-params ] )
//! ```
//!
//! Only the bare media range and the `q` weight survive parsing; negotiation
//! looks media types up by exact string, so other parameters are dropped.

use std::str::FromStr;

use tracing::warn;

use crate::error::Error;

/// One parsed element of an `Accept` header.
#[derive(Clone, Debug, PartialEq)]
pub struct AcceptEntry {
    media_type: String,
    quality: f32,
}

impl AcceptEntry {
    /// Builds an entry. `media_type` is lower-cased; `quality` is clamped to `0..=1`.
    pub fn new(media_type: impl AsRef<str>, quality: f32) -> Self {
        Self {
            media_type: media_type.as_ref().trim().to_ascii_lowercase(),
            quality: if quality.is_nan() { 0.0 } else { quality.clamp(0.0, 1.0) },
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Client preference weight, `1.0` when the entry had no `q` parameter.
    pub fn quality(&self) -> f32 {
        self.quality
    }
}

impl FromStr for AcceptEntry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMediaType(s.trim().to_owned());

        let mut parts = split_unquoted(s, ';').into_iter();
        let media_type = parts.next().unwrap_or_default().trim();
        match media_type.split_once('/') {
            Some((ty, sub))
                if !ty.is_empty() && !sub.is_empty() && !sub.contains(['/', '"']) => {}
            _ => return Err(invalid()),
        }

        let mut quality = 1.0;
        for param in parts {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            let value = unquote(value.trim()).ok_or_else(invalid)?;
            if name.trim().eq_ignore_ascii_case("q") {
                quality = parse_quality(&value)?;
            }
        }

        Ok(Self::new(media_type, quality))
    }
}

/// `qvalue = ( "0" [ "." 0*3DIGIT ] ) / ( "1" [ "." 0*3("0") ] )`
fn parse_quality(raw: &str) -> Result<f32, Error> {
    let invalid = || Error::InvalidQuality(raw.to_owned());
    let (int, frac) = raw.split_once('.').unwrap_or((raw, ""));
    if !matches!(int, "0" | "1") || frac.len() > 3 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let q: f32 = raw.parse().map_err(|_| invalid())?;
    if q > 1.0 {
        return Err(invalid());
    }
    Ok(q)
}

/// Splits on `sep`, except inside quoted-strings (RFC 7230 §3.2.6).
///
/// An unterminated quoted-string runs to the end of the input.
fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            c if c == sep && !quoted => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// A parameter value: a token as-is, or a quoted-string with its quotes and
/// escapes removed. `None` for an unterminated quoted-string.
fn unquote(value: &str) -> Option<String> {
    let Some(inner) = value.strip_prefix('"') else {
        return Some(value.to_owned());
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?),
            '"' => return chars.as_str().is_empty().then_some(out),
            c => out.push(c),
        }
    }
    None
}

/// Parses a full `Accept` value, skipping malformed elements.
///
/// A header made only of garbage yields an empty list, which negotiation
/// treats the same as a missing header.
pub fn parse(header: &str) -> Vec<AcceptEntry> {
    split_unquoted(header, ',')
        .into_iter()
        .filter(|element| !element.trim().is_empty())
        .filter_map(|element| match element.parse::<AcceptEntry>() {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "ignoring malformed Accept element");
                None
            }
        })
        .collect()
}
