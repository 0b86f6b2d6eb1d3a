//! Byte decoding with encoding detection.
//!
//! Order of attempts:
//! 1. strict UTF-8 (the overwhelmingly common case, zero-copy check);
//! 2. chardetng detection — a reliable guess decodes with replacement
//!    characters on invalid sequences;
//! 3. the configured fallback decoder, accepted only when it decodes cleanly.
//!
//! chardetng reports a best guess plus a reliability flag rather than a
//! numeric score; reliable guesses count as confidence 1.0 and unreliable
//! ones as 0.5 when compared against the configured threshold.

use crate::config::ParserConfig;
use crate::errors::{Error, Result};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::debug;

const RELIABLE_CONFIDENCE: f64 = 1.0;
const UNRELIABLE_CONFIDENCE: f64 = 0.5;

/// Decode file bytes to text, returning `(text, encoding_label)`.
pub fn decode(bytes: &[u8], config: &ParserConfig) -> Result<(String, String)> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok((text.to_string(), "utf-8".to_string()));
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let (encoding, reliable) = detector.guess_assess(None, true);
    let confidence = if reliable {
        RELIABLE_CONFIDENCE
    } else {
        UNRELIABLE_CONFIDENCE
    };

    if confidence >= config.encoding_confidence_threshold {
        let (text, _, _) = encoding.decode(bytes);
        debug!(encoding = encoding.name(), "decoded via detection");
        return Ok((text.into_owned(), encoding.name().to_ascii_lowercase()));
    }

    if let Some(fallback) = Encoding::for_label(config.fallback_encoding.as_bytes()) {
        let (text, _, had_errors) = fallback.decode(bytes);
        if !had_errors {
            debug!(encoding = fallback.name(), "decoded via fallback");
            return Ok((text.into_owned(), fallback.name().to_ascii_lowercase()));
        }
    }

    Err(Error::EncodingUnresolved(format!(
        "detection below threshold {} and fallback '{}' failed",
        config.encoding_confidence_threshold, config.fallback_encoding
    )))
}
