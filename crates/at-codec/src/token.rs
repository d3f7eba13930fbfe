//! Base64 transport for the token text.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::CodecResult;

/// Standard alphabet, padded on encode, padding optional on decode.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn wrap(json: &str) -> String {
    TOKEN_ENGINE.encode(json.as_bytes())
}

/// Undo [`wrap`]. Whitespace anywhere in the token is ignored, since pasted
/// tokens often pick up line breaks.
pub fn unwrap(token: &str) -> CodecResult<String> {
    let compact: String = token.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = TOKEN_ENGINE.decode(compact.as_bytes())?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        // Tokens from older instances are byte strings, one char per byte.
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    })
}
