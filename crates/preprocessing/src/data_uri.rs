//! Base64 data-URI decoding for uploaded screenshots

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::PreprocessError;

static DATA_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:[\w.+-]+/[\w.+-]+;base64,(?P<payload>[A-Za-z0-9+/=]+)$")
        .expect("data URI pattern is valid"));

/// Decode a `data:<mime>;base64,<payload>` URI into raw image bytes.
///
/// # Errors
/// [`PreprocessError::InvalidDataUri`] when the string does not match the
/// expected shape, [`PreprocessError::Base64`] when the payload is not valid
/// base64.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, PreprocessError> {
    let captures = DATA_URI
        .captures(uri)
        .ok_or(PreprocessError::InvalidDataUri)?;

    Ok(STANDARD.decode(&captures["payload"])?)
}
