//! Base64 encode / decode

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolkitError};

/// Decoder that tolerates missing padding and non-zero trailing bits
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Base64Operation {
    Encode,
    Decode,
}

/// Input for `base64-convert`
#[derive(Debug, Clone, Deserialize)]
pub struct Base64Params {
    pub operation: Base64Operation,
    pub text: String,
}

/// Output of `base64-convert`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedText {
    pub result: String,
    pub operation: Base64Operation,
    pub original_text: String,
}

/// Encode text to standard base64, or decode base64 back to text
pub fn convert_base64(params: &Base64Params) -> Result<ConvertedText> {
    let result = match params.operation {
        Base64Operation::Encode => STANDARD.encode(params.text.as_bytes()),
        Base64Operation::Decode => decode(&params.text)?,
    };

    Ok(ConvertedText {
        result,
        operation: params.operation,
        original_text: params.text.clone(),
    })
}

fn decode(text: &str) -> Result<String> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = LENIENT
        .decode(compact)
        .map_err(|_| ToolkitError::Generation("Invalid Base64 input".to_string()))?;

    // Binary payloads fall back to one char per byte.
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    })
}
