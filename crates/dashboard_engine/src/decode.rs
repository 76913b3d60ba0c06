use chardetng::EncodingDetector;
use dashboard_logging::dash_warn;
use encoding_rs::Encoding;

use crate::FetchOutput;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

impl DecodedText {
    pub fn from_fetch(output: &FetchOutput) -> Result<Self, DecodeError> {
        decode_text(&output.bytes, output.content_type.as_deref())
    }
}

/// Decode a response body into UTF-8 using: BOM -> Content-Type charset -> chardetng guess.
///
/// JSON bodies must decode cleanly. Markup is decoded leniently: malformed
/// sequences become U+FFFD and are only logged.
pub fn decode_text(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedText, DecodeError> {
    let is_json = content_type.is_some_and(|ct| ct.trim_start().starts_with("application/json"));
    let encoding = pick_encoding(bytes, content_type, is_json);

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        if is_json {
            return Err(DecodeError::DecodeFailure {
                encoding: encoding.name().to_string(),
                message: "malformed byte sequence".into(),
            });
        }
        dash_warn!(
            "Replaced malformed {} sequences while decoding {} bytes",
            encoding.name(),
            bytes.len()
        );
    }
    Ok(DecodedText {
        text: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}

fn pick_encoding(bytes: &[u8], content_type: Option<&str>, is_json: bool) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if let Some(encoding) = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }
    // JSON bodies without a charset are UTF-8 by definition.
    if is_json {
        return encoding_rs::UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}
