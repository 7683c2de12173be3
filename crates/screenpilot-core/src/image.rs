use base64::Engine;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{AssistError, Result};

pub const MAX_QUESTION_CHARS: usize = 500;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

static DATA_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^data:([^;]+);base64,(.+)$").expect("static regex"));

/// Image split out of a `data:<mime>;base64,<payload>` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

pub fn decode_image(data_uri: &str) -> Result<DecodedImage> {
    let captures = DATA_URI
        .captures(data_uri)
        .ok_or(AssistError::InvalidImageFormat)?;

    let mime_type = captures[1].to_string();
    let data = base64::engine::general_purpose::STANDARD
        .decode(captures[2].trim_end())
        .map_err(|_| AssistError::InvalidImageFormat)?;

    Ok(DecodedImage { mime_type, data })
}

/// Size of the decoded payload estimated from the encoded length (3/4 rule)
pub fn estimated_decoded_size(encoded_len: usize) -> f64 {
    encoded_len as f64 * 0.75
}

/// Pre-decode checks, in order: both present, question length, image size.
pub fn validate_input(image_data_uri: &str, question: &str) -> Result<()> {
    if image_data_uri.is_empty() || question.is_empty() {
        return Err(AssistError::MissingInput);
    }

    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err(AssistError::QuestionTooLong);
    }

    if estimated_decoded_size(image_data_uri.len()) > MAX_IMAGE_BYTES as f64 {
        return Err(AssistError::ImageTooLarge);
    }

    Ok(())
}
