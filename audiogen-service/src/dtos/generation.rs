use serde::{Deserialize, Serialize};

pub const GENERATED_MESSAGE: &str = "✅ Song generated";

/// Body of `POST /generate`.
///
/// `text` is kept as raw JSON so a wrong type is reported the same way as a
/// missing field.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub text: Option<serde_json::Value>,
}

impl GenerateRequest {
    /// The prompt, if present as a non-empty string.
    pub fn prompt(&self) -> Option<&str> {
        match &self.text {
            Some(serde_json::Value::String(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_url: Option<String>,
    pub local_path: String,
}

impl GenerateResponse {
    pub fn new(local_path: String, s3_url: Option<String>) -> Self {
        Self {
            message: GENERATED_MESSAGE.to_string(),
            s3_url,
            local_path,
        }
    }
}
