//! Wire types for the Gemini REST API.

use serde::{Deserialize, Serialize};
use vidverify_models::TokenUsage;

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Processing,
    Active,
    Failed,
    /// Also used for states this client does not know
    #[default]
    #[serde(other)]
    StateUnspecified,
}

/// An uploaded file as returned by the Files API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiFile {
    /// Resource name, `files/{id}`
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub size_bytes: Option<String>,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub state: FileState,
    #[serde(default)]
    pub error: Option<ApiStatus>,
}

/// `google.rpc.Status` as embedded in file and error payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileEnvelope {
    pub file: GeminiFile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ApiStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadMetadata<'a> {
    pub file: UploadMetadataFile<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadMetadataFile<'a> {
    pub display_name: &'a str,
}

/// generateContent request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Part {
    Text {
        text: String,
    },
    File {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

/// generateContent response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub content: Option<ResponseContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    pub text: Option<String>,
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
    #[serde(default)]
    pub total_token_count: u64,
}

impl From<UsageMetadata> for TokenUsage {
    fn from(usage: UsageMetadata) -> Self {
        TokenUsage {
            prompt_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Text and accounting of a successful generateContent call.
#[derive(Debug, Clone)]
pub struct GenerateOutput {
    /// Model that produced the answer
    pub model: String,
    pub text: String,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_text_and_file_parts() {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: "prompt".to_string(),
                    },
                    Part::File {
                        file_data: FileData {
                            mime_type: "video/mp4".to_string(),
                            file_uri: "https://example/files/abc".to_string(),
                        },
                    },
                ],
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "prompt");
        assert_eq!(parts[1]["fileData"]["mimeType"], "video/mp4");
        assert_eq!(parts[1]["fileData"]["fileUri"], "https://example/files/abc");
    }

    #[test]
    fn test_file_deserializes_state() {
        let file: GeminiFile = serde_json::from_str(
            r#"{"name": "files/abc", "mimeType": "video/mp4", "uri": "u", "state": "PROCESSING"}"#,
        )
        .unwrap();
        assert_eq!(file.state, FileState::Processing);

        let file: GeminiFile = serde_json::from_str(r#"{"name": "files/abc"}"#).unwrap();
        assert_eq!(file.state, FileState::StateUnspecified);
    }

    #[test]
    fn test_unknown_state_does_not_break_file() {
        let file: GeminiFile =
            serde_json::from_str(r#"{"name": "files/abc", "state": "ARCHIVED"}"#).unwrap();
        assert_eq!(file.name, "files/abc");
        assert_eq!(file.state, FileState::StateUnspecified);
    }
}
