//! Gemini HTTP client.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, Response};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};
use crate::types::{
    Content, ErrorEnvelope, FileData, FileEnvelope, FileState, GeminiFile, GenerateOutput,
    GenerateRequest, GenerateResponse, Part, UploadMetadata, UploadMetadataFile,
};

/// Called with the cumulative number of bytes sent.
pub type UploadProgress = Arc<dyn Fn(u64) + Send + Sync>;

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Client for the Gemini Files and generateContent APIs.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client.
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(GeminiError::config("Gemini API key is empty"));
        }

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> GeminiResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Upload a local file with the resumable upload protocol.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        progress: Option<UploadProgress>,
    ) -> GeminiResult<GeminiFile> {
        let path = path.as_ref();
        let size = tokio::fs::metadata(path).await?.len();
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        debug!(
            "Starting resumable upload of {} ({} bytes, {})",
            path.display(),
            size,
            mime_type
        );

        let start = self
            .http
            .post(format!("{}/upload/v1beta/files", self.config.base_url))
            .header(API_KEY_HEADER, &self.config.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", &mime_type)
            .timeout(self.config.timeout)
            .json(&UploadMetadata {
                file: UploadMetadataFile {
                    display_name: &display_name,
                },
            })
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| GeminiError::upload("response did not include an upload URL"))?;

        let file = tokio::fs::File::open(path).await?;
        let body = reqwest::Body::wrap_stream(file_stream(
            file,
            self.config.upload_chunk_size,
            progress,
        ));

        let response = self
            .http
            .post(&upload_url)
            .header("Content-Length", size.to_string())
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .timeout(self.config.upload_timeout)
            .body(body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let envelope: FileEnvelope = response.json().await?;
        info!(
            "Uploaded {} as {} ({:?})",
            display_name, envelope.file.name, envelope.file.state
        );
        Ok(envelope.file)
    }

    /// Fetch the current metadata of an uploaded file.
    pub async fn get_file(&self, name: &str) -> GeminiResult<GeminiFile> {
        let url = format!("{}/v1beta/{}", self.config.base_url, name);
        let response = self
            .with_retry(|| send_checked(self.authorized(self.http.get(&url))))
            .await?;
        Ok(response.json().await?)
    }

    /// Poll until the file leaves `PROCESSING`.
    ///
    /// `on_tick` is called before every wait with the time waited so far.
    pub async fn wait_until_active<F>(
        &self,
        mut file: GeminiFile,
        mut on_tick: F,
    ) -> GeminiResult<GeminiFile>
    where
        F: FnMut(Duration),
    {
        let started = Instant::now();

        loop {
            match file.state {
                FileState::Processing => {
                    let waited = started.elapsed();
                    if waited >= self.config.processing_timeout {
                        return Err(GeminiError::ProcessingTimeout {
                            name: file.name,
                            secs: self.config.processing_timeout.as_secs(),
                        });
                    }
                    on_tick(waited);
                    tokio::time::sleep(self.config.poll_interval).await;
                    file = self.get_file(&file.name).await?;
                }
                FileState::Failed => {
                    let message = file
                        .error
                        .map(|e| e.message)
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| "no details returned".to_string());
                    return Err(GeminiError::FileFailed {
                        name: file.name,
                        message,
                    });
                }
                FileState::Active | FileState::StateUnspecified => {
                    debug!("File {} ready after {:?}", file.name, started.elapsed());
                    return Ok(file);
                }
            }
        }
    }

    /// Run one generateContent call: the prompt followed by the files.
    pub async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        files: &[GeminiFile],
    ) -> GeminiResult<GenerateOutput> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, model
        );

        let mut parts = Vec::with_capacity(files.len() + 1);
        parts.push(Part::Text {
            text: prompt.to_string(),
        });
        parts.extend(files.iter().map(|f| Part::File {
            file_data: FileData {
                mime_type: f.mime_type.clone(),
                file_uri: f.uri.clone(),
            },
        }));

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
        };

        let response = self
            .authorized(self.http.post(&url))
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;
        let response: GenerateResponse = response.json().await?;

        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(GeminiError::Blocked(reason));
        }

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GeminiError::EmptyResponse("no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse(format!(
                "finish reason {}",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(GenerateOutput {
            model: model.to_string(),
            text,
            usage: response.usage_metadata.map(Into::into),
            finish_reason: candidate.finish_reason,
        })
    }

    /// Try each model in order and return the first successful answer.
    pub async fn generate_with_fallback(
        &self,
        models: &[String],
        prompt: &str,
        files: &[GeminiFile],
    ) -> GeminiResult<GenerateOutput> {
        let mut last_error = None;

        for model in models {
            info!("Attempting Gemini API with model: {}", model);
            match self.generate_content(model, prompt, files).await {
                Ok(output) => {
                    info!("Got analysis from {}", model);
                    return Ok(output);
                }
                Err(e) => {
                    warn!("Failed with model {}: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| GeminiError::config("no models configured")))
    }

    /// Delete an uploaded file.
    pub async fn delete_file(&self, name: &str) -> GeminiResult<()> {
        let url = format!("{}/v1beta/{}", self.config.base_url, name);
        self.with_retry(|| send_checked(self.authorized(self.http.delete(&url))))
            .await?;
        Ok(())
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(API_KEY_HEADER, &self.config.api_key)
            .timeout(self.config.timeout)
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> GeminiResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = GeminiResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Gemini request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

async fn send_checked(builder: RequestBuilder) -> GeminiResult<Response> {
    check_status(builder.send().await?).await
}

/// Turn a non-2xx response into `GeminiError::Api`.
async fn check_status(response: Response) -> GeminiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or(body);

    Err(GeminiError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Stream a file in chunks, reporting cumulative bytes read.
fn file_stream(
    file: tokio::fs::File,
    chunk_size: usize,
    progress: Option<UploadProgress>,
) -> impl futures::Stream<Item = std::io::Result<Vec<u8>>> + Send + 'static {
    futures::stream::try_unfold((file, 0u64), move |(mut file, sent)| {
        let progress = progress.clone();
        async move {
            let mut buf = vec![0u8; chunk_size.max(1)];
            let n = file.read(&mut buf).await?;
            if n == 0 {
                return Ok(None);
            }
            buf.truncate(n);
            let sent = sent + n as u64;
            if let Some(progress) = progress {
                progress(sent);
            }
            Ok(Some((buf, (file, sent))))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            GeminiClient::new(GeminiConfig::new("  ")),
            Err(GeminiError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_file_stream_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        tokio::fs::write(&path, vec![7u8; 10_000]).await.unwrap();

        let seen = Arc::new(AtomicU64::new(0));
        let seen_in_cb = seen.clone();
        let progress: UploadProgress = Arc::new(move |sent| seen_in_cb.store(sent, Ordering::SeqCst));

        let file = tokio::fs::File::open(&path).await.unwrap();
        let chunks: Vec<Vec<u8>> = file_stream(file, 4096, Some(progress))
            .try_collect()
            .await
            .unwrap();

        assert_eq!(chunks.iter().map(Vec::len).sum::<usize>(), 10_000);
        assert!(chunks.iter().all(|c| c.len() <= 4096));
        assert_eq!(seen.load(Ordering::SeqCst), 10_000);
    }
}
