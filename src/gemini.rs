//! Minimal Gemini REST client for embeddings and text generation.
//!
//! Only the three calls the pipeline needs are implemented:
//! `embedContent`, `batchEmbedContents` and `generateContent`.

use crate::config::Settings;
use crate::error::{NyayError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default timeout for Gemini API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Embedding task hint sent with every embedding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// The text is a search query.
    RetrievalQuery,
    /// The text is a document to be searched over.
    RetrievalDocument,
}

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiClient {
    /// Create a client against the default endpoint.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_config(
            api_key,
            DEFAULT_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client with a custom endpoint and timeout.
    pub fn with_config(api_key: Option<String>, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Create a client from application settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::with_config(
            settings.gemini_api_key().map(str::to_string),
            &settings.gemini.base_url,
            Duration::from_secs(settings.gemini.timeout_seconds),
        )
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| NyayError::Config("GEMINI_API_KEY is not configured".to_string()))
    }

    fn url(&self, model: &str, method: &str) -> String {
        format!("{}/{}:{}", self.base_url, model_path(model), method)
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> std::result::Result<R, String> {
        let api_key = self.api_key().map_err(|e| e.to_string())?;

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Gemini API error {}: {}", status, body.trim()));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| format!("failed to parse response: {}", e.without_url()))
    }

    /// Embed a single text.
    pub async fn embed_content(&self, model: &str, text: &str, task: TaskType) -> Result<Vec<f32>> {
        self.api_key()?;

        let model = model_path(model);
        let request = EmbedContentRequest {
            model: model.clone(),
            content: Content::user_text(text),
            task_type: task,
        };

        debug!(model = %model, task = ?task, "Requesting embedding");

        let response: EmbedContentResponse = self
            .post(&self.url(&model, "embedContent"), &request)
            .await
            .map_err(NyayError::Embedding)?;

        if response.embedding.values.is_empty() {
            return Err(NyayError::Embedding("Empty embedding response".to_string()));
        }

        Ok(response.embedding.values)
    }

    /// Embed several texts in one request, preserving input order.
    pub async fn batch_embed_contents(
        &self,
        model: &str,
        texts: &[String],
        task: TaskType,
    ) -> Result<Vec<Vec<f32>>> {
        self.api_key()?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = model_path(model);
        let request = BatchEmbedContentsRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: model.clone(),
                    content: Content::user_text(text),
                    task_type: task,
                })
                .collect(),
        };

        debug!(model = %model, count = texts.len(), "Requesting batch embeddings");

        let response: BatchEmbedContentsResponse = self
            .post(&self.url(&model, "batchEmbedContents"), &request)
            .await
            .map_err(NyayError::Embedding)?;

        if response.embeddings.len() != texts.len() {
            return Err(NyayError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    /// Generate text for a single-turn prompt.
    pub async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        temperature: Option<f32>,
    ) -> Result<String> {
        self.api_key()?;

        let model = model_path(model);
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: temperature.map(|t| GenerationConfig {
                temperature: Some(t),
            }),
        };

        debug!(model = %model, prompt_len = prompt.len(), "Sending request to Gemini API");

        let response: GenerateContentResponse = self
            .post(&self.url(&model, "generateContent"), &request)
            .await
            .map_err(NyayError::Generation)?;

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            NyayError::Generation(format!("Empty response from model: {}", reason))
        })?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(NyayError::Generation(
                "Response blocked by safety filters".to_string(),
            ));
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(NyayError::Generation("Empty response from model".to_string()));
        }

        Ok(text)
    }
}

/// Normalise a model name to the `models/<name>` form the REST API expects.
pub fn model_path(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

// === Wire types ===

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user_text(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest {
    model: String,
    content: Content,
    task_type: TaskType,
}

#[derive(Debug, Serialize)]
struct BatchEmbedContentsRequest {
    requests: Vec<EmbedContentRequest>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedContentsResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{
        extract::{Path, State},
        http::HeaderMap,
        http::StatusCode,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A fake Gemini endpoint and the number of batchEmbedContents calls it served.
    pub(crate) struct FakeGemini {
        pub base_url: String,
        pub batch_calls: Arc<AtomicUsize>,
    }

    impl FakeGemini {
        pub fn batch_calls(&self) -> usize {
            self.batch_calls.load(Ordering::SeqCst)
        }
    }

    /// Serve a fake Gemini endpoint on a random local port.
    pub(crate) async fn spawn_fake_gemini() -> FakeGemini {
        async fn handle(
            State(batch_calls): State<Arc<AtomicUsize>>,
            Path(call): Path<String>,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> (StatusCode, Json<Value>) {
            if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({"error": {"message": "API key not valid"}})),
                );
            }

            if call.ends_with(":embedContent") {
                assert_eq!(body["taskType"], "RETRIEVAL_QUERY");
                return (StatusCode::OK, Json(json!({"embedding": {"values": [0.5, 0.5]}})));
            }

            if call.ends_with(":batchEmbedContents") {
                batch_calls.fetch_add(1, Ordering::SeqCst);
                let requests = body["requests"].as_array().cloned().unwrap_or_default();
                let embeddings: Vec<Value> = requests
                    .iter()
                    .map(|r| {
                        assert_eq!(r["taskType"], "RETRIEVAL_DOCUMENT");
                        assert_eq!(r["model"], "models/embedding-001");
                        let len = r["content"]["parts"][0]["text"].as_str().unwrap_or("").len();
                        json!({"values": [len as f32, 1.0]})
                    })
                    .collect();
                return (StatusCode::OK, Json(json!({"embeddings": embeddings})));
            }

            if call.ends_with(":generateContent") {
                let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or("");
                if prompt == "blocked" {
                    return (
                        StatusCode::OK,
                        Json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
                    );
                }
                return (
                    StatusCode::OK,
                    Json(json!({
                        "candidates": [{
                            "content": {"role": "model", "parts": [{"text": "Section 379"}, {"text": " applies."}]},
                            "finishReason": "STOP"
                        }]
                    })),
                );
            }

            (StatusCode::NOT_FOUND, Json(json!({})))
        }

        let batch_calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/models/{call}", post(handle))
            .with_state(batch_calls.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeGemini {
            base_url: format!("http://{}", addr),
            batch_calls,
        }
    }

    fn client(base_url: &str, key: Option<&str>) -> GeminiClient {
        GeminiClient::with_config(key.map(str::to_string), base_url, Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_model_path() {
        assert_eq!(model_path("gemini-1.5-flash-latest"), "models/gemini-1.5-flash-latest");
        assert_eq!(model_path("models/embedding-001"), "models/embedding-001");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let gemini = client("http://127.0.0.1:9", None);

        let err = gemini
            .generate_content("gemini-1.5-flash-latest", "hi", None)
            .await
            .unwrap_err();
        assert!(matches!(err, NyayError::Config(_)));
    }

    #[tokio::test]
    async fn test_embed_and_batch_embed() {
        let fake = spawn_fake_gemini().await;
        let gemini = client(&fake.base_url, Some("test-key"));

        let query = gemini
            .embed_content("models/embedding-001", "theft", TaskType::RetrievalQuery)
            .await
            .unwrap();
        assert_eq!(query, vec![0.5, 0.5]);

        let texts = vec!["a".to_string(), "abc".to_string()];
        let docs = gemini
            .batch_embed_contents("embedding-001", &texts, TaskType::RetrievalDocument)
            .await
            .unwrap();
        assert_eq!(docs, vec![vec![1.0, 1.0], vec![3.0, 1.0]]);
        assert_eq!(fake.batch_calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_concatenates_parts() {
        let fake = spawn_fake_gemini().await;
        let gemini = client(&fake.base_url, Some("test-key"));

        let text = gemini
            .generate_content("gemini-1.5-flash-latest", "someone stole my phone", Some(0.2))
            .await
            .unwrap();
        assert_eq!(text, "Section 379 applies.");
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_an_error() {
        let fake = spawn_fake_gemini().await;
        let gemini = client(&fake.base_url, Some("test-key"));

        let err = gemini
            .generate_content("gemini-1.5-flash-latest", "blocked", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_api_error_carries_status() {
        let fake = spawn_fake_gemini().await;
        let gemini = client(&fake.base_url, Some("wrong-key"));

        let err = gemini
            .embed_content("models/embedding-001", "x", TaskType::RetrievalQuery)
            .await
            .unwrap_err();
        match err {
            NyayError::Embedding(msg) => assert!(msg.contains("403")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
