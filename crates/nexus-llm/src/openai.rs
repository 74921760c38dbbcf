use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::{GenerationOptions, LlmProvider, Message};

const PROVIDER: &str = "openai";
const DEFAULT_CHAT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_EMBED_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for any OpenAI-compatible API (`OpenAI`, `OpenRouter`, local gateways).
#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    embedding_model: Option<String>,
    options: GenerationOptions,
    chat_timeout: Duration,
    embed_timeout: Duration,
    referer: Option<String>,
    title: Option<String>,
}

impl fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("options", &self.options)
            .field("chat_timeout", &self.chat_timeout)
            .field("embed_timeout", &self.embed_timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiProvider {
    #[must_use]
    pub fn new(
        api_key: String,
        mut base_url: String,
        model: String,
        embedding_model: Option<String>,
    ) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: crate::http::default_client(),
            api_key,
            base_url,
            model,
            embedding_model,
            options: GenerationOptions::default(),
            chat_timeout: DEFAULT_CHAT_TIMEOUT,
            embed_timeout: DEFAULT_EMBED_TIMEOUT,
            referer: None,
            title: None,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, chat: Duration, embed: Duration) -> Self {
        self.chat_timeout = chat;
        self.embed_timeout = embed;
        self
    }

    /// Attribution headers (`HTTP-Referer`, `X-Title`) used by `OpenRouter` rankings.
    #[must_use]
    pub fn with_attribution(mut self, referer: Option<String>, title: Option<String>) -> Self {
        self.referer = referer;
        self.title = title;
        self
    }

    #[must_use]
    pub fn options(&self) -> GenerationOptions {
        self.options
    }

    fn post(&self, endpoint: &str, timeout: Duration) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(format!("{}/{endpoint}", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(timeout);
        if let Some(ref referer) = self.referer {
            req = req.header("HTTP-Referer", referer);
        }
        if let Some(ref title) = self.title {
            req = req.header("X-Title", title);
        }
        req
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        operation: &'static str,
    ) -> Result<String, LlmError> {
        let response = req
            .send()
            .await
            .map_err(|e| LlmError::from_send(e, operation))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::from_send(e, operation))?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }

        if !status.is_success() {
            tracing::error!(%status, body = %text, "{PROVIDER} {operation} API error");
            return Err(LlmError::Api {
                provider: PROVIDER.into(),
                status: status.as_u16(),
            });
        }

        Ok(text)
    }
}

impl LlmProvider for OpenAiProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let api_messages = convert_messages(messages);
        let body = ChatRequest {
            model: &self.model,
            messages: &api_messages,
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        };

        let req = self.post("chat/completions", self.chat_timeout).json(&body);
        let text = self.send(req, "chat").await?;
        let resp: OpenAiChatResponse = serde_json::from_str(&text)?;

        if let Some(ref usage) = resp.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "{PROVIDER} API usage"
            );
        }

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse {
                provider: PROVIDER.into(),
            })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let model = self
            .embedding_model
            .as_deref()
            .ok_or(LlmError::EmbedUnsupported {
                provider: PROVIDER.into(),
            })?;

        if text.trim().is_empty() {
            return Err(LlmError::EmptyInput);
        }

        let body = EmbeddingRequest { input: text, model };
        let req = self.post("embeddings", self.embed_timeout).json(&body);
        let raw = self.send(req, "embedding").await?;
        let resp: EmbeddingResponse = serde_json::from_str(&raw)?;

        resp.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(LlmError::EmptyResponse {
                provider: PROVIDER.into(),
            })
    }

    fn supports_embeddings(&self) -> bool {
        self.embedding_model.is_some()
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        PROVIDER
    }
}

fn convert_messages(messages: &[Message]) -> Vec<ApiMessage<'_>> {
    messages
        .iter()
        .map(|msg| ApiMessage {
            role: msg.role.as_str(),
            content: &msg.content,
        })
        .collect()
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ApiMessage<'a>],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::provider::Role;

    fn provider_for(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new(
            "test-key".into(),
            server.uri(),
            "deepseek/deepseek-r1".into(),
            Some("text-embedding-ada-002".into()),
        )
    }

    fn chat_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        })
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        let p = OpenAiProvider::new(
            "key".into(),
            "https://openrouter.ai/api/v1/".into(),
            "m".into(),
            None,
        );
        assert_eq!(p.base_url, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn debug_redacts_api_key() {
        let p = OpenAiProvider::new("sk-secret".into(), "http://x".into(), "m".into(), None);
        let dbg = format!("{p:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn convert_messages_keeps_order_and_roles() {
        let msgs = vec![Message::system("sys"), Message::user("question")];
        let api = convert_messages(&msgs);
        assert_eq!(api.len(), 2);
        assert_eq!(api[0].role, "system");
        assert_eq!(api[1].role, "user");
        assert_eq!(api[1].content, "question");
    }

    #[test]
    fn chat_request_serializes_sampling_parameters() {
        let msgs = [ApiMessage {
            role: "user",
            content: "hi",
        }];
        let body = ChatRequest {
            model: "m",
            messages: &msgs,
            temperature: 0.5,
            max_tokens: 500,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn chat_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "deepseek/deepseek-r1",
                "max_tokens": 500
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("Check the filter.")))
            .expect(1)
            .mount(&server)
            .await;

        let p = provider_for(&server);
        let answer = p.chat(&[Message::user("why is it warm?")]).await.unwrap();
        assert_eq!(answer, "Check the filter.");
    }

    #[tokio::test]
    async fn chat_sends_attribution_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("HTTP-Referer", "https://smart-insight-nexus.com"))
            .and(header("X-Title", "Smart Insight Nexus"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let p = provider_for(&server).with_attribution(
            Some("https://smart-insight-nexus.com".into()),
            Some("Smart Insight Nexus".into()),
        );
        assert_eq!(p.chat(&[Message::user("hi")]).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn chat_empty_choices_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .chat(&[Message::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn chat_null_content_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": null}}]
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .chat(&[Message::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn chat_server_error_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .chat(&[Message::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 502, .. }));
    }

    #[tokio::test]
    async fn chat_rate_limit_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .chat(&[Message::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RateLimited));
    }

    #[tokio::test]
    async fn chat_unreachable_endpoint_errors() {
        let p = OpenAiProvider::new("key".into(), "http://127.0.0.1:1".into(), "m".into(), None);
        assert!(p.chat(&[Message::new(Role::User, "test")]).await.is_err());
    }

    #[tokio::test]
    async fn embed_returns_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(serde_json::json!({
                "model": "text-embedding-ada-002",
                "input": "boiler pressure"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.25, 0.5, 0.75], "index": 0}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let v = provider_for(&server).embed("boiler pressure").await.unwrap();
        assert_eq!(v, vec![0.25, 0.5, 0.75]);
    }

    #[tokio::test]
    async fn embed_rejects_blank_input_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = provider_for(&server).embed("   ").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyInput));
    }

    #[tokio::test]
    async fn embed_without_model_returns_error() {
        let p = OpenAiProvider::new("key".into(), "http://127.0.0.1:1".into(), "m".into(), None);
        assert!(!p.supports_embeddings());
        let err = p.embed("test").await.unwrap_err();
        assert!(err.to_string().contains("embedding not supported"));
    }

    #[tokio::test]
    async fn embed_upstream_length_error_is_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "maximum context length exceeded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider_for(&server).embed("long text").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn embed_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(serde_json::json!({"data": [{"embedding": [1.0]}]})),
            )
            .mount(&server)
            .await;

        let p = provider_for(&server)
            .with_timeouts(Duration::from_secs(5), Duration::from_millis(50));
        let err = p.embed("slow").await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::Timeout {
                operation: "embedding"
            }
        ));
    }

    #[test]
    fn embedding_response_empty_data() {
        let resp: EmbeddingResponse = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(resp.data.is_empty());
    }
}
