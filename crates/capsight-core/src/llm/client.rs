use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::config::LlmConfig;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Cannot connect to the model server at {0}")]
    Connection(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Model server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// One-shot chat completion against a language model.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends `prompt` as a single user message and returns the raw reply text.
    async fn chat(&self, prompt: &str) -> ClientResult<String>;

    fn model(&self) -> &str;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Deserialize, Default)]
struct ChatReplyMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: ChatReplyMessage,
}

/// Non-streaming client for Ollama's `/api/chat`.
pub struct OllamaClient {
    config: LlmConfig,
    chat_url: Url,
    inner: Client,
}

impl OllamaClient {
    pub fn new(config: LlmConfig) -> ClientResult<Self> {
        let chat_url = config.chat_url()?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            chat_url,
            inner,
        })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn classify_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_connect() {
            ClientError::Connection(self.config.base_url.clone())
        } else if e.is_timeout() {
            ClientError::Timeout(self.config.request_timeout_seconds)
        } else {
            ClientError::Http(e)
        }
    }
}

#[async_trait::async_trait]
impl ChatClient for OllamaClient {
    async fn chat(&self, prompt: &str) -> ClientResult<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        tracing::debug!(
            url = %self.chat_url,
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "Sending chat request"
        );

        let response = self
            .inner
            .post(self.chat_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| self.classify_error(e))?;

        Ok(parsed.message.content)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: String) -> OllamaClient {
        OllamaClient::new(LlmConfig {
            base_url,
            model: "test-model".into(),
            connect_timeout_seconds: 5,
            request_timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_chat_sends_single_user_message() {
        let app = Router::new().route(
            "/api/chat",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "test-model");
                assert_eq!(body["stream"], false);
                assert_eq!(body["messages"][0]["role"], "user");
                let echoed = body["messages"][0]["content"].as_str().unwrap_or_default();
                Json(json!({"message": {"role": "assistant", "content": format!("echo:{echoed}")}}))
            }),
        );
        let client = client_for(serve(app).await);

        let reply = client.chat("hello").await.unwrap();

        assert_eq!(reply, "echo:hello");
        assert_eq!(client.model(), "test-model");
    }

    #[tokio::test]
    async fn test_missing_message_content_is_empty() {
        let app = Router::new().route("/api/chat", post(|| async { Json(json!({"done": true})) }));
        let client = client_for(serve(app).await);

        let reply = client.chat("hello").await.unwrap();

        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async { (StatusCode::NOT_FOUND, "model not found") }),
        );
        let client = client_for(serve(app).await);

        let err = client.chat("hello").await.unwrap_err();

        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "model not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(format!("http://{addr}"));

        let err = client.chat("hello").await.unwrap_err();

        assert!(matches!(err, ClientError::Connection(_)));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = OllamaClient::new(LlmConfig {
            base_url: "::nope::".into(),
            ..Default::default()
        });

        assert!(matches!(result, Err(ClientError::UrlParse(_))));
    }
}
