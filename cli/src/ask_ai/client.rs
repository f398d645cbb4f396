use super::types::{AnalysisConfig, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, NO_RESPONSE_TEXT};
use crate::services::Credentials;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("API returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint
pub struct ChatCompletionClient {
    client: Client,
    credentials: Credentials,
    config: AnalysisConfig,
}

impl ChatCompletionClient {
    pub fn new(credentials: Credentials, config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            credentials,
            config,
        })
    }

    pub(crate) fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }

    /// Send one conversation and return the first choice's text
    #[instrument(skip(self, messages), fields(model = %self.config.model))]
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AnalysisError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
        };
        let url = self.endpoint();
        debug!(%url, message_count = messages.len(), "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.credentials.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api { status, body });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;

        match body.first_content() {
            Some(content) => {
                info!(chars = content.len(), "Received analysis");
                Ok(content)
            }
            None => {
                info!("Model returned no content");
                Ok(NO_RESPONSE_TEXT.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode as AxumStatus},
        response::IntoResponse,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn spawn_server(reply: Value, status: AxumStatus) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            let auth = headers
                                .get("authorization")
                                .and_then(|h| h.to_str().ok())
                                .map(String::from);
                            captured.lock().unwrap().push((auth, body));
                            (status, Json(reply)).into_response()
                        }
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v1", addr), captured)
    }

    fn client_for(api_base: String) -> ChatCompletionClient {
        let config = AnalysisConfig {
            api_base,
            timeout: Duration::from_secs(5),
            ..Default::default()
        };
        ChatCompletionClient::new(Credentials::new("sk-test"), config).unwrap()
    }

    #[tokio::test]
    async fn test_returns_first_choice_and_sends_expected_request() {
        let reply = json!({"choices": [{"message": {"role": "assistant", "content": "Looks bullish."}}]});
        let (base, captured) = spawn_server(reply, AxumStatus::OK).await;
        let client = client_for(base);

        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("data")];
        let text = client.complete(&messages).await.unwrap();
        assert_eq!(text, "Looks bullish.");

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let (auth, body) = &captured[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "data");
    }

    #[tokio::test]
    async fn test_fetch_analysis_sends_system_and_user_roles_only() {
        use crate::ask_ai::AnalysisProvider;
        use crate::models::{PriceRow, PriceTable};

        let reply = json!({"choices": [{"message": {"content": "ok"}}]});
        let (base, captured) = spawn_server(reply, AxumStatus::OK).await;
        let client = ChatCompletionClient::new(
            Credentials::new("sk-test"),
            AnalysisConfig {
                api_base: base,
                system_prompt: "Be brief.".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let table = PriceTable::new(vec![PriceRow::new("AAPL", date, 100.0, 105.0)]);
        assert_eq!(client.fetch_analysis(&table).await.unwrap(), "ok");

        let captured = captured.lock().unwrap();
        let messages = captured[0].1["messages"].as_array().unwrap().clone();
        let roles: Vec<_> = messages.iter().map(|m| m["role"].clone()).collect();
        assert_eq!(roles, vec![json!("system"), json!("user")]);
        assert_eq!(messages[0]["content"], "Be brief.");
    }

    #[tokio::test]
    async fn test_empty_choices_yield_no_response_text() {
        let (base, _) = spawn_server(json!({"choices": []}), AxumStatus::OK).await;
        let text = client_for(base).complete(&[ChatMessage::user("x")]).await.unwrap();
        assert_eq!(text, NO_RESPONSE_TEXT);
    }

    #[tokio::test]
    async fn test_error_status_maps_to_api_error() {
        let reply = json!({"error": {"message": "Incorrect API key provided"}});
        let (base, _) = spawn_server(reply, AxumStatus::UNAUTHORIZED).await;
        let err = client_for(base).complete(&[ChatMessage::user("x")]).await.unwrap_err();
        match err {
            AnalysisError::Api { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert!(body.contains("Incorrect API key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(format!("http://{}/v1", addr))
            .complete(&[ChatMessage::user("x")])
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Transport(_)));
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let client = client_for("http://localhost:9/v1/".to_string());
        assert_eq!(client.endpoint(), "http://localhost:9/v1/chat/completions");
    }
}
