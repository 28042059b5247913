use crate::models::DEFAULT_BASE_URL;
use crate::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Longest server body carried into an [`Error::Api`] message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Lightweight Gemini REST client used by the vision module.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `gemini-1.5-flash`);
    /// a `models/` prefix is stripped. Without a `timeout` the reqwest
    /// client's own default applies.
    pub fn new(api_key: String, model: String, timeout: Option<Duration>) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Option<Duration>,
        client: Client,
    ) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn post_to_url<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: String,
        request: &Req,
    ) -> Result<Resp> {
        tracing::debug!("POST {}", url);

        let mut builder = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        // `without_url` keeps the API key query parameter out of error text.
        let response = builder.send().await.map_err(|e| {
            let e = e.without_url();
            tracing::error!("Failed to send request to Gemini: {}", e);
            Error::Network(e)
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.without_url()))?;

        if !status.is_success() {
            tracing::error!("Gemini API error (status {}): {}", status, body);
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error_message(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::MalformedResponse(format!("Failed to parse Gemini response: {}", e))
        })
    }

    /// Calls Gemini's `generateContent` endpoint.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        self.post_to_url(url, request).await
    }
}

/// Pulls `error.message` out of a Google-style error body, falling back to a
/// snippet of the raw body and finally the status text.
fn api_error_message(status: StatusCode, body: &str) -> String {
    let structured = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });
    if let Some(message) = structured {
        return message;
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use serde_json::Value;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer, model: &str) -> GeminiHttpClient {
        GeminiHttpClient::new("secret-key".to_string(), model.to_string(), None)
            .with_base_url(server.uri())
    }

    #[test]
    fn test_model_prefix_is_stripped() {
        let client = GeminiHttpClient::new(
            "k".to_string(),
            "models/gemini-1.5-flash".to_string(),
            None,
        );
        assert_eq!(client.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_api_error_message_prefers_structured_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            api_error_message(StatusCode::BAD_REQUEST, body),
            "API key not valid."
        );
    }

    #[test]
    fn test_api_error_message_falls_back_to_body_then_status() {
        assert_eq!(
            api_error_message(StatusCode::INTERNAL_SERVER_ERROR, "  upstream exploded \n"),
            "upstream exploded"
        );
        assert_eq!(
            api_error_message(StatusCode::TOO_MANY_REQUESTS, ""),
            "Too Many Requests"
        );
    }

    #[test]
    fn test_api_error_message_truncates_long_bodies() {
        let body = "x".repeat(MAX_ERROR_BODY_CHARS * 2);
        assert_eq!(
            api_error_message(StatusCode::BAD_GATEWAY, &body).len(),
            MAX_ERROR_BODY_CHARS
        );
    }

    #[tokio::test]
    async fn test_sends_key_as_query_and_json_content_type() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "secret-key"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "gemini-1.5-flash");
        let value: Value = client
            .generate_content(&serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn test_non_success_maps_to_api_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": { "code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED" }
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "gemini-1.5-flash");
        let err = client
            .generate_content::<_, Value>(&serde_json::json!({}))
            .await
            .unwrap_err();
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Permission denied");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_maps_to_malformed_response() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = make_client(&server, "gemini-1.5-flash");
        let err = client
            .generate_content::<_, Value>(&serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_slow_response_times_out_as_network_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = GeminiHttpClient::new(
            "secret-key".to_string(),
            "gemini-1.5-flash".to_string(),
            Some(Duration::from_millis(50)),
        )
        .with_base_url(server.uri());

        let err = client
            .generate_content::<_, Value>(&serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(ref e) if e.is_timeout()));
        assert!(!err.to_string().contains("secret-key"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_maps_to_network_error_without_key() {
        // Port 9 (discard) on localhost is not served by anything in tests.
        let client = GeminiHttpClient::new("secret-key".to_string(), "m".to_string(), None)
            .with_base_url("http://127.0.0.1:9".to_string());

        let err = client
            .generate_content::<_, Value>(&serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(!err.to_string().contains("secret-key"));
    }
}
