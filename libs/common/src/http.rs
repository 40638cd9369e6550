//! HTTP transport for the marketplace backend
//!
//! Every call carries an explicit deadline. Idempotent GETs get a small retry
//! budget for transport failures; nothing else is retried. Non-success answers
//! are turned into [`ApiError`] using the `error` or `message` field of the
//! JSON body when the backend provides one.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::config::{ClientConfig, MAX_GET_RETRIES};
use crate::error::{ApiError, ApiResult};

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Client for the marketplace REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    get_retries: u32,
}

impl ApiClient {
    /// Create a client from the loaded configuration
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        Self::with_timeout(&config.base_url, config.request_timeout(), config.get_retries)
    }

    /// Create a client for `base_url` with an explicit deadline and GET retry budget
    pub fn with_timeout(base_url: &str, timeout: Duration, get_retries: u32) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            get_retries: get_retries.min(MAX_GET_RETRIES),
        })
    }

    /// Backend base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path`, optionally authenticated
    pub async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> ApiResult<T> {
        self.send(Method::GET, path, &[], None, token).await
    }

    /// GET `path` with query parameters
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> ApiResult<T> {
        self.send(Method::GET, path, query, None, token).await
    }

    /// POST a JSON body to `path`
    pub async fn post<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        self.send(Method::POST, path, &[], Some(body), token).await
    }

    /// POST to `path` without a body
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> ApiResult<T> {
        self.send(Method::POST, path, &[], None, token).await
    }

    /// PUT a JSON body to `path`
    pub async fn put<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        self.send(Method::PUT, path, &[], Some(body), token).await
    }

    /// DELETE `path`
    pub async fn delete<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> ApiResult<T> {
        self.send(Method::DELETE, path, &[], None, token).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        token: Option<&str>,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let request_id = Uuid::new_v4();
        let span = info_span!("api_request", %method, path, %request_id);

        async {
            let attempts = if method == Method::GET {
                1 + self.get_retries
            } else {
                1
            };

            let mut last_error = None;
            for attempt in 1..=attempts {
                let mut request = self
                    .http
                    .request(method.clone(), &url)
                    .header(REQUEST_ID_HEADER, request_id.to_string());
                if !query.is_empty() {
                    request = request.query(query);
                }
                if let Some(body) = &body {
                    request = request.json(body);
                }
                request = authorize(request, token);

                match request.send().await {
                    Ok(response) => {
                        let status = response.status();
                        debug!("Backend answered {}", status);
                        let bytes = response
                            .bytes()
                            .await
                            .map_err(|e| self.transport_error(&e))?;
                        return if status.is_success() {
                            decode(&bytes)
                        } else {
                            Err(error_from_response(status, &bytes))
                        };
                    }
                    Err(e) => {
                        let error = self.transport_error(&e);
                        if attempt < attempts {
                            warn!("Attempt {} failed ({}), retrying", attempt, error);
                        }
                        last_error = Some(error);
                    }
                }
            }

            Err(last_error
                .unwrap_or_else(|| ApiError::Network("Request was never sent".to_string())))
        }
        .instrument(span)
        .await
    }

    fn transport_error(&self, error: &reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Network(format!(
                "Request timed out after {} ms",
                self.timeout.as_millis()
            ))
        } else if error.is_connect() {
            ApiError::Network(format!("Could not reach backend at {}", self.base_url))
        } else {
            ApiError::Network(error.to_string())
        }
    }
}

fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(format!("Invalid request body: {}", e)))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> ApiResult<T> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ApiError::Decode(format!("Response is not UTF-8: {}", e)))?;
    if text.trim().is_empty() {
        return serde_json::from_value(Value::Null).map_err(|e| ApiError::Decode(e.to_string()));
    }
    // Some endpoints answer with a bare text message
    serde_json::from_str(text)
        .or_else(|_| serde_json::from_value(Value::String(text.trim().to_string())))
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Build the error for a non-success answer
///
/// The message is the body's `error` field, else its `message` field, else the
/// raw body text, else the canonical reason phrase.
pub fn error_from_response(status: StatusCode, bytes: &[u8]) -> ApiError {
    let text = String::from_utf8_lossy(bytes);
    let from_json = serde_json::from_str::<Value>(&text).ok().and_then(|body| {
        ["error", "message"]
            .iter()
            .find_map(|field| body.get(field).and_then(Value::as_str).map(str::to_string))
    });

    let message = from_json
        .or_else(|| {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_prefers_error_field() {
        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            br#"{"error":"Email already registered","message":"ignored"}"#,
        );
        assert_eq!(
            err,
            ApiError::Status {
                status: 400,
                message: "Email already registered".to_string()
            }
        );
    }

    #[test]
    fn test_error_falls_back_to_message_then_text() {
        let err = error_from_response(StatusCode::NOT_FOUND, br#"{"message":"No such provider"}"#);
        assert_eq!(err.user_message(), "No such provider");

        let err = error_from_response(StatusCode::BAD_GATEWAY, b"upstream down");
        assert_eq!(err.user_message(), "upstream down");

        let err = error_from_response(StatusCode::INTERNAL_SERVER_ERROR, b"");
        assert_eq!(err.user_message(), "Internal Server Error");
    }

    #[test]
    fn test_auth_statuses_are_classified() {
        let err = error_from_response(StatusCode::UNAUTHORIZED, br#"{"error":"Token expired"}"#);
        assert!(err.is_auth_failure());
        assert_eq!(err.status(), Some(401));

        let err = error_from_response(StatusCode::FORBIDDEN, b"");
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn test_empty_success_body_decodes_as_null() {
        let _: () = decode(b"").expect("empty body should decode");

        let value: Option<Value> = decode(b"  ").expect("blank body should decode");
        assert!(value.is_none());
    }

    #[test]
    fn test_text_body_decodes_as_string() {
        let value: Value = decode(b"Booking cancelled successfully").expect("text body");
        assert_eq!(value, Value::String("Booking cancelled successfully".to_string()));
    }
}
