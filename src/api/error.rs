use tracing::warn;

/// HTTP-level error returned by a provider client
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 400 Bad Request
    BadRequest(String),
    /// 401/403 rejected credentials
    Unauthorized(String),
    /// 404 Not Found
    NotFound(String),
    /// 429 Too Many Requests
    RateLimited { retry_after: Option<u64> },
    /// 5xx Server Error
    ServerError(u16, String),
    /// Other HTTP errors
    HttpError(u16, String),
    /// Network/request error
    RequestError(String),
    /// Body could not be decoded
    DeserializationError(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::RateLimited { retry_after } => match retry_after {
                Some(secs) => write!(f, "Rate Limited. Retry after {} s", secs),
                None => write!(f, "Rate Limited"),
            },
            ApiError::ServerError(code, msg) => write!(f, "Server Error ({}): {}", code, msg),
            ApiError::HttpError(code, msg) => write!(f, "HTTP Error ({}): {}", code, msg),
            ApiError::RequestError(msg) => write!(f, "Request Error: {}", msg),
            ApiError::DeserializationError(msg) => write!(f, "Deserialization Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Classify a non-success response by its status code
pub async fn handle_error_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok());
    let body_text = response.text().await.unwrap_or_default();

    classify_status(status, retry_after, body_text)
}

pub(crate) fn classify_status(status: u16, retry_after: Option<u64>, body_text: String) -> ApiError {
    match status {
        400 => ApiError::BadRequest(extract_message(&body_text)),
        401 | 403 => ApiError::Unauthorized(extract_message(&body_text)),
        404 => ApiError::NotFound(extract_message(&body_text)),
        429 => {
            warn!("Rate limited by provider, retry after {:?} s", retry_after);
            ApiError::RateLimited { retry_after }
        }
        500..=599 => {
            warn!("Server error {}: {}", status, body_text);
            ApiError::ServerError(status, body_text)
        }
        _ => ApiError::HttpError(status, body_text),
    }
}

/// Pull a human-readable message out of a JSON error body, if there is one
fn extract_message(body_text: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body_text) else {
        return body_text.to_string();
    };

    // CoinGecko: {"error": "coin not found"}; Yahoo: {"chart": {"error": {"description": ..}}}
    json.get("error")
        .and_then(|v| v.as_str())
        .or_else(|| json.pointer("/chart/error/description").and_then(|v| v.as_str()))
        .or_else(|| json.get("message").and_then(|v| v.as_str()))
        .map(|s| s.to_string())
        .unwrap_or_else(|| body_text.to_string())
}
