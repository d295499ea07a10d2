//! HTTP error mapping shared by the OpenAI adapters.

use reqwest::StatusCode;
use serde::Deserialize;
use vpersona_core::VpError;

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub(crate) fn map_http_error(status: StatusCode, body: String) -> VpError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    VpError::Http {
        status: Some(status.as_u16()),
        message,
        retryable,
    }
}

pub(crate) fn request_failed(api: &str, err: reqwest::Error) -> VpError {
    VpError::Http {
        status: None,
        message: format!("{api} request failed: {err}"),
        retryable: err.is_connect() || err.is_timeout(),
    }
}
