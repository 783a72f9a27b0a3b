//! JSON extractor with enveloped rejections

use axum::{
    extract::{rejection::JsonRejection as AxumJsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// `axum::Json` wrapper whose rejections use the API error envelope
///
/// Missing fields are reported with the field name in `param`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

/// JSON rejection rendered as an `ApiError`
#[derive(Debug)]
pub struct JsonRejection(ApiError);

impl IntoResponse for JsonRejection {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumJson::<T>::from_request(req, state).await {
            Ok(AxumJson(value)) => Ok(Json(value)),
            Err(rejection) => Err(JsonRejection(rejection_to_error(&rejection))),
        }
    }
}

fn rejection_to_error(rejection: &AxumJsonRejection) -> ApiError {
    let (message, param) = match rejection {
        AxumJsonRejection::JsonDataError(err) => {
            let text = err.body_text();
            let param = missing_field(&text);
            (format!("Invalid JSON data: {}", text), param)
        }
        AxumJsonRejection::JsonSyntaxError(err) => {
            (format!("Invalid JSON syntax: {}", err.body_text()), None)
        }
        AxumJsonRejection::MissingJsonContentType(_) => (
            "Missing Content-Type header. Expected 'application/json'.".to_string(),
            None,
        ),
        AxumJsonRejection::BytesRejection(err) => {
            (format!("Failed to read request body: {}", err.body_text()), None)
        }
        _ => ("Invalid JSON request".to_string(), None),
    };

    // Keep bad input on 400 whatever status axum picked
    let status = match rejection.status() {
        StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::PAYLOAD_TOO_LARGE => rejection.status(),
        _ => StatusCode::BAD_REQUEST,
    };

    let error = ApiError::new(status, message).with_code("json_parse_error");

    match param {
        Some(param) => error.with_param(param),
        None => error,
    }
}

/// Extract `name` from serde's "missing field `name`" message
fn missing_field(text: &str) -> Option<String> {
    let rest = text.split("missing field `").nth(1)?;
    rest.split('`').next().map(str::to_string)
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}
