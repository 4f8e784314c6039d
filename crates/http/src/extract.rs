//! Request body extraction shared by every write operation.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
};
use percent_encoding::percent_decode;
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::AppError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Typed request body accepted either form-encoded or as JSON.
///
/// Bodies carrying the form content type are decoded as `application/x-www-form-urlencoded`;
/// anything else is decoded as JSON, whatever its declared type. Absent or ill-typed fields
/// become [`AppError::Parameter`]; a body that isn't parseable at all becomes
/// [`AppError::Decode`]. In a form body a repeated key keeps its last value, and a value
/// whose escapes do not decode to UTF-8 counts as a bad argument.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let form = is_form(req.headers());
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::malformed_body(rejection.body_text()))?;

        if form {
            return decode_form(&body).map(Self);
        }

        serde_json::from_slice(&body)
            .map(Self)
            .map_err(|e| match e.classify() {
                Category::Data => AppError::missing_argument(e.to_string()),
                Category::Io | Category::Syntax | Category::Eof => {
                    AppError::malformed_body(e.to_string())
                }
            })
    }
}

fn decode_form<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for pair in body.split(|byte| *byte == b'&').filter(|pair| !pair.is_empty()) {
        let (key, value) = match pair.iter().position(|byte| *byte == b'=') {
            Some(at) => (&pair[..at], &pair[at + 1..]),
            None => (pair, &[][..]),
        };
        let key = decode_component(key)?;
        let value = decode_component(value)?;
        match pairs.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => pairs.push((key, value)),
        }
    }

    let normalized = serde_urlencoded::to_string(&pairs)
        .map_err(|e| AppError::malformed_body(e.to_string()))?;
    serde_urlencoded::from_str(&normalized).map_err(|e| AppError::missing_argument(e.to_string()))
}

fn decode_component(raw: &[u8]) -> Result<String, AppError> {
    let spaced: Vec<u8> = raw
        .iter()
        .map(|byte| if *byte == b'+' { b' ' } else { *byte })
        .collect();
    percent_decode(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| AppError::missing_argument("argument is not valid UTF-8"))
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE))
}
