//! Typed procedure transport.
//!
//! Every endpoint is a named procedure under `/trpc/<namespace>.<name>`.
//! Queries are `GET` requests carrying their input as URL-encoded JSON in the
//! `input` query parameter; mutations are `POST` requests with a JSON body.
//! Results are wrapped as `{"result": {"data": ...}}`.

use axum::{
    body::Bytes,
    extract::{FromRequest, Query, Request},
    http::Method,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::AppError;

/// Deserialized procedure input. Malformed or ill-typed input is rejected
/// as a validation error before the handler runs.
#[derive(Debug)]
pub struct ProcedureInput<T>(pub T);

#[derive(Deserialize)]
struct QueryInput {
    input: Option<String>,
}

impl<T, S> FromRequest<S> for ProcedureInput<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let raw: Vec<u8> = if req.method() == Method::GET {
            let Query(query) = Query::<QueryInput>::try_from_uri(req.uri())
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            query.input.unwrap_or_default().into_bytes()
        } else {
            Bytes::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?
                .to_vec()
        };

        let raw: &[u8] = if raw.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &raw
        };

        serde_json::from_slice(raw)
            .map(ProcedureInput)
            .map_err(|e| AppError::Validation(format!("Invalid input: {e}")))
    }
}

/// Successful procedure result.
#[derive(Debug)]
pub struct Procedure<T>(pub T);

#[derive(Serialize)]
struct Envelope<T> {
    result: ResultData<T>,
}

#[derive(Serialize)]
struct ResultData<T> {
    data: T,
}

impl<T> IntoResponse for Procedure<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        Json(Envelope {
            result: ResultData { data: self.0 },
        })
        .into_response()
    }
}

/// Input of procedures scoped to one user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub user_id: String,
}

/// Input of procedures addressing one owned entity.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityInput {
    pub id: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Reject a `limit` input outside 1..=500.
pub fn check_limit(limit: i64) -> Result<i64, AppError> {
    if (1..=500).contains(&limit) {
        Ok(limit)
    } else {
        Err(AppError::Validation(
            "limit must be between 1 and 500".to_string(),
        ))
    }
}
