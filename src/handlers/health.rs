use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::procedure::{Procedure, ProcedureInput};
use crate::version::GIT_VERSION;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    git_version: &'static str,
}

pub async fn check() -> Procedure<HealthResponse> {
    Procedure(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        git_version: GIT_VERSION,
    })
}

#[derive(Deserialize)]
pub struct EchoInput {
    message: String,
}

#[derive(Serialize)]
pub struct EchoResponse {
    message: String,
    timestamp: DateTime<Utc>,
}

pub async fn echo(ProcedureInput(input): ProcedureInput<EchoInput>) -> Result<Procedure<EchoResponse>> {
    Ok(Procedure(EchoResponse {
        message: input.message,
        timestamp: Utc::now(),
    }))
}
