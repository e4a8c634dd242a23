use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::core::errors::{SDError, SDResult};
use crate::core::operations::orchestrator::ActionOrchestrator;
use crate::rpc::handlers::{self, CheckInput, SubmitInput};

pub struct SubmissionServer {
    orchestrator: Arc<ActionOrchestrator>,
    auth_token: String,
}

impl SubmissionServer {
    pub fn new(orchestrator: Arc<ActionOrchestrator>, auth_token: impl Into<String>) -> Self {
        Self {
            orchestrator,
            auth_token: auth_token.into(),
        }
    }

    async fn handle_request(&self, method: &str, params: Option<Value>) -> SDResult<Value> {
        match method {
            "challenge" => Ok(serde_json::to_value(handlers::challenge(&self.orchestrator)?)?),

            "status" => Ok(serde_json::to_value(handlers::status(&self.orchestrator))?),

            "check" => {
                let input: CheckInput = parse_params(params)?;
                Ok(serde_json::to_value(handlers::check(&self.orchestrator, &input))?)
            }

            "submit" => {
                let input: SubmitInput = parse_params(params)?;

                let output =
                    handlers::submit(self.orchestrator.clone(), &self.auth_token, input).await?;
                Ok(serde_json::to_value(output)?)
            }

            _ => Err(SDError::MethodNotFound(method.to_string())),
        }
    }

    /// Answers one JSON-RPC request per line until the input ends or a
    /// submission destroys the site.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> SDResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let request: Value = match serde_json::from_str(&line) {
                Ok(v) => v,
                Err(e) => {
                    let response = json!({
                        "jsonrpc": "2.0",
                        "error": {
                            "code": -32700,
                            "message": format!("Parse error: {e}")
                        },
                        "id": null
                    });
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            let id = request.get("id").cloned().unwrap_or(Value::Null);
            let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
            let params = request.get("params").cloned();

            if method == "initialize" {
                let response = json!({
                    "jsonrpc": "2.0",
                    "result": {
                        "serverInfo": {
                            "name": "sd",
                            "version": env!("CARGO_PKG_VERSION")
                        },
                        "methods": ["challenge", "check", "status", "submit"]
                    },
                    "id": id
                });
                write_response(&mut writer, &response).await?;
                continue;
            }

            let result = self.handle_request(method, params).await;
            let destroyed = method == "submit" && result.is_ok();

            let response = match result {
                Ok(content) => json!({
                    "jsonrpc": "2.0",
                    "result": content,
                    "id": id
                }),
                Err(e) => {
                    let (code, message) = error_code(e);
                    json!({
                        "jsonrpc": "2.0",
                        "error": {
                            "code": code,
                            "message": message
                        },
                        "id": id
                    })
                }
            };
            write_response(&mut writer, &response).await?;

            // Nothing is left to serve once the site is gone.
            if destroyed {
                tracing::info!("Site destroyed, closing submission server");
                break;
            }
        }

        Ok(())
    }
}

fn error_code(e: SDError) -> (i64, String) {
    match e {
        SDError::ChallengeMismatch => (-32001, e.to_string()),
        SDError::Unauthorized => (-32002, e.to_string()),
        SDError::InvalidInput(msg) => (-32003, msg),
        SDError::PathNotFound(_) => (-32004, e.to_string()),
        SDError::DeletionEntryFailure { .. } => (-32005, e.to_string()),
        SDError::StoreCommandFailure(_) => (-32006, e.to_string()),
        SDError::DestructionInProgress => (-32007, e.to_string()),
        SDError::AlreadyDestroyed => (-32008, e.to_string()),
        SDError::IoError(_) => (
            -32009,
            "An I/O error occurred. Please check file permissions and disk space.".to_string(),
        ),
        SDError::SqliteError(_) => (-32010, "A database error occurred.".to_string()),
        SDError::JsonError(_) => (
            -32011,
            "A data serialization error occurred. Please check your input format.".to_string(),
        ),
        SDError::Config(msg) => (-32012, msg),
        SDError::TaskFailed(_) => (-32013, e.to_string()),
        SDError::MethodNotFound(method) => (-32601, format!("Method not found: {method}")),
    }
}

/// Missing params deserialize as defaults; malformed ones are invalid input.
fn parse_params<T: DeserializeOwned + Default>(params: Option<Value>) -> SDResult<T> {
    params
        .map(|v| {
            serde_json::from_value(v)
                .map_err(|e| SDError::InvalidInput(format!("Parse error: {e}")))
        })
        .transpose()
        .map(Option::unwrap_or_default)
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Value) -> SDResult<()> {
    writer.write_all(format!("{response}\n").as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn run_server(
    orchestrator: Arc<ActionOrchestrator>,
    auth_token: Option<String>,
) -> SDResult<()> {
    let auth_token = auth_token.ok_or_else(|| {
        SDError::Config(
            "an auth token is required to serve submissions (use --auth-token or SD_AUTH_TOKEN)"
                .to_string(),
        )
    })?;

    tracing::debug!(site = %orchestrator.site(), "Submission server listening on stdio");

    let server = SubmissionServer::new(orchestrator, auth_token);
    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
}
