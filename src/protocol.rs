//! Line-delimited JSON tool server over stdin/stdout.
//!
//! Each input line is a [`Request`]; each output line a [`Response`].
//! Requests are handled concurrently, so responses may arrive out of order
//! and echo the request `id` for correlation.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::app::App;
use crate::tools::{self, Params};

#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<Value>,
    pub tool: String,
    #[serde(default)]
    pub params: serde_json::Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Value>,
        data: Value,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Value>,
        error: String,
    },
}

/// Answer one request line. Never fails: malformed input becomes an error
/// response.
pub async fn handle_line(app: &App, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejecting malformed request: {}", e);
            return Response::Error {
                id: None,
                error: format!("Invalid request: {e}"),
            };
        }
    };

    debug!("Handling {}", request.tool);
    let params = Params::from_json(request.params);
    match tools::call(app, &request.tool, &params).await {
        Ok(data) => Response::Success { id: request.id, data },
        Err(e) => Response::Error {
            id: request.id,
            error: e.to_string(),
        },
    }
}

/// Serve requests from stdin until it closes.
pub async fn serve(app: Arc<App>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = rx.recv().await {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    info!("Serving tools on stdin/stdout");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }

        let app = Arc::clone(&app);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = handle_line(&app, &line).await;
            match serde_json::to_string(&response) {
                Ok(encoded) => {
                    if tx.send(encoded).is_err() {
                        warn!("Output closed, dropping response");
                    }
                }
                Err(e) => error!("Failed to encode response: {}", e),
            }
        });
    }

    // Writer exits once every in-flight handler has dropped its sender.
    drop(tx);
    writer
        .await
        .context("Response writer panicked")?
        .context("Failed to write response")?;

    info!("Input closed, shutting down");
    Ok(())
}
