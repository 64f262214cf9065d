use std::io;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::header::{self, HeaderMap, HeaderValue},
    response::Response,
};
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

use crate::common::AppState;
use crate::entity::{SensorKind, sensor_logs};
use crate::error::{AppError, AppResult};
use crate::ingest;

use super::encode::{LogEncoder, LogFormat};
use super::types::{AddLogRequest, LogResponse, LogsQuery};
use crate::routes::extract::{AppJson, AppQuery};

/// Chunks buffered between the database cursor and the socket.
const STREAM_BUFFER: usize = 64;

/// Append a sensor log
///
/// The log takes the sensor's type. `date_` defaults to the server clock.
#[utoipa::path(
    post,
    path = "/add-log",
    request_body = AddLogRequest,
    responses(
        (status = 200, description = "Log stored", body = LogResponse),
        (status = 400, description = "Invalid measure or timestamp"),
        (status = 404, description = "Sensor not found"),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "logs"
)]
pub async fn add_log(
    State(state): State<AppState>,
    AppJson(req): AppJson<AddLogRequest>,
) -> AppResult<Json<LogResponse>> {
    let recorded_at = req.timestamp()?;
    let log = ingest::append_log(&state.db, req.sensor_id, req.measure, recorded_at).await?;
    Ok(Json(log.into()))
}

/// Get the logs of one sensor type
///
/// Mounted once per type: `/get-ultrasonic-logs`, `/get-magnetic-logs`,
/// `/get-push-logs`, `/get-ir-logs` and `/get-sound-logs`. Rows are ordered
/// by `date_` then `id`, and streamed as a JSON array, NDJSON or CSV.
#[utoipa::path(
    get,
    path = "/get-{kind}-logs",
    params(
        ("kind" = String, Path, description = "ultrasonic, magnetic, push, ir or sound"),
        LogsQuery
    ),
    responses(
        (status = 200, description = "Ordered log rows", body = Vec<LogResponse>),
        (status = 400, description = "Bad window or sensor of another type"),
        (status = 404, description = "Sensor not found"),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "logs"
)]
pub async fn get_logs(
    State(state): State<AppState>,
    kind: SensorKind,
    AppQuery(query): AppQuery<LogsQuery>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let window = query.window(kind)?;
    let format = LogFormat::negotiate(query.format.as_deref(), &headers)?;

    let (tx, rx) = mpsc::channel::<Result<Vec<u8>, io::Error>>(STREAM_BUFFER);
    let (opened_tx, opened_rx) = oneshot::channel::<AppResult<()>>();
    let db = state.db.clone();

    // The stream borrows the pool handle, so it lives in its own task and the
    // response body only sees the channel.
    tokio::spawn(async move {
        let rows = match window.open(&db).await {
            Ok(rows) => rows,
            Err(e) => {
                let _ = opened_tx.send(Err(e));
                return;
            }
        };
        if opened_tx.send(Ok(())).is_err() {
            return;
        }
        pump(rows, format.encoder(), tx).await;
    });

    // Validation and connection failures surface here, before any body byte.
    opened_rx
        .await
        .map_err(|_| AppError::Internal("log stream task ended before opening".to_string()))??;

    Response::builder()
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static(format.content_type()),
        )
        .body(Body::from_stream(ReceiverStream::new(rx)))
        .map_err(|e| AppError::Internal(e.to_string()))
}

async fn pump<S>(rows: S, mut encoder: LogEncoder, tx: mpsc::Sender<Result<Vec<u8>, io::Error>>)
where
    S: Stream<Item = AppResult<sensor_logs::Model>>,
{
    let mut rows = std::pin::pin!(rows);

    let prelude = encoder.open();
    if !prelude.is_empty() && tx.send(Ok(prelude)).await.is_err() {
        return;
    }

    let mut sent = 0usize;
    while let Some(row) = rows.next().await {
        match row.and_then(|log| encoder.row(&LogResponse::from(log))) {
            Ok(chunk) => {
                if tx.send(Ok(chunk)).await.is_err() {
                    tracing::debug!(sent, "Client went away, stopping log stream");
                    return;
                }
                sent += 1;
            }
            Err(e) => {
                // Aborting the body tells the client the series is incomplete.
                tracing::error!(sent, error = %e, "Log stream failed mid-body");
                let _ = tx.send(Err(io::Error::other(e.to_string()))).await;
                return;
            }
        }
    }

    let epilogue = encoder.close();
    if !epilogue.is_empty() {
        let _ = tx.send(Ok(epilogue)).await;
    }
    tracing::debug!(sent, "Log stream finished");
}
