use std::io;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Json, Response};
use hoard_store::SaveRequest;
use hoard_types::Identifier;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::body::{read_head, stream_reader, ChannelReader, CHANNEL_CAPACITY};
use crate::error::{ServerError, ServerResult};
use crate::router::AppState;
use crate::sniff::{self, SNIFF_LEN};

/// Multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub hashstring: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// `POST /files`: store the `file` part and return its identifier.
///
/// The part is forwarded chunk by chunk to a blocking save, so memory use
/// does not grow with the upload.
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<(StatusCode, Json<UploadResponse>)> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(rejected_upload)?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let (tx, rx) = mpsc::channel::<io::Result<bytes::Bytes>>(CHANNEL_CAPACITY);
        let store = state.store.clone();
        let naming = state.naming.clone();
        let save = tokio::task::spawn_blocking(move || {
            let mut reader = ChannelReader::new(rx);
            store.save(SaveRequest::new(&mut reader).naming(naming.as_ref()))
        });

        let mut aborted = None;
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    // The save gave up early; its error is reported below.
                    if tx.send(Ok(chunk)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = tx
                        .send(Err(io::Error::new(io::ErrorKind::UnexpectedEof, e.body_text())))
                        .await;
                    aborted = Some(rejected_upload(e));
                    break;
                }
            }
        }
        drop(tx);

        let saved = save
            .await
            .map_err(|e| ServerError::Internal(format!("save task failed: {e}")))?;
        if let Some(err) = aborted {
            return Err(err);
        }
        let id = saved?;
        tracing::info!(id = %id, "file stored");
        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                hashstring: id.into_string(),
            }),
        ));
    }
    Err(ServerError::BadRequest(format!(
        "missing multipart field `{UPLOAD_FIELD}`"
    )))
}

/// `GET /files/:id`: stream the object back with a sniffed Content-Type.
pub async fn download_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> ServerResult<Response> {
    let id = Identifier::parse(raw)?;
    let store = state.store.clone();
    let lookup = id.clone();
    let (handle, head) = blocking(move || {
        let mut handle = store.load(&lookup)?;
        let head = read_head(&mut handle, SNIFF_LEN)?;
        Ok((handle, head))
    })
    .await?;

    let size = handle.size();
    let content_type = sniff::content_type(&head);
    tracing::debug!(id = %id, size, content_type, "serving file");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={id}"),
        )
        .body(stream_reader(handle.into_reader(), head))
        .map_err(|e| ServerError::Internal(e.to_string()))
}

/// `DELETE /files/:id`.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> ServerResult<StatusCode> {
    let id = Identifier::parse(raw)?;
    let store = state.store.clone();
    let target = id.clone();
    blocking(move || Ok(store.delete(&target)?)).await?;
    tracing::info!(id = %id, "file deleted");
    Ok(StatusCode::OK)
}

/// A body over the configured limit is 413, any other multipart failure 400.
fn rejected_upload(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(e.body_text())
    } else {
        ServerError::BadRequest(e.body_text())
    }
}

/// Run a store call on the blocking pool.
async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(format!("blocking task failed: {e}")))?
}
