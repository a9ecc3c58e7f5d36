// Chunked frame streaming utilities
use crate::domain::status::RenderFrame;
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Create a chunked streaming response of length-prefixed JSON frames
pub async fn chunked_frame_stream<S>(
    stream: S,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = RenderFrame> + Send + 'static,
{
    let byte_stream =
        stream.then(move |frame| async move { serialize_chunk(frame, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding on the response.
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::TRANSFER_ENCODING, "chunked");

    response
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single frame to a chunk: u32 big-endian length, then payload
async fn serialize_chunk(frame: RenderFrame, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(&frame).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Stream every frame published on `rx`, starting with the current one.
///
/// Ends when the publisher goes away or `shutdown` is cancelled.
pub fn frames_from_watch(
    mut rx: watch::Receiver<RenderFrame>,
    shutdown: CancellationToken,
) -> impl Stream<Item = RenderFrame> {
    async_stream::stream! {
        if shutdown.is_cancelled() {
            return;
        }
        let current = rx.borrow_and_update().clone();
        yield current;
        loop {
            let changed = tokio::select! {
                result = rx.changed() => result.is_ok(),
                _ = shutdown.cancelled() => false,
            };
            if !changed {
                break;
            }
            let frame = rx.borrow_and_update().clone();
            yield frame;
        }
    }
}

/// Helper to create a streaming response from a frame receiver
pub async fn stream_from_watch(
    rx: watch::Receiver<RenderFrame>,
    shutdown: CancellationToken,
    compress: bool,
) -> impl IntoResponse {
    match chunked_frame_stream(frames_from_watch(rx, shutdown), compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
