//! Bounded body capture with replay.
//!
//! The inbound body is a single-use stream but has two readers: the
//! authorization call wants a bounded prefix, the upstream wants all of it.
//! [`capture`] reads the prefix once and hands back a replacement body that
//! yields `prefix ++ overflow ++ rest-of-original`, so nothing is read twice
//! and nothing is lost.

use axum::body::{Body, HttpBody};
use bytes::{Bytes, BytesMut};
use futures_util::{stream, StreamExt};
use http_body_util::BodyExt;

/// Bytes of a discarded response body read before the connection is dropped.
pub const DRAIN_LIMIT: usize = 4 << 10;

/// Result of a capture: the prefix for authorization and the full body for
/// forwarding.
#[derive(Debug)]
pub struct CapturedBody {
    pub prefix: Bytes,
    pub body: Body,
}

/// Read up to `limit` bytes of `body` into memory.
///
/// The returned body replays the captured bytes followed by the unread
/// remainder of the original stream. Trailers are not preserved.
pub async fn capture(mut body: Body, limit: usize) -> Result<CapturedBody, axum::Error> {
    if limit == 0 || body.is_end_stream() {
        return Ok(CapturedBody {
            prefix: Bytes::new(),
            body,
        });
    }

    let mut prefix = BytesMut::new();
    let mut overflow = None;
    let mut exhausted = false;

    while prefix.len() < limit {
        let Some(frame) = body.frame().await else {
            exhausted = true;
            break;
        };
        let Ok(mut data) = frame?.into_data() else {
            continue;
        };

        let room = limit - prefix.len();
        if data.len() > room {
            overflow = Some(data.split_off(room));
        }
        prefix.extend_from_slice(&data);
    }

    let prefix = prefix.freeze();

    if exhausted {
        return Ok(CapturedBody {
            body: Body::from(prefix.clone()),
            prefix,
        });
    }

    let replayed = stream::iter(
        std::iter::once(prefix.clone())
            .chain(overflow)
            .filter(|chunk| !chunk.is_empty())
            .map(Ok::<_, axum::Error>),
    );

    Ok(CapturedBody {
        body: Body::from_stream(replayed.chain(body.into_data_stream())),
        prefix,
    })
}

/// Read and discard at most `limit` bytes, then drop the body.
///
/// A fully read body lets the pooled connection be reused; anything larger is
/// abandoned and its connection closed.
pub async fn drain(mut body: Body, limit: usize) {
    let mut read = 0;
    while read < limit {
        match body.frame().await {
            Some(Ok(frame)) => {
                if let Some(data) = frame.data_ref() {
                    read += data.len();
                }
            }
            Some(Err(e)) => {
                tracing::debug!(error = %e, "Discarded body ended with error");
                return;
            }
            None => return,
        }
    }
}
