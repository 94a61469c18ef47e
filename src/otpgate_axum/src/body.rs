//! Bounded look-ahead into request bodies.

use axum::body::{Body, Bytes};
use futures::{StreamExt, stream};

/// A request body after the gate looked into it.
pub struct Peeked {
    /// What to forward downstream. It yields exactly what the client sent,
    /// whether or not the whole body was read.
    pub body: Body,
    /// The complete body, when it fit within the limit.
    pub bytes: Option<Bytes>,
}

/// Read `body` up to `limit` bytes.
///
/// A body over the limit is not rejected: the chunks read so far are
/// replayed in front of the unread rest and `bytes` is `None`.
pub async fn peek(body: Body, limit: usize) -> Peeked {
    let mut data = body.into_data_stream();
    let mut chunks: Vec<Bytes> = Vec::new();
    let mut size = 0usize;

    while let Some(chunk) = data.next().await {
        match chunk {
            Ok(chunk) => {
                size += chunk.len();
                chunks.push(chunk);
                if size > limit {
                    tracing::debug!(limit, "Request body exceeds look-ahead limit");
                    let head = stream::iter(chunks.into_iter().map(Ok::<_, axum::Error>));
                    return Peeked {
                        body: Body::from_stream(head.chain(data)),
                        bytes: None,
                    };
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not read request body");
                let replay = chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(e)));
                return Peeked {
                    body: Body::from_stream(stream::iter(replay)),
                    bytes: None,
                };
            }
        }
    }

    let bytes = match chunks.len() {
        1 => chunks.swap_remove(0),
        _ => Bytes::from(chunks.concat()),
    };
    Peeked {
        body: Body::from(bytes.clone()),
        bytes: Some(bytes),
    }
}
