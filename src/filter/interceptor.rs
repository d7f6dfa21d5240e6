//! Body interceptor that rewrites the `servers` entry of an OpenAPI document.
//!
//! # Data Flow
//! ```text
//! BodySource::Streaming
//!     → accumulate chunks in arrival order (size-limited)
//!     → concatenate once the stream completes
//!     → gunzip (when Content-Encoding: gzip)
//!     → parse JSON object, set "servers" to the gateway route prefix
//!     → gzip again (when Content-Encoding: gzip)
//!     → one buffer handed back to the transport
//!
//! BodySource::Singleton
//!     → returned untouched, no rewrite
//! ```
//!
//! # Design Decisions
//! - Nothing is parsed until the stream completes; JSON and gzip framing
//!   cannot be processed from arbitrary chunk boundaries
//! - Full parse/serialize round trip with key order preserved
//! - A gzip body that fails to decompress is forwarded as received
//! - The size limit applies to the received and to the decoded document
//! - An empty body (HEAD, 204) is forwarded as received

use std::borrow::Cow;

use axum::body::{Body, Bytes};
use axum::http::HeaderMap;
use bytes::BytesMut;
use futures_util::StreamExt;
use serde::Serialize;

use crate::filter::error::FilterError;
use crate::filter::gzip;
use crate::filter::BodySource;

/// Gateway location of the service instance whose document is rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteContext {
    /// e.g. `/services/store/store-1`
    pub service_path_prefix: String,
}

impl RouteContext {
    /// Derive the context by removing `docs_suffix` from the request path.
    pub fn from_request_path(request_path: &str, docs_suffix: &str) -> Self {
        let prefix = request_path.strip_suffix(docs_suffix).unwrap_or(request_path);
        Self {
            service_path_prefix: prefix.to_string(),
        }
    }
}

/// Lifecycle of one interceptor. There is no way back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptorState {
    Idle,
    Accumulating,
    Completed,
    RewriteSucceeded,
    RewriteFailed,
    /// The body was not a stream and passed through unchanged.
    Skipped,
}

#[derive(Serialize)]
struct ServerEntry<'a> {
    url: &'a str,
    description: &'a str,
}

/// Single-use rewriter bound to one response.
#[derive(Debug)]
pub struct ServersInterceptor {
    context: RouteContext,
    gzipped: bool,
    description: String,
    max_document_bytes: usize,
    state: InterceptorState,
    rewritten: Option<String>,
}

impl ServersInterceptor {
    /// Bind an interceptor to a route context and the response headers.
    ///
    /// The compression flag is read from `headers` here, before any body
    /// bytes are seen.
    pub fn new(
        context: RouteContext,
        headers: &HeaderMap,
        description: impl Into<String>,
        max_document_bytes: usize,
    ) -> Self {
        Self {
            context,
            gzipped: gzip::is_gzip_encoded(headers),
            description: description.into(),
            max_document_bytes,
            state: InterceptorState::Idle,
            rewritten: None,
        }
    }

    pub fn context(&self) -> &RouteContext {
        &self.context
    }

    pub fn is_gzipped(&self) -> bool {
        self.gzipped
    }

    pub fn state(&self) -> InterceptorState {
        self.state
    }

    /// The rewritten document text, or `""` when no rewrite happened.
    pub fn rewritten_body(&self) -> &str {
        self.rewritten.as_deref().unwrap_or_default()
    }

    /// Consume the response body and return the bytes to send instead.
    pub async fn write_with(&mut self, source: BodySource) -> Result<Bytes, FilterError> {
        if self.state != InterceptorState::Idle {
            return Err(FilterError::AlreadyWritten);
        }

        let body = match source {
            BodySource::Streaming(body) => body,
            BodySource::Singleton(bytes) => {
                tracing::debug!(
                    service_prefix = %self.context.service_path_prefix,
                    "Body is not streamed, skipping servers rewrite"
                );
                self.state = InterceptorState::Skipped;
                return Ok(bytes);
            }
        };

        self.state = InterceptorState::Accumulating;
        let result = match self.accumulate(body).await {
            Ok(buffer) if buffer.is_empty() => {
                tracing::debug!(
                    service_prefix = %self.context.service_path_prefix,
                    "Empty document body, skipping servers rewrite"
                );
                self.state = InterceptorState::Skipped;
                return Ok(buffer);
            }
            Ok(buffer) => {
                self.state = InterceptorState::Completed;
                self.transform(buffer)
            }
            Err(e) => Err(e),
        };

        if result.is_err() {
            self.state = InterceptorState::RewriteFailed;
        }
        result
    }

    async fn accumulate(&self, body: Body) -> Result<Bytes, FilterError> {
        let mut chunks: Vec<Bytes> = Vec::new();
        let mut received = 0usize;

        let mut stream = body.into_data_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(FilterError::Upstream)?;
            received += chunk.len();
            if received > self.max_document_bytes {
                return Err(FilterError::DocumentTooLarge {
                    limit: self.max_document_bytes,
                });
            }
            chunks.push(chunk);
        }

        tracing::trace!(chunks = chunks.len(), bytes = received, "Document body received");

        if chunks.len() == 1 {
            return Ok(chunks.swap_remove(0));
        }
        let mut buffer = BytesMut::with_capacity(received);
        for chunk in &chunks {
            buffer.extend_from_slice(chunk);
        }
        Ok(buffer.freeze())
    }

    fn transform(&mut self, buffer: Bytes) -> Result<Bytes, FilterError> {
        let document: Cow<'_, [u8]> = if self.gzipped {
            match gzip::decompress(&buffer, self.max_document_bytes) {
                Ok(decoded) if decoded.len() > self.max_document_bytes => {
                    return Err(FilterError::DocumentTooLarge {
                        limit: self.max_document_bytes,
                    });
                }
                Ok(decoded) => Cow::Owned(decoded),
                Err(e) => {
                    tracing::warn!(
                        service_prefix = %self.context.service_path_prefix,
                        error = %e,
                        "Failed to decompress OpenAPI document, forwarding it unchanged"
                    );
                    self.state = InterceptorState::RewriteFailed;
                    return Ok(buffer);
                }
            }
        } else {
            Cow::Borrowed(&buffer[..])
        };

        let text = self.rewrite_servers(&document)?;

        let encoded = if self.gzipped {
            Bytes::from(gzip::compress(text.as_bytes()).map_err(FilterError::Compression)?)
        } else {
            Bytes::copy_from_slice(text.as_bytes())
        };

        self.rewritten = Some(text);
        self.state = InterceptorState::RewriteSucceeded;
        Ok(encoded)
    }

    fn rewrite_servers(&self, document: &[u8]) -> Result<String, FilterError> {
        let mut value: serde_json::Value = serde_json::from_slice(document)?;
        let root = value.as_object_mut().ok_or(FilterError::NotAnObject)?;

        let entry = serde_json::to_value(ServerEntry {
            url: &self.context.service_path_prefix,
            description: &self.description,
        })?;
        root.insert("servers".to_string(), serde_json::Value::Array(vec![entry]));

        Ok(serde_json::to_string(&value)?)
    }
}
