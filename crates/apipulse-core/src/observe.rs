//! Observation inputs handed to the client by framework adapters.
//!
//! Adapters (one per web framework) only extract these plain structs from
//! their framework's request/response types; the client never sees a
//! framework type.

/// One observed HTTP request, as seen by a middleware adapter.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    /// Consumer identifier, if the adapter attributed the request to one.
    pub consumer: Option<String>,
    /// HTTP method (any casing; normalized by the client).
    pub method: String,
    /// Templated route pattern, e.g. `/items/{id}`, never the raw path.
    pub path: String,
    /// Request body size in bytes, if known.
    pub size_bytes: Option<u64>,
}

/// The matching observed response.
#[derive(Debug, Clone)]
pub struct ResponseInfo {
    /// Response status code.
    pub status_code: u16,
    /// Wall-clock handling time in milliseconds.
    pub response_time_ms: f64,
    /// Response body size in bytes, if known.
    pub size_bytes: Option<u64>,
}
