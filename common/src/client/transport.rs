//! Network seam of the remote store client.

use crate::protocol::HttpResponse;

/// Query parameters as `(name, value)` pairs; the transport encodes them.
pub type Query<'a> = [(&'a str, String)];

/// Sends requests to the single backend endpoint.
///
/// Implementations return `Err` only for transport failures (no response at
/// all); any HTTP status is reported through [`HttpResponse`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// `POST` with a `text/plain` body.
    async fn post(&self, url: &str, query: &Query<'_>, body: String) -> Result<HttpResponse, String>;

    async fn get(&self, url: &str, query: &Query<'_>) -> Result<HttpResponse, String>;

    /// Wall clock in milliseconds, used for request nonces.
    fn now_millis(&self) -> u64;
}
