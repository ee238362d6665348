//! SPA fallback handler
//!
//! Entry point for HTTP request processing. Makes one or two asset-store
//! calls per request and returns the store's response untouched.

use crate::assets::{AssetError, AssetRequest, AssetResponse, AssetStore};
use crate::handler::Env;
use hyper::{Request, StatusCode};

/// Handle one inbound request against the environment's asset store.
///
/// Any status other than 404 from the first fetch is returned as-is. A 404
/// triggers a second fetch for the fallback document with the original
/// request head as context, and that response is returned whatever its
/// status. Store failures propagate to the caller.
pub async fn handle<B, S>(req: Request<B>, env: &Env<S>) -> Result<AssetResponse, AssetError>
where
    S: AssetStore,
{
    let (head, _body) = req.into_parts();

    let response = env.assets.fetch(AssetRequest::original(&head)).await?;
    if response.status() != StatusCode::NOT_FOUND {
        return Ok(response);
    }

    env.assets.fetch(AssetRequest::fallback(&head)).await
}
