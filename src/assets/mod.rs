//! Asset store capability
//!
//! The request handler never touches storage itself. It asks an [`AssetStore`]
//! for a path, passing the inbound request head along as context, and gets an
//! HTTP response back (404 when nothing matches).

mod dir;

pub use dir::DirAssetStore;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Response};
use std::future::Future;
use std::path::PathBuf;

/// Document served in place of any path the store does not know
pub const FALLBACK_DOCUMENT: &str = "index.html";

/// Response type produced by every asset store
pub type AssetResponse = Response<Full<Bytes>>;

/// Failure of the asset-fetch capability itself.
///
/// A missing asset is not an error: stores answer it with a 404 response.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read asset '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("asset store unavailable: {0}")]
    Unavailable(String),
}

/// A request-like value handed to [`AssetStore::fetch`]
#[derive(Debug, Clone, Copy)]
pub struct AssetRequest<'a> {
    path: &'a str,
    context: &'a Parts,
    fallback: bool,
}

impl<'a> AssetRequest<'a> {
    /// Ask for the path of the inbound request itself
    pub fn original(context: &'a Parts) -> Self {
        Self {
            path: context.uri.path(),
            context,
            fallback: false,
        }
    }

    /// Ask for [`FALLBACK_DOCUMENT`] on behalf of the inbound request
    pub const fn fallback(context: &'a Parts) -> Self {
        Self {
            path: FALLBACK_DOCUMENT,
            context,
            fallback: true,
        }
    }

    pub const fn path(&self) -> &'a str {
        self.path
    }

    pub const fn method(&self) -> &'a Method {
        &self.context.method
    }

    pub const fn headers(&self) -> &'a HeaderMap {
        &self.context.headers
    }

    /// The inbound request head this fetch is made for
    pub const fn context(&self) -> &'a Parts {
        self.context
    }

    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Capability to map a request path to a static asset response
pub trait AssetStore {
    fn fetch(
        &self,
        request: AssetRequest<'_>,
    ) -> impl Future<Output = Result<AssetResponse, AssetError>>;
}
